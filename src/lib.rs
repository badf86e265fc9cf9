//! # ldsorg-client
//!
//! A Rust client library for the LDS Tools member and unit web services.
//!
//! The service does not have a fixed API surface. It publishes a
//! configuration document naming every endpoint it supports, and this crate
//! discovers that map when a client is built. Requests are then made by
//! endpoint name, with path and query parameters substituted into the
//! advertised URL templates.
//!
//! ## Features
//!
//! - Endpoint discovery and normalization of the advertised URL templates
//! - Cookie-based sign-in and sign-out
//! - Automatic substitution of the signed-in member's unit number
//! - Scoped sessions that always sign out
//!
//! ## Example
//!
//! ```rust,no_run
//! use ldsorg_client::{EndpointArgs, LdsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = LdsClient::builder()
//!         .username("member")
//!         .password("secret")
//!         .build()
//!         .await?;
//!
//!     for (name, template) in client.endpoints().iter() {
//!         println!("[{name:25}] {template}");
//!     }
//!
//!     let my_id: u64 =
//!         client.get_json("current-user-id", EndpointArgs::new()).await?;
//!     let photo: serde_json::Value = client
//!         .get_json("photo-url", EndpointArgs::new().arg("individual").member(my_id))
//!         .await?;
//!     println!("{photo}");
//!
//!     client.sign_out().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod endpoint;
mod error;
mod models;
mod session;

pub use client::{LdsClient, LdsClientBuilder};
pub use endpoint::{
    normalize, EndpointMap, RenderedUrl, UrlTemplate, AUTH_ENDPOINT, CURRENT_UNIT_ENDPOINT,
    DEFAULT_CONFIG_URL, SIGNOUT_ENDPOINT,
};
pub use error::{LdsError, LdsResult, UrlParseError};
pub use models::args::EndpointArgs;
pub use session::session;
