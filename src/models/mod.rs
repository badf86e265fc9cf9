//! Data models for the LDS Tools services.
//!
//! This module contains the request and response shapes the client sends
//! and reads.

// Export submodules
pub mod args;
pub mod auth;
pub mod unit;
