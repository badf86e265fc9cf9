//! Endpoint discovery and normalization.
//!
//! The service publishes a flat JSON document mapping endpoint names to URL
//! templates written with printf-style markers (`%@`, `%d`, `%.0f`). Those
//! markers are rewritten once, at discovery time, into the brace syntax
//! understood by [`UrlTemplate`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::{LdsError, LdsResult};

pub mod template;

pub use template::{RenderedUrl, UrlTemplate};

/// Bootstrap document published by LDS Tools.
pub const DEFAULT_CONFIG_URL: &str = "https://tech.lds.org/mobile/ldstools/config.json";

/// Endpoint used to sign in.
pub const AUTH_ENDPOINT: &str = "auth-url";

/// Endpoint used to sign out.
pub const SIGNOUT_ENDPOINT: &str = "signout-url";

/// Endpoint returning the signed-in member's unit number.
pub const CURRENT_UNIT_ENDPOINT: &str = "current-user-unit";

const GENERIC_MARKERS: [&str; 3] = ["%@", "%d", "%.0f"];

/// Normalized mapping from endpoint name to URL template.
///
/// The set of names is whatever the service advertised when the client was
/// built; lookups are checked at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMap {
    endpoints: BTreeMap<String, String>,
}

impl EndpointMap {
    /// Builds a normalized map from a bootstrap configuration document.
    ///
    /// Entries whose value is not a string starting with `http://` or
    /// `https://` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LdsError::DiscoveryFailed`] when the document is not a JSON
    /// object.
    pub fn from_config(config: &Value) -> LdsResult<Self> {
        let entries = config.as_object().ok_or_else(|| {
            LdsError::DiscoveryFailed("configuration document is not a JSON object".into())
        })?;

        let endpoints = entries
            .iter()
            .filter_map(|(name, value)| {
                let url = value.as_str()?;
                is_absolute_url(url).then(|| (name.clone(), normalize(name, url)))
            })
            .collect();

        Ok(Self { endpoints })
    }

    /// Returns the template registered under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.endpoints.get(name).map(String::as_str)
    }

    /// Returns `true` when `name` was advertised by the service.
    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Iterates over `(name, template)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.endpoints.iter().map(|(name, url)| (name.as_str(), url.as_str()))
    }

    /// Iterates over the endpoint names sorted alphabetically.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// Looks up `name`, failing with [`LdsError::UnknownEndpoint`].
    pub(crate) fn require(&self, name: &str) -> LdsResult<&str> {
        self.get(name).ok_or_else(|| LdsError::UnknownEndpoint(name.to_string()))
    }
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Rewrites the printf-style markers of one advertised URL.
///
/// Unit placeholders are resolved first, then member placeholders; whatever
/// markers remain become positional `{}` placeholders. A `unitNumber=%@`
/// query binds every `=%@` in the URL to the unit, and a membership record
/// URL binds every remaining `%@` to the member.
pub fn normalize(name: &str, url: &str) -> String {
    let mut url = url.to_string();

    if url.contains("unit/%@") {
        url = url.replace("unit/%@", "unit/{unit}");
    } else if url.contains("unitNumber=%@") {
        url = url.replace("=%@", "={unit}");
    } else if name.starts_with("unit-") && url.ends_with("/%@") {
        url.truncate(url.len() - "%@".len());
        url.push_str("{unit}");
    }

    if url.contains("membership-record/%@") {
        url = url.replace("%@", "{member}");
    } else if url.contains("photo/url/%@") {
        url = url.replace("url/%@", "url/{member}");
    }

    for marker in GENERIC_MARKERS {
        if url.contains(marker) {
            url = url.replace(marker, "{}");
        }
    }

    url
}
