use std::collections::BTreeMap;
use std::fmt::Display;

/// Arguments substituted into an endpoint's URL template.
///
/// Positional arguments fill `{}` placeholders in order. The member
/// identifier fills `{member}`. Query parameters may fill a placeholder of
/// the same name; the rest are appended to the URL's query string.
///
/// There is no way to supply the unit number: `{unit}` always receives the
/// signed-in member's unit.
///
/// # Examples
///
/// ```
/// use ldsorg_client::EndpointArgs;
///
/// let args = EndpointArgs::new()
///     .arg("individual")
///     .member(123456789)
///     .query("lang", "eng");
/// assert_eq!(args.positional(), ["individual".to_string()]);
/// assert_eq!(args.member_id(), Some("123456789"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointArgs {
    positional: Vec<String>,
    member: Option<String>,
    query: BTreeMap<String, String>,
}

impl EndpointArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Sets the member identifier.
    pub fn member(mut self, member: impl Display) -> Self {
        self.member = Some(member.to_string());
        self
    }

    /// Adds a query parameter.
    ///
    /// `unit` and `member` are reserved and ignored here; use
    /// [`EndpointArgs::member`] for the latter.
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        let key = key.into();
        if key != "unit" && key != "member" {
            self.query.insert(key, value.to_string());
        }
        self
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn member_id(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Named template values, with `unit` bound to the resolved unit number.
    pub(crate) fn named_values(&self, unit: &str) -> BTreeMap<String, String> {
        let mut named = self.query.clone();
        if let Some(member) = &self.member {
            named.insert("member".to_string(), member.clone());
        }
        named.insert("unit".to_string(), unit.to_string());
        named
    }
}
