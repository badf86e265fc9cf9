use serde::Deserialize;

/// Body returned by the `current-user-unit` endpoint.
#[derive(Debug, Deserialize)]
pub struct CurrentUnitResponse {
    /// The unit number of the signed-in member.
    pub message: UnitValue,
}

/// The unit number as the service encodes it.
///
/// Depending on the service version the value arrives either as a JSON
/// string or a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UnitValue {
    Text(String),
    Number(u64),
}

impl From<UnitValue> for String {
    fn from(value: UnitValue) -> Self {
        match value {
            UnitValue::Text(text) => text,
            UnitValue::Number(number) => number.to_string(),
        }
    }
}
