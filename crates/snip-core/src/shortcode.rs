use crate::base62;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A validated short code identifying a shortened URL.
///
/// Short codes are base62 renderings of counter values: 1 to 11 characters
/// drawn from `[0-9A-Za-z]`. Every `ShortCode` decodes back to the counter
/// value it was minted from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Mints the short code for a counter value.
    pub fn from_id(id: u64) -> Self {
        Self(base62::encode(id))
    }

    /// Parses a short code presented by a caller.
    ///
    /// Fails with [`CoreError::MalformedToken`] if `code` is not a valid
    /// base62 token, or is not the canonical rendering of its value
    /// (leading zeros).
    pub fn parse(code: impl Into<String>) -> Result<Self, CoreError> {
        let code = code.into();
        let id = base62::decode(&code)?;
        if base62::encode(id) != code {
            return Err(CoreError::MalformedToken(format!(
                "'{code}' is not in canonical form"
            )));
        }
        Ok(Self(code))
    }

    /// Returns the counter value this code was minted from.
    pub fn id(&self) -> u64 {
        // validated on construction
        base62::decode(&self.0).unwrap_or_default()
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ShortCode> for String {
    fn from(value: ShortCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_counter_value_is_one() {
        assert_eq!(ShortCode::from_id(1).as_str(), "1");
    }

    #[test]
    fn id_round_trips() {
        let code = ShortCode::from_id(123_456_789);
        assert_eq!(code.id(), 123_456_789);
        assert_eq!(ShortCode::parse(code.as_str()).unwrap(), code);
    }

    #[test]
    fn valid_codes() {
        assert!(ShortCode::parse("1").is_ok());
        assert!(ShortCode::parse("aZ09").is_ok());
        assert!(ShortCode::parse("zzzzzzzzzz").is_ok());
    }

    #[test]
    fn invalid_codes() {
        assert!(ShortCode::parse("").is_err());
        assert!(ShortCode::parse("abc def").is_err());
        assert!(ShortCode::parse("abc/def").is_err());
        assert!(ShortCode::parse("my-code").is_err());
        assert!(ShortCode::parse("a".repeat(12)).is_err());
    }

    #[test]
    fn leading_zeros_are_rejected() {
        assert!(ShortCode::parse("0").is_ok());
        assert!(matches!(
            ShortCode::parse("01"),
            Err(CoreError::MalformedToken(_))
        ));
        assert!(ShortCode::parse("00zz").is_err());
    }

    #[test]
    fn to_url() {
        let code = ShortCode::parse("abc123").unwrap();
        assert_eq!(code.to_url("https://sn.ip"), "https://sn.ip/abc123");
        assert_eq!(code.to_url("https://sn.ip/"), "https://sn.ip/abc123");
    }

    #[test]
    fn deserialize_validates() {
        let code: ShortCode = serde_json::from_str("\"Ab3\"").unwrap();
        assert_eq!(code.as_str(), "Ab3");
        assert!(serde_json::from_str::<ShortCode>("\"no-dashes\"").is_err());
    }
}
