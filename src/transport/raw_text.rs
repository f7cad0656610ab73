use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_json::value::RawValue;

/// Error-body field the service sends either as text or as epoch millis.
///
/// Numbers keep their exact source token, so `1481730180000` reads back as
/// `"1481730180000"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText(String);

impl RawText {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for RawText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        match serde_json::from_str::<Value>(raw.get()).map_err(D::Error::custom)? {
            Value::String(text) => Ok(Self(text)),
            Value::Number(_) => Ok(Self(raw.get().to_owned())),
            other => Err(D::Error::custom(format_args!(
                "expected text or a number, found {other}"
            ))),
        }
    }
}
