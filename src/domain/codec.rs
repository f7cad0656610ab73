//! Serde helpers for wire conventions shared by several records.

/// Byte arrays travel as lowercase hex strings.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(de: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(de)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Optional byte arrays on outgoing records; pair with
/// `skip_serializing_if = "Option::is_none"`.
pub(crate) mod hex_bytes_opt {
    use serde::Serializer;

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }
}
