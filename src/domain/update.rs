use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field-update descriptor for update requests.
///
/// On the wire `Unchanged` omits the field, `Clear` emits `null`, and `Set`
/// emits the value. Fields of this type must be declared with
/// `#[serde(default, skip_serializing_if = "UpdateValue::is_unchanged")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateValue<T> {
    Unchanged,
    Clear,
    Set(T),
}

impl<T> UpdateValue<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// The new value, if this update sets one.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged | Self::Clear => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UpdateValue<U> {
        match self {
            Self::Unchanged => UpdateValue::Unchanged,
            Self::Clear => UpdateValue::Clear,
            Self::Set(value) => UpdateValue::Set(f(value)),
        }
    }
}

impl<T> Default for UpdateValue<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> From<Option<T>> for UpdateValue<T> {
    /// `Some` sets the value, `None` clears it.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }
}

impl<T: Serialize> Serialize for UpdateValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Unchanged | Self::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for UpdateValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}
