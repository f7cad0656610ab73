use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

const FIELD_TAGS: &str = "tags";

fn check_tag(tag: &str) -> Result<(), ValidationError> {
    if tag.trim().is_empty() {
        return Err(ValidationError::Empty { field: FIELD_TAGS });
    }
    if tag.contains(',') {
        return Err(ValidationError::ReservedComma {
            field: FIELD_TAGS,
            value: tag.to_owned(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Tag set of a batch or group.
pub struct Tags {
    #[serde(default)]
    tags: Vec<String>,
}

impl Tags {
    /// Create a tag set; tags must be non-blank and comma-free.
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, ValidationError> {
        let tags = tags.into_iter().map(Into::into).collect::<Vec<String>>();
        for tag in &tags {
            check_tag(tag)?;
        }
        Ok(Self { tags })
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|it| it == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Tags to add to and remove from a batch or group.
pub struct TagsUpdate {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remove: Vec<String>,
}

impl TagsUpdate {
    pub fn new(
        add: impl IntoIterator<Item = impl Into<String>>,
        remove: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, ValidationError> {
        let add = add.into_iter().map(Into::into).collect::<Vec<String>>();
        let remove = remove.into_iter().map(Into::into).collect::<Vec<String>>();
        for tag in add.iter().chain(&remove) {
            check_tag(tag)?;
        }
        Ok(Self { add, remove })
    }

    pub fn add(&self) -> &[String] {
        &self.add
    }

    pub fn remove(&self) -> &[String] {
        &self.remove
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tags_reject_commas() {
        assert!(Tags::new(["a", "b"]).is_ok());
        assert!(matches!(
            Tags::new(["a,b"]),
            Err(ValidationError::ReservedComma { .. })
        ));
        assert!(TagsUpdate::new(["ok"], [" "]).is_err());
    }

    #[test]
    fn update_omits_empty_lists() {
        let update = TagsUpdate::new(["new"], Vec::<String>::new()).unwrap();
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "add": ["new"] }));

        let tags: Tags = serde_json::from_value(json!({ "tags": ["x", "y"] })).unwrap();
        assert!(tags.contains("y"));
    }
}
