use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::update::UpdateValue;
use crate::domain::validation::ValidationError;
use crate::domain::value::{Address, GroupId};

const FIELD_NAME: &str = "name";
const FIELD_FIRST_WORD: &str = "first_word";
const FIELD_TAGS: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Keyword(s) an inbound message must start with to trigger an auto update.
pub struct KeywordPair {
    first_word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second_word: Option<String>,
}

impl KeywordPair {
    /// Create a keyword pair; `first_word` must be non-empty after trimming.
    pub fn new(
        first_word: impl Into<String>,
        second_word: Option<String>,
    ) -> Result<Self, ValidationError> {
        let first_word = first_word.into();
        if first_word.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: FIELD_FIRST_WORD,
            });
        }
        Ok(Self {
            first_word: first_word.trim().to_owned(),
            second_word: second_word
                .map(|word| word.trim().to_owned())
                .filter(|word| !word.is_empty()),
        })
    }

    pub fn first_word(&self) -> &str {
        &self.first_word
    }

    pub fn second_word(&self) -> Option<&str> {
        self.second_word.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Lets recipients join or leave a group by texting keywords to `to`.
pub struct GroupAutoUpdate {
    pub to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<KeywordPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<KeywordPair>,
}

impl GroupAutoUpdate {
    pub fn new(to: Address) -> Self {
        Self {
            to,
            add: None,
            remove: None,
        }
    }

    pub fn add(mut self, keywords: KeywordPair) -> Self {
        self.add = Some(keywords);
        self
    }

    pub fn remove(mut self, keywords: KeywordPair) -> Self {
        self.remove = Some(keywords);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Validated request to create a group.
pub struct GroupCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    members: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    child_groups: Vec<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_update: Option<GroupAutoUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl GroupCreate {
    pub fn builder() -> GroupCreateBuilder {
        GroupCreateBuilder::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn members(&self) -> &[Address] {
        &self.members
    }

    pub fn child_groups(&self) -> &[GroupId] {
        &self.child_groups
    }

    pub fn auto_update(&self) -> Option<&GroupAutoUpdate> {
        self.auto_update.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupCreateBuilder {
    inner: GroupCreate,
}

impl GroupCreateBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn member(mut self, member: Address) -> Self {
        self.inner.members.push(member);
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = Address>) -> Self {
        self.inner.members.extend(members);
        self
    }

    pub fn child_group(mut self, group: GroupId) -> Self {
        self.inner.child_groups.push(group);
        self
    }

    pub fn auto_update(mut self, auto_update: GroupAutoUpdate) -> Self {
        self.inner.auto_update = Some(auto_update);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.inner.tags.push(tag.into());
        self
    }

    /// Validate and build. A blank name or a blank tag is rejected.
    pub fn build(self) -> Result<GroupCreate, ValidationError> {
        if matches!(self.inner.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::Empty { field: FIELD_NAME });
        }
        if self.inner.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(ValidationError::Empty { field: FIELD_TAGS });
        }
        Ok(self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A group as stored by the service.
pub struct GroupResult {
    pub id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_groups: Vec<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<GroupAutoUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Partial update of a group.
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    name: UpdateValue<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    add: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remove: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    child_groups_add: Vec<GroupId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    child_groups_remove: Vec<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    add_from_group: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remove_from_group: Option<GroupId>,
    #[serde(skip_serializing_if = "UpdateValue::is_unchanged")]
    auto_update: UpdateValue<GroupAutoUpdate>,
}

impl GroupUpdate {
    pub fn builder() -> GroupUpdateBuilder {
        GroupUpdateBuilder::default()
    }

    pub fn name(&self) -> &UpdateValue<String> {
        &self.name
    }

    pub fn add(&self) -> &[Address] {
        &self.add
    }

    pub fn remove(&self) -> &[Address] {
        &self.remove
    }

    pub fn auto_update(&self) -> &UpdateValue<GroupAutoUpdate> {
        &self.auto_update
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupUpdateBuilder {
    inner: GroupUpdate,
}

impl GroupUpdateBuilder {
    pub fn name(mut self, name: UpdateValue<String>) -> Self {
        self.inner.name = name;
        self
    }

    pub fn add_member(mut self, member: Address) -> Self {
        self.inner.add.push(member);
        self
    }

    pub fn remove_member(mut self, member: Address) -> Self {
        self.inner.remove.push(member);
        self
    }

    pub fn add_child_group(mut self, group: GroupId) -> Self {
        self.inner.child_groups_add.push(group);
        self
    }

    pub fn remove_child_group(mut self, group: GroupId) -> Self {
        self.inner.child_groups_remove.push(group);
        self
    }

    /// Copy all members of `group` into this group.
    pub fn add_from_group(mut self, group: GroupId) -> Self {
        self.inner.add_from_group = Some(group);
        self
    }

    /// Remove all members of `group` from this group.
    pub fn remove_from_group(mut self, group: GroupId) -> Self {
        self.inner.remove_from_group = Some(group);
        self
    }

    pub fn auto_update(mut self, auto_update: UpdateValue<GroupAutoUpdate>) -> Self {
        self.inner.auto_update = auto_update;
        self
    }

    pub fn build(self) -> Result<GroupUpdate, ValidationError> {
        if matches!(self.inner.name.as_set(), Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::Empty { field: FIELD_NAME });
        }
        Ok(self.inner)
    }
}
