//! Tags and the client-side tag registry.
//!
//! The registry is the snapshot of `GET /tags` the client currently holds.
//! The asset-create endpoint attaches tags by *name*, so the form's selected
//! tag ids are translated through the registry at submit time.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum tag name length accepted by the API.
pub const MAX_TAG_NAME_LEN: usize = 64;

/// A named label attachable to zero or more assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
}

/// A validated tag name: trimmed, non-empty, at most [`MAX_TAG_NAME_LEN`]
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Trim `raw` and check it is non-empty and short enough.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Tag name is required".into()));
        }
        if name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Tag name must be at most {MAX_TAG_NAME_LEN} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// The trimmed name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `GET /tags` returns either a bare array or `{"tags": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    Bare(Vec<Tag>),
    Envelope { tags: Vec<Tag> },
}

impl TagList {
    pub fn into_vec(self) -> Vec<Tag> {
        match self {
            TagList::Bare(tags) | TagList::Envelope { tags } => tags,
        }
    }
}

/// Ordered tag snapshot with id lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: Vec<Tag>,
}

impl TagRegistry {
    /// Wrap a tag list as returned by `GET /tags`, keeping its order.
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    /// All tags in registry order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Number of tags held.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the registry holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Look up a tag by id.
    pub fn get(&self, id: DbId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Map tag ids to their current names.
    ///
    /// Output follows the order of `ids`. Ids with no matching tag (for
    /// example a tag deleted since the form was filled in) are dropped, and
    /// a repeated id contributes its name once, at its first position.
    pub fn resolve_names(&self, ids: &[DbId]) -> Vec<String> {
        let by_id: HashMap<DbId, &str> = self
            .tags
            .iter()
            .map(|t| (t.id, t.name.as_str()))
            .collect();

        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| by_id.get(id).map(|name| name.to_string()))
            .collect()
    }

    /// Insert a tag, replacing any entry with the same id in place.
    pub fn upsert(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
    }

    /// Remove the tag with `id`, returning it if it was present.
    pub fn remove(&mut self, id: DbId) -> Option<Tag> {
        let pos = self.tags.iter().position(|t| t.id == id)?;
        Some(self.tags.remove(pos))
    }
}
