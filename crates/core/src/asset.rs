//! Asset records and the create payload.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::serde_util::null_as_empty;
use crate::tag::Tag;
use crate::types::DbId;

/// A catalog record with an optional attached file URL and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: DbId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Set only when a file was uploaded for this asset.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<AssetTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Asset {
    /// Tag names in the order the server returned them.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(AssetTag::name).collect()
    }
}

/// A tag as embedded in an asset. Some API versions embed full tag
/// objects, others only the tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetTag {
    Tag(Tag),
    Name(String),
}

impl AssetTag {
    pub fn name(&self) -> &str {
        match self {
            AssetTag::Tag(tag) => &tag.name,
            AssetTag::Name(name) => name,
        }
    }
}

/// Body of `POST /assets`.
///
/// `url` serializes as `null` when no file was uploaded; tags are names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAsset {
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

/// `GET /assets` returns either a bare array or `{"assets": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AssetList {
    Bare(Vec<Asset>),
    Envelope { assets: Vec<Asset> },
}

impl AssetList {
    pub fn into_vec(self) -> Vec<Asset> {
        match self {
            AssetList::Bare(assets) | AssetList::Envelope { assets } => assets,
        }
    }
}

/// `POST /assets` returns either the created asset or
/// `{"assets": [created, ...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreatedAsset {
    Envelope { assets: Vec<Asset> },
    Single(Asset),
}

impl CreatedAsset {
    /// Extract exactly one asset: the single object, or the envelope's
    /// first element.
    pub fn into_asset(self) -> Result<Asset, CoreError> {
        match self {
            CreatedAsset::Single(asset) => Ok(asset),
            CreatedAsset::Envelope { assets } => assets
                .into_iter()
                .next()
                .ok_or(CoreError::EmptyResponse("create response contained no asset")),
        }
    }
}
