//! HTTP collaborators for the asset catalog.
//!
//! [`api::ApiClient`] talks to the REST API (assets, tags, auth, presign)
//! with a per-instance cookie session and the anti-forgery header on
//! mutating calls. [`storage::StorageClient`] performs the presigned PUT to
//! object storage. Both sit behind traits ([`api::CatalogApi`],
//! [`storage::ObjectStorage`]) so the catalog crate can run against fakes.

pub mod api;
pub mod config;
pub mod csrf;
pub mod error;
pub mod storage;
