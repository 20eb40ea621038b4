//! Domain types for the asset catalog client.
//!
//! Everything here is pure: assets, tags, users, the asset form and its
//! validation, pending uploads and presign results, and the normalisation
//! of the API's list/create response shapes. Network I/O lives in
//! `assethub-client`; in-memory state and the upload workflow live in
//! `assethub-catalog`.

pub mod asset;
pub mod error;
pub mod form;
mod serde_util;
pub mod tag;
pub mod types;
pub mod upload;
pub mod user;
