//! In-memory catalog state and the asset upload-and-create workflow.
//!
//! [`store::CatalogStore`] holds the asset list and tag registry for one
//! view and keeps them in step with the API. [`workflow::UploadWorkflow`]
//! runs one asset creation at a time: optional presign and storage upload,
//! then the create call, then an optimistic prepend into the store.

pub mod error;
pub mod store;
pub mod workflow;
