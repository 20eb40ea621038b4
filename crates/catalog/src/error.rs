//! Catalog and workflow error types.

use assethub_client::error::{ApiError, UploadError};
use assethub_core::error::CoreError;

/// A read, delete, or tag call against the API failed. The store is left
/// as it was before the call.
#[derive(Debug, thiserror::Error)]
#[error("Failed to {operation}: {source}")]
pub struct FetchError {
    /// What was being attempted, e.g. `"list tags"`.
    pub operation: &'static str,
    #[source]
    pub source: ApiError,
}

impl FetchError {
    pub(crate) fn new(operation: &'static str, source: ApiError) -> Self {
        Self { operation, source }
    }

    /// The message to show the user: the server's text where it gave one.
    pub fn message(&self) -> String {
        self.source.to_string()
    }
}

/// The step of an asset submission that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Validate,
    Presign,
    Upload,
    Create,
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkflowStep::Validate => "validate",
            WorkflowStep::Presign => "presign",
            WorkflowStep::Upload => "upload",
            WorkflowStep::Create => "create",
        };
        f.write_str(label)
    }
}

/// Terminal failure of one asset submission. Nothing is retried and
/// nothing already done (such as a finished storage upload) is undone.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Another submission on the same workflow has not finished yet.
    #[error("An asset submission is already in progress")]
    Busy,

    /// The form was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The presign request failed.
    #[error("Presign failed: {0}")]
    Presign(#[source] ApiError),

    /// The storage write failed; the create call was never made.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The API rejected the create call.
    #[error("Create failed: {0}")]
    Create(#[source] ApiError),
}

impl WorkflowError {
    /// Which step failed. `None` for [`WorkflowError::Busy`], which never
    /// started.
    pub fn step(&self) -> Option<WorkflowStep> {
        match self {
            WorkflowError::Busy => None,
            WorkflowError::Validation(_) => Some(WorkflowStep::Validate),
            WorkflowError::Presign(_) => Some(WorkflowStep::Presign),
            WorkflowError::Upload(_) => Some(WorkflowStep::Upload),
            WorkflowError::Create(_) => Some(WorkflowStep::Create),
        }
    }

    /// The underlying message, verbatim, without the step prefix.
    pub fn message(&self) -> String {
        match self {
            WorkflowError::Presign(e) | WorkflowError::Create(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}
