//! Asset upload-and-create workflow.
//!
//! One submission moves through a fixed sequence of states:
//!
//! ```text
//! Idle ─┬─ NoUpload ───────────────────────────────► Creating ─► Succeeded
//!       └─ Pending ─► Presigning ─► Uploading ─────► Creating
//!                          │            │               │
//!                          └────────────┴───────────────┴──────► Failed
//! ```
//!
//! Steps run strictly in order because each needs the previous one's
//! output. There is no timeout, cancellation, or retry; a failure ends the
//! submission and already-completed steps are not undone (an uploaded
//! object whose create call fails stays in storage). A caller that drops
//! the `submit` future part way through leaves the workflow `Failed`.
//!
//! A workflow accepts one submission at a time. A second call to
//! [`UploadWorkflow::submit`] before the first resolves returns
//! [`WorkflowError::Busy`] without touching the network.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use assethub_client::api::CatalogApi;
use assethub_client::storage::ObjectStorage;
use assethub_core::asset::Asset;
use assethub_core::form::AssetForm;
use assethub_core::upload::{Attachment, PendingUpload};

use crate::error::WorkflowError;
use crate::store::CatalogStore;

/// Observable state of the most recent submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkflowState {
    Idle = 0,
    Presigning = 1,
    Uploading = 2,
    Creating = 3,
    Succeeded = 4,
    Failed = 5,
}

impl WorkflowState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Presigning,
            2 => Self::Uploading,
            3 => Self::Creating,
            4 => Self::Succeeded,
            5 => Self::Failed,
            _ => Self::Idle,
        }
    }

    /// `Succeeded` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Runs asset submissions against a [`CatalogStore`] and an
/// [`ObjectStorage`].
pub struct UploadWorkflow<A, S> {
    store: Arc<CatalogStore<A>>,
    storage: S,
    busy: AtomicBool,
    state: AtomicU8,
}

/// Holds the busy flag for one submission and clears it on drop.
///
/// A submission dropped before reaching a terminal state (the caller's
/// timeout fired, say) is recorded as `Failed`.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a AtomicU8,
}

impl<'a> BusyGuard<'a> {
    fn acquire(busy: &'a AtomicBool, state: &'a AtomicU8) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy, state })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let current = WorkflowState::from_u8(self.state.load(Ordering::Acquire));
        if !current.is_terminal() {
            self.state
                .store(WorkflowState::Failed as u8, Ordering::Release);
        }
        self.busy.store(false, Ordering::Release);
    }
}

impl<A: CatalogApi, S: ObjectStorage> UploadWorkflow<A, S> {
    /// A new idle workflow over `store` and `storage`.
    pub fn new(store: Arc<CatalogStore<A>>, storage: S) -> Self {
        Self {
            store,
            storage,
            busy: AtomicBool::new(false),
            state: AtomicU8::new(WorkflowState::Idle as u8),
        }
    }

    /// The store successful submissions are prepended to.
    pub fn store(&self) -> &Arc<CatalogStore<A>> {
        &self.store
    }

    /// Current state. Terminal states persist until the next submission.
    pub fn state(&self) -> WorkflowState {
        WorkflowState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Create an asset from `form`, uploading `attachment` first if present.
    ///
    /// On success the created asset is prepended to the store before the
    /// busy flag is released. On failure the store is unchanged.
    pub async fn submit(
        &self,
        form: &AssetForm,
        attachment: Attachment,
    ) -> Result<Asset, WorkflowError> {
        let Some(_guard) = BusyGuard::acquire(&self.busy, &self.state) else {
            tracing::warn!("Asset submission rejected: another is in progress");
            return Err(WorkflowError::Busy);
        };
        self.set_state(match attachment {
            Attachment::NoUpload => WorkflowState::Creating,
            Attachment::Pending(_) => WorkflowState::Presigning,
        });

        match self.run(form, attachment).await {
            Ok(asset) => {
                self.store.prepend_asset(asset.clone()).await;
                self.set_state(WorkflowState::Succeeded);
                tracing::info!(
                    asset_id = asset.id,
                    name = %asset.name,
                    has_file = asset.url.is_some(),
                    "Asset created",
                );
                Ok(asset)
            }
            Err(e) => {
                self.set_state(WorkflowState::Failed);
                tracing::warn!(
                    step = ?e.step(),
                    error = %e,
                    "Asset submission failed",
                );
                Err(e)
            }
        }
    }

    // ---- private helpers ----

    async fn run(&self, form: &AssetForm, attachment: Attachment) -> Result<Asset, WorkflowError> {
        form.validate()?;
        // Tag ids resolve against the registry as it is when submit starts.
        let registry = self.store.tags().await;

        let public_url = match attachment {
            Attachment::NoUpload => None,
            Attachment::Pending(upload) => Some(self.upload(upload).await?),
        };

        self.set_state(WorkflowState::Creating);
        let payload = form.to_payload(&registry, public_url)?;
        tracing::debug!(
            name = %payload.name,
            tags = payload.tags.len(),
            "Creating asset",
        );

        self.store
            .api()
            .create_asset(&payload)
            .await
            .map_err(WorkflowError::Create)
    }

    /// Presign, then write the payload to storage. Returns the public URL
    /// to store on the asset.
    async fn upload(&self, upload: PendingUpload) -> Result<String, WorkflowError> {
        self.set_state(WorkflowState::Presigning);
        let content_type = upload.content_type();
        tracing::debug!(
            filename = %upload.filename(),
            content_type = %content_type,
            bytes = upload.len(),
            "Requesting upload URL",
        );

        let target = self
            .store
            .api()
            .presign_upload(upload.filename(), &content_type)
            .await
            .map_err(WorkflowError::Presign)?;

        self.set_state(WorkflowState::Uploading);
        self.storage
            .put_object(&target, &content_type, upload.into_payload())
            .await?;

        Ok(target.public_url)
    }

    fn set_state(&self, state: WorkflowState) {
        self.state.store(state as u8, Ordering::Release);
    }
}
