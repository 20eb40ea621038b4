//! In-memory fakes of the API and storage collaborators.
//!
//! Both fakes append to a shared [`CallLog`] so tests can assert on the
//! exact order of network calls across the two.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use assethub_catalog::store::{CatalogSnapshot, CatalogStore};
use assethub_client::api::CatalogApi;
use assethub_client::error::{ApiError, UploadError};
use assethub_client::storage::ObjectStorage;
use assethub_core::asset::{Asset, AssetTag, NewAsset};
use assethub_core::tag::{Tag, TagName, TagRegistry};
use assethub_core::types::DbId;
use assethub_core::upload::{PendingUpload, PresignResult};
use async_trait::async_trait;
use tokio::sync::Notify;

/// First eight bytes of a PNG file; enough for content sniffing.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListAssets,
    ListTags,
    CreateAsset(NewAsset),
    DeleteAsset(DbId),
    CreateTag(String),
    UpdateTag(DbId, String),
    DeleteTag(DbId),
    Presign {
        filename: String,
        content_type: String,
    },
    Upload {
        url: String,
        content_type: String,
        bytes: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn has_create(&self) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::CreateAsset(_)))
    }
}

pub fn rejected(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// FakeApi
// ---------------------------------------------------------------------------

/// Server-side state plus per-operation failure switches.
pub struct FakeApi {
    log: CallLog,
    assets: Vec<Asset>,
    tags: Vec<Tag>,
    presign: PresignResult,
    failures: Mutex<HashMap<&'static str, (u16, String)>>,
    next_id: AtomicI64,
}

impl FakeApi {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            assets: Vec::new(),
            tags: Vec::new(),
            presign: presign_result(),
            failures: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(100),
        }
    }

    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Make `operation` fail with `status` and `message` from now on.
    pub fn fail(self, operation: &'static str, status: u16, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, message.to_string()));
        self
    }

    fn check(&self, operation: &'static str) -> Result<(), ApiError> {
        match self.failures.lock().unwrap().get(operation) {
            Some((status, message)) => Err(rejected(*status, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogApi for FakeApi {
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError> {
        self.log.push(Call::ListAssets);
        self.check("list_assets")?;
        Ok(self.assets.clone())
    }

    async fn create_asset(&self, payload: &NewAsset) -> Result<Asset, ApiError> {
        self.log.push(Call::CreateAsset(payload.clone()));
        self.check("create_asset")?;
        Ok(Asset {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: payload.name.clone(),
            description: payload.description.clone(),
            url: payload.url.clone(),
            tags: payload.tags.iter().cloned().map(AssetTag::Name).collect(),
            created_at: None,
            updated_at: None,
        })
    }

    async fn delete_asset(&self, id: DbId) -> Result<(), ApiError> {
        self.log.push(Call::DeleteAsset(id));
        self.check("delete_asset")
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.log.push(Call::ListTags);
        self.check("list_tags")?;
        Ok(self.tags.clone())
    }

    async fn create_tag(&self, name: &TagName) -> Result<Tag, ApiError> {
        self.log.push(Call::CreateTag(name.to_string()));
        self.check("create_tag")?;
        // Existing names come back as the existing tag.
        if let Some(existing) = self.tags.iter().find(|t| t.name == name.as_str()) {
            return Ok(existing.clone());
        }
        Ok(Tag {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
        })
    }

    async fn update_tag(&self, id: DbId, name: &TagName) -> Result<Tag, ApiError> {
        self.log.push(Call::UpdateTag(id, name.to_string()));
        self.check("update_tag")?;
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }

    async fn delete_tag(&self, id: DbId) -> Result<(), ApiError> {
        self.log.push(Call::DeleteTag(id));
        self.check("delete_tag")
    }

    async fn presign_upload(
        &self,
        filename: &str,
        content_type: &str,
    ) -> Result<PresignResult, ApiError> {
        self.log.push(Call::Presign {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        });
        self.check("presign")?;
        Ok(self.presign.clone())
    }
}

// ---------------------------------------------------------------------------
// FakeStorage
// ---------------------------------------------------------------------------

pub struct FakeStorage {
    log: CallLog,
    failure: Option<(u16, String)>,
    gate: Option<Arc<Notify>>,
}

impl FakeStorage {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failure: None,
            gate: None,
        }
    }

    /// Answer every PUT with `status` and `body`.
    pub fn failing(mut self, status: u16, body: &str) -> Self {
        self.failure = Some((status, body.to_string()));
        self
    }

    /// Hold every PUT open until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        target: &PresignResult,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<(), UploadError> {
        self.log.push(Call::Upload {
            url: target.upload_url.clone(),
            content_type: content_type.to_string(),
            bytes: payload.len(),
        });
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.failure {
            Some((status, body)) => Err(UploadError::Status {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn presign_result() -> PresignResult {
    PresignResult {
        upload_url: "https://s3/x".into(),
        headers: BTreeMap::new(),
        public_url: "https://cdn/x.png".into(),
        key: None,
        get_url: None,
    }
}

pub fn tags() -> Vec<Tag> {
    vec![
        Tag { id: 1, name: "unreal".into() },
        Tag { id: 2, name: "concept".into() },
        Tag { id: 3, name: "final".into() },
    ]
}

pub fn asset(id: DbId, name: &str) -> Asset {
    Asset {
        id,
        name: name.to_string(),
        description: String::new(),
        url: None,
        tags: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

pub fn png_upload() -> PendingUpload {
    PendingUpload::new("x.png", PNG_BYTES.to_vec())
}

/// The contents every store in these tests starts with.
pub fn seeded_contents() -> CatalogSnapshot {
    CatalogSnapshot {
        assets: vec![asset(2, "Desert Terrain"), asset(1, "Robot Head")],
        tags: TagRegistry::new(tags()),
    }
}

pub fn seeded_store(api: FakeApi) -> Arc<CatalogStore<FakeApi>> {
    Arc::new(CatalogStore::with_contents(api, seeded_contents()))
}
