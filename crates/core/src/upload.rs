//! Pending uploads, presign results, and content type derivation.
//!
//! A file chosen for an asset is carried as a [`PendingUpload`] inside an
//! [`Attachment`]. The API's presign endpoint answers with a
//! [`PresignResult`]: a one-time write target plus the public URL stored
//! on the asset.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Content type used when nothing better can be derived.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension fallbacks for payloads `infer` cannot recognise.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("svg", "image/svg+xml"),
    ("obj", "model/obj"),
    ("gltf", "model/gltf+json"),
    ("glb", "model/gltf-binary"),
    ("fbx", "application/octet-stream"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
];

// ---------------------------------------------------------------------------
// PendingUpload / Attachment
// ---------------------------------------------------------------------------

/// A file waiting to be written to object storage. Lives only for one
/// create attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    filename: String,
    content_type: Option<String>,
    payload: Vec<u8>,
}

impl PendingUpload {
    /// A file chosen for upload. The content type is derived later
    /// unless set with [`PendingUpload::with_content_type`].
    pub fn new(filename: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            payload,
        }
    }

    /// Use an explicit content type instead of deriving one.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name sent to the presign endpoint.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Bytes that will be written to storage.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Take the payload bytes for the storage write.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// The content type sent with the presign request and the storage write.
    pub fn content_type(&self) -> String {
        derive_content_type(&self.filename, self.content_type.as_deref(), &self.payload)
    }
}

/// Whether a create attempt carries a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Attachment {
    #[default]
    NoUpload,
    Pending(PendingUpload),
}

impl From<Option<PendingUpload>> for Attachment {
    fn from(upload: Option<PendingUpload>) -> Self {
        upload.map_or(Attachment::NoUpload, Attachment::Pending)
    }
}

impl From<PendingUpload> for Attachment {
    fn from(upload: PendingUpload) -> Self {
        Attachment::Pending(upload)
    }
}

/// Pick a content type: explicit value, then sniffed magic bytes, then the
/// filename extension, then [`DEFAULT_CONTENT_TYPE`].
pub fn derive_content_type(filename: &str, explicit: Option<&str>, payload: &[u8]) -> String {
    if let Some(ct) = explicit.map(str::trim).filter(|ct| !ct.is_empty()) {
        return ct.to_string();
    }
    if let Some(kind) = infer::get(payload) {
        return kind.mime_type().to_string();
    }
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    ext.and_then(|ext| {
        EXTENSION_TYPES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, ct)| ct.to_string())
    })
    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

// ---------------------------------------------------------------------------
// PresignResult
// ---------------------------------------------------------------------------

/// Response of the presign endpoint.
///
/// Older servers name the write target `put_url` and the read URL
/// `get_url`; both spellings are accepted, camelCase winning when both
/// are present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawPresign")]
pub struct PresignResult {
    /// One-time write target for the storage PUT.
    pub upload_url: String,
    /// Headers that must accompany the storage PUT.
    pub headers: BTreeMap<String, String>,
    /// Stable read URL stored on the asset.
    pub public_url: String,
    /// Object key in the bucket, when the server reports it.
    pub key: Option<String>,
    /// Short-lived signed read URL, when the server reports it.
    pub get_url: Option<String>,
}

#[derive(Deserialize)]
struct RawPresign {
    #[serde(rename = "uploadUrl")]
    upload_url: Option<String>,
    put_url: Option<String>,
    #[serde(rename = "publicUrl")]
    public_url: String,
    #[serde(default)]
    headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    key: Option<String>,
    #[serde(rename = "getUrl")]
    get_url: Option<String>,
    #[serde(rename = "get_url")]
    get_url_legacy: Option<String>,
}

impl TryFrom<RawPresign> for PresignResult {
    type Error = String;

    fn try_from(raw: RawPresign) -> Result<Self, Self::Error> {
        let upload_url = raw
            .upload_url
            .or(raw.put_url)
            .ok_or_else(|| "presign response has no upload URL".to_string())?;
        Ok(Self {
            upload_url,
            headers: raw.headers.unwrap_or_default(),
            public_url: raw.public_url,
            key: raw.key,
            get_url: raw.get_url.or(raw.get_url_legacy),
        })
    }
}

/// Response of `GET /uploads/get-url`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadUrl {
    pub url: String,
}
