//! The catalog store: assets and tags for one view.
//!
//! All mutations happen after the corresponding API call has completed, and
//! only on success. A failed call leaves the store exactly as it was.

use assethub_client::api::CatalogApi;
use assethub_core::asset::Asset;
use assethub_core::tag::{Tag, TagName, TagRegistry};
use assethub_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::FetchError;

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Assets in display order (newest created first after a submit).
    pub assets: Vec<Asset>,
    pub tags: TagRegistry,
}

/// In-memory asset list and tag registry backed by a [`CatalogApi`].
///
/// Shared by reference between the view and the upload workflow; wrap in an
/// `Arc` to hand it to [`UploadWorkflow`](crate::workflow::UploadWorkflow).
pub struct CatalogStore<A> {
    api: A,
    state: RwLock<CatalogSnapshot>,
}

impl<A: CatalogApi> CatalogStore<A> {
    /// Create an empty store. Call [`CatalogStore::refresh`] to load it.
    pub fn new(api: A) -> Self {
        Self::with_contents(api, CatalogSnapshot::default())
    }

    /// Create a store that starts from `contents` instead of empty.
    pub fn with_contents(api: A, contents: CatalogSnapshot) -> Self {
        Self {
            api,
            state: RwLock::new(contents),
        }
    }

    /// The API collaborator, for calls the store does not wrap.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current assets and tag registry.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.clone()
    }

    /// Copy of the current asset list, in display order.
    pub async fn assets(&self) -> Vec<Asset> {
        self.state.read().await.assets.clone()
    }

    /// Copy of the current tag registry.
    pub async fn tags(&self) -> TagRegistry {
        self.state.read().await.tags.clone()
    }

    /// Reload assets and tags.
    ///
    /// Both lists are requested concurrently. The store is replaced only if
    /// both calls succeed; otherwise it keeps its previous contents and the
    /// first failure is returned.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<CatalogSnapshot, FetchError> {
        let (assets, tags) = tokio::try_join!(
            async {
                self.api
                    .list_assets()
                    .await
                    .map_err(|e| FetchError::new("list assets", e))
            },
            async {
                self.api
                    .list_tags()
                    .await
                    .map_err(|e| FetchError::new("list tags", e))
            },
        )
        .inspect_err(|e| tracing::warn!(error = %e, "Catalog refresh failed"))?;

        let snapshot = CatalogSnapshot {
            assets,
            tags: TagRegistry::new(tags),
        };
        *self.state.write().await = snapshot.clone();

        tracing::info!(
            assets = snapshot.assets.len(),
            tags = snapshot.tags.len(),
            "Catalog refreshed",
        );
        Ok(snapshot)
    }

    /// Reload only the asset list (the public read-only view needs no tags).
    #[tracing::instrument(skip(self))]
    pub async fn refresh_assets(&self) -> Result<Vec<Asset>, FetchError> {
        let assets = self
            .api
            .list_assets()
            .await
            .map_err(|e| FetchError::new("list assets", e))?;

        self.state.write().await.assets = assets.clone();
        tracing::info!(assets = assets.len(), "Asset list refreshed");
        Ok(assets)
    }

    /// Delete an asset on the server, then drop it from the list.
    #[tracing::instrument(skip(self))]
    pub async fn delete_asset(&self, id: DbId) -> Result<(), FetchError> {
        self.api
            .delete_asset(id)
            .await
            .map_err(|e| FetchError::new("delete asset", e))?;

        self.state.write().await.assets.retain(|a| a.id != id);
        tracing::info!(asset_id = id, "Asset deleted");
        Ok(())
    }

    /// Create a tag and add it to the registry. The API answers with the
    /// existing tag when the name is already taken; that entry is replaced
    /// in place.
    #[tracing::instrument(skip(self))]
    pub async fn create_tag(&self, name: &TagName) -> Result<Tag, FetchError> {
        let tag = self
            .api
            .create_tag(name)
            .await
            .map_err(|e| FetchError::new("create tag", e))?;

        self.state.write().await.tags.upsert(tag.clone());
        tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    /// Rename a tag and patch the registry with the server's copy.
    #[tracing::instrument(skip(self))]
    pub async fn rename_tag(&self, id: DbId, name: &TagName) -> Result<Tag, FetchError> {
        let tag = self
            .api
            .update_tag(id, name)
            .await
            .map_err(|e| FetchError::new("rename tag", e))?;

        self.state.write().await.tags.upsert(tag.clone());
        tracing::info!(tag_id = tag.id, name = %tag.name, "Tag renamed");
        Ok(tag)
    }

    /// Delete a tag on the server, then drop it from the registry.
    #[tracing::instrument(skip(self))]
    pub async fn delete_tag(&self, id: DbId) -> Result<(), FetchError> {
        self.api
            .delete_tag(id)
            .await
            .map_err(|e| FetchError::new("delete tag", e))?;

        self.state.write().await.tags.remove(id);
        tracing::info!(tag_id = id, "Tag deleted");
        Ok(())
    }

    /// Put a freshly created asset at the front of the list.
    pub(crate) async fn prepend_asset(&self, asset: Asset) {
        self.state.write().await.assets.insert(0, asset);
    }
}
