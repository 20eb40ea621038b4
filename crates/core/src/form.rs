//! The asset-creation form and its translation into a create payload.

use crate::asset::NewAsset;
use crate::error::CoreError;
use crate::tag::TagRegistry;
use crate::types::DbId;

/// Maximum asset name length accepted by the API.
pub const MAX_ASSET_NAME_LEN: usize = 255;

/// Fields of one asset-creation attempt.
///
/// `selected_tag_ids` is a set kept in selection order. Edits through
/// [`AssetForm::select_tag`] never add a duplicate, and [`AssetForm::to_payload`]
/// sends a repeated id's tag only once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetForm {
    pub name: String,
    pub description: String,
    pub selected_tag_ids: Vec<DbId>,
}

impl AssetForm {
    /// Start a form with `name` and nothing else filled in.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Select each of `ids`, skipping ones already selected.
    pub fn with_tags(mut self, ids: impl IntoIterator<Item = DbId>) -> Self {
        for id in ids {
            self.select_tag(id);
        }
        self
    }

    /// Add `id` to the selection unless it is already there.
    pub fn select_tag(&mut self, id: DbId) {
        if !self.selected_tag_ids.contains(&id) {
            self.selected_tag_ids.push(id);
        }
    }

    /// Drop `id` from the selection.
    pub fn deselect_tag(&mut self, id: DbId) {
        self.selected_tag_ids.retain(|t| *t != id);
    }

    /// Clear every field, as after a successful submit.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check the form can be submitted: the trimmed name must be
    /// non-empty and within [`MAX_ASSET_NAME_LEN`].
    pub fn validate(&self) -> Result<(), CoreError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Asset name is required".into()));
        }
        if name.chars().count() > MAX_ASSET_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "Asset name must be at most {MAX_ASSET_NAME_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Build the `POST /assets` body.
    ///
    /// Name and description are trimmed. Tag ids are resolved to names
    /// through `registry`; ids that no longer resolve are dropped.
    pub fn to_payload(
        &self,
        registry: &TagRegistry,
        url: Option<String>,
    ) -> Result<NewAsset, CoreError> {
        self.validate()?;
        Ok(NewAsset {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            url,
            tags: registry.resolve_names(&self.selected_tag_ids),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tag::Tag;

    fn registry() -> TagRegistry {
        TagRegistry::new(vec![
            Tag { id: 1, name: "unreal".into() },
            Tag { id: 2, name: "concept".into() },
            Tag { id: 3, name: "final".into() },
        ])
    }

    #[test]
    fn payload_resolves_selected_tags() {
        let form = AssetForm::new("Hero Statue").with_tags([1, 3]);
        let payload = form.to_payload(&registry(), None).unwrap();
        assert_eq!(
            payload,
            NewAsset {
                name: "Hero Statue".into(),
                description: String::new(),
                url: None,
                tags: vec!["unreal".into(), "final".into()],
            }
        );
    }

    #[test]
    fn payload_sends_each_tag_once() {
        let form = AssetForm {
            name: "Hero Statue".into(),
            description: String::new(),
            selected_tag_ids: vec![1, 1, 3],
        };
        let payload = form.to_payload(&registry(), None).unwrap();
        assert_eq!(payload.tags, vec!["unreal", "final"]);
    }

    #[test]
    fn payload_trims_text_fields() {
        let form = AssetForm::new("  Crate  ").with_description(" wooden \n");
        let payload = form
            .to_payload(&registry(), Some("https://cdn/crate.glb".into()))
            .unwrap();
        assert_eq!(payload.name, "Crate");
        assert_eq!(payload.description, "wooden");
        assert_eq!(payload.url.as_deref(), Some("https://cdn/crate.glb"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let form = AssetForm::new("   ");
        assert_matches!(form.validate(), Err(CoreError::Validation(_)));
        assert_matches!(form.to_payload(&registry(), None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let form = AssetForm::new("n".repeat(MAX_ASSET_NAME_LEN + 1));
        assert_matches!(form.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn select_tag_ignores_duplicates() {
        let mut form = AssetForm::new("x");
        form.select_tag(2);
        form.select_tag(1);
        form.select_tag(2);
        assert_eq!(form.selected_tag_ids, vec![2, 1]);
    }

    #[test]
    fn deselect_and_reset() {
        let mut form = AssetForm::new("x").with_description("y").with_tags([1, 2]);
        form.deselect_tag(1);
        assert_eq!(form.selected_tag_ids, vec![2]);
        form.reset();
        assert_eq!(form, AssetForm::default());
    }
}
