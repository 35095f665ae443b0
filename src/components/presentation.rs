use crate::{
    errors::{CatalogError, Result},
    stac::{Asset, AssetDefinition},
};

/// Title, media type and roles shared by every asset of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTemplate {
    /// May contain a `{label}` placeholder.
    pub title: &'static str,
    pub media_type: &'static str,
    pub roles: &'static [&'static str],
}

impl AssetTemplate {
    pub const fn new(
        title: &'static str,
        media_type: &'static str,
        roles: &'static [&'static str],
    ) -> Self {
        Self {
            title,
            media_type,
            roles,
        }
    }

    pub fn title_with(&self, label: &str) -> String {
        self.title.replace("{label}", label).trim().to_owned()
    }

    pub fn asset(&self, href: impl Into<String>, label: &str) -> Asset {
        Asset::new(href, self.title_with(label), self.media_type, self.roles)
    }

    /// Item-assets entry: the title with an empty label.
    pub fn definition(&self) -> AssetDefinition {
        AssetDefinition::new(self.title_with(""), self.media_type, self.roles)
    }
}

/// Ordered lookup of asset templates by asset key.
#[derive(Debug, Clone, Copy)]
pub struct PresentationTable(pub &'static [(&'static str, AssetTemplate)]);

impl PresentationTable {
    pub fn lookup(&self, key: &str) -> Result<&AssetTemplate> {
        self.0
            .iter()
            .find_map(|(entry, template)| (*entry == key).then_some(template))
            .ok_or_else(|| CatalogError::UnknownAssetKey(key.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static AssetTemplate)> {
        self.0.iter().map(|(key, template)| (*key, template))
    }
}
