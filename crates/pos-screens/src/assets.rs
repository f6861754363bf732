//! Item images by display name.
//!
//! A reference is either a file path or a placeholder key (anything starting
//! with `placeholder`). Placeholders render as an inline glyph; names with no
//! mapping render nothing.

use std::collections::BTreeMap;

use pos_config::{AssetConfig, PlaceholderSpec};

const PLACEHOLDER_PREFIX: &str = "placeholder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset<'a> {
    /// Static image path, e.g. `/static/images/combo_8.png`.
    Image(&'a str),
    Placeholder {
        key: &'a str,
        glyph: &'a str,
        color: &'a str,
    },
}

impl Asset<'_> {
    /// Short text stand-in for the image: the glyph, or the file stem in
    /// brackets.
    pub fn badge(&self) -> String {
        match self {
            Asset::Placeholder { glyph, .. } => glyph.to_string(),
            Asset::Image(path) => {
                let file = path.rsplit('/').next().unwrap_or(path);
                let stem = file.split('.').next().unwrap_or(file);
                format!("[{stem}]")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    images: BTreeMap<String, String>,
    placeholders: BTreeMap<String, PlaceholderSpec>,
}

impl AssetCatalog {
    pub fn from_config(cfg: &AssetConfig) -> Self {
        Self {
            images: cfg.images.clone(),
            placeholders: cfg.placeholders.clone(),
        }
    }

    /// Image for a menu item's display name.
    pub fn for_item(&self, name: &str) -> Option<Asset<'_>> {
        self.images
            .get(name)
            .and_then(|reference| self.resolve(reference))
    }

    /// Resolve a raw reference (path or placeholder key). An unknown
    /// placeholder key resolves to nothing.
    pub fn resolve<'a>(&'a self, reference: &'a str) -> Option<Asset<'a>> {
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with(PLACEHOLDER_PREFIX) {
            return self
                .placeholders
                .get_key_value(reference)
                .map(|(key, spec)| Asset::Placeholder {
                    key: key.as_str(),
                    glyph: spec.glyph.as_str(),
                    color: spec.color.as_str(),
                });
        }
        Some(Asset::Image(reference))
    }

    /// Badge text for an item, or an empty string.
    pub fn badge_for_item(&self, name: &str) -> String {
        self.for_item(name).map(|a| a.badge()).unwrap_or_default()
    }
}
