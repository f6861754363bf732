//! Command handlers for pos-cli.
//!
//! Shared setup (config resolution, HTTP client, item arguments) lives here.
//! Command-specific logic lives in the submodules.

pub mod orders;
pub mod screen;
pub mod staff;

use anyhow::{Context as _, Result};
use pos_cart::Cart;
use pos_client::HttpOrderApi;
use pos_config::{LoadedConfig, PosConfig};
use pos_screens::staff::split_quantity;
use pos_screens::AssetCatalog;
use tracing::info;

// ---------------------------------------------------------------------------
// Shared setup
// ---------------------------------------------------------------------------

/// Resolved configuration for one invocation.
pub struct Context {
    pub loaded: LoadedConfig,
    pub config: PosConfig,
}

impl Context {
    /// Defaults, then `--config` overlays, then `--api-url` / `POS_API_URL`.
    pub fn load(config_paths: &[String], api_url: Option<&str>) -> Result<Self> {
        let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
        let mut loaded = pos_config::load_with_defaults(&path_refs)?;

        if let Some(url) =
            pos_config::resolve_api_url_override(api_url, |key| std::env::var(key).ok())
        {
            loaded = loaded.with_api_url(&url)?;
        }

        let config = loaded.typed()?;
        info!(
            config_hash = %loaded.config_hash,
            base_url = %config.api.base_url,
            overlays = config_paths.len(),
            "config resolved"
        );
        Ok(Self { loaded, config })
    }

    pub fn api(&self) -> Result<HttpOrderApi> {
        HttpOrderApi::new(&self.config.api.base_url, self.config.api.timeout())
            .context("failed to build order service client")
    }

    pub fn assets(&self) -> AssetCatalog {
        AssetCatalog::from_config(&self.config.assets)
    }
}

/// Fill a cart from `--item` arguments such as `2x Combo 8`.
pub fn cart_from_items(config: &PosConfig, items: &[String]) -> Result<Cart> {
    let mut cart = Cart::new();
    for raw in items {
        let (quantity, name) = split_quantity(raw.trim())?;
        let entry = config
            .menu_item(name)
            .with_context(|| format!("'{name}' is not on the menu"))?;
        cart.add_n(&entry.name, entry.price, entry.image.as_deref(), quantity);
    }
    Ok(cart)
}
