//! pos-config
//!
//! Layered YAML configuration for the screens. Documents are merged in order
//! (built-in defaults first, then each `--config` file), converted to JSON,
//! canonicalised and hashed, then read into a typed [`PosConfig`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use pos_timing::TimerTheme;

/// Built-in defaults, always the first layer.
pub const DEFAULTS_YAML: &str = include_str!("../../../config/defaults/base.yaml");

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "POS_API_URL";

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub timers: TimerConfig,
    pub menu: Vec<MenuItem>,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub timer_tick_ms: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    pub customer: TimerTheme,
    pub kitchen: TimerTheme,
}

/// One button on the staff menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItem {
    pub name: String,
    /// Colones.
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Item display name → image path or placeholder key.
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    /// Placeholder key → inline glyph.
    #[serde(default)]
    pub placeholders: BTreeMap<String, PlaceholderSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceholderSpec {
    pub glyph: String,
    /// CSS-style hex colour, e.g. `#e6b800`.
    pub color: String,
}

/// Look up a menu entry by name, ignoring case and surrounding spaces.
pub fn find_menu_item<'a>(menu: &'a [MenuItem], name: &str) -> Option<&'a MenuItem> {
    let wanted = name.trim();
    menu.iter().find(|m| m.name.eq_ignore_ascii_case(wanted))
}

impl PosConfig {
    pub fn menu_item(&self, name: &str) -> Option<&MenuItem> {
        find_menu_item(&self.menu, name)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "CONFIG_INVALID api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            );
        }
        if self.api.timeout_ms == 0 {
            bail!("CONFIG_INVALID api.timeout_ms must be > 0");
        }
        if self.polling.interval_ms == 0 {
            bail!("CONFIG_INVALID polling.interval_ms must be > 0");
        }
        if self.polling.timer_tick_ms == 0 {
            bail!("CONFIG_INVALID polling.timer_tick_ms must be > 0");
        }

        let mut seen = BTreeSet::new();
        for item in &self.menu {
            if item.name.trim().is_empty() {
                bail!("CONFIG_INVALID menu entry with empty name");
            }
            if item.price <= 0 {
                bail!(
                    "CONFIG_INVALID menu item '{}' price must be > 0, got {}",
                    item.name,
                    item.price
                );
            }
            if !seen.insert(item.name.to_ascii_lowercase()) {
                bail!("CONFIG_INVALID duplicate menu item '{}'", item.name);
            }
        }

        for (name, reference) in &self.assets.images {
            if reference.starts_with("placeholder") && !self.assets.placeholders.contains_key(reference) {
                bail!(
                    "CONFIG_INVALID assets.images['{name}'] names unknown placeholder '{reference}'"
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Deserialise and validate the merged document.
    pub fn typed(&self) -> Result<PosConfig> {
        let cfg: PosConfig = serde_json::from_value(self.config_json.clone())
            .context("config does not match the expected shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Replace `api.base_url` and re-hash, so the hash always describes the
    /// config the screens actually run with.
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        let api = self
            .config_json
            .as_object_mut()
            .and_then(|root| root.get_mut("api"))
            .and_then(Value::as_object_mut)
            .context("config has no api section")?;
        api.insert("base_url".to_string(), Value::String(url.trim().to_string()));

        let canonical_json = canonicalize_json(&self.config_json)?;
        self.config_hash = sha256_hex(canonical_json.as_bytes());
        self.canonical_json = canonical_json;
        Ok(self)
    }
}

/// Defaults plus the given files, in order.
pub fn load_with_defaults(paths: &[&str]) -> Result<LoadedConfig> {
    let files = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<String>>>()?;

    let mut doc_refs: Vec<&str> = Vec::with_capacity(files.len() + 1);
    doc_refs.push(DEFAULTS_YAML);
    doc_refs.extend(files.iter().map(String::as_str));
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty overlay file parses as null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    debug!(layers = yaml_docs.len(), config_hash = %config_hash, "config loaded");
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

/// Pick the API URL override: explicit flag first, then the environment.
pub fn resolve_api_url_override(
    flag: Option<&str>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    flag.map(str::to_string)
        .or_else(|| env_lookup(API_URL_ENV))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json's default map is ordered by key, so compact output is stable.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
