//! Configuration resolution for jejak-ui
//!
//! Every setting resolves with ENV → TOML → compiled default priority.
//! The TOML file lives at the platform config path for service
//! "jejak-ui" (see `jejak_common::config::default_config_path`).

use jejak_common::config::{self, TomlConfig};
use tracing::info;

/// Default OCR / inference service (the hosted model space)
const DEFAULT_OCR_BASE_URL: &str = "https://delia-ayu-nandhita-emisicarbonmodel.hf.space";

/// Default application backend
const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:4000";

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5740";

/// Default carbon offset price, IDR per kg CO2e
const DEFAULT_OFFSET_PRICE_PER_KG: f64 = 1200.0;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub bind_address: String,
    pub ocr_base_url: String,
    pub backend_base_url: String,
    pub offset_price_per_kg: f64,
}

impl UiConfig {
    /// Resolve configuration from environment, TOML file and defaults
    pub fn resolve() -> jejak_common::Result<Self> {
        let toml_config = match config::default_config_path("jejak-ui") {
            Some(path) => config::load_toml_config(&path)?,
            None => TomlConfig::default(),
        };
        Ok(Self::from_toml(&toml_config))
    }

    /// Resolve against an already-loaded TOML config (environment still
    /// takes priority)
    pub fn from_toml(toml_config: &TomlConfig) -> Self {
        let resolved = Self {
            bind_address: config::resolve_string(
                "JEJAK_BIND_ADDRESS",
                toml_config.bind_address.as_deref(),
                DEFAULT_BIND_ADDRESS,
            ),
            ocr_base_url: config::resolve_string(
                "JEJAK_OCR_URL",
                toml_config.ocr_base_url.as_deref(),
                DEFAULT_OCR_BASE_URL,
            ),
            backend_base_url: config::resolve_string(
                "JEJAK_BACKEND_URL",
                toml_config.backend_base_url.as_deref(),
                DEFAULT_BACKEND_BASE_URL,
            ),
            offset_price_per_kg: config::resolve_f64(
                "JEJAK_OFFSET_PRICE",
                toml_config.offset_price_per_kg,
                DEFAULT_OFFSET_PRICE_PER_KG,
            ),
        };

        info!(
            ocr = %resolved.ocr_base_url,
            backend = %resolved.backend_base_url,
            "Configuration resolved"
        );

        resolved
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            ocr_base_url: DEFAULT_OCR_BASE_URL.to_string(),
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            offset_price_per_kg: DEFAULT_OFFSET_PRICE_PER_KG,
        }
    }
}
