//! Configuration loading and setting resolution
//!
//! Settings resolve with ENV → TOML → compiled default priority. The TOML
//! file is optional; a missing file simply means defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// TOML configuration file contents (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to, e.g. "127.0.0.1:5740"
    pub bind_address: Option<String>,
    /// Base URL of the OCR / inference service
    pub ocr_base_url: Option<String>,
    /// Base URL of the application backend
    pub backend_base_url: Option<String>,
    /// Carbon offset price per kg CO2e, local currency
    pub offset_price_per_kg: Option<f64>,
}

/// Default configuration file path for a service, platform dependent
///
/// Linux: `~/.config/jejak/<service>.toml`, falling back to
/// `/etc/jejak/<service>.toml` when the user path does not exist.
pub fn default_config_path(service_name: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", service_name);

    let user_path = dirs::config_dir().map(|d| d.join("jejak").join(&file_name));

    if cfg!(target_os = "linux") {
        if let Some(path) = &user_path {
            if path.exists() {
                return user_path;
            }
        }
        let system_path = PathBuf::from("/etc/jejak").join(&file_name);
        if system_path.exists() {
            return Some(system_path);
        }
    }

    user_path
}

/// Load and parse a TOML configuration file
///
/// A missing file is not an error; it yields the empty default config.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Resolve a string setting with ENV → TOML → default priority
///
/// Warns when a setting is present in more than one source, since that is
/// a likely misconfiguration.
pub fn resolve_string(env_var: &str, toml_value: Option<&str>, default: &str) -> String {
    let env_value = std::env::var(env_var).ok().filter(|v| !v.trim().is_empty());
    let toml_value = toml_value.filter(|v| !v.trim().is_empty());

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} set in both environment and TOML; using environment (highest priority)",
            env_var
        );
    }

    if let Some(value) = env_value {
        return value;
    }
    if let Some(value) = toml_value {
        return value.to_string();
    }
    default.to_string()
}

/// Resolve a float setting with ENV → TOML → default priority
///
/// An unparseable environment value is ignored with a warning rather than
/// aborting startup.
pub fn resolve_f64(env_var: &str, toml_value: Option<f64>, default: f64) -> f64 {
    if let Ok(raw) = std::env::var(env_var) {
        match raw.trim().parse::<f64>() {
            Ok(value) => return value,
            Err(_) => warn!("{} is not a number ({:?}); ignoring", env_var, raw),
        }
    }
    toml_value.unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_toml_config(Path::new("/nonexistent/jejak.toml")).unwrap();
        assert!(config.bind_address.is_none());
        assert!(config.ocr_base_url.is_none());
        assert!(config.offset_price_per_kg.is_none());
    }

    #[test]
    fn toml_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jejak-ui.toml");
        std::fs::write(
            &path,
            r#"
bind_address = "0.0.0.0:8080"
ocr_base_url = "https://ocr.example.test"
offset_price_per_kg = 950.5
"#,
        )
        .unwrap();

        let config = load_toml_config(&path).unwrap();
        assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(config.ocr_base_url.as_deref(), Some("https://ocr.example.test"));
        assert_eq!(config.offset_price_per_kg, Some(950.5));
        assert!(config.backend_base_url.is_none());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "bind_address = [not toml").unwrap();

        let err = load_toml_config(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn resolve_string_prefers_toml_over_default() {
        let value = resolve_string(
            "JEJAK_TEST_UNSET_VAR",
            Some("from-toml"),
            "from-default",
        );
        assert_eq!(value, "from-toml");
    }

    #[test]
    fn resolve_string_falls_back_to_default() {
        let value = resolve_string("JEJAK_TEST_UNSET_VAR", None, "from-default");
        assert_eq!(value, "from-default");
    }

    #[test]
    fn resolve_f64_falls_back_through_tiers() {
        assert_eq!(resolve_f64("JEJAK_TEST_UNSET_VAR", Some(42.0), 7.0), 42.0);
        assert_eq!(resolve_f64("JEJAK_TEST_UNSET_VAR", None, 7.0), 7.0);
    }
}
