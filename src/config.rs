//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the optional `config.toml` in the content root.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Pragna Skin & Hair Clinic"
//! tagline = "Dermatology, done thoughtfully"
//! base_url = "https://www.pragnaclinic.com"
//!
//! [colors]
//! background = "#fbf8f4"
//! text = "#1f1a17"
//! text_muted = "#6b625b"
//! accent = "#9c6b4e"
//! border = "#e7dfd6"
//!
//! [booking]
//! endpoint = ""               # Spreadsheet script URL; empty disables the form
//! source = "website"
//! max_retries = 3
//! initial_backoff_ms = 500
//! timeout_secs = 15
//!
//! [build]
//! max_threads = 4             # Omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [booking]
//! endpoint = "https://script.google.com/macros/s/abc/exec"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Clinic identity and public URL.
    pub site: SiteInfo,
    /// Palette injected as CSS custom properties.
    pub colors: ColorScheme,
    /// Booking lead endpoint and retry policy.
    pub booking: BookingConfig,
    /// Build parallelism.
    pub build: BuildConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.site.base_url.starts_with("https://") || self.site.base_url.starts_with("http://"))
        {
            return Err(ConfigError::Validation(
                "site.base_url must be an absolute http(s) URL".into(),
            ));
        }
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if !self.booking.endpoint.is_empty()
            && !(self.booking.endpoint.starts_with("https://")
                || self.booking.endpoint.starts_with("http://"))
        {
            return Err(ConfigError::Validation(
                "booking.endpoint must be an absolute http(s) URL".into(),
            ));
        }
        if self.booking.max_retries > 10 {
            return Err(ConfigError::Validation(
                "booking.max_retries must be 0-10".into(),
            ));
        }
        if self.booking.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "booking.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    /// Absolute origin used for sitemap and robots URLs. A trailing slash is ignored.
    pub base_url: String,
}

impl SiteInfo {
    /// `base_url` without a trailing slash.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Pragna Skin & Hair Clinic".to_string(),
            tagline: "Dermatology, done thoughtfully".to_string(),
            base_url: "https://www.pragnaclinic.com".to_string(),
        }
    }
}

/// Booking lead submission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookingConfig {
    /// Spreadsheet script URL receiving the JSON lead. Empty disables booking.
    pub endpoint: String,
    /// Value of the `source` field on every submitted lead.
    pub source: String,
    /// Retries after the first attempt for transport errors, 429 and 5xx.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub initial_backoff_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            source: "website".to_string(),
            max_retries: 3,
            initial_backoff_ms: 500,
            timeout_secs: 15,
        }
    }
}

/// Build parallelism settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Maximum number of page-rendering threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Site palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (breadcrumbs, captions, stat labels).
    pub text_muted: String,
    /// Buttons, links and highlights.
    pub accent: String,
    pub border: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#fbf8f4".to_string(),
            text: "#1f1a17".to_string(),
            text_muted: "#6b625b".to_string(),
            accent: "#9c6b4e".to_string(),
            border: "#e7dfd6".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pragna Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file at content/config.toml.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Pragna Skin & Hair Clinic"
tagline = "Dermatology, done thoughtfully"
# Absolute origin used in sitemap.xml and robots.txt.
base_url = "https://www.pragnaclinic.com"

# ---------------------------------------------------------------------------
# Colors (CSS custom properties)
# ---------------------------------------------------------------------------
[colors]
background = "#fbf8f4"
text = "#1f1a17"
text_muted = "#6b625b"    # Breadcrumbs, captions, stat labels
accent = "#9c6b4e"        # Buttons, links
border = "#e7dfd6"

# ---------------------------------------------------------------------------
# Booking leads
# ---------------------------------------------------------------------------
[booking]
# URL of the spreadsheet script that receives booking leads as JSON.
# Leave empty to render the form without a submit target.
endpoint = ""
# Recorded in the `source` field of every lead.
source = "website"
# Retries after the first attempt (network errors, 429, 5xx). 0-10.
max_retries = 3
# Delay before the first retry in milliseconds; doubles each time.
initial_backoff_ms = 500
# Per-request timeout in seconds.
timeout_secs = 15

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Maximum parallel page-rendering threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}

/// Generate CSS custom properties from the color config.
pub fn generate_color_css(colors: &ColorScheme) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-accent: {accent};
    --color-border: {border};
}}"#,
        background = colors.background,
        text = colors.text,
        text_muted = colors.text_muted,
        accent = colors.accent,
        border = colors.border,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = SiteConfig::default();
        config.validate().unwrap();
        assert_eq!(config.site.origin(), "https://www.pragnaclinic.com");
        assert_eq!(config.booking.max_retries, 3);
        assert!(config.booking.endpoint.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors]
accent = "#004466"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.accent, "#004466");
        assert_eq!(config.colors.background, "#fbf8f4");
        assert_eq!(config.booking.source, "website");
    }

    #[test]
    fn origin_strips_trailing_slash() {
        let info = SiteInfo {
            base_url: "https://example.com/".into(),
            ..SiteInfo::default()
        };
        assert_eq!(info.origin(), "https://example.com");
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let colors = ColorScheme {
            accent: "#123456".into(),
            ..ColorScheme::default()
        };
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-accent: #123456"));
        assert!(css.contains("--color-bg: #fbf8f4"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.name, "Pragna Skin & Hair Clinic");
    }

    #[test]
    fn load_config_merges_sparse_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[booking]
endpoint = "https://script.example.com/exec"
max_retries = 5
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.booking.endpoint, "https://script.example.com/exec");
        assert_eq!(config.booking.max_retries, 5);
        // Untouched values keep their defaults
        assert_eq!(config.booking.timeout_secs, 15);
        assert_eq!(config.site.origin(), "https://www.pragnaclinic.com");
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[booking]\nendpont = \"https://x.example\"\n",
        )
        .unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[site\nname = ").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validation_rejects_relative_base_url() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[site]\nbase_url = \"/\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validation_rejects_excessive_retries() {
        let mut config = SiteConfig::default();
        config.booking.max_retries = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_zero_timeout() {
        let mut config = SiteConfig::default();
        config.booking.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn merge_toml_overlay_wins() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.base_url, defaults.site.base_url);
        assert_eq!(config.colors.accent, defaults.colors.accent);
        assert_eq!(config.booking.initial_backoff_ms, defaults.booking.initial_backoff_ms);
        assert_eq!(config.build.max_threads, None);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = BuildConfig {
            max_threads: Some(10_000),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&BuildConfig { max_threads: Some(1) }), 1);
        assert_eq!(effective_threads(&BuildConfig::default()), cores);
    }
}
