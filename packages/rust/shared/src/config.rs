//! Application configuration for ragwalk.
//!
//! Lookup order: an explicit `--config` path, then `./ragwalk.toml`, then
//! `~/.ragwalk/ragwalk.toml`. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RagwalkError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "ragwalk.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ragwalk";

// ---------------------------------------------------------------------------
// Config structs (matching ragwalk.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Locales, content location and step table.
    #[serde(default)]
    pub site: SiteConfig,

    /// Static build settings.
    #[serde(default)]
    pub build: BuildSection,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Locale used when a candidate does not match, and for canonical builds.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Supported locales in declaration order.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Directory holding one `<locale>.json` content store per locale.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Explicit ordered demo keys, one per step. Empty uses the built-in table.
    #[serde(default)]
    pub demos: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locales: default_locales(),
            content_dir: default_content_dir(),
            demos: Vec::new(),
        }
    }
}

fn default_locale() -> String {
    "en".into()
}
fn default_locales() -> Vec<String> {
    vec!["en".into(), "de".into()]
}
fn default_content_dir() -> String {
    "content".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Output directory for rendered page payloads.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Render every supported locale instead of only the default one.
    #[serde(default)]
    pub all_locales: bool,

    /// Fail the build when any enumerated route resolves to not-found.
    #[serde(default)]
    pub strict: bool,

    /// Maximum page assemblies in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            all_locales: false,
            strict: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_out_dir() -> String {
    "dist".into()
}
fn default_concurrency() -> u32 {
    4
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the per-user config directory (`~/.ragwalk/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| RagwalkError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Find the config file to use, if any.
///
/// An explicit path must exist; the implicit locations are optional.
pub fn config_file_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(RagwalkError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(Some(local));
    }

    let user = config_dir()?.join(CONFIG_FILE_NAME);
    Ok(user.exists().then_some(user))
}

/// Load the application config. Returns defaults if no file is found.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match config_file_path(explicit)? {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("config file not found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RagwalkError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RagwalkError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path`. Refuses to overwrite.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(RagwalkError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RagwalkError::io(parent, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RagwalkError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| RagwalkError::io(path, e))?;
    tracing::info!(path = %path.display(), "created default config file");

    Ok(path.to_path_buf())
}
