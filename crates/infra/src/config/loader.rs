//! Configuration loader
//!
//! Loads bridge configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PAGEVAULT_PROVIDER_BASE_URL`: OAuth provider base URL
//! - `PAGEVAULT_CLIENT_ID`: OAuth client id
//! - `PAGEVAULT_AUDIENCE`: expected `aud` claim on access tokens
//! - `PAGEVAULT_CALLBACK_BASE_URL`: public base URL of this bridge
//! - `PAGEVAULT_BACKEND_BASE_URL`: primary backend base URL
//! - `PAGEVAULT_ALLOWED_REDIRECTS`: comma-separated `scheme://host` entries
//! - `PAGEVAULT_OUTBOUND_TIMEOUT_SECS`: outbound call timeout (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./pagevault.json` or `./pagevault.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use pagevault_domain::constants::DEFAULT_OUTBOUND_TIMEOUT_SECS;
use pagevault_domain::{BridgeConfig, BridgeError, RedirectRule, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<BridgeConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `BridgeError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<BridgeConfig> {
    let provider_base_url = env_var("PAGEVAULT_PROVIDER_BASE_URL")?;
    let client_id = env_var("PAGEVAULT_CLIENT_ID")?;
    let audience = env_var("PAGEVAULT_AUDIENCE")?;
    let callback_base_url = env_var("PAGEVAULT_CALLBACK_BASE_URL")?;
    let backend_base_url = env_var("PAGEVAULT_BACKEND_BASE_URL")?;

    let allowed_redirects = env_var("PAGEVAULT_ALLOWED_REDIRECTS")?
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(RedirectRule::parse)
        .collect::<Result<Vec<_>>>()?;
    if allowed_redirects.is_empty() {
        return Err(BridgeError::Config(
            "PAGEVAULT_ALLOWED_REDIRECTS must list at least one scheme://host entry".to_string(),
        ));
    }

    let outbound_timeout_secs = match std::env::var("PAGEVAULT_OUTBOUND_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| BridgeError::Config(format!("Invalid outbound timeout: {e}")))?,
        Err(_) => DEFAULT_OUTBOUND_TIMEOUT_SECS,
    };

    Ok(BridgeConfig {
        provider_base_url,
        client_id,
        audience,
        callback_base_url,
        backend_base_url,
        allowed_redirects,
        outbound_timeout_secs,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BridgeError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<BridgeConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BridgeError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format is detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<BridgeConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(BridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("pagevault.json"),
            cwd.join("pagevault.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("pagevault.json"),
                exe_dir.join("pagevault.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| BridgeError::Config(format!("Missing required environment variable: {key}")))
}
