//! Process configuration from `TIDYHOME_*` environment variables, or from a
//! JSON/TOML file when `TIDYHOME_DB_PATH` or `TIDYHOME_GATEWAY_API_KEY` is
//! unset. Optional variables fall back to `tidyhome_domain::constants`.
//!
//! The file is the first of `config.{json,toml}`, `tidyhome.{json,toml}` and
//! `../config.{json,toml}` found under the working directory, then under the
//! executable's directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tidyhome_domain::{
    Config, DatabaseConfig, GatewayConfig, PayoutsConfig, Result, TidyHomeError,
};

/// Environment first, then the first config file found.
///
/// # Errors
/// `TidyHomeError::Config` when neither source yields a valid configuration.
pub fn load() -> Result<Config> {
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
/// # Errors
/// Returns `TidyHomeError::Config` if required variables are missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let database = DatabaseConfig {
        path: env_var("TIDYHOME_DB_PATH")?,
        pool_size: env_parse("TIDYHOME_DB_POOL_SIZE", defaults.database.pool_size)?,
    };

    let gateway = GatewayConfig {
        base_url: std::env::var("TIDYHOME_GATEWAY_URL").unwrap_or(defaults.gateway.base_url),
        api_key: env_var("TIDYHOME_GATEWAY_API_KEY")?,
        timeout_secs: env_parse("TIDYHOME_GATEWAY_TIMEOUT_SECS", defaults.gateway.timeout_secs)?,
        max_attempts: env_parse("TIDYHOME_GATEWAY_MAX_ATTEMPTS", defaults.gateway.max_attempts)?,
    };

    let payouts = PayoutsConfig {
        currency: std::env::var("TIDYHOME_PAYOUT_CURRENCY").unwrap_or(defaults.payouts.currency),
        max_concurrency: env_parse(
            "TIDYHOME_PAYOUT_MAX_CONCURRENCY",
            defaults.payouts.max_concurrency,
        )?,
    };

    Ok(Config { database, gateway, payouts })
}

/// Load `path`, or the first file [`find_config_file`] returns.
///
/// # Errors
/// `TidyHomeError::Config` when no file is found or it does not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TidyHomeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            TidyHomeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TidyHomeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// JSON or TOML by extension; a file without one is read as JSON.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TidyHomeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TidyHomeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TidyHomeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file, looked up as the module docs describe.
pub fn find_config_file() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "config.json",
        "config.toml",
        "tidyhome.json",
        "tidyhome.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `TidyHomeError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TidyHomeError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, falling back to `default`.
///
/// # Errors
/// Returns `TidyHomeError::Config` when the variable is set but invalid.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| TidyHomeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
pub fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
