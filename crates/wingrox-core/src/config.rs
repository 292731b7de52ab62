//! Server configuration loading: defaults -> JSON file -> environment.
//!
//! CLI flags are applied on top by the binary. The environment is passed in
//! as a lookup function so the layering can be tested without touching the
//! process environment.

use std::path::{Path, PathBuf};

use validator::Validate;
use wingrox_types::{ConfigError, ServerConfig, StoreConfig};

const DATA_DIR: &str = "wingrox";
const CONFIG_FILE: &str = "config.json";

pub const ENV_CONFIG: &str = "WINGROX_CONFIG";
pub const ENV_DATA_DIR: &str = "WINGROX_DATA_DIR";
pub const ENV_HOST: &str = "WINGROX_HOST";
pub const ENV_PORT: &str = "WINGROX_PORT";
pub const ENV_ALIAS_PREFIXES: &str = "WINGROX_ALIAS_PREFIXES";
pub const ENV_STORE_PATH: &str = "WINGROX_STORE_PATH";

/// Directory holding the config file and the default JSON store.
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    data_dir_from(|key| std::env::var(key).ok())
}

fn data_dir_from(env: impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(custom) = env(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(custom));
    }
    let base = dirs::data_dir().or_else(dirs::home_dir).ok_or_else(|| {
        ConfigError::DataDirUnavailable { message: "cannot determine home directory".to_string() }
    })?;
    Ok(base.join(DATA_DIR))
}

/// Default location of the JSON-file store.
pub fn default_store_path() -> Result<PathBuf, ConfigError> {
    Ok(get_data_dir()?.join("store.json"))
}

/// Load the effective configuration from the process environment.
pub fn load_server_config(explicit: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    load_server_config_with(explicit, |key| std::env::var(key).ok())
}

/// Layer defaults, the config file and environment overrides, then validate.
///
/// The file is `explicit`, else `$WINGROX_CONFIG`, else `<data dir>/wingrox/config.json`.
/// Only the last one may be missing.
pub fn load_server_config_with(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| env(ENV_CONFIG).filter(|v| !v.trim().is_empty()).map(PathBuf::from));

    let mut config = match named {
        Some(path) => read_config_file(&path)?,
        None => {
            let path = data_dir_from(&env)?.join(CONFIG_FILE);
            if path.exists() {
                read_config_file(&path)?
            } else {
                tracing::debug!("No config file at {}, using defaults", path.display());
                ServerConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, &env)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn read_config_file(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(path, &e))?;
    let config: ServerConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn apply_env_overrides(
    config: &mut ServerConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(host) = env(ENV_HOST).filter(|v| !v.trim().is_empty()) {
        config.host = host.trim().to_string();
    }
    if let Some(port) = env(ENV_PORT).filter(|v| !v.trim().is_empty()) {
        config.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(ENV_PORT, format!("'{}' is not a valid port", port)))?;
    }
    if let Some(prefixes) = env(ENV_ALIAS_PREFIXES) {
        config.alias_prefixes = prefixes.split(',').map(|p| p.trim().to_string()).collect();
    }
    if let Some(path) = env(ENV_STORE_PATH).filter(|v| !v.trim().is_empty()) {
        config.store = StoreConfig::JsonFile { path: PathBuf::from(path) };
    }
    Ok(())
}

pub fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if let Err(errors) = config.validate() {
        let field = errors.field_errors().keys().next().map(|k| k.to_string()).unwrap_or_default();
        return Err(ConfigError::invalid(field, errors.to_string()));
    }
    if let Some(bad) = config.alias_prefixes.iter().find(|p| !p.is_empty() && !p.starts_with('/')) {
        return Err(ConfigError::invalid(
            "aliasPrefixes",
            format!("prefix '{}' must be empty or start with '/'", bad),
        ));
    }
    if let Some(bad) = config
        .alias_prefixes
        .iter()
        .find(|p| p.split('/').any(|segment| segment.starts_with(':') || segment.starts_with('*')))
    {
        return Err(ConfigError::invalid(
            "aliasPrefixes",
            format!("prefix '{}' must not contain path parameters or wildcards", bad),
        ));
    }
    if let StoreConfig::JsonFile { path } = &config.store {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("store.path", "must not be empty"));
        }
    }
    Ok(())
}
