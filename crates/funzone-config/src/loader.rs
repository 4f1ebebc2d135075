//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.funzone/config.toml` (user)
//! 3. Merge `{workspace}/.funzone/config.toml` (workspace)
//! 4. Apply env var fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Environment variable → dotted field path.
const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("FUNZONE_BASE_URL", "source.base_url"),
    ("FUNZONE_ASSET_ROOT", "source.asset_root"),
    ("FUNZONE_LOG_LEVEL", "logging.level"),
    ("FUNZONE_STORAGE_PATH", "storage.path"),
];

/// A loaded configuration plus the files that contributed to it.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final configuration.
    pub config: Config,
    /// Config files merged over the defaults, lowest precedence first.
    pub loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// Render the resolved configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns a validation error if serialization fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(&self.config).map_err(|e| ConfigError::ValidationError {
            field: "<resolved config>".to_owned(),
            message: e.to_string(),
        })
    }
}

/// Load the configuration with layered file precedence.
///
/// `home_override` replaces the user-level config directory (the directory
/// that contains `config.toml`), bypassing `FUNZONE_HOME` and `~/.funzone`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let env_vars: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("FUNZONE_"))
        .collect();
    load_with_env(workspace_root, home_override, &env_vars)
}

pub(crate) fn load_with_env(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged = parse_defaults()?;
    let mut file_fields = HashSet::new();
    let mut loaded_files = Vec::new();

    // User config.
    let user_dir = match home_override {
        Some(dir) => Some(dir.to_path_buf()),
        None => user_config_dir(env_vars),
    };
    if let Some(dir) = user_dir {
        let path = dir.join("config.toml");
        if let Some(overlay) = try_load_file(&path)? {
            record_leaves(&overlay, "", &mut file_fields);
            deep_merge(&mut merged, &overlay);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), "loaded user config");
        }
    }

    // Workspace config.
    if let Some(root) = workspace_root {
        let path = root.join(".funzone").join("config.toml");
        if let Some(overlay) = try_load_file(&path)? {
            record_leaves(&overlay, "", &mut file_fields);
            deep_merge(&mut merged, &overlay);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), "loaded workspace config");
        }
    }

    let env_count = apply_env_fallbacks(&mut merged, &file_fields, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
    })
}

/// Load a single config file layered over the embedded defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or the
/// result fails validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;

    let mut merged = parse_defaults()?;
    deep_merge(&mut merged, &overlay);

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// The embedded defaults on their own, without files or environment.
///
/// # Errors
///
/// Returns a parse error if the embedded defaults are malformed.
pub fn defaults() -> ConfigResult<Config> {
    toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })
}

fn parse_defaults() -> ConfigResult<toml::Value> {
    toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })
}

/// `$FUNZONE_HOME` if set, otherwise `~/.funzone`.
fn user_config_dir(env_vars: &HashMap<String, String>) -> Option<PathBuf> {
    if let Some(home) = env_vars.get("FUNZONE_HOME") {
        return Some(PathBuf::from(home));
    }
    directories::BaseDirs::new().map(|d| d.home_dir().join(".funzone"))
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per-field; scalars and arrays (including `[[bundle]]`)
/// replace the base value.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Record the dotted path of every leaf value in `val`.
fn record_leaves(val: &toml::Value, prefix: &str, out: &mut HashSet<String>) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            record_leaves(child, &path, out);
        }
    } else {
        out.insert(prefix.to_owned());
    }
}

/// Apply env vars to fields that no config file set. Returns how many applied.
fn apply_env_fallbacks(
    merged: &mut toml::Value,
    file_fields: &HashSet<String>,
    env_vars: &HashMap<String, String>,
) -> usize {
    let mut count: usize = 0;
    for (var_name, field_path) in ENV_MAPPINGS {
        let Some(value) = env_vars.get(*var_name) else {
            continue;
        };
        if file_fields.contains(*field_path) {
            debug!(var = var_name, field = field_path, "env var shadowed by config file");
            continue;
        }
        if set_path(merged, field_path, toml::Value::String(value.clone())) {
            count = count.saturating_add(1);
        }
    }
    count
}

fn set_path(root: &mut toml::Value, dotted: &str, value: toml::Value) -> bool {
    let mut parts: Vec<&str> = dotted.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return false;
    };
    let mut cursor = root;
    for part in parts {
        let Some(table) = cursor.as_table_mut() else {
            return false;
        };
        cursor = table
            .entry(part)
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    match cursor.as_table_mut() {
        Some(table) => {
            table.insert(leaf.to_owned(), value);
            true
        },
        None => false,
    }
}
