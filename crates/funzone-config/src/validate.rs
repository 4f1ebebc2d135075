//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, SourceKind};

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_source(config)?;
    validate_logging(config)?;
    validate_bundles(config)?;
    Ok(())
}

fn validate_source(config: &Config) -> ConfigResult<()> {
    let url = config.source.base_url()?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            field: "source.base_url".to_owned(),
            message: format!("unsupported scheme '{}'; expected http or https", url.scheme()),
        });
    }

    if config.source.kind == SourceKind::Local && config.source.asset_root.is_none() {
        return Err(ConfigError::ValidationError {
            field: "source.asset_root".to_owned(),
            message: "asset_root is required when source.kind = \"local\"".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !matches!(
        l.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        });
    }
    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        });
    }
    Ok(())
}

fn validate_bundles(config: &Config) -> ConfigResult<()> {
    for (i, bundle) in config.bundles.iter().enumerate() {
        if bundle.id.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("bundle[{i}].id"),
                message: "bundle id must not be empty".to_owned(),
            });
        }
        if bundle.entry.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("bundle[{i}].entry"),
                message: format!("bundle '{}' has no entry path", bundle.id),
            });
        }
    }
    Ok(())
}
