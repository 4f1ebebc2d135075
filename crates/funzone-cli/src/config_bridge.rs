//! Bridge from `funzone_config::Config` to loader types.

use std::sync::Arc;

use anyhow::{Context, Result};

use funzone_config::{BundleSection, Config, SourceKind};
use funzone_core::{BundleCatalog, BundleDescriptor, Category};
use funzone_loader::{HttpResourceClient, LoaderSettings, LocalResourceClient, ResourceClient};
use funzone_telemetry::{LogConfig, LogFormat};

/// Convert the `[[bundle]]` sections into a catalog.
///
/// # Errors
///
/// Returns an error for invalid ids, unknown categories, missing entries or
/// duplicate ids.
pub(crate) fn to_catalog(cfg: &Config) -> Result<BundleCatalog> {
    let bundles = cfg
        .bundles
        .iter()
        .map(to_descriptor)
        .collect::<Result<Vec<_>>>()?;
    BundleCatalog::new(bundles).context("invalid bundle catalog")
}

fn to_descriptor(section: &BundleSection) -> Result<BundleDescriptor> {
    let category = if section.category.is_empty() {
        Category::default()
    } else {
        section
            .category
            .parse::<Category>()
            .with_context(|| format!("bundle '{}'", section.id))?
    };
    let title = if section.title.is_empty() {
        section.id.as_str()
    } else {
        section.title.as_str()
    };

    let mut descriptor = BundleDescriptor::new(section.id.as_str(), title, section.entry.as_str())
        .with_context(|| format!("bundle '{}'", section.id))?
        .with_description(section.description.as_str())
        .with_icon(section.icon.as_str())
        .with_category(category);
    for style in &section.styles {
        descriptor = descriptor.with_style(style.as_str());
    }
    for script in &section.scripts {
        descriptor = descriptor.with_script(script.as_str());
    }
    Ok(descriptor)
}

/// Convert config to [`LogConfig`].
#[must_use]
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg.logging.format.parse().unwrap_or(LogFormat::Compact);
    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);
    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }
    log_config
}

/// Convert config to [`LoaderSettings`].
#[must_use]
pub(crate) fn to_settings(cfg: &Config) -> LoaderSettings {
    LoaderSettings {
        script_attach_delay: cfg.loader.script_attach_delay(),
        resume_delay: cfg.loader.resume_delay(),
    }
}

/// Build the resource client selected by `[source]`.
///
/// # Errors
///
/// Returns an error if the base URL is invalid, the HTTP client cannot be
/// built, or a local source has no asset root.
pub(crate) fn to_client(cfg: &Config) -> Result<Arc<dyn ResourceClient>> {
    match cfg.source.kind {
        SourceKind::Http => {
            let base = cfg.source.base_url()?;
            let client = HttpResourceClient::new(base, cfg.loader.fetch_timeout())?;
            Ok(Arc::new(client))
        },
        SourceKind::Local => {
            let root = cfg
                .source
                .asset_root
                .clone()
                .context("source.asset_root is required for a local source")?;
            Ok(Arc::new(LocalResourceClient::new(root)))
        },
    }
}
