//! Config command - inspect the resolved configuration.

use anyhow::Result;

use funzone_config::ResolvedConfig;

use crate::theme::Theme;

/// Print the resolved configuration as TOML.
pub(crate) fn show_config(resolved: &ResolvedConfig) -> Result<()> {
    println!("{}", resolved.to_toml()?);
    Ok(())
}

/// Print the files that contributed to the configuration.
pub(crate) fn show_paths(resolved: &ResolvedConfig) -> Result<()> {
    println!("{}", Theme::header("Config files"));
    if resolved.loaded_files.is_empty() {
        println!("  {}", Theme::dimmed("(embedded defaults only)"));
    }
    for file in &resolved.loaded_files {
        println!("  {file}");
    }
    let prefs = resolved.config.storage.resolve_path()?;
    println!("\n{}", Theme::header("Preferences"));
    println!("  {}", prefs.display());
    Ok(())
}
