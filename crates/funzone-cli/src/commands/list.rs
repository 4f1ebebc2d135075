//! List the bundle catalog.

use colored::Colorize;

use funzone_core::BundleCatalog;

use crate::theme::Theme;

/// Print every bundle, marking the last-opened one.
pub(crate) fn list_bundles(catalog: &BundleCatalog, last_opened: Option<&str>) {
    if catalog.is_empty() {
        println!("{}", Theme::info("No bundles configured"));
        return;
    }

    println!("\n{}", Theme::header("Bundles"));
    println!(
        "{:<14} {:<22} {:<16} {}",
        "ID".dimmed(),
        "TITLE".dimmed(),
        "CATEGORY".dimmed(),
        "ENTRY".dimmed()
    );
    println!("{}", Theme::separator());

    for bundle in catalog.all() {
        let marker = if Some(bundle.id().as_str()) == last_opened {
            "*".green().to_string()
        } else {
            " ".to_owned()
        };
        println!(
            "{marker}{:<13} {:<22} {:<16} {}",
            bundle.id().as_str().bold(),
            bundle.title(),
            bundle.category().label(),
            Theme::dimmed(bundle.entry_path())
        );
    }

    if last_opened.is_some() {
        println!("\n{}", Theme::dimmed("* last opened"));
    }
    println!();
}
