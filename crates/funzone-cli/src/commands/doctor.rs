//! Doctor command for resource health checks.

use anyhow::Result;
use colored::Colorize;

use crate::context::LoaderContext;
use crate::theme::Theme;

/// Check every bundle resource and print loader state.
pub(crate) async fn run_doctor(ctx: &LoaderContext) -> Result<()> {
    println!("{}", "Funzone Doctor - Bundle Health Check".cyan().bold());
    println!();

    let report = ctx.controller.doctor().await;
    let none = || "-".to_owned();

    println!("  Current bundle: {}", report.current_bundle_id.map_or_else(none, |id| id.to_string()));
    println!("  Bundles:        {}", report.bundle_count);
    println!("  Loading:        {}", report.is_loading);
    println!("  Grid visible:   {}", report.is_grid_visible);
    println!("  Fullscreen:     {}", report.is_fullscreen);
    println!("  Last opened:    {}", report.last_opened.map_or_else(none, |id| id.to_string()));

    let mut unhealthy = 0_usize;
    for bundle in &report.bundles {
        println!("\n{} {}", Theme::header(&bundle.title), Theme::dimmed(bundle.bundle_id.as_str()));
        for check in &bundle.checks {
            print!("  {} {:<7} {}", Theme::status(check.is_ok()), check.kind, check.path);
            if let Some(err) = &check.error {
                print!(" - {}", err.dimmed());
            }
            println!();
        }
        if !bundle.is_healthy() {
            unhealthy = unhealthy.saturating_add(1);
        }
    }

    println!();
    if unhealthy == 0 {
        println!("{}", "All bundles healthy".green().bold());
    } else {
        println!("{}", format!("{unhealthy} bundle(s) have missing resources").yellow().bold());
    }
    Ok(())
}
