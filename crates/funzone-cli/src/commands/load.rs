//! Load a bundle and export the rendered document.
//!
//! Without `--out` the document is the only thing written to stdout; status
//! lines go to stderr.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use funzone_loader::{LoadOutcome, LoadResult, ScriptOutcome};

use crate::context::LoaderContext;
use crate::theme::Theme;

/// Load `id`, wait for its scripts and write the document.
pub(crate) async fn load_bundle(ctx: &LoaderContext, id: &str, out: Option<&Path>) -> Result<()> {
    let result = ctx.controller.load_app(id).await;
    finish(ctx, result, out, &mut std::io::stdout()).await
}

/// Load the last-opened bundle, if there is one.
pub(crate) async fn resume(ctx: &LoaderContext, out: Option<&Path>) -> Result<()> {
    match ctx.controller.resume_last().await {
        Some(result) => finish(ctx, result, out, &mut std::io::stdout()).await,
        None => {
            eprintln!("{}", Theme::info("Nothing to resume"));
            Ok(())
        },
    }
}

/// Forget the last-opened bundle.
pub(crate) async fn forget(ctx: &LoaderContext) -> Result<()> {
    if ctx.last_opened.clear().await? {
        println!("{}", Theme::success("Forgot last-opened bundle"));
    } else {
        println!("{}", Theme::info("No last-opened bundle stored"));
    }
    Ok(())
}

async fn finish<W: Write + Send>(
    ctx: &LoaderContext,
    result: LoadResult<LoadOutcome>,
    out: Option<&Path>,
    stdout: &mut W,
) -> Result<()> {
    let failure = match result {
        Ok(LoadOutcome::Ready { bundle_id, scripts }) => {
            for report in scripts.settle().await {
                match report.outcome {
                    ScriptOutcome::Attached | ScriptOutcome::Skipped => {},
                    ScriptOutcome::RecoveredInline => {
                        eprintln!("{}", Theme::warning(&format!("{} attached inline", report.path)));
                    },
                    ScriptOutcome::Failed(e) => eprintln!("{}", Theme::error(&e.to_string())),
                }
            }
            eprintln!("{}", Theme::success(&format!("Loaded {bundle_id}")));
            None
        },
        Ok(LoadOutcome::Superseded { bundle_id }) => {
            eprintln!("{}", Theme::warning(&format!("Load of {bundle_id} was superseded")));
            return Ok(());
        },
        Err(e) => {
            eprintln!("{}", Theme::error(&e.to_string()));
            Some(e)
        },
    };

    if let Some(status) = ctx.controller.state().resource_status {
        eprintln!("{}", Theme::dimmed(&format!("  resources: {status}")));
    }

    if let Some(document) = ctx.surface.document() {
        match out {
            Some(path) => {
                std::fs::write(path, &document)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("{}", Theme::info(&format!("Wrote {}", path.display())));
            },
            None => {
                writeln!(stdout, "{document}").context("failed to write document")?;
                stdout.flush().context("failed to write document")?;
            },
        }
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
