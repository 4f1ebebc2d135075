//! Load pipeline behavior against mock collaborators.

use funzone_loader::{
    FetchError, LoadError, LoadOutcome, LoadPhase, LoadState, Provenance, RenderedContent,
    ScriptOutcome, ScriptReport, ScriptSource, SurfaceError,
};
use funzone_test::{
    LoaderHarness, MockMethod, MockResourceClient, MockResponse, RecordingSurface, bundle_markup,
    init_test_logging, memory_last_opened, serving_client, test_catalog,
};

async fn settle(outcome: LoadOutcome) -> Vec<ScriptReport> {
    match outcome {
        LoadOutcome::Ready { scripts, .. } => scripts.settle().await,
        LoadOutcome::Superseded { bundle_id } => panic!("load of {bundle_id} was superseded"),
    }
}

#[tokio::test]
async fn test_bingo_end_to_end() {
    init_test_logging();
    let harness = LoaderHarness::new(test_catalog());

    let outcome = harness.controller.load_app("bingo").await.unwrap();
    assert!(outcome.is_ready());
    assert!(settle(outcome).await.is_empty());

    let state = harness.controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(!state.is_loading);
    assert_eq!(state.current_bundle_id.as_ref().unwrap(), "bingo");

    let status = state.resource_status.unwrap();
    assert!(status.entry_ok && status.style_ok && status.script_ok);

    let RenderedContent::Bundle(markup) = &state.rendered_content else {
        panic!("expected bundle content, got {:?}", state.rendered_content);
    };
    assert!(markup.contains("<base href=\"/assets/funzone/Bingo/\">"));
    assert!(markup.contains("<link rel=\"stylesheet\" href=\"/assets/funzone/Bingo/style.css\">"));
    assert!(markup.contains("<h1>Bingo</h1>"));
    assert_eq!(harness.surface.current_content().as_ref(), Some(markup));

    let saved = harness.last_opened.load().await.unwrap().unwrap();
    assert_eq!(saved, "bingo");
}

#[tokio::test]
async fn test_probe_heads_samples_and_gets_only_entry() {
    let harness = LoaderHarness::new(test_catalog());
    harness.controller.load_app("kanban").await.unwrap();

    assert_eq!(harness.client.count(MockMethod::Head, "Kanban/index1.html"), 1);
    assert_eq!(harness.client.count(MockMethod::Head, "Kanban/style1.css"), 1);
    assert_eq!(harness.client.count(MockMethod::Head, "Kanban/javascript1.js"), 1);
    assert_eq!(harness.client.count(MockMethod::Get, "Kanban/index1.html"), 1);
    assert_eq!(harness.client.count(MockMethod::Get, "Kanban/style1.css"), 0);
}

#[tokio::test]
async fn test_unknown_bundle_leaves_state_untouched() {
    let harness = LoaderHarness::new(test_catalog());

    let err = harness.controller.load_app("chess").await.unwrap_err();
    assert_eq!(err, LoadError::UnknownBundle { id: "chess".into() });
    assert_eq!(harness.controller.state(), LoadState::default());
    assert!(harness.last_opened.load().await.unwrap().is_none());
    assert!(harness.client.requests().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_commits_diagnostic() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    client.respond("assets/funzone/Kviz/quiz.html", MockResponse::Status(404));
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());

    let err = harness.controller.load_app("quiz").await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Fetch {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));

    let state = harness.controller.state();
    assert_eq!(state.phase, LoadPhase::Failed);
    assert!(!state.is_loading);
    assert_eq!(state.current_bundle_id.as_ref().unwrap(), "quiz");
    assert!(!state.resource_status.unwrap().entry_ok);

    let RenderedContent::Diagnostic(doc) = &state.rendered_content else {
        panic!("expected a diagnostic document");
    };
    assert!(doc.contains("<strong>Quiz</strong>"));
    assert!(doc.contains("HTTP 404"));
    assert!(doc.contains("data-funzone-action=\"retry\" data-bundle-id=\"quiz\""));
    assert!(doc.contains("http://funzone.test/assets/funzone/Kviz/quiz.html"));
    assert_eq!(harness.surface.current_content().as_ref(), Some(doc));

    // The id is persisted when the load starts, even if it then fails.
    assert_eq!(harness.last_opened.load().await.unwrap().unwrap(), "quiz");
}

#[tokio::test]
async fn test_empty_entry_body_fails() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    client.respond("assets/funzone/Bingo/bingo.html", MockResponse::Text(String::new()));
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());

    let err = harness.controller.load_app("bingo").await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Fetch {
            source: FetchError::EmptyBody { .. },
            ..
        }
    ));
    assert!(harness.controller.state().rendered_content.is_diagnostic());
}

#[tokio::test]
async fn test_surface_rejection_fails_load() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    let surface = RecordingSurface::new().rejecting_content();
    let harness = LoaderHarness::with_parts(catalog, client, surface, memory_last_opened());

    let err = harness.controller.load_app("bingo").await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Surface {
            source: SurfaceError::Rejected(_),
            ..
        }
    ));
    let state = harness.controller.state();
    assert_eq!(state.phase, LoadPhase::Failed);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_missing_style_is_reported_but_load_succeeds() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    client.respond("Kanban/style1.css", MockResponse::Status(404));
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());

    let outcome = harness.controller.load_app("kanban").await.unwrap();
    assert!(outcome.is_ready());

    let status = harness.controller.state().resource_status.unwrap();
    assert!(status.entry_ok);
    assert!(!status.style_ok);
    assert!(status.script_ok);
}

// ---------------------------------------------------------------------------
// Scripts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_scripts_attach_by_reference() {
    let harness = LoaderHarness::new(test_catalog());
    let outcome = harness.controller.load_app("kanban").await.unwrap();
    let reports = settle(outcome).await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].path, "Kanban/javascript1.js");
    assert_eq!(reports[0].outcome, ScriptOutcome::Attached);

    let attached = harness.surface.attached();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].provenance, Provenance::Primary);
    assert_eq!(attached[0].bundle_id, "kanban");
}

#[tokio::test]
async fn test_mounted_client_prefixes_every_href() {
    let catalog = test_catalog();
    let client = serving_client(&catalog).mounted_at("/app/");
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());

    let outcome = harness.controller.load_app("kanban").await.unwrap();
    settle(outcome).await;

    let markup = harness.surface.current_content().unwrap();
    assert!(markup.contains("<base href=\"/app/Kanban/\">"));
    assert!(markup.contains("<link rel=\"stylesheet\" href=\"/app/Kanban/style1.css\">"));

    let attached = harness.surface.attached();
    assert_eq!(
        attached[0].source,
        ScriptSource::External("/app/Kanban/javascript1.js".to_owned())
    );
    assert_eq!(
        harness.controller.entry_location("kanban").unwrap(),
        "http://funzone.test/app/Kanban/index1.html"
    );
}

#[tokio::test]
async fn test_script_recovers_inline() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    let surface = RecordingSurface::new().fail_primary("Kanban/javascript1.js");
    let harness = LoaderHarness::with_parts(catalog, client, surface, memory_last_opened());

    let outcome = harness.controller.load_app("kanban").await.unwrap();
    let reports = settle(outcome).await;
    assert_eq!(reports[0].outcome, ScriptOutcome::RecoveredInline);

    let attached = harness.surface.attached();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].provenance, Provenance::Fallback);
    assert!(attached[0].to_markup().contains("console.log('Kanban/javascript1.js');"));
    assert_eq!(harness.client.count(MockMethod::Get, "Kanban/javascript1.js"), 1);
}

#[tokio::test]
async fn test_script_failing_both_ways_is_skipped() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    let surface = RecordingSurface::new()
        .fail_primary("whiteboard/javascript3.js")
        .fail_inline("whiteboard/javascript3.js");
    let harness = LoaderHarness::with_parts(catalog, client, surface, memory_last_opened());

    let outcome = harness.controller.load_app("whiteboard").await.unwrap();
    let reports = settle(outcome).await;

    assert_eq!(reports.len(), 2);
    assert!(matches!(reports[0].outcome, ScriptOutcome::Failed(ref e) if e.path == "whiteboard/javascript3.js"));
    assert_eq!(reports[1].outcome, ScriptOutcome::Attached);

    let state = harness.controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(!state.rendered_content.is_diagnostic());
}

#[tokio::test]
async fn test_script_fallback_fetch_failure() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    client.respond("Kanban/javascript1.js", MockResponse::Status(404));
    let surface = RecordingSurface::new().fail_primary("Kanban/javascript1.js");
    let harness = LoaderHarness::with_parts(catalog, client, surface, memory_last_opened());

    let outcome = harness.controller.load_app("kanban").await.unwrap();
    let reports = settle(outcome).await;

    let ScriptOutcome::Failed(err) = &reports[0].outcome else {
        panic!("expected failure, got {:?}", reports[0].outcome);
    };
    assert!(err.fallback.contains("404"));
    assert!(harness.surface.attached().is_empty());
    assert_eq!(harness.controller.state().phase, LoadPhase::Ready);
}

#[tokio::test]
async fn test_reload_replaces_previous_executables() {
    let harness = LoaderHarness::new(test_catalog());

    let first = harness.controller.load_app("kanban").await.unwrap();
    settle(first).await;
    let second = harness.controller.load_app("kanban").await.unwrap();
    settle(second).await;

    assert_eq!(harness.surface.attached().len(), 1);
    assert_eq!(harness.surface.attempts().len(), 2);
}

#[tokio::test]
async fn test_switching_bundles_clears_scripts() {
    let harness = LoaderHarness::new(test_catalog());

    let kanban = harness.controller.load_app("kanban").await.unwrap();
    settle(kanban).await;
    let bingo = harness.controller.load_app("bingo").await.unwrap();
    settle(bingo).await;

    assert!(harness.surface.attached().is_empty());
}

// ---------------------------------------------------------------------------
// Supersession
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_newer_load_wins() {
    let harness = LoaderHarness::new(test_catalog());
    let gate = harness.client.gate("assets/funzone/Bingo/bingo.html");

    let controller = harness.controller.clone();
    let slow = tokio::spawn(async move { controller.load_app("bingo").await });

    let mut rx = harness.controller.subscribe();
    rx.wait_for(|s| s.phase == LoadPhase::Fetching).await.unwrap();

    let fast = harness.controller.load_app("quiz").await.unwrap();
    assert!(fast.is_ready());

    gate.notify_one();
    let slow = slow.await.unwrap().unwrap();
    assert!(matches!(slow, LoadOutcome::Superseded { ref bundle_id } if bundle_id == "bingo"));

    let state = harness.controller.state();
    assert_eq!(state.current_bundle_id.as_ref().unwrap(), "quiz");
    assert_eq!(state.phase, LoadPhase::Ready);
    assert_eq!(state.generation, 2);
    assert_eq!(
        state.rendered_content.markup().map(|m| m.contains("<h1>Quiz</h1>")),
        Some(true)
    );
    assert_eq!(harness.surface.content_history().len(), 1);
    assert_eq!(harness.last_opened.load().await.unwrap().unwrap(), "quiz");
}

#[tokio::test]
async fn test_superseded_failure_is_discarded() {
    let catalog = test_catalog();
    let client = serving_client(&catalog);
    client.respond("assets/funzone/Bingo/bingo.html", MockResponse::Status(500));
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());
    let gate = harness.client.gate("assets/funzone/Bingo/bingo.html");

    let controller = harness.controller.clone();
    let slow = tokio::spawn(async move { controller.load_app("bingo").await });
    let mut rx = harness.controller.subscribe();
    rx.wait_for(|s| s.phase == LoadPhase::Fetching).await.unwrap();

    harness.controller.load_app("quiz").await.unwrap();
    gate.notify_one();

    let slow = slow.await.unwrap();
    assert!(matches!(slow, Ok(LoadOutcome::Superseded { .. })));

    let state = harness.controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    assert!(!state.rendered_content.is_diagnostic());
    assert!(harness
        .surface
        .content_history()
        .iter()
        .all(|c| !c.contains("funzone-error")));
}

// ---------------------------------------------------------------------------
// Resume, refresh and presentation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_resume_last_opened() {
    let harness = LoaderHarness::new(test_catalog());
    harness
        .last_opened
        .save(&funzone_core::BundleId::new("quiz").unwrap())
        .await
        .unwrap();

    let outcome = harness.controller.resume_last().await.unwrap().unwrap();
    assert!(outcome.is_ready());
    assert_eq!(outcome.bundle_id(), "quiz");
    assert_eq!(harness.controller.state().current_bundle_id.unwrap(), "quiz");
}

#[tokio::test]
async fn test_resume_without_saved_bundle() {
    let harness = LoaderHarness::new(test_catalog());
    assert!(harness.controller.resume_last().await.is_none());
    assert_eq!(harness.controller.state(), LoadState::default());
}

#[tokio::test]
async fn test_resume_ignores_retired_bundle() {
    let harness = LoaderHarness::new(test_catalog());
    harness
        .last_opened
        .save(&funzone_core::BundleId::new("retired").unwrap())
        .await
        .unwrap();

    assert!(harness.controller.resume_last().await.is_none());
    assert!(harness.client.requests().is_empty());
}

#[tokio::test]
async fn test_refresh_reloads_current() {
    let harness = LoaderHarness::new(test_catalog());
    assert!(harness.controller.refresh().await.is_none());

    harness.controller.load_app("bingo").await.unwrap();
    let outcome = harness.controller.refresh().await.unwrap().unwrap();
    assert_eq!(outcome.bundle_id(), "bingo");
    assert_eq!(harness.controller.state().generation, 2);
    assert_eq!(
        harness.client.count(MockMethod::Get, "assets/funzone/Bingo/bingo.html"),
        2
    );
}

#[tokio::test]
async fn test_presentation_flags() {
    let harness = LoaderHarness::new(test_catalog());

    assert!(harness.controller.toggle_fullscreen());
    assert!(!harness.controller.toggle_fullscreen());

    harness.controller.show_grid();
    assert!(harness.controller.state().is_grid_visible);
    harness.controller.load_app("bingo").await.unwrap();
    assert!(!harness.controller.state().is_grid_visible);

    harness.controller.show_grid();
    harness.controller.hide_grid();
    assert!(!harness.controller.state().is_grid_visible);
}

#[tokio::test]
async fn test_current_bundle_and_entry_location() {
    let harness = LoaderHarness::new(test_catalog());
    assert!(harness.controller.current_bundle().is_none());

    harness.controller.load_app("kanban").await.unwrap();
    assert_eq!(harness.controller.current_bundle().unwrap().title(), "Kanban Board");

    assert_eq!(
        harness.controller.entry_location("kanban").unwrap(),
        "http://funzone.test/Kanban/index1.html"
    );
    assert!(matches!(
        harness.controller.entry_location("chess"),
        Err(LoadError::UnknownBundle { .. })
    ));
}

#[tokio::test]
async fn test_observers_see_every_phase_end() {
    let harness = LoaderHarness::new(test_catalog());
    let rx = harness.controller.subscribe();

    harness.controller.load_app("bingo").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow().phase, LoadPhase::Ready);
}

#[tokio::test]
async fn test_doctor_report() {
    let catalog = test_catalog();
    let client = MockResourceClient::new()
        .with_text("assets/funzone/Bingo/bingo.html", bundle_markup("Bingo"))
        .with_text("assets/funzone/Bingo/style.css", "body {}")
        .with_transport_error("Kanban/index1.html", "connection refused");
    let harness =
        LoaderHarness::with_parts(catalog, client, RecordingSurface::new(), memory_last_opened());
    harness.controller.load_app("bingo").await.unwrap();

    let report = harness.controller.doctor().await;
    assert_eq!(report.bundle_count, 4);
    assert_eq!(report.current_bundle_id.unwrap(), "bingo");
    assert_eq!(report.last_opened.unwrap(), "bingo");
    assert!(!report.is_loading);

    let bingo = &report.bundles[0];
    assert!(bingo.is_healthy());
    assert_eq!(bingo.checks.len(), 2);

    let kanban = report.bundles.iter().find(|b| b.bundle_id == "kanban").unwrap();
    assert!(!kanban.is_healthy());
    assert!(kanban.checks[0].error.as_deref().unwrap().contains("connection refused"));
    assert_eq!(kanban.checks.len(), 3);
}
