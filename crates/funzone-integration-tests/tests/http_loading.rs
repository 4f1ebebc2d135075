//! End-to-end loading over real HTTP from a static file server.

mod common;

use std::sync::Arc;

use common::{StaticServer, http_controller};
use funzone_core::{BundleCatalog, BundleDescriptor, Category};
use funzone_loader::{
    FetchError, LoadController, LoadError, LoadOutcome, LoadPhase, LoaderSettings,
    LocalResourceClient, RenderedContent, ResourceClient, ScriptOutcome,
};
use funzone_storage::{JsonFileKvStore, LastOpenedStore};
use funzone_test::{RecordingSurface, bingo, bundle_markup, kanban};

const BINGO_FILES: &[(&str, &str)] = &[
    (
        "assets/funzone/Bingo/bingo.html",
        "<!DOCTYPE html><html><head><title>Bingo</title></head><body><div id=\"card\"></div></body></html>",
    ),
    ("assets/funzone/Bingo/style.css", "#card { display: grid; }"),
];

fn catalog() -> BundleCatalog {
    BundleCatalog::new(vec![bingo(), kanban()]).unwrap()
}

#[tokio::test]
async fn test_bingo_over_http() {
    let server = StaticServer::start(BINGO_FILES).await;
    let prefs = tempfile::tempdir().unwrap();
    let surface = RecordingSurface::new();
    let controller =
        http_controller(&server, catalog(), &surface, &prefs.path().join("prefs.json")).await;

    let outcome = controller.load_app("bingo").await.unwrap();
    assert!(outcome.is_ready());

    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Ready);
    let status = state.resource_status.unwrap();
    assert!(status.all_ok());

    let markup = surface.current_content().unwrap();
    assert!(markup.contains(
        "<head><base href=\"/assets/funzone/Bingo/\"><title>Bingo</title><link rel=\"stylesheet\" href=\"/assets/funzone/Bingo/style.css\">\n</head>"
    ));
    assert!(markup.contains("<div id=\"card\"></div>"));
}

#[tokio::test]
async fn test_hrefs_follow_a_mounted_base_url() {
    let server = StaticServer::start_under("/app/", BINGO_FILES).await;
    assert_eq!(server.base.path(), "/app/");
    let prefs = tempfile::tempdir().unwrap();
    let surface = RecordingSurface::new();
    let controller =
        http_controller(&server, catalog(), &surface, &prefs.path().join("prefs.json")).await;

    controller.load_app("bingo").await.unwrap();
    let markup = surface.current_content().unwrap();
    assert!(markup.contains("<base href=\"/app/assets/funzone/Bingo/\">"));

    // The host resolves emitted hrefs against its own origin.
    let client = server.client();
    let style = server
        .base
        .join("/app/assets/funzone/Bingo/style.css")
        .unwrap();
    assert!(markup.contains("href=\"/app/assets/funzone/Bingo/style.css\""));
    assert!(client.head(style.as_str()).await.is_ok());
    let entry = server
        .base
        .join("/app/assets/funzone/Bingo/")
        .unwrap()
        .join("bingo.html")
        .unwrap();
    assert!(client.head(entry.as_str()).await.is_ok());
}

#[tokio::test]
async fn test_last_opened_survives_restart() {
    let server = StaticServer::start(BINGO_FILES).await;
    let prefs = tempfile::tempdir().unwrap();
    let path = prefs.path().join("prefs.json");

    let first_surface = RecordingSurface::new();
    let first = http_controller(&server, catalog(), &first_surface, &path).await;
    first.load_app("bingo").await.unwrap();
    drop(first);

    let second_surface = RecordingSurface::new();
    let second = http_controller(&server, catalog(), &second_surface, &path).await;
    let resumed = second.resume_last().await.unwrap().unwrap();
    assert_eq!(resumed.bundle_id(), "bingo");
    assert!(second_surface.current_content().unwrap().contains("Bingo"));
}

#[tokio::test]
async fn test_missing_entry_shows_diagnostic() {
    let server = StaticServer::start(&[]).await;
    let prefs = tempfile::tempdir().unwrap();
    let surface = RecordingSurface::new();
    let controller =
        http_controller(&server, catalog(), &surface, &prefs.path().join("prefs.json")).await;

    let err = controller.load_app("bingo").await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Fetch {
            source: FetchError::Status { status: 404, .. },
            ..
        }
    ));

    let state = controller.state();
    assert_eq!(state.phase, LoadPhase::Failed);
    let status = state.resource_status.unwrap();
    assert!(!status.entry_ok);
    assert!(!status.style_ok);
    assert!(status.script_ok);

    let RenderedContent::Diagnostic(doc) = state.rendered_content else {
        panic!("expected a diagnostic document");
    };
    let location = format!("{}assets/funzone/Bingo/bingo.html", server.base);
    assert!(doc.contains(&location));
    assert!(doc.contains("Markup: \u{274c}"));
}

#[tokio::test]
async fn test_script_fallback_fetches_over_http() {
    let entry = bundle_markup("Kanban Board");
    let server = StaticServer::start(&[
        ("Kanban/index1.html", entry.as_str()),
        ("Kanban/style1.css", "body {}"),
        ("Kanban/javascript1.js", "initBoard();"),
    ])
    .await;
    let prefs = tempfile::tempdir().unwrap();
    let surface = RecordingSurface::new().fail_primary("Kanban/javascript1.js");
    let controller =
        http_controller(&server, catalog(), &surface, &prefs.path().join("prefs.json")).await;

    let outcome = controller.load_app("kanban").await.unwrap();
    let LoadOutcome::Ready { scripts, .. } = outcome else {
        panic!("kanban load was superseded");
    };
    let reports = scripts.settle().await;
    assert_eq!(reports[0].outcome, ScriptOutcome::RecoveredInline);

    let attached = surface.attached();
    assert_eq!(attached.len(), 1);
    assert!(attached[0].to_markup().contains("initBoard();"));
}

#[tokio::test]
async fn test_entry_location_points_at_server() {
    let server = StaticServer::start(BINGO_FILES).await;
    let prefs = tempfile::tempdir().unwrap();
    let controller = http_controller(
        &server,
        catalog(),
        &RecordingSurface::new(),
        &prefs.path().join("prefs.json"),
    )
    .await;

    assert_eq!(
        controller.entry_location("kanban").unwrap(),
        format!("{}Kanban/index1.html", server.base)
    );
}

#[tokio::test]
async fn test_doctor_over_http() {
    let server = StaticServer::start(BINGO_FILES).await;
    let prefs = tempfile::tempdir().unwrap();
    let controller = http_controller(
        &server,
        catalog(),
        &RecordingSurface::new(),
        &prefs.path().join("prefs.json"),
    )
    .await;

    let report = controller.doctor().await;
    assert_eq!(report.bundle_count, 2);
    assert!(report.bundles[0].is_healthy());
    assert!(!report.bundles[1].is_healthy());
    assert!(report.last_opened.is_none());
}

#[tokio::test]
async fn test_local_directory_source() {
    let server = StaticServer::start(BINGO_FILES).await;
    let surface = RecordingSurface::new();
    let prefs = tempfile::tempdir().unwrap();
    let kv = JsonFileKvStore::open(prefs.path().join("prefs.json"))
        .await
        .unwrap();

    let solo = BundleDescriptor::new("bingo", "Bingo", "assets/funzone/Bingo/bingo.html")
        .unwrap()
        .with_style("assets/funzone/Bingo/style.css")
        .with_category(Category::Game);
    let controller = LoadController::new(
        Arc::new(BundleCatalog::new(vec![solo]).unwrap()),
        Arc::new(LocalResourceClient::new(server.root.path())),
        Arc::new(surface.clone()),
        LastOpenedStore::new(Arc::new(kv)),
        LoaderSettings::immediate(),
    );

    let outcome = controller.load_app("bingo").await.unwrap();
    assert!(outcome.is_ready());
    assert!(controller.state().resource_status.unwrap().all_ok());
    assert!(surface.current_content().unwrap().contains("id=\"card\""));
}
