//! Test fixtures for catalogs and bundle markup.

use std::sync::Arc;

use funzone_core::{BundleCatalog, BundleDescriptor, Category};
use funzone_storage::{LastOpenedStore, MemoryKvStore};

use crate::mocks::{MockResourceClient, MockResponse};

/// Bingo: one stylesheet, no scripts.
#[must_use]
pub fn bingo() -> BundleDescriptor {
    BundleDescriptor::new("bingo", "Bingo", "assets/funzone/Bingo/bingo.html")
        .map(|d| {
            d.with_style("assets/funzone/Bingo/style.css")
                .with_description("Classic bingo")
                .with_icon("grid")
        })
        .unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// Quiz: one stylesheet, no scripts.
#[must_use]
pub fn quiz() -> BundleDescriptor {
    BundleDescriptor::new("quiz", "Quiz", "assets/funzone/Kviz/quiz.html")
        .map(|d| d.with_style("assets/funzone/Kviz/style.css"))
        .unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// Kanban: one stylesheet, one script.
#[must_use]
pub fn kanban() -> BundleDescriptor {
    BundleDescriptor::new("kanban", "Kanban Board", "Kanban/index1.html")
        .map(|d| {
            d.with_style("Kanban/style1.css")
                .with_script("Kanban/javascript1.js")
                .with_category(Category::Productivity)
        })
        .unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// Whiteboard: one stylesheet, two scripts.
#[must_use]
pub fn whiteboard() -> BundleDescriptor {
    BundleDescriptor::new("whiteboard", "Whiteboard", "whiteboard/index3.html")
        .map(|d| {
            d.with_style("whiteboard/style3.css")
                .with_script("whiteboard/javascript3.js")
                .with_script("whiteboard/tools.js")
                .with_category(Category::Creative)
        })
        .unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// A catalog of [`bingo`], [`quiz`], [`kanban`] and [`whiteboard`].
#[must_use]
pub fn test_catalog() -> BundleCatalog {
    BundleCatalog::new(vec![bingo(), quiz(), kanban(), whiteboard()])
        .unwrap_or_else(|e| panic!("invalid fixture catalog: {e}"))
}

/// A small entry document titled `title`.
#[must_use]
pub fn bundle_markup(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n</body>\n</html>"
    )
}

/// A mock client serving every resource declared in `catalog`.
#[must_use]
pub fn serving_client(catalog: &BundleCatalog) -> MockResourceClient {
    let client = MockResourceClient::new();
    for descriptor in catalog.all() {
        client.respond(
            descriptor.entry_path(),
            MockResponse::Text(bundle_markup(descriptor.title())),
        );
        for style in descriptor.style_paths() {
            client.respond(
                style.as_str(),
                MockResponse::Text("body { margin: 0; }".to_owned()),
            );
        }
        for script in descriptor.script_paths() {
            client.respond(
                script.as_str(),
                MockResponse::Text(format!("console.log('{script}');")),
            );
        }
    }
    client
}

/// A last-opened store backed by memory.
#[must_use]
pub fn memory_last_opened() -> LastOpenedStore {
    LastOpenedStore::new(Arc::new(MemoryKvStore::new()))
}
