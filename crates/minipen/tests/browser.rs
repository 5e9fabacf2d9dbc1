//! Browser adapter tests. Run with `wasm-pack test --headless --firefox -- --features browser`.
#![cfg(all(target_arch = "wasm32", feature = "browser"))]

use minipen::platform::browser::{IframeSurface, LocalStorage};
use minipen::{KeyValueStore, LoadOutcome, PreviewSurface, SnapshotStore, SourceDocument};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trip() {
    let mut storage = LocalStorage;
    storage.set("minipen-test-slot", "value").unwrap();
    assert_eq!(storage.get("minipen-test-slot").unwrap().as_deref(), Some("value"));
    storage.remove("minipen-test-slot").unwrap();
    assert_eq!(storage.get("minipen-test-slot").unwrap(), None);
}

#[wasm_bindgen_test]
fn snapshot_survives_in_local_storage() {
    let mut store = SnapshotStore::with_key(LocalStorage, "minipen-test-snapshot");
    let source = SourceDocument::new("<p>x</p>", "p{}", "1");
    store.save(&source, chrono::Utc::now()).unwrap();
    let LoadOutcome::Loaded(snapshot) = store.load().unwrap() else {
        panic!("expected a snapshot");
    };
    assert_eq!(snapshot.into_source(), source);
    store.forget().unwrap();
}

#[wasm_bindgen_test]
fn iframe_surface_publishes_document() {
    let mut surface = IframeSurface::new();
    let srcdoc = surface.srcdoc();
    let placeholder = surface.placeholder_visible();
    surface.set_document("<p>doc</p>".to_owned()).unwrap();
    surface.hide_placeholder();
    assert_eq!(srcdoc.get_cloned(), "<p>doc</p>");
    assert!(!placeholder.get());
}
