//! Core of the minipen live playground.
//!
//! Three panes (HTML, CSS, JS) are composed into one self-contained document
//! and pushed into an isolated preview surface. The last saved snapshot lives
//! in an origin-scoped key-value store. Everything that touches a platform
//! (storage, rendering surface, timers, confirmation dialogs) is reached
//! through a port trait so the pipeline runs the same way in the browser, in
//! the CLI and in tests.

pub mod clock;
pub mod composer;
pub mod config;
pub mod controller;
pub mod keymap;
pub mod line_numbers;
pub mod notification;
pub mod persistence;
pub mod platform;
pub mod preview;
pub mod text;

pub use clock::{Clock, TimerJob};
pub use composer::{SourceDocument, compose};
pub use config::{ConfigError, PlaygroundConfig};
pub use controller::{AppState, Confirm, EditorController, KeyOutcome, PaneFocus, PaneState};
pub use keymap::{KeyPress, Shortcut};
pub use notification::{Notification, NotificationService, Severity};
pub use persistence::{
    KeyValueStore, LoadOutcome, MemoryStorage, PersistError, SavedSnapshot, SnapshotStore,
    StorageError,
};
pub use preview::{PreviewRenderer, PreviewSurface, RecordingSurface, RenderError};

#[cfg(feature = "browser")]
pub use zoon;

/// One of the three independently editable text regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    Html,
    Css,
    Js,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Html, Pane::Css, Pane::Js];

    pub fn label(self) -> &'static str {
        match self {
            Pane::Html => "html",
            Pane::Css => "css",
            Pane::Js => "js",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "html" => Some(Pane::Html),
            "css" => Some(Pane::Css),
            "js" | "javascript" => Some(Pane::Js),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Pane::Html => 0,
            Pane::Css => 1,
            Pane::Js => 2,
        }
    }
}

impl std::fmt::Display for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
