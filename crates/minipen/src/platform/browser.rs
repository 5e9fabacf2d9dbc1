//! Browser adapters built on zoon.
//!
//! - [`LocalStorage`]: origin-scoped `window.localStorage`.
//! - [`IframeSurface`]: `srcdoc` of a sandboxed iframe, published through
//!   `Mutable`s the UI binds to. The iframe must not get `allow-same-origin`,
//!   so the preview cannot reach the host page's DOM or storage.
//! - [`BrowserClock`]: zoon timers; fired jobs come back through a channel
//!   that the UI drains with [`drive_timers`].

use chrono::{DateTime, Utc};
use futures_channel::mpsc;
use zoon::futures_util::StreamExt;
use zoon::{Mutable, Task, TaskHandle, Timer, web_sys};

use crate::clock::{Clock, TimerJob};
use crate::controller::EditorController;
use crate::persistence::{KeyValueStore, StorageError};
use crate::preview::{PreviewSurface, RenderError};

pub type BrowserController = EditorController<LocalStorage, IframeSurface, BrowserClock>;

/// `sandbox` attribute for the preview iframe.
pub const IFRAME_SANDBOX: &str = "allow-scripts allow-modals";

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

fn web_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?
        .local_storage()
        .map_err(|error| StorageError::Unavailable(format!("{error:?}")))?
        .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_owned()))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        web_storage()?
            .get_item(key)
            .map_err(|error| StorageError::Unavailable(format!("{error:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Throws (e.g. QuotaExceededError) without touching the old value
        web_storage()?
            .set_item(key, value)
            .map_err(|error| StorageError::Unavailable(format!("{error:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        web_storage()?
            .remove_item(key)
            .map_err(|error| StorageError::Unavailable(format!("{error:?}")))
    }
}

/// Preview iframe state. Clones share the same `Mutable`s.
#[derive(Clone)]
pub struct IframeSurface {
    srcdoc: Mutable<String>,
    placeholder_visible: Mutable<bool>,
}

impl IframeSurface {
    pub fn new() -> Self {
        Self {
            srcdoc: Mutable::new(String::new()),
            placeholder_visible: Mutable::new(true),
        }
    }

    /// Bind to the iframe's `srcdoc` attribute.
    pub fn srcdoc(&self) -> Mutable<String> {
        self.srcdoc.clone()
    }

    /// Bind to the placeholder overlay's visibility and pointer events.
    pub fn placeholder_visible(&self) -> Mutable<bool> {
        self.placeholder_visible.clone()
    }
}

impl Default for IframeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface for IframeSurface {
    fn set_document(&mut self, document: String) -> Result<(), RenderError> {
        // `set`, not `set_neq`: re-running identical code must reload the frame
        self.srcdoc.set(document);
        Ok(())
    }

    fn hide_placeholder(&mut self) {
        self.placeholder_visible.set_neq(false);
    }
}

pub struct BrowserClock {
    sender: mpsc::UnboundedSender<TimerJob>,
}

impl BrowserClock {
    /// Clock plus the receiving end for fired jobs.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerJob>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }
}

impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule(&mut self, delay_ms: u64, job: TimerJob) {
        let sender = self.sender.clone();
        let delay_ms = u32::try_from(delay_ms).unwrap_or(u32::MAX);
        Task::start(async move {
            Timer::sleep(delay_ms).await;
            if sender.unbounded_send(job).is_err() {
                log::warn!("Timer job {job:?} fired after the playground was dropped");
            }
        });
    }
}

/// Feeds fired jobs to `fire` until the clock is dropped. Keep the handle alive.
pub fn drive_timers(
    mut receiver: mpsc::UnboundedReceiver<TimerJob>,
    mut fire: impl FnMut(TimerJob) + 'static,
) -> TaskHandle {
    Task::start_droppable(async move {
        while let Some(job) = receiver.next().await {
            fire(job);
        }
    })
}

/// `window.confirm` dialog; a missing window counts as "no".
pub fn confirm_dialog(prompt: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(prompt).ok())
        .unwrap_or(false)
}

struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error | log::Level::Warn => {
                zoon::eprintln!("[{}] {}: {}", record.level(), record.target(), record.args())
            }
            _ => zoon::println!("[{}] {}: {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Routes the `log` facade to the browser console. Later calls are no-ops.
pub fn init_logger(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
