//! Editor controller.
//!
//! Owns the application state and drives the edit → compose → render →
//! notify pipeline. Platform bindings come in as ports: a [`KeyValueStore`]
//! for snapshots, a [`PreviewSurface`] for rendering and a [`Clock`] for
//! timestamps and deferred jobs.
//!
//! # Auto-run
//! With auto-run on, every content change schedules its own render
//! `auto_run_delay_ms` later. The delay is fixed: later edits neither reset nor
//! cancel it, and switching auto-run off does not stop renders that are
//! already scheduled. A burst of N edits therefore yields N renders.

use std::ops::Range;

use crate::Pane;
use crate::clock::{Clock, TimerJob};
use crate::composer::{SourceDocument, compose};
use crate::config::PlaygroundConfig;
use crate::keymap::{self, KeyPress, Shortcut};
use crate::line_numbers;
use crate::notification::{Notification, NotificationService, Severity};
use crate::persistence::{KeyValueStore, LoadOutcome, PersistError, SavedSnapshot, SnapshotStore};
use crate::platform::cli::TestClock;
use crate::preview::{PreviewRenderer, PreviewSurface, RenderError};
use crate::text;

/// Literal inserted by Tab.
pub const TAB: &str = "  ";
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all editors?";

/// Confirmation dialog port used by destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneState {
    Idle,
    /// At least one deferred render requested by this pane has not fired yet.
    RenderScheduled,
}

/// Pane that has keyboard focus, with its selection in UTF-8 byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneFocus {
    pub pane: Pane,
    pub selection: Range<usize>,
}

impl PaneFocus {
    pub fn caret(pane: Pane, at: usize) -> Self {
        Self {
            pane,
            selection: at..at,
        }
    }
}

/// What the host should do after a key press went through the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub shortcut: Option<Shortcut>,
    /// Suppress the host's default handling (browser save dialog, focus move).
    pub prevent_default: bool,
    /// New caret position (byte offset) when the pane text was edited.
    pub caret: Option<usize>,
}

/// Everything the UI shows that is not owned by a port.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    source: SourceDocument,
    line_numbers: [String; 3],
    auto_run: bool,
    pending_renders: [u32; 3],
}

impl AppState {
    fn new(auto_run: bool) -> Self {
        let mut state = Self {
            auto_run,
            ..Self::default()
        };
        for pane in Pane::ALL {
            state.refresh_line_numbers(pane);
        }
        state
    }

    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    pub fn text(&self, pane: Pane) -> &str {
        self.source.get(pane)
    }

    pub fn line_numbers(&self, pane: Pane) -> &str {
        &self.line_numbers[pane.index()]
    }

    pub fn auto_run(&self) -> bool {
        self.auto_run
    }

    pub fn pane_state(&self, pane: Pane) -> PaneState {
        if self.pending_renders[pane.index()] > 0 {
            PaneState::RenderScheduled
        } else {
            PaneState::Idle
        }
    }

    fn refresh_line_numbers(&mut self, pane: Pane) {
        self.line_numbers[pane.index()] = line_numbers::annotate(self.source.get(pane));
    }
}

pub struct EditorController<S, P, C> {
    state: AppState,
    config: PlaygroundConfig,
    store: SnapshotStore<S>,
    renderer: PreviewRenderer<P>,
    clock: C,
    notifications: NotificationService,
}

impl<S: KeyValueStore, P: PreviewSurface, C: Clock> EditorController<S, P, C> {
    pub fn new(storage: S, surface: P, clock: C, config: PlaygroundConfig) -> Self {
        Self {
            state: AppState::new(config.auto_run),
            store: SnapshotStore::with_key(storage, config.storage_key.clone()),
            renderer: PreviewRenderer::new(surface),
            notifications: NotificationService::new(config.notification_ms),
            clock,
            config,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn source(&self) -> &SourceDocument {
        &self.state.source
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn renderer(&self) -> &PreviewRenderer<P> {
        &self.renderer
    }

    pub fn surface(&self) -> &P {
        self.renderer.surface()
    }

    pub fn surface_mut(&mut self) -> &mut P {
        self.renderer.surface_mut()
    }

    pub fn store(&self) -> &SnapshotStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SnapshotStore<S> {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The host's text control changed `pane` to `text`.
    pub fn input(&mut self, pane: Pane, text: impl Into<String>) {
        *self.state.source.get_mut(pane) = text.into();
        self.content_changed(pane);
    }

    /// Replaces `selection` in `pane` with [`TAB`] and returns the caret
    /// position right after the inserted spaces.
    pub fn insert_tab(&mut self, pane: Pane, selection: Range<usize>) -> usize {
        let content = self.state.source.get_mut(pane);
        let selection = text::clamp_selection(content, selection);
        let caret = selection.start + TAB.len();
        content.replace_range(selection, TAB);
        self.content_changed(pane);
        caret
    }

    /// Enter was pressed in `pane`; the annotation is refreshed once the host
    /// has inserted the newline.
    pub fn newline_pressed(&mut self, pane: Pane) {
        self.clock
            .schedule(self.config.newline_refresh_ms, TimerJob::RefreshLines(pane));
    }

    /// Composes the panes and renders them immediately, independent of any
    /// pending deferred render.
    pub fn run(&mut self) -> Result<(), RenderError> {
        let document = compose(&self.state.source);
        match self.renderer.render(document) {
            Ok(()) => {
                self.notify("Code executed successfully!", Severity::Success);
                Ok(())
            }
            Err(error) => {
                log::error!("Execution error: {error}");
                self.notify(format!("Error: {error}"), Severity::Error);
                Err(error)
            }
        }
    }

    pub fn save(&mut self) -> Result<SavedSnapshot, PersistError> {
        match self.store.save(&self.state.source, self.clock.now()) {
            Ok(snapshot) => {
                self.notify("Code saved successfully!", Severity::Success);
                Ok(snapshot)
            }
            Err(error) => {
                log::error!("Save failed: {error}");
                self.notify(format!("Error saving code: {error}"), Severity::Error);
                Err(error)
            }
        }
    }

    /// Restores the saved snapshot. Panes are only touched when a snapshot was
    /// read and parsed completely.
    pub fn load(&mut self) -> Result<LoadOutcome, PersistError> {
        match self.store.load() {
            Ok(LoadOutcome::NothingSaved) => {
                self.notify("No saved code found", Severity::Warning);
                Ok(LoadOutcome::NothingSaved)
            }
            Ok(LoadOutcome::Loaded(snapshot)) => {
                self.state.source = snapshot.source();
                for pane in Pane::ALL {
                    self.state.refresh_line_numbers(pane);
                }
                self.notify("Code loaded successfully!", Severity::Success);
                if self.state.auto_run {
                    self.clock
                        .schedule(self.config.load_run_delay_ms, TimerJob::LoadRun);
                }
                Ok(LoadOutcome::Loaded(snapshot))
            }
            Err(error) => {
                log::error!("Load failed: {error}");
                self.notify("Error loading saved code", Severity::Error);
                Err(error)
            }
        }
    }

    /// Empties all panes if `confirm` agrees. Returns whether anything happened.
    pub fn clear(&mut self, confirm: &mut impl Confirm) -> bool {
        if !confirm.confirm(CLEAR_PROMPT) {
            return false;
        }
        self.state.source.clear();
        for pane in Pane::ALL {
            self.state.refresh_line_numbers(pane);
        }
        self.notify("All editors cleared", Severity::Success);
        true
    }

    /// Toggles auto-run. Never renders by itself and leaves already scheduled
    /// renders alone.
    pub fn set_auto_run(&mut self, enabled: bool) {
        self.state.auto_run = enabled;
        let message = if enabled {
            "Auto-run enabled"
        } else {
            "Auto-run disabled"
        };
        self.notify(message, Severity::Success);
    }

    pub fn handle_key(&mut self, press: &KeyPress, focus: Option<PaneFocus>) -> KeyOutcome {
        let Some(shortcut) = keymap::resolve(press, focus.is_some()) else {
            return KeyOutcome::default();
        };
        let mut outcome = KeyOutcome {
            shortcut: Some(shortcut),
            prevent_default: shortcut.prevents_default(),
            caret: None,
        };
        // A held Ctrl+S keeps the host's dialog suppressed but saves only once
        if press.repeat && matches!(shortcut, Shortcut::Save | Shortcut::Load | Shortcut::Run) {
            return outcome;
        }
        // Failures are already reported through the notification banner.
        match (shortcut, focus) {
            (Shortcut::Save, _) => {
                let _ = self.save();
            }
            (Shortcut::Load, _) => {
                let _ = self.load();
            }
            (Shortcut::Run, _) => {
                let _ = self.run();
            }
            (Shortcut::InsertTab, Some(focus)) => {
                outcome.caret = Some(self.insert_tab(focus.pane, focus.selection));
            }
            (Shortcut::Newline, Some(focus)) => self.newline_pressed(focus.pane),
            (Shortcut::InsertTab | Shortcut::Newline, None) => {}
        }
        outcome
    }

    /// Handles a job delivered by the clock.
    pub fn fire(&mut self, job: TimerJob) {
        match job {
            TimerJob::AutoRun(pane) => {
                let pending = &mut self.state.pending_renders[pane.index()];
                *pending = pending.saturating_sub(1);
                log::debug!("Deferred render from {pane} pane fired");
                let _ = self.run();
            }
            TimerJob::LoadRun => {
                let _ = self.run();
            }
            TimerJob::RefreshLines(pane) => self.state.refresh_line_numbers(pane),
            TimerJob::ExpireNotification(generation) => {
                self.notifications.expire(generation);
            }
        }
    }

    fn content_changed(&mut self, pane: Pane) {
        self.state.refresh_line_numbers(pane);
        if self.state.auto_run {
            self.state.pending_renders[pane.index()] += 1;
            self.clock
                .schedule(self.config.auto_run_delay_ms, TimerJob::AutoRun(pane));
            log::debug!(
                "Render scheduled in {} ms after {pane} edit",
                self.config.auto_run_delay_ms
            );
        }
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        let generation = self.notifications.show(message, severity);
        self.clock.schedule(
            self.notifications.duration_ms(),
            TimerJob::ExpireNotification(generation),
        );
    }
}

impl<S: KeyValueStore, P: PreviewSurface> EditorController<S, P, TestClock> {
    /// Advances virtual time by `ms`, firing every job that falls due on the
    /// way (including jobs scheduled by earlier ones). Returns the fired jobs.
    pub fn advance_by(&mut self, ms: u64) -> Vec<TimerJob> {
        let target = self.clock.now_ms().saturating_add(ms);
        let mut fired = Vec::new();
        while let Some(job) = self.clock.pop_due(target) {
            self.fire(job);
            fired.push(job);
        }
        self.clock.set_time(target);
        fired
    }
}
