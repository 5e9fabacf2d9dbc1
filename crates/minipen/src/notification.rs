//! Transient status banner.
//!
//! Non-queuing: showing a message replaces whatever is visible and restarts
//! the display window. Every shown message gets a fresh generation number and
//! an expiry only hides the message of the same generation, so an older
//! expiry timer can never cut a newer message short.

pub const DEFAULT_NOTIFICATION_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Success,
    Error,
    Warning,
    /// Fallback styling for tags the banner does not recognize.
    Info,
}

impl Severity {
    /// Maps a severity tag; unknown tags get the fallback styling.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "success" => Severity::Success,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Theme variable the banner background uses.
    pub fn css_background(self) -> &'static str {
        match self {
            Severity::Success => "var(--accent-secondary)",
            Severity::Error => "var(--accent-danger)",
            Severity::Warning => "var(--accent-warning)",
            Severity::Info => "var(--accent-primary)",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    current: Option<Notification>,
    generation: u64,
    duration_ms: u64,
}

impl NotificationService {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            current: None,
            generation: 0,
            duration_ms,
        }
    }

    /// Shows `message`, replacing the current one. Returns the generation the
    /// caller has to pass to [`Self::expire`] once the display window ends.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.generation += 1;
        let notification = Notification {
            message: message.into(),
            severity,
            generation: self.generation,
        };
        match severity {
            Severity::Error => log::warn!("[notification] {}", notification.message),
            _ => log::debug!("[notification:{severity}] {}", notification.message),
        }
        self.current = Some(notification);
        self.generation
    }

    /// Hides the current message if it is still the one from `generation`.
    /// Returns whether anything was hidden.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.current.as_ref().is_some_and(|current| current.generation == generation) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_fall_back() {
        assert_eq!(Severity::from_tag("success"), Severity::Success);
        assert_eq!(Severity::from_tag("error"), Severity::Error);
        assert_eq!(Severity::from_tag("warning"), Severity::Warning);
        assert_eq!(Severity::from_tag("fancy"), Severity::Info);
        assert_eq!(Severity::default(), Severity::Success);
    }

    #[test]
    fn new_message_replaces_current() {
        let mut service = NotificationService::default();
        service.show("first", Severity::Success);
        service.show("second", Severity::Warning);
        let current = service.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Warning);
    }

    #[test]
    fn stale_expiry_does_not_hide_newer_message() {
        let mut service = NotificationService::default();
        let first = service.show("first", Severity::Success);
        let second = service.show("second", Severity::Error);
        assert!(!service.expire(first));
        assert_eq!(service.current().unwrap().message, "second");
        assert!(service.expire(second));
        assert!(service.current().is_none());
    }
}
