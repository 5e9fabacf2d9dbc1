//! Keyboard surface.
//!
//! Global: Ctrl/Cmd+S save, Ctrl/Cmd+L load, Ctrl/Cmd+R run.
//! Inside a pane: Tab inserts two spaces, Enter refreshes line numbers.

/// A key press as reported by the host (`KeyboardEvent.key` naming).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// Auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Parses `"ctrl+s"`, `"cmd+L"`, `"tab"`, `"enter"`, `"shift+enter"`.
    pub fn parse(chord: &str) -> Option<Self> {
        let mut press = KeyPress::default();
        let mut parts = chord.split('+').map(str::trim).peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                press.key = match part.to_ascii_lowercase().as_str() {
                    "" => return None,
                    "tab" => "Tab".to_owned(),
                    "enter" | "return" => "Enter".to_owned(),
                    _ => part.to_owned(),
                };
                return Some(press);
            }
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => press.ctrl = true,
                "cmd" | "meta" | "super" => press.meta = true,
                "shift" => press.shift = true,
                "alt" | "option" => press.alt = true,
                _ => return None,
            }
        }
        None
    }

    fn command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Save,
    Load,
    Run,
    InsertTab,
    Newline,
}

impl Shortcut {
    /// Whether the host's default action for the key must be suppressed.
    /// Enter still inserts its newline natively.
    pub fn prevents_default(self) -> bool {
        !matches!(self, Shortcut::Newline)
    }
}

/// Resolves a key press. `in_pane` tells whether focus is inside an editor pane.
pub fn resolve(press: &KeyPress, in_pane: bool) -> Option<Shortcut> {
    if press.command_modifier() {
        return match press.key.to_lowercase().as_str() {
            "s" => Some(Shortcut::Save),
            "l" => Some(Shortcut::Load),
            "r" => Some(Shortcut::Run),
            _ => None,
        };
    }
    if !in_pane {
        return None;
    }
    match press.key.as_str() {
        "Tab" => Some(Shortcut::InsertTab),
        "Enter" => Some(Shortcut::Newline),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_shortcuts_are_case_insensitive() {
        assert_eq!(resolve(&KeyPress::new("s").ctrl(), false), Some(Shortcut::Save));
        assert_eq!(resolve(&KeyPress::new("S").ctrl().shift(), false), Some(Shortcut::Save));
        assert_eq!(resolve(&KeyPress::new("l").meta(), true), Some(Shortcut::Load));
        assert_eq!(resolve(&KeyPress::new("R").meta(), false), Some(Shortcut::Run));
        assert_eq!(resolve(&KeyPress::new("x").ctrl(), true), None);
    }

    #[test]
    fn bare_letters_do_nothing() {
        assert_eq!(resolve(&KeyPress::new("s"), true), None);
    }

    #[test]
    fn pane_keys_need_pane_focus() {
        assert_eq!(resolve(&KeyPress::new("Tab"), true), Some(Shortcut::InsertTab));
        assert_eq!(resolve(&KeyPress::new("Tab"), false), None);
        assert_eq!(resolve(&KeyPress::new("Enter"), true), Some(Shortcut::Newline));
        assert!(!Shortcut::Newline.prevents_default());
        assert!(Shortcut::InsertTab.prevents_default());
    }

    #[test]
    fn parses_chords() {
        assert_eq!(KeyPress::parse("ctrl+s"), Some(KeyPress::new("s").ctrl()));
        assert_eq!(KeyPress::parse("Cmd+L"), Some(KeyPress::new("L").meta()));
        assert_eq!(KeyPress::parse("tab"), Some(KeyPress::new("Tab")));
        assert_eq!(KeyPress::parse("shift+enter"), Some(KeyPress::new("Enter").shift()));
        assert_eq!(KeyPress::parse("hyper+s"), None);
        assert_eq!(KeyPress::parse("ctrl+"), None);
    }
}
