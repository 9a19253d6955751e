/// Observable events the proctor reacts to. Each maps to the exact reason
/// string the server records with the violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorSignal {
    TabHidden,
    FocusLost,
    FullscreenExited,
    RestrictedShortcut,
    TimeElapsed,
}

impl MonitorSignal {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TabHidden => "Tab switch detected",
            Self::FocusLost => "Browser focus lost",
            Self::FullscreenExited => "Exited fullscreen mode",
            Self::RestrictedShortcut => "Restricted keyboard shortcut",
            Self::TimeElapsed => "Exam time elapsed",
        }
    }
}

/// A keyboard event as delivered by the host UI.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: &str) -> Self {
        Self { key: key.to_string(), ctrl: false, alt: false, shift: false, meta: false }
    }

    pub fn with_ctrl(key: &str) -> Self {
        Self { ctrl: true, ..Self::plain(key) }
    }

    pub fn with_meta(key: &str) -> Self {
        Self { meta: true, ..Self::plain(key) }
    }

    pub fn with_ctrl_shift(key: &str) -> Self {
        Self { ctrl: true, shift: true, ..Self::plain(key) }
    }

    pub fn with_alt(key: &str) -> Self {
        Self { alt: true, ..Self::plain(key) }
    }
}

/// Classifies a key chord. Restricted chords must be both swallowed by the
/// UI and reported as a violation; the caller treats `Some` as "cancel the
/// event, then report".
pub fn classify_key(event: &KeyEvent) -> Option<MonitorSignal> {
    let key = event.key.to_lowercase();

    if key == "f12" || key == "printscreen" {
        return Some(MonitorSignal::RestrictedShortcut);
    }

    if event.ctrl && event.shift && matches!(key.as_str(), "i" | "j" | "c" | "k") {
        return Some(MonitorSignal::RestrictedShortcut);
    }

    if (event.ctrl || event.meta)
        && matches!(key.as_str(), "c" | "v" | "x" | "s" | "p" | "a" | "r")
    {
        return Some(MonitorSignal::RestrictedShortcut);
    }

    if event.alt && matches!(key.as_str(), "tab" | "f4") {
        return Some(MonitorSignal::RestrictedShortcut);
    }

    None
}

/// Non-keyboard input events the UI must cancel outright while an exam is
/// in progress. These are suppressed silently, not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressedInput {
    Copy,
    Cut,
    Paste,
    ContextMenu,
    SelectStart,
    DragStart,
}
