//! Candidate-side proctoring engine.
//!
//! UI-agnostic core of the exam client: a phase machine that arms and
//! disarms the violation listeners, classifies suspicious signals, and
//! decides exactly once that the exam is locked. The host UI forwards raw
//! events (visibility changes, key chords, focus loss) and renders whatever
//! phase the engine lands in; all enforcement decisions live here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod countdown;
pub mod reporter;
pub mod signals;

pub use signals::{classify_key, KeyEvent, MonitorSignal, SuppressedInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    Login,
    Instructions,
    InProgress,
    Locked,
    Submitted,
}

/// Keeps the host's event listeners attached for as long as it is held.
/// Dropping the guard detaches them, so a submit or lock that releases the
/// guard cannot leave a listener firing into a dead session.
#[derive(Debug)]
pub struct ListenerGuard {
    attached: Arc<AtomicBool>,
}

impl ListenerGuard {
    fn new(attached: Arc<AtomicBool>) -> Self {
        attached.store(true, Ordering::SeqCst);
        Self { attached }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

/// The decision the engine hands back to the UI when a signal lands while
/// the listeners are armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationVerdict {
    /// Reason string to report to the server, verbatim.
    pub reason: &'static str,
}

#[derive(Debug)]
pub struct ProctorMonitor {
    phase: ExamPhase,
    armed: bool,
    listeners: Arc<AtomicBool>,
}

impl Default for ProctorMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProctorMonitor {
    pub fn new() -> Self {
        Self { phase: ExamPhase::Login, armed: false, listeners: Arc::new(AtomicBool::new(false)) }
    }

    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    /// Login succeeded; the candidate is reading the instructions. Nothing
    /// is armed yet, so stray focus changes on this screen are harmless.
    pub fn enter_instructions(&mut self) {
        self.phase = ExamPhase::Instructions;
    }

    /// The candidate starts answering. Arms the listeners and returns the
    /// guard the host must hold while its DOM/event hooks are live.
    pub fn begin_exam(&mut self) -> ListenerGuard {
        self.phase = ExamPhase::InProgress;
        self.armed = true;
        ListenerGuard::new(Arc::clone(&self.listeners))
    }

    pub fn listeners_attached(&self) -> bool {
        self.listeners.load(Ordering::SeqCst)
    }

    /// Feeds one observed signal through the engine.
    ///
    /// The first signal that lands while armed wins: it disarms the engine
    /// and locks the exam, and every later signal is ignored. This is what
    /// keeps a burst of events from one physical action (a tab switch fires
    /// both visibility and blur) from producing multiple reports.
    pub fn observe(&mut self, signal: MonitorSignal) -> Option<ViolationVerdict> {
        if !self.armed || self.phase != ExamPhase::InProgress {
            return None;
        }

        self.armed = false;
        self.phase = ExamPhase::Locked;
        Some(ViolationVerdict { reason: signal.reason() })
    }

    /// Whether a non-keyboard input event (copy, paste, context menu...)
    /// should be cancelled. Suppression is unconditional during the exam
    /// and does not consume the armed state.
    pub fn should_suppress(&self, _input: SuppressedInput) -> bool {
        self.phase == ExamPhase::InProgress
    }

    /// A key chord was observed; restricted chords lock the exam like any
    /// other signal, and the caller must also cancel the event.
    pub fn observe_key(&mut self, event: &KeyEvent) -> Option<ViolationVerdict> {
        let signal = classify_key(event)?;
        self.observe(signal)
    }

    /// The submission round-trip completed; the session is closed cleanly.
    pub fn mark_submitted(&mut self) {
        self.armed = false;
        self.phase = ExamPhase::Submitted;
    }

    /// The navigator should warn before unload only while answers could be
    /// lost; locked and submitted screens let the candidate leave freely.
    pub fn should_prompt_on_unload(&self) -> bool {
        self.phase == ExamPhase::InProgress
    }
}
