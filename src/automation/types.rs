// Types and enums shared between the controller and its presentation context
use super::error::AutomationError;
use crate::devices::KeySymbol;
use std::fmt;

/// Consistent copy of the run state taken under one lock acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub running: bool,
    pub bound_hotkey: KeySymbol,
    pub is_rebinding: bool,
    pub secondary_enabled: bool,
    /// Bumped on every Running/Stopped change, so a stop and restart between two
    /// polls is still visible
    pub run_generation: u64,
}

impl RunSnapshot {
    pub fn status_text(&self) -> String {
        let mut text = if self.running {
            "Running".to_string()
        } else {
            "Stopped".to_string()
        };
        if self.secondary_enabled {
            text.push_str(" + auto-eat");
        }
        if self.is_rebinding {
            text.push_str(" (press a key to bind, Escape to cancel)");
        } else {
            text.push_str(&format!(" [hotkey: {}]", self.bound_hotkey));
        }
        text
    }
}

/// What a key-down did to the run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDispatch {
    Toggled { running: bool },
    Rebound { key: KeySymbol },
    RebindCancelled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Periodic clicking
    Primary,
    /// Capture, detect, react
    Sensing,
    /// Periodic hold action (auto-eat)
    Secondary,
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopKind::Primary => "click loop",
            LoopKind::Sensing => "sensing loop",
            LoopKind::Secondary => "auto-eat loop",
        };
        f.write_str(name)
    }
}

/// Why a loop tick sent no input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Another sequence held the injector
    Busy,
    /// The catalog has no usable entry for the configured item
    MissingActionData,
    Injection,
    Capture,
    Other,
}

impl SkipReason {
    pub fn from_error(error: &AutomationError) -> Self {
        match error {
            AutomationError::BusyConflict => SkipReason::Busy,
            AutomationError::MissingActionData { .. } => SkipReason::MissingActionData,
            AutomationError::Injection { .. } => SkipReason::Injection,
            AutomationError::Capture { .. } => SkipReason::Capture,
            _ => SkipReason::Other,
        }
    }
}

/// Messages posted to the presentation context, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StateChanged(RunSnapshot),
    /// Interactive controls must be disabled (`true`) or re-enabled (`false`)
    ControlsLocked(bool),
    /// Rate-limited user-facing warning
    Diagnostic { source: LoopKind, message: String },
    Triggered { delta: i64 },
    ActionSkipped {
        source: LoopKind,
        reason: SkipReason,
        detail: String,
    },
    LoopStopped(LoopKind),
}
