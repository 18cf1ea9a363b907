//! User-editable settings, read fresh by every loop tick

use crate::automation::color::TargetColor;
use crate::automation::debounce::DEFAULT_MOVEMENT_THRESHOLD;
use crate::automation::interval::IntervalInput;
use crate::automation::run_state::{DEFAULT_CANCEL_KEY, DEFAULT_HOTKEY};
use crate::automation::sequence::DEFAULT_REACTION_PAUSE;
use crate::devices::{CaptureRegion, KeySymbol, MouseButton};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Which primary loop the hotkey starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Click on a fixed interval
    Clicker,
    /// Watch the capture region and react to the bobber dropping
    Fisher,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Clicker => f.write_str("clicker"),
            RunMode::Fisher => f.write_str("fisher"),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clicker" | "click" => Ok(RunMode::Clicker),
            "fisher" | "fish" => Ok(RunMode::Fisher),
            other => Err(format!("unknown mode '{other}', expected 'clicker' or 'fisher'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickType {
    Single,
    Double,
}

impl ClickType {
    pub fn count(self) -> u32 {
        match self {
            ClickType::Single => 1,
            ClickType::Double => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: RunMode,
    /// Key that starts and stops the active loop
    pub hotkey: KeySymbol,
    /// Key that aborts a hotkey change
    pub cancel_key: KeySymbol,

    pub click_interval: IntervalInput,
    pub click_button: MouseButton,
    pub click_type: ClickType,

    /// How often auto-eat runs
    pub secondary_interval: IntervalInput,
    /// Catalog entry deciding how long the eat button is held
    pub secondary_item: String,
    pub secondary_button: MouseButton,

    pub target_color: TargetColor,
    pub capture_region: CaptureRegion,
    /// Downward movement in pixels that counts as a bite
    pub movement_threshold: u32,
    pub sensing_interval: IntervalInput,
    /// Pause between hooking and recasting, milliseconds
    pub reaction_pause_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: RunMode::Clicker,
            hotkey: KeySymbol::new(DEFAULT_HOTKEY),
            cancel_key: KeySymbol::new(DEFAULT_CANCEL_KEY),
            click_interval: IntervalInput::from_millis(100),
            click_button: MouseButton::Left,
            click_type: ClickType::Single,
            secondary_interval: IntervalInput::new("", "5", "", ""),
            secondary_item: "steak".to_string(),
            secondary_button: MouseButton::Right,
            target_color: TargetColor::default(),
            capture_region: CaptureRegion::default(),
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            // Roughly three captures per second
            sensing_interval: IntervalInput::from_millis(333),
            reaction_pause_ms: DEFAULT_REACTION_PAUSE.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn reaction_pause(&self) -> Duration {
        Duration::from_millis(self.reaction_pause_ms)
    }
}

/// Settings shared between the configuration surface and the loops.
///
/// Loops call [`SharedSettings::current`] once per tick and never keep the copy
/// past that tick.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn current(&self) -> Settings {
        self.inner
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn update<F: FnOnce(&mut Settings)>(&self, f: F) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}
