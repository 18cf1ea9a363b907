//! The shared run/stop, hotkey and auto-eat state.
//!
//! Every transition happens under one mutex and posts its resulting snapshot to
//! the presentation channel before the lock is released, so observers see
//! changes in the order they were applied.

use super::channels::EventSender;
use super::error::{AutomationError, AutomationResult};
use super::interval::{IntervalInput, SECONDARY_MINIMUM};
use super::types::{ControllerEvent, KeyDispatch, RunSnapshot};
use crate::devices::KeySymbol;
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_HOTKEY: &str = "f6";
pub const DEFAULT_CANCEL_KEY: &str = "escape";

#[derive(Debug)]
struct RunState {
    running: bool,
    bound_hotkey: KeySymbol,
    is_rebinding: bool,
    secondary_enabled: bool,
    run_generation: u64,
}

impl RunState {
    fn set_running(&mut self, running: bool) {
        self.running = running;
        self.run_generation = self.run_generation.wrapping_add(1);
    }

    fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            running: self.running,
            bound_hotkey: self.bound_hotkey.clone(),
            is_rebinding: self.is_rebinding,
            secondary_enabled: self.secondary_enabled,
            run_generation: self.run_generation,
        }
    }
}

pub struct RunStateMachine {
    state: Mutex<RunState>,
    cancel_key: KeySymbol,
    events: Option<EventSender>,
}

impl RunStateMachine {
    pub fn new(hotkey: KeySymbol, cancel_key: KeySymbol) -> Self {
        Self {
            state: Mutex::new(RunState {
                running: false,
                bound_hotkey: hotkey,
                is_rebinding: false,
                secondary_enabled: false,
                run_generation: 0,
            }),
            cancel_key,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        // RunState is plain data, a panic elsewhere cannot leave it half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn post(&self, event: ControllerEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone means the presenter already shut down
            let _ = tx.send(event);
        }
    }

    fn post_state(&self, state: &RunState) {
        self.post(ControllerEvent::StateChanged(state.snapshot()));
    }

    pub fn cancel_key(&self) -> &KeySymbol {
        &self.cancel_key
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.lock().snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Flips Running/Stopped and returns the new value.
    pub fn toggle_run(&self) -> bool {
        let mut state = self.lock();
        let running = !state.running;
        state.set_running(running);
        log::info!(
            "{} Automation {}",
            if state.running { "🚀" } else { "⏹️" },
            if state.running { "started" } else { "stopped" }
        );
        self.post_state(&state);
        state.running
    }

    /// Moves to Stopped if running. Returns whether anything changed.
    pub fn force_stop(&self, reason: &str) -> bool {
        let mut state = self.lock();
        if !state.running {
            return false;
        }
        state.set_running(false);
        log::warn!("⏹️ Automation stopped: {}", reason);
        self.post_state(&state);
        true
    }

    /// Starts listening for a new hotkey. Returns `false` if already rebinding.
    pub fn begin_rebind(&self) -> bool {
        let mut state = self.lock();
        if state.is_rebinding {
            return false;
        }
        state.is_rebinding = true;
        log::info!("⌨️ Waiting for new hotkey (press {} to cancel)", self.cancel_key);
        self.post(ControllerEvent::ControlsLocked(true));
        self.post_state(&state);
        true
    }

    pub fn complete_rebind(&self, key: KeySymbol) -> AutomationResult<()> {
        let mut state = self.lock();
        if !state.is_rebinding {
            return Err(AutomationError::NotRebinding);
        }
        self.finish_rebind(&mut state, Some(key));
        Ok(())
    }

    pub fn cancel_rebind(&self) -> AutomationResult<()> {
        let mut state = self.lock();
        if !state.is_rebinding {
            return Err(AutomationError::NotRebinding);
        }
        self.finish_rebind(&mut state, None);
        Ok(())
    }

    /// Leaves rebinding with the lock held. `None` keeps the current hotkey.
    fn finish_rebind(&self, state: &mut RunState, new_key: Option<KeySymbol>) -> KeyDispatch {
        state.is_rebinding = false;
        let outcome = match new_key {
            Some(key) => {
                log::info!("⌨️ Hotkey changed: {} -> {}", state.bound_hotkey, key);
                state.bound_hotkey = key.clone();
                KeyDispatch::Rebound { key }
            }
            None => {
                log::info!("⌨️ Hotkey change cancelled, keeping {}", state.bound_hotkey);
                KeyDispatch::RebindCancelled
            }
        };
        self.post(ControllerEvent::ControlsLocked(false));
        self.post_state(state);
        outcome
    }

    /// Turns the auto-eat feature on or off.
    ///
    /// Enabling requires `interval` to parse and be at least [`SECONDARY_MINIMUM`];
    /// otherwise nothing changes and the interval error is returned. Disabling
    /// always succeeds.
    pub fn set_secondary_enabled(
        &self,
        enabled: bool,
        interval: &IntervalInput,
    ) -> AutomationResult<()> {
        if enabled {
            interval.at_least(SECONDARY_MINIMUM)?;
        }
        let mut state = self.lock();
        if state.secondary_enabled != enabled {
            state.secondary_enabled = enabled;
            log::info!(
                "🍖 Auto-eat {}",
                if enabled { "enabled" } else { "disabled" }
            );
            self.post_state(&state);
        }
        Ok(())
    }

    /// Disables auto-eat without validation (safe state after a bad interval).
    pub fn force_disable_secondary(&self, reason: &str) -> bool {
        let mut state = self.lock();
        if !state.secondary_enabled {
            return false;
        }
        state.secondary_enabled = false;
        log::warn!("🍖 Auto-eat disabled: {}", reason);
        self.post_state(&state);
        true
    }

    /// Routes one key-down.
    ///
    /// While rebinding, the cancel key cancels and any other key becomes the new
    /// hotkey; the toggle is never dispatched. Otherwise the bound hotkey toggles
    /// and everything else is ignored.
    pub fn dispatch_key(&self, key: &KeySymbol) -> KeyDispatch {
        let mut state = self.lock();
        if state.is_rebinding {
            let new_key = (*key != self.cancel_key).then(|| key.clone());
            return self.finish_rebind(&mut state, new_key);
        }

        if *key == state.bound_hotkey {
            let running = !state.running;
            state.set_running(running);
            log::info!(
                "{} Automation {} by hotkey",
                if state.running { "🚀" } else { "⏹️" },
                if state.running { "started" } else { "stopped" }
            );
            self.post_state(&state);
            return KeyDispatch::Toggled {
                running: state.running,
            };
        }

        log::debug!("⌨️ Ignoring key {}", key);
        KeyDispatch::Ignored
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new(
            KeySymbol::new(DEFAULT_HOTKEY),
            KeySymbol::new(DEFAULT_CANCEL_KEY),
        )
    }
}
