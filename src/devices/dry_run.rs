// Injector that performs no OS input; it logs and journals every request
use super::error::{InjectionError, InjectionResult};
use super::types::{InputInjector, MouseButton};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// One request received by a [`DryRunInjector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedAction {
    Press(MouseButton),
    Release(MouseButton),
    Click(MouseButton, u32),
}

#[derive(Default)]
pub struct DryRunInjector {
    journal: Mutex<Vec<InjectedAction>>,
    clicks: AtomicU64,
    keep_journal: bool,
}

impl DryRunInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps every action in memory so it can be inspected with [`Self::journal`].
    pub fn with_journal() -> Self {
        Self {
            keep_journal: true,
            ..Self::default()
        }
    }

    pub fn journal(&self) -> Vec<InjectedAction> {
        self.journal
            .lock()
            .map(|j| j.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Total number of button clicks requested so far (a double click counts twice).
    pub fn click_count(&self) -> u64 {
        self.clicks.load(Ordering::SeqCst)
    }

    fn record(&self, action: InjectedAction) {
        log::debug!("🖱️ dry-run input: {:?}", action);
        if self.keep_journal {
            match self.journal.lock() {
                Ok(mut journal) => journal.push(action),
                Err(poisoned) => poisoned.into_inner().push(action),
            }
        }
    }
}

impl InputInjector for DryRunInjector {
    fn press(&self, button: MouseButton) -> InjectionResult<()> {
        self.record(InjectedAction::Press(button));
        Ok(())
    }

    fn release(&self, button: MouseButton) -> InjectionResult<()> {
        self.record(InjectedAction::Release(button));
        Ok(())
    }

    fn click(&self, button: MouseButton, count: u32) -> InjectionResult<()> {
        if count == 0 {
            return Err(InjectionError::InvalidClickCount { count });
        }
        self.clicks.fetch_add(count as u64, Ordering::SeqCst);
        self.record(InjectedAction::Click(button, count));
        Ok(())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
