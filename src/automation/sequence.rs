//! Timed input sequences run against a shared, exclusively-held injector

use super::error::{AutomationError, AutomationResult};
use crate::devices::{InputInjector, MouseButton};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Pause between hooking and recasting in the fishing reaction.
pub const DEFAULT_REACTION_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStep {
    Press(MouseButton),
    Release(MouseButton),
    Click { button: MouseButton, count: u32 },
    Wait(Duration),
}

/// Immutable list of steps; every run walks it with its own cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSequence {
    name: String,
    steps: Vec<ActionStep>,
}

impl ActionSequence {
    pub fn new(name: &str, steps: Vec<ActionStep>) -> Self {
        Self {
            name: name.to_string(),
            steps,
        }
    }

    pub fn click(button: MouseButton, count: u32) -> Self {
        Self::new("click", vec![ActionStep::Click { button, count }])
    }

    /// Hook, wait, recast.
    pub fn fishing_reaction(pause: Duration) -> Self {
        Self::new(
            "reel-and-recast",
            vec![
                ActionStep::Click {
                    button: MouseButton::Right,
                    count: 1,
                },
                ActionStep::Wait(pause),
                ActionStep::Click {
                    button: MouseButton::Right,
                    count: 1,
                },
            ],
        )
    }

    /// Press, hold for `duration`, release.
    pub fn hold(button: MouseButton, duration: Duration) -> Self {
        Self::new(
            "hold",
            vec![
                ActionStep::Press(button),
                ActionStep::Wait(duration),
                ActionStep::Release(button),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[ActionStep] {
        &self.steps
    }

    pub fn total_wait(&self) -> Duration {
        self.steps
            .iter()
            .filter_map(|step| match step {
                ActionStep::Wait(d) => Some(*d),
                _ => None,
            })
            .sum()
    }
}

/// Runs sequences against one injector, one sequence at a time.
///
/// Clones share the same execution slot. A run that finds the slot taken is
/// rejected with [`AutomationError::BusyConflict`] and sends no input.
#[derive(Clone)]
pub struct ActionSequencer {
    injector: Arc<dyn InputInjector>,
    slot: Arc<Mutex<()>>,
}

impl ActionSequencer {
    pub fn new(injector: Arc<dyn InputInjector>) -> Self {
        Self {
            injector,
            slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn injector_name(&self) -> &str {
        self.injector.name()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    pub async fn run(&self, sequence: &ActionSequence) -> AutomationResult<()> {
        let _slot = self
            .slot
            .try_lock()
            .map_err(|_| AutomationError::BusyConflict)?;

        log::debug!(
            "▶️ Running sequence '{}' ({} steps) on {}",
            sequence.name(),
            sequence.steps().len(),
            self.injector.name()
        );

        for (index, step) in sequence.steps().iter().enumerate() {
            let result = match *step {
                ActionStep::Press(button) => self.injector.press(button),
                ActionStep::Release(button) => self.injector.release(button),
                ActionStep::Click { button, count } => self.injector.click(button, count),
                ActionStep::Wait(duration) => {
                    sleep(duration).await;
                    Ok(())
                }
            };
            if let Err(e) = result {
                log::warn!(
                    "❌ Sequence '{}' aborted at step {} ({:?}): {}",
                    sequence.name(),
                    index + 1,
                    step,
                    e
                );
                return Err(e.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::{DryRunInjector, InjectedAction, InjectionError, InjectionResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Fails every call from the `fail_at`-th one (1-based).
    struct FailingInjector {
        calls: AtomicUsize,
        fail_at: usize,
    }

    impl FailingInjector {
        fn check(&self, button: MouseButton, operation: &'static str) -> InjectionResult<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.fail_at {
                return Err(InjectionError::Failed {
                    operation,
                    button,
                    description: "device unplugged".to_string(),
                });
            }
            Ok(())
        }
    }

    impl InputInjector for FailingInjector {
        fn press(&self, button: MouseButton) -> InjectionResult<()> {
            self.check(button, "press")
        }
        fn release(&self, button: MouseButton) -> InjectionResult<()> {
            self.check(button, "release")
        }
        fn click(&self, button: MouseButton, _count: u32) -> InjectionResult<()> {
            self.check(button, "click")
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let injector = Arc::new(DryRunInjector::with_journal());
        let sequencer = ActionSequencer::new(injector.clone());
        sequencer
            .run(&ActionSequence::hold(MouseButton::Right, Duration::from_millis(5)))
            .await
            .unwrap();
        sequencer
            .run(&ActionSequence::click(MouseButton::Left, 2))
            .await
            .unwrap();

        assert_eq!(
            injector.journal(),
            vec![
                InjectedAction::Press(MouseButton::Right),
                InjectedAction::Release(MouseButton::Right),
                InjectedAction::Click(MouseButton::Left, 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_wait_step_never_returns_early() {
        let sequencer = ActionSequencer::new(Arc::new(DryRunInjector::new()));
        let sequence = ActionSequence::fishing_reaction(Duration::from_millis(60));
        assert_eq!(sequence.total_wait(), Duration::from_millis(60));

        let start = Instant::now();
        sequencer.run(&sequence).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_injector_failure_aborts_remaining_steps() {
        let injector = Arc::new(FailingInjector {
            calls: AtomicUsize::new(0),
            fail_at: 2,
        });
        let sequencer = ActionSequencer::new(injector.clone());
        let sequence = ActionSequence::new(
            "three-clicks",
            vec![
                ActionStep::Click {
                    button: MouseButton::Left,
                    count: 1,
                },
                ActionStep::Click {
                    button: MouseButton::Left,
                    count: 1,
                },
                ActionStep::Click {
                    button: MouseButton::Left,
                    count: 1,
                },
            ],
        );

        let err = sequencer.run(&sequence).await.unwrap_err();
        assert!(matches!(err, AutomationError::Injection { .. }));
        assert_eq!(injector.calls.load(Ordering::SeqCst), 2, "third step skipped");
        assert!(!sequencer.is_busy(), "slot released after failure");
    }

    #[tokio::test]
    async fn test_overlapping_run_is_rejected_as_busy() {
        let injector = Arc::new(DryRunInjector::with_journal());
        let sequencer = ActionSequencer::new(injector.clone());
        let other = sequencer.clone();

        let long = tokio::spawn(async move {
            other
                .run(&ActionSequence::hold(MouseButton::Right, Duration::from_millis(150)))
                .await
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(sequencer.is_busy());
        let err = sequencer
            .run(&ActionSequence::click(MouseButton::Left, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::BusyConflict));

        long.await.unwrap().unwrap();
        assert_eq!(
            injector.journal(),
            vec![
                InjectedAction::Press(MouseButton::Right),
                InjectedAction::Release(MouseButton::Right),
            ],
            "rejected run sent no input"
        );
    }
}
