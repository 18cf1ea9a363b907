//! Turns per-frame target positions into discrete "it dropped" triggers

/// Default downward movement (pixels) that counts as a bite.
pub const DEFAULT_MOVEMENT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// No accepted position; the next sighting only primes the tracker
    Idle,
    Tracking { last_y: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    NoTrigger,
    Trigger { delta: i64 },
}

impl TriggerDecision {
    pub fn is_trigger(&self) -> bool {
        matches!(self, TriggerDecision::Trigger { .. })
    }
}

/// Fires once per sustained downward jump larger than the threshold.
///
/// Losing the target or firing a trigger both return to `Idle`, so two fresh
/// sightings are needed before the next trigger can fire. Upward movement never
/// triggers.
#[derive(Debug, Clone)]
pub struct MotionDebouncer {
    threshold: u32,
    state: DebounceState,
}

impl MotionDebouncer {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Applies a new threshold without disturbing the tracked position.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }

    pub fn observe(&mut self, current_y: Option<u32>) -> TriggerDecision {
        let Some(y) = current_y else {
            self.state = DebounceState::Idle;
            return TriggerDecision::NoTrigger;
        };

        match self.state {
            DebounceState::Idle => {
                self.state = DebounceState::Tracking { last_y: y };
                TriggerDecision::NoTrigger
            }
            DebounceState::Tracking { last_y } => {
                let delta = y as i64 - last_y as i64;
                if delta > self.threshold as i64 {
                    self.state = DebounceState::Idle;
                    TriggerDecision::Trigger { delta }
                } else {
                    self.state = DebounceState::Tracking { last_y: y };
                    TriggerDecision::NoTrigger
                }
            }
        }
    }
}

impl Default for MotionDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_MOVEMENT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions(threshold: u32, samples: &[Option<u32>]) -> Vec<TriggerDecision> {
        let mut debouncer = MotionDebouncer::new(threshold);
        samples.iter().map(|s| debouncer.observe(*s)).collect()
    }

    #[test]
    fn test_drop_after_steady_position_triggers() {
        let got = decisions(5, &[Some(10), Some(10), Some(25)]);
        assert_eq!(
            got,
            vec![
                TriggerDecision::NoTrigger,
                TriggerDecision::NoTrigger,
                TriggerDecision::Trigger { delta: 15 },
            ]
        );
    }

    #[test]
    fn test_identical_positions_never_trigger() {
        let got = decisions(0, &[Some(7); 50]);
        assert!(got.iter().all(|d| !d.is_trigger()));
    }

    #[test]
    fn test_upward_jump_is_ignored_and_tracked() {
        let mut debouncer = MotionDebouncer::new(3);
        debouncer.observe(Some(100));
        assert_eq!(debouncer.observe(Some(20)), TriggerDecision::NoTrigger);
        assert_eq!(debouncer.state(), DebounceState::Tracking { last_y: 20 });
    }

    #[test]
    fn test_delta_equal_to_threshold_does_not_trigger() {
        let got = decisions(3, &[Some(10), Some(13)]);
        assert_eq!(got[1], TriggerDecision::NoTrigger);
    }

    #[test]
    fn test_trigger_resets_to_idle() {
        let mut debouncer = MotionDebouncer::new(3);
        debouncer.observe(Some(10));
        assert!(debouncer.observe(Some(30)).is_trigger());
        assert_eq!(debouncer.state(), DebounceState::Idle);

        // Continuing the same drop needs a fresh pair of samples
        assert_eq!(debouncer.observe(Some(60)), TriggerDecision::NoTrigger);
        assert!(debouncer.observe(Some(90)).is_trigger());
    }

    #[test]
    fn test_first_sighting_never_triggers() {
        let got = decisions(3, &[None, Some(500)]);
        assert_eq!(got, vec![TriggerDecision::NoTrigger; 2]);
    }

    #[test]
    fn test_lost_signal_resets_tracking() {
        let got = decisions(3, &[Some(10), None, Some(40)]);
        assert!(got.iter().all(|d| !d.is_trigger()));

        let mut debouncer = MotionDebouncer::new(3);
        debouncer.observe(Some(10));
        debouncer.observe(None);
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn test_reset_forgets_position() {
        let mut debouncer = MotionDebouncer::default();
        debouncer.observe(Some(10));
        debouncer.reset();
        assert_eq!(debouncer.observe(Some(50)), TriggerDecision::NoTrigger);
    }
}
