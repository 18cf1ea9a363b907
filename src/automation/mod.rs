// Automation module
// Run state, timed action sequences and the background loops that drive the
// device services.

pub mod catalog;
pub mod channels;
pub mod color;
pub mod debounce;
pub mod error;
pub mod interval;
pub mod run_state;
pub mod scheduler;
pub mod sequence;
pub mod types;


// Re-export the main types and functions for easy access
pub use catalog::ActionCatalog;
pub use channels::{EventReceiver, EventSender, create_event_channel};
pub use color::{TargetColor, locate, locate_target};
pub use debounce::{DebounceState, MotionDebouncer, TriggerDecision};
pub use error::{AutomationError, AutomationResult, IntervalError};
pub use interval::{INTERVAL_FLOOR, IntervalInput, IntervalSpec, SECONDARY_MINIMUM};
pub use run_state::RunStateMachine;
pub use scheduler::{LoopContext, LoopScheduler, ShutdownSignal, run_secondary_now};
pub use sequence::{ActionSequence, ActionSequencer, ActionStep};
pub use types::{ControllerEvent, KeyDispatch, LoopKind, RunSnapshot, SkipReason};
