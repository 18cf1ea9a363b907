// Device module - the three services the controller drives
// Input injection, frame capture and key events are reached only through the
// traits in `types`; concrete backends live next to them.

pub mod dry_run;
pub mod error;
pub mod replay;
pub mod stdin;
pub mod types;


// Re-export the main types and functions for easy access
pub use dry_run::{DryRunInjector, InjectedAction};
pub use error::{CaptureError, CaptureResult, InjectionError, InjectionResult, ListenError};
pub use replay::{ReplayFrameGrabber, ScriptedFrameGrabber};
pub use stdin::LineEventSource;
pub use types::{
    CaptureRegion, ChannelOrder, EventSource, Frame, FrameGrabber, InputInjector, KeySymbol,
    MouseButton,
};
