pub mod automation;
pub mod config;
pub mod console;
pub mod devices;

pub use automation::{LoopScheduler, RunStateMachine};
pub use config::Settings;
