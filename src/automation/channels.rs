// Communication channel from the controller to the presentation context
use super::types::ControllerEvent;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<ControllerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Helper function to create the controller event channel.
///
/// Unbounded so synchronous callers (the key listener thread) can post without
/// blocking; a single receiver preserves send order.
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
