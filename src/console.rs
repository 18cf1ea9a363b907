//! Terminal front end: prints controller events in order and turns typed lines
//! into key-downs or commands.
//!
//! A line starting with `:` is a command (`:rebind`, `:eat on`, `:eat off`,
//! `:eat now`, `:mode fisher`, `:status`); anything else is a key name.

use crate::automation::{
    ActionCatalog, ControllerEvent, EventReceiver, KeyDispatch, LoopContext, SkipReason,
    run_secondary_now,
};
use crate::config::RunMode;
use crate::devices::KeySymbol;
use std::sync::Arc;
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Rebind,
    EatEnable(bool),
    EatNow,
    Mode(RunMode),
    Status,
    Help,
}

impl ConsoleCommand {
    /// Parses a `:command` line. Returns `None` for plain key names.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let body = line.trim().strip_prefix(':')?;
        let mut words = body.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("rebind"), None) => Ok(ConsoleCommand::Rebind),
            (Some("eat"), Some("on")) => Ok(ConsoleCommand::EatEnable(true)),
            (Some("eat"), Some("off")) => Ok(ConsoleCommand::EatEnable(false)),
            (Some("eat"), Some("now")) => Ok(ConsoleCommand::EatNow),
            (Some("mode"), Some(mode)) => mode.parse().map(ConsoleCommand::Mode),
            (Some("status"), None) => Ok(ConsoleCommand::Status),
            (Some("help"), None) => Ok(ConsoleCommand::Help),
            _ => Err(format!("unknown command ':{}'", body)),
        };
        Some(command)
    }

    /// Commands still accepted while a hotkey change locks the controls.
    pub fn allowed_while_locked(&self) -> bool {
        matches!(self, ConsoleCommand::Status | ConsoleCommand::Help)
    }
}

/// Human readable line for an event, or `None` for events not worth printing.
pub fn describe(event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::StateChanged(snapshot) => Some(format!("📋 {}", snapshot.status_text())),
        ControllerEvent::ControlsLocked(true) => {
            Some("⌨️ Press the new hotkey (or the cancel key)".to_string())
        }
        ControllerEvent::ControlsLocked(false) => None,
        ControllerEvent::Diagnostic { source, message } => {
            Some(format!("⚠️ [{}] {}", source, message))
        }
        ControllerEvent::Triggered { delta } => Some(format!("🎣 Bite! moved {} px", delta)),
        ControllerEvent::ActionSkipped {
            source,
            reason: SkipReason::Busy,
            ..
        } => Some(format!("⏳ [{}] skipped, input busy with another action", source)),
        ControllerEvent::ActionSkipped { source, detail, .. } => {
            Some(format!("⏭️ [{}] skipped: {}", source, detail))
        }
        ControllerEvent::LoopStopped(_) => None,
    }
}

/// Consumes events on the presentation task until every sender is gone.
pub async fn run_presenter(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        log::debug!("📨 {:?}", event);
        if let Some(line) = describe(&event) {
            println!("{}", line);
        }
    }
    log::debug!("📨 Event channel closed");
}

/// Routes each line read by the key listener.
///
/// Runs on the listener thread; anything async is spawned onto `runtime`.
pub struct ConsoleController {
    ctx: LoopContext,
    catalog: Arc<ActionCatalog>,
    runtime: Handle,
}

impl ConsoleController {
    pub fn new(ctx: LoopContext, catalog: Arc<ActionCatalog>, runtime: Handle) -> Self {
        Self {
            ctx,
            catalog,
            runtime,
        }
    }

    pub fn handle(&self, key: KeySymbol) {
        match ConsoleCommand::parse(key.as_str()) {
            None => {
                if let KeyDispatch::Ignored = self.ctx.state.dispatch_key(&key) {
                    println!("❓ '{}' is not the hotkey (type :help for commands)", key);
                }
            }
            Some(Ok(command)) => {
                self.execute(command);
            }
            Some(Err(message)) => println!("❌ {}", message),
        }
    }

    /// Runs `command`, refusing anything but status and help while a hotkey
    /// change is in progress. Returns whether it ran.
    pub fn execute(&self, command: ConsoleCommand) -> bool {
        if self.ctx.state.snapshot().is_rebinding && !command.allowed_while_locked() {
            println!(
                "🔒 Press the new hotkey or {} first",
                self.ctx.state.cancel_key()
            );
            return false;
        }
        match command {
            ConsoleCommand::Rebind => {
                if !self.ctx.state.begin_rebind() {
                    println!("⌨️ Already waiting for a new hotkey");
                }
            }
            ConsoleCommand::EatEnable(enabled) => {
                let interval = self.ctx.settings.current().secondary_interval;
                if let Err(e) = self.ctx.state.set_secondary_enabled(enabled, &interval) {
                    println!("❌ Cannot enable auto-eat: {}", e);
                }
            }
            ConsoleCommand::EatNow => {
                let ctx = self.ctx.clone();
                let catalog = self.catalog.clone();
                self.runtime.spawn(async move {
                    if let Err(e) = run_secondary_now(&ctx, &catalog).await {
                        println!("❌ Eat skipped: {}", e);
                    }
                });
            }
            ConsoleCommand::Mode(mode) => {
                self.ctx.settings.update(|s| s.mode = mode);
                log::info!("🔀 Mode set to {}", mode);
            }
            ConsoleCommand::Status => {
                let snapshot = self.ctx.state.snapshot();
                let settings = self.ctx.settings.current();
                println!("📋 {} | mode: {}", snapshot.status_text(), settings.mode);
            }
            ConsoleCommand::Help => print_commands(),
        }
        true
    }
}

pub fn print_commands() {
    println!("Type a key name (e.g. f6) and press Enter to send a key-down.");
    println!("Commands:");
    println!("    :rebind             Bind the next key typed as the hotkey");
    println!("    :eat on|off         Enable or disable auto-eat");
    println!("    :eat now            Eat once right away");
    println!("    :mode clicker|fisher");
    println!("    :status             Show the current state");
    println!("    quit                Exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{
        ActionSequencer, IntervalInput, LoopKind, RunSnapshot, RunStateMachine, ShutdownSignal,
        create_event_channel,
    };
    use crate::config::{Settings, SharedSettings};
    use crate::devices::DryRunInjector;

    fn controller(settings: Settings) -> ConsoleController {
        let (tx, _rx) = create_event_channel();
        let ctx = LoopContext {
            state: Arc::new(RunStateMachine::default()),
            settings: SharedSettings::new(settings),
            sequencer: ActionSequencer::new(Arc::new(DryRunInjector::new())),
            events: tx,
            shutdown: ShutdownSignal::new(),
        };
        ConsoleController::new(ctx, Arc::new(ActionCatalog::builtin()), Handle::current())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("f6"), None);
        assert_eq!(
            ConsoleCommand::parse(":rebind"),
            Some(Ok(ConsoleCommand::Rebind))
        );
        assert_eq!(
            ConsoleCommand::parse(" :eat off "),
            Some(Ok(ConsoleCommand::EatEnable(false)))
        );
        assert_eq!(
            ConsoleCommand::parse(":mode fish"),
            Some(Ok(ConsoleCommand::Mode(RunMode::Fisher)))
        );
        assert!(matches!(ConsoleCommand::parse(":dance"), Some(Err(_))));
        assert!(matches!(ConsoleCommand::parse(":mode farm"), Some(Err(_))));
    }

    #[test]
    fn test_describe_reports_skips() {
        let missing = describe(&ControllerEvent::ActionSkipped {
            source: LoopKind::Secondary,
            reason: SkipReason::MissingActionData,
            detail: "No action data available for 'cake'".to_string(),
        })
        .unwrap();
        assert!(missing.contains("cake"));
        assert!(missing.contains("auto-eat loop"));

        let busy = describe(&ControllerEvent::ActionSkipped {
            source: LoopKind::Primary,
            reason: SkipReason::Busy,
            detail: String::new(),
        })
        .unwrap();
        assert!(busy.contains("busy"));
        assert!(describe(&ControllerEvent::LoopStopped(LoopKind::Primary)).is_none());

        let snapshot = RunSnapshot {
            running: true,
            bound_hotkey: KeySymbol::new("f6"),
            is_rebinding: false,
            secondary_enabled: false,
            run_generation: 1,
        };
        let line = describe(&ControllerEvent::StateChanged(snapshot)).unwrap();
        assert!(line.contains("Running"));
    }

    #[tokio::test]
    async fn test_lines_drive_the_run_state() {
        let console = controller(Settings::default());

        console.handle(KeySymbol::new("f6"));
        assert!(console.ctx.state.is_running());

        console.handle(KeySymbol::new(":rebind"));
        console.handle(KeySymbol::new("f7"));
        let snapshot = console.ctx.state.snapshot();
        assert_eq!(snapshot.bound_hotkey, KeySymbol::new("f7"));
        assert!(snapshot.running, "Rebinding must not toggle");

        console.handle(KeySymbol::new("f7"));
        assert!(!console.ctx.state.is_running());
    }

    #[tokio::test]
    async fn test_eat_on_respects_interval_minimum() {
        let console = controller(Settings {
            secondary_interval: IntervalInput::from_millis(500),
            ..Settings::default()
        });
        console.handle(KeySymbol::new(":eat on"));
        assert!(!console.ctx.state.snapshot().secondary_enabled);

        console
            .ctx
            .settings
            .update(|s| s.secondary_interval = IntervalInput::from_secs(30));
        console.handle(KeySymbol::new(":eat on"));
        assert!(console.ctx.state.snapshot().secondary_enabled);
    }

    #[tokio::test]
    async fn test_mode_command_updates_settings() {
        let console = controller(Settings::default());
        console.handle(KeySymbol::new(":mode fisher"));
        assert_eq!(console.ctx.settings.current().mode, RunMode::Fisher);
    }

    #[tokio::test]
    async fn test_commands_locked_while_rebinding() {
        let console = controller(Settings {
            secondary_interval: IntervalInput::from_secs(30),
            ..Settings::default()
        });
        console.handle(KeySymbol::new(":rebind"));

        console.handle(KeySymbol::new(":eat on"));
        console.handle(KeySymbol::new(":mode fisher"));
        assert!(!console.execute(ConsoleCommand::EatNow));
        assert!(console.execute(ConsoleCommand::Status));

        let snapshot = console.ctx.state.snapshot();
        assert!(snapshot.is_rebinding, "Commands must not end the rebind");
        assert!(!snapshot.secondary_enabled);
        assert_eq!(console.ctx.settings.current().mode, RunMode::Clicker);

        // Cancelling unlocks the controls again
        console.handle(KeySymbol::new("escape"));
        console.handle(KeySymbol::new(":eat on"));
        assert!(console.ctx.state.snapshot().secondary_enabled);
    }
}
