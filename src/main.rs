mod args;

use args::Args;
use auto_input_run::automation::{
    ActionSequencer, AutomationResult, LoopContext, LoopScheduler, RunStateMachine,
    ShutdownSignal, create_event_channel,
};
use auto_input_run::config::{
    CATALOG_FILE, SETTINGS_FILE, SharedSettings, config_dir, load_catalog, load_settings,
    save_settings,
};
use auto_input_run::console::{ConsoleController, print_commands, run_presenter};
use auto_input_run::devices::{DryRunInjector, EventSource, LineEventSource, ReplayFrameGrabber};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };

    let level = if args.debug_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args)) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> AutomationResult<()> {
    let dir = args.config_dir.clone().unwrap_or_else(config_dir);
    let settings_path = dir.join(SETTINGS_FILE);
    let mut settings = load_settings(&settings_path);
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    let catalog = Arc::new(load_catalog(&dir.join(CATALOG_FILE)));

    let (event_tx, event_rx) = create_event_channel();
    let state = RunStateMachine::new(settings.hotkey.clone(), settings.cancel_key.clone())
        .with_events(event_tx.clone());
    let ctx = LoopContext {
        state: Arc::new(state),
        settings: SharedSettings::new(settings.clone()),
        sequencer: ActionSequencer::new(Arc::new(DryRunInjector::new())),
        events: event_tx,
        shutdown: ShutdownSignal::new(),
    };
    let presenter = tokio::spawn(run_presenter(event_rx));

    let mut scheduler = LoopScheduler::new(ctx.clone());
    scheduler.spawn_primary();
    scheduler.spawn_secondary(catalog.clone());
    match &args.frames_dir {
        Some(frames) => {
            let grabber = ReplayFrameGrabber::from_dir(frames)?;
            log::info!(
                "🎞️ Replaying {} frames from {}",
                grabber.frame_count(),
                frames.display()
            );
            scheduler.spawn_sensing(Arc::new(grabber));
        }
        None => log::info!("🎣 No --frames given, fisher mode has no frame source"),
    }

    println!(
        "🚀 Auto Input Run ({} mode, input via {}). Type {} + Enter to start/stop.",
        settings.mode,
        ctx.sequencer.injector_name(),
        settings.hotkey
    );
    print_commands();

    let console = ConsoleController::new(ctx.clone(), catalog, Handle::current());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        let mut source = LineEventSource::stdin().with_quit_word("quit");
        let result = source.listen(&mut |key| console.handle(key));
        let _ = done_tx.send(result);
    });

    let listener_result = match args.timeout_secs {
        Some(secs) => tokio::select! {
            result = done_rx => result.ok(),
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                log::info!("⏰ Timeout reached ({}s), exiting", secs);
                None
            }
        },
        None => done_rx.await.ok(),
    };
    if let Some(Err(e)) = listener_result {
        log::error!("❌ Key listener failed: {}", e);
    }

    ctx.state.force_stop("exiting");
    scheduler.shutdown().await;

    let hotkey = ctx.state.snapshot().bound_hotkey;
    ctx.settings.update(|s| s.hotkey = hotkey);
    match save_settings(&settings_path, &ctx.settings.current()) {
        Ok(()) => log::info!("💾 Settings saved to {}", settings_path.display()),
        Err(e) => log::warn!("Could not save settings: {}", e),
    }

    // The listener thread may still hold a sender while blocked on stdin
    tokio::task::yield_now().await;
    presenter.abort();
    Ok(())
}
