//! Independently paced background loops driven by the shared run state.
//!
//! Every loop runs the same template: poll the run state, idle when not needed,
//! resolve its interval, run one tick, then sleep the interval in short chunks
//! so stopping takes effect within one chunk.

use super::catalog::ActionCatalog;
use super::channels::EventSender;
use super::color;
use super::debounce::{MotionDebouncer, TriggerDecision};
use super::error::{AutomationError, AutomationResult, IntervalError};
use super::interval::SECONDARY_MINIMUM;
use super::run_state::RunStateMachine;
use super::sequence::{ActionSequence, ActionSequencer};
use super::types::{ControllerEvent, LoopKind, RunSnapshot, SkipReason};
use crate::config::{RunMode, Settings, SharedSettings};
use crate::devices::{CaptureError, CaptureResult, FrameGrabber};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

/// Sleep used while a loop is not needed.
pub const IDLE_TICK: Duration = Duration::from_millis(100);

/// Longest uninterrupted sleep inside an interval.
pub const SLEEP_CHUNK: Duration = Duration::from_millis(200);

/// Minimum spacing between two diagnostics from the same loop.
pub const DIAGNOSTIC_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lets one message through per cooldown window.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.cooldown => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Sleeps `total` in pieces of at most `chunk`, stopping early once `keep_going`
/// returns false. Returns whether the full duration elapsed.
pub async fn sleep_interruptible<F>(total: Duration, chunk: Duration, mut keep_going: F) -> bool
where
    F: FnMut() -> bool,
{
    let mut remaining = total;
    while !remaining.is_zero() {
        if !keep_going() {
            return false;
        }
        let step = remaining.min(chunk);
        sleep(step).await;
        remaining -= step;
    }
    true
}

/// Everything a loop needs; cheap to clone.
#[derive(Clone)]
pub struct LoopContext {
    pub state: Arc<RunStateMachine>,
    pub settings: SharedSettings,
    pub sequencer: ActionSequencer,
    pub events: EventSender,
    pub shutdown: ShutdownSignal,
}

impl LoopContext {
    fn post(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

/// Runs the auto-eat hold once, outside the timed loop (manual trigger).
///
/// Shares the injector slot with the loops, so it is rejected with
/// [`AutomationError::BusyConflict`] while another sequence is in flight.
pub async fn run_secondary_now(ctx: &LoopContext, catalog: &ActionCatalog) -> AutomationResult<()> {
    let settings = ctx.settings.current();
    let hold = catalog.lookup(&settings.secondary_item)?;
    log::info!("🍖 Eating {} ({:.2}s)", settings.secondary_item, hold.as_secs_f64());
    ctx.sequencer
        .run(&ActionSequence::hold(settings.secondary_button, hold))
        .await
}

enum LoopBody {
    Primary,
    Sensing {
        grabber: Arc<dyn FrameGrabber>,
        debouncer: MotionDebouncer,
        /// Run generation the debouncer's history belongs to
        seen_generation: Option<u64>,
    },
    Secondary {
        catalog: Arc<ActionCatalog>,
    },
}

impl LoopBody {
    fn kind(&self) -> LoopKind {
        match self {
            LoopBody::Primary => LoopKind::Primary,
            LoopBody::Sensing { .. } => LoopKind::Sensing,
            LoopBody::Secondary { .. } => LoopKind::Secondary,
        }
    }

    fn is_active(kind: LoopKind, snapshot: &RunSnapshot, settings: &Settings) -> bool {
        match kind {
            LoopKind::Primary => snapshot.running && settings.mode == RunMode::Clicker,
            LoopKind::Sensing => snapshot.running && settings.mode == RunMode::Fisher,
            LoopKind::Secondary => snapshot.running && snapshot.secondary_enabled,
        }
    }

    fn interval(&self, settings: &Settings) -> Result<Duration, IntervalError> {
        match self {
            LoopBody::Primary => settings.click_interval.effective(),
            LoopBody::Sensing { .. } => settings.sensing_interval.effective(),
            LoopBody::Secondary { .. } => settings.secondary_interval.at_least(SECONDARY_MINIMUM),
        }
    }

    /// Puts the run state somewhere this loop will not tick again.
    fn enter_safe_state(&self, ctx: &LoopContext, error: &IntervalError) {
        let reason = format!("{} interval is invalid ({})", self.kind(), error);
        match self {
            LoopBody::Primary | LoopBody::Sensing { .. } => {
                ctx.state.force_stop(&reason);
            }
            LoopBody::Secondary { .. } => {
                ctx.state.force_disable_secondary(&reason);
            }
        }
    }

    fn on_idle(&mut self) {
        if let LoopBody::Sensing { debouncer, .. } = self {
            debouncer.reset();
        }
    }

    /// Drops detection history left over from an earlier run, including a stop
    /// and restart that happened entirely inside one sleep chunk.
    fn sync_run_generation(&mut self, generation: u64) {
        if let LoopBody::Sensing {
            debouncer,
            seen_generation,
            ..
        } = self
        {
            if *seen_generation != Some(generation) {
                debouncer.reset();
                *seen_generation = Some(generation);
            }
        }
    }

    async fn tick(&mut self, ctx: &LoopContext, settings: &Settings) -> AutomationResult<()> {
        match self {
            LoopBody::Primary => {
                let clicks = ActionSequence::click(settings.click_button, settings.click_type.count());
                ctx.sequencer.run(&clicks).await
            }
            LoopBody::Sensing {
                grabber, debouncer, ..
            } => {
                let grabber = grabber.clone();
                let region = settings.capture_region;
                let target = settings.target_color;
                let capture = tokio::task::spawn_blocking(move || -> CaptureResult<Option<u32>> {
                    let frame = grabber.capture(&region)?;
                    Ok(color::locate_target(&frame, &target))
                });
                let located = match capture.await.map_err(CaptureError::from) {
                    Ok(Ok(located)) => located,
                    Ok(Err(e)) | Err(e) => {
                        // No delta across a gap in the samples
                        debouncer.reset();
                        return Err(e.into());
                    }
                };

                match located {
                    Some(y) => log::trace!("🎯 Target found at y={}", y),
                    None => log::trace!("👀 Target not found in region"),
                }

                debouncer.set_threshold(settings.movement_threshold);
                if let TriggerDecision::Trigger { delta } = debouncer.observe(located) {
                    log::info!("🎣 Drop detected! Delta Y: {}", delta);
                    ctx.post(ControllerEvent::Triggered { delta });
                    ctx.sequencer
                        .run(&ActionSequence::fishing_reaction(settings.reaction_pause()))
                        .await?;
                }
                Ok(())
            }
            LoopBody::Secondary { catalog } => run_secondary_now(ctx, catalog).await,
        }
    }
}

async fn run_loop(mut body: LoopBody, ctx: LoopContext) {
    let kind = body.kind();
    let mut diagnostics = RateLimiter::new(DIAGNOSTIC_COOLDOWN);
    let mut skip_notices: HashMap<SkipReason, RateLimiter> = HashMap::new();
    log::debug!("🔁 {} started", kind);

    while !ctx.shutdown.is_requested() {
        let snapshot = ctx.state.snapshot();
        let settings = ctx.settings.current();
        if !LoopBody::is_active(kind, &snapshot, &settings) {
            body.on_idle();
            sleep(IDLE_TICK).await;
            continue;
        }
        body.sync_run_generation(snapshot.run_generation);

        let interval = match body.interval(&settings) {
            Ok(interval) => interval,
            Err(e) => {
                log::warn!("⚠️ {}: {}", kind, e);
                body.enter_safe_state(&ctx, &e);
                if diagnostics.allow() {
                    ctx.post(ControllerEvent::Diagnostic {
                        source: kind,
                        message: format!("Invalid interval, {} stopped: {}", kind, e),
                    });
                }
                sleep(IDLE_TICK).await;
                continue;
            }
        };

        let mut pause = interval;
        if let Err(e) = body.tick(&ctx, &settings).await {
            if matches!(e, AutomationError::BusyConflict) {
                // Retry soon instead of skipping a whole interval
                log::debug!("⏳ {} skipped a tick: {}", kind, e);
                pause = pause.min(IDLE_TICK);
            } else {
                log::warn!("⚠️ {} tick failed: {}", kind, e);
            }
            let reason = SkipReason::from_error(&e);
            let notice = skip_notices
                .entry(reason)
                .or_insert_with(|| RateLimiter::new(DIAGNOSTIC_COOLDOWN));
            if notice.allow() {
                ctx.post(ControllerEvent::ActionSkipped {
                    source: kind,
                    reason,
                    detail: e.to_string(),
                });
            }
        }

        let state = ctx.state.clone();
        let shared = ctx.settings.clone();
        let shutdown = ctx.shutdown.clone();
        sleep_interruptible(pause, SLEEP_CHUNK, || {
            !shutdown.is_requested()
                && LoopBody::is_active(kind, &state.snapshot(), &shared.current())
        })
        .await;
    }

    log::debug!("🔁 {} finished", kind);
    ctx.post(ControllerEvent::LoopStopped(kind));
}

/// Owns the background loop tasks.
pub struct LoopScheduler {
    ctx: LoopContext,
    handles: Vec<(LoopKind, JoinHandle<()>)>,
}

impl LoopScheduler {
    pub fn new(ctx: LoopContext) -> Self {
        Self {
            ctx,
            handles: Vec::new(),
        }
    }

    pub fn context(&self) -> &LoopContext {
        &self.ctx
    }

    fn spawn(&mut self, body: LoopBody) {
        let kind = body.kind();
        let handle = tokio::spawn(run_loop(body, self.ctx.clone()));
        self.handles.push((kind, handle));
    }

    pub fn spawn_primary(&mut self) {
        self.spawn(LoopBody::Primary);
    }

    pub fn spawn_sensing(&mut self, grabber: Arc<dyn FrameGrabber>) {
        let threshold = self.ctx.settings.current().movement_threshold;
        self.spawn(LoopBody::Sensing {
            grabber,
            debouncer: MotionDebouncer::new(threshold),
            seen_generation: None,
        });
    }

    pub fn spawn_secondary(&mut self, catalog: Arc<ActionCatalog>) {
        self.spawn(LoopBody::Secondary { catalog });
    }

    pub fn running_loops(&self) -> Vec<LoopKind> {
        self.handles.iter().map(|(kind, _)| *kind).collect()
    }

    /// Signals every loop to exit and waits for them.
    ///
    /// Loop sleeps notice the signal within one [`SLEEP_CHUNK`], but a sequence
    /// already running is finished first so a held button gets released. The
    /// wait is therefore bounded by the longest `Wait` step in flight (the
    /// reaction pause or a catalog hold) plus one chunk.
    pub async fn shutdown(self) {
        self.ctx.shutdown.request();
        for (kind, handle) in self.handles {
            if let Err(e) = handle.await {
                log::error!("❌ {} task failed: {}", kind, e);
            }
        }
    }
}
