use crate::cancel::CancelToken;
use crate::chain::{ChainBuilder, LandmarkChain, ProcessingChain};
use crate::config::LiveConfig;
use crate::detector::{Detector, DetectorFactory};
use crate::error::LiveError;
use crate::state::{LiveSessionState, SchedulerState};
use crate::timer::TickTimer;
use log::{debug, info, warn};
use retarget_core::DriverFrame;
use retarget_engine::{PoseSink, RetargetEngine};
use retarget_mapping::MappingDocument;
use retarget_skeleton::SkeletonGraph;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Chain builder used by [`LiveScheduler::new`].
pub type DefaultChainBuilder = fn(&LiveConfig) -> LandmarkChain;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Explicit stop or cancel signal.
    Cancelled,
    /// The detector returned no data.
    EndOfStream,
}

/// Result of one [`LiveScheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do; the scheduler is not running.
    Idle,
    /// A frame was pulled and processed.
    Advanced { frame: u64, applied: bool },
    /// The session ended during this tick and resources were released.
    Stopped { frame: u64, reason: StopReason },
}

/// Counters for the current or last session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub applications: u64,
    pub updates: usize,
    pub errors: usize,
    pub stop_reason: Option<StopReason>,
}

/// Timer-driven loop that pulls detector output, runs it through a
/// processing chain and retargets onto a pose sink on a fixed cadence.
///
/// All state changes happen in [`start`](Self::start),
/// [`tick`](Self::tick) and [`stop`](Self::stop). Retargeting is applied on
/// the first tick and then whenever `frame_counter % refresh_interval == 0`.
pub struct LiveScheduler<F, T, S, B = DefaultChainBuilder>
where
    F: DetectorFactory,
    T: TickTimer,
    S: PoseSink,
    B: ChainBuilder,
{
    mapping: MappingDocument,
    skeleton: SkeletonGraph,
    engine: RetargetEngine,
    factory: F,
    chains: B,
    timer: T,
    sink: S,
    state: SchedulerState,
    session: Option<LiveSessionState>,
    detector: Option<F::Detector>,
    chain: Option<B::Chain>,
    timer_armed: bool,
    cancel: CancelToken,
    latest: DriverFrame,
    summary: RunSummary,
}

impl<F, T, S> LiveScheduler<F, T, S, DefaultChainBuilder>
where
    F: DetectorFactory,
    T: TickTimer,
    S: PoseSink,
{
    /// Scheduler using [`LandmarkChain`] as processing chain.
    pub fn new(mapping: MappingDocument, skeleton: SkeletonGraph, factory: F, timer: T, sink: S) -> Self {
        Self::with_chain_builder(
            mapping,
            skeleton,
            factory,
            LandmarkChain::from_config as DefaultChainBuilder,
            timer,
            sink,
        )
    }
}

impl<F, T, S, B> LiveScheduler<F, T, S, B>
where
    F: DetectorFactory,
    T: TickTimer,
    S: PoseSink,
    B: ChainBuilder,
{
    pub fn with_chain_builder(
        mapping: MappingDocument,
        skeleton: SkeletonGraph,
        factory: F,
        chains: B,
        timer: T,
        sink: S,
    ) -> Self {
        Self {
            mapping,
            skeleton,
            engine: RetargetEngine::default(),
            factory,
            chains,
            timer,
            sink,
            state: SchedulerState::Idle,
            session: None,
            detector: None,
            chain: None,
            timer_armed: false,
            cancel: CancelToken::new(),
            latest: DriverFrame::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn with_engine(mut self, engine: RetargetEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn session(&self) -> Option<&LiveSessionState> {
        self.session.as_ref()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn skeleton(&self) -> &SkeletonGraph {
        &self.skeleton
    }

    pub fn mapping(&self) -> &MappingDocument {
        &self.mapping
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Driver frame produced by the most recent tick.
    pub fn latest_frame(&self) -> &DriverFrame {
        &self.latest
    }

    /// Handle that cancels the session at the next tick boundary.
    ///
    /// A cancel issued while idle is kept and ends the next session on its
    /// first tick. The signal is cleared when a session shuts down.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn request_cancel(&self) {
        self.cancel.cancel();
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Open the detector and arm the timer.
    ///
    /// On error nothing changes and the scheduler stays idle.
    pub fn start(&mut self, config: &LiveConfig) -> Result<(), LiveError> {
        if self.state != SchedulerState::Idle {
            return Err(LiveError::AlreadyRunning);
        }
        config.validate()?;
        let detector = self
            .factory
            .open(config)
            .map_err(|source| LiveError::InvalidConfig {
                reason: format!("cannot open detector on device {}", config.webcam_device),
                source: Some(source),
            })?;

        let (w, h) = config.stream_dim.size();
        info!(
            "live session start: device {} {}x{} api {} detect {:?} refresh {}",
            config.webcam_device,
            w,
            h,
            config.backend.api_preference(),
            config.detect_type,
            config.refresh_interval
        );

        self.chain = Some(self.chains.build(config));
        self.detector = Some(detector);
        self.session = Some(LiveSessionState::new(config));
        self.latest = DriverFrame::new();
        self.summary = RunSummary::default();
        self.timer.arm(config.tick_interval());
        self.timer_armed = true;
        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Advance the session by one frame.
    ///
    /// Checks the cancel signal first, then pulls one detector result. An
    /// exhausted detector ends the session within this call.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != SchedulerState::Running {
            return TickOutcome::Idle;
        }
        let last = self.session.as_ref().map_or(0, |s| s.frame_counter);
        if self.cancel.is_cancelled() {
            debug!("cancel requested, stopping after frame {last}");
            self.shutdown(StopReason::Cancelled);
            return TickOutcome::Stopped {
                frame: last,
                reason: StopReason::Cancelled,
            };
        }

        let Some(frame) = self.session.as_mut().map(LiveSessionState::advance) else {
            self.shutdown(StopReason::Cancelled);
            return TickOutcome::Idle;
        };
        self.summary.ticks += 1;

        let Some(landmarks) = self.detector.as_mut().and_then(Detector::next_frame) else {
            info!("detector exhausted at frame {frame}");
            self.shutdown(StopReason::EndOfStream);
            return TickOutcome::Stopped {
                frame,
                reason: StopReason::EndOfStream,
            };
        };
        self.latest = match self.chain.as_mut() {
            Some(chain) => chain.process(&landmarks),
            None => DriverFrame::new(),
        };

        let applied = self
            .session
            .as_mut()
            .is_some_and(LiveSessionState::take_apply);
        if applied {
            let min_confidence = self.session.as_ref().map_or(0.0, |s| s.min_confidence);
            let updates = self
                .engine
                .apply(&self.mapping, &self.skeleton, &self.latest, min_confidence);
            updates.apply_to(&mut self.sink);
            self.summary.applications += 1;
            self.summary.updates += updates.len();
            self.summary.errors += updates.errors.len();
            debug!(
                "frame {frame}: applied {} updates from {} drivers",
                updates.len(),
                self.latest.len()
            );
        }
        TickOutcome::Advanced { frame, applied }
    }

    /// Stop the session right away. A no-op when idle.
    pub fn stop(&mut self) -> bool {
        if self.state == SchedulerState::Idle {
            return false;
        }
        self.shutdown(StopReason::Cancelled);
        true
    }

    /// Wait on the timer and tick until the session ends.
    pub fn run(&mut self) -> RunSummary {
        while self.state == SchedulerState::Running {
            self.timer.wait();
            self.tick();
        }
        self.summary.clone()
    }

    fn shutdown(&mut self, reason: StopReason) {
        self.state = SchedulerState::Cancelling;
        if self.timer_armed {
            self.timer.release();
            self.timer_armed = false;
        }
        self.chain = None;
        self.detector = None;
        if self.session.take().is_none() {
            warn!("shutdown without an active session");
        }
        self.summary.stop_reason = Some(reason);
        self.cancel.reset();
        info!(
            "live session stopped ({reason:?}): {} ticks, {} applications",
            self.summary.ticks, self.summary.applications
        );
        self.state = SchedulerState::Idle;
    }
}
