//! The frame-to-event pipeline.
//!
//! Frames flow one way: source -> [`RateGovernor`] -> [`CellSampler`] ->
//! [`FrameDiffer`] -> [`EventEncoder`]. The pipeline runs either as a plain
//! loop on the calling thread or as three stages (decode, render, encode)
//! joined by bounded channels. Full channels block the upstream stage;
//! only the governor drops frames.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

use log::{debug, info};

use crate::cache::CacheStats;
use crate::color::Quantizer;
use crate::config::PipelineConfig;
use crate::diff::{CellDelta, FrameDiffer};
use crate::encoder::{Event, EventEncoder};
use crate::frame::{DecodeError, Frame, FrameSource};
use crate::governor::{GovernedFrame, GovernorError, RateGovernor};
use crate::grid::{CellSampler, GridSize};

/// How the pipeline stages are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Everything on the calling thread.
    #[default]
    Sequential,
    /// Decode and render on their own threads with bounded queues between stages.
    Staged { queue_capacity: usize },
}

/// Errors that can occur while running a session.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} stage failed at input frame {frame_index}: {source}")]
    Input {
        stage: &'static str,
        frame_index: u64,
        #[source]
        source: GovernorError,
    },

    #[error("{stage} stage failed at {timestamp:.4}s: {source}")]
    Sink {
        stage: &'static str,
        timestamp: f64,
        #[source]
        source: io::Error,
    },

    #[error("{stage} stage panicked")]
    StagePanicked { stage: &'static str },
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Input { stage, .. }
            | PipelineError::Sink { stage, .. }
            | PipelineError::StagePanicked { stage } => stage,
        }
    }

    fn input(source: GovernorError) -> Self {
        let stage = match source {
            GovernorError::Decode { .. } => "decode",
            GovernorError::NonMonotonic { .. } => "governor",
        };
        PipelineError::Input {
            stage,
            frame_index: source.frame_index(),
            source,
        }
    }

    fn sink(timestamp: f64, source: io::Error) -> Self {
        PipelineError::Sink {
            stage: "encode",
            timestamp,
            source,
        }
    }
}

/// A shared flag that stops a running session between events.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Set up the Ctrl+C handler to cancel `token`.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler(token: CancelToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        token.cancel();
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    pub frames_read: u64,
    pub frames_dropped: u64,
    pub slots: u64,
    pub repeated_slots: u64,
    pub events_written: u64,
    pub cells_written: u64,
    pub style_cache: CacheStats,
    pub position_cache: CacheStats,
    pub cancelled: bool,
}

impl SessionSummary {
    fn record(&mut self, repeated: bool, event: &Event) {
        self.slots += 1;
        if repeated {
            self.repeated_slots += 1;
        }
        if !event.delta.is_empty() {
            self.events_written += 1;
            self.cells_written += event.delta.len() as u64;
        }
    }
}

/// Per-session rendering state: the quantizer and its caches, the sampler
/// and the previous grid. Nothing is shared between sessions.
#[derive(Debug)]
pub struct Session {
    config: PipelineConfig,
    sampler: CellSampler,
    differ: FrameDiffer,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        let quantizer = Quantizer::new(config.color_depth(), config.style_cache());
        let sampler = CellSampler::new(config.grid(), quantizer, config.position_cache());
        let differ = FrameDiffer::new(config.threshold(), config.metric())
            .with_keyframe_interval(config.keyframe_interval())
            .with_differential(config.differential());
        Self {
            config,
            sampler,
            differ,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Begin a new stream: drop both caches and the diff baseline, so the
    /// next event is a full grid. Returns the grid size.
    pub fn start(&mut self) -> GridSize {
        self.sampler.clear_caches();
        self.differ.reset();
        self.sampler.size()
    }

    /// Render one governed frame. A held frame yields an empty delta.
    pub fn process(&mut self, governed: &GovernedFrame) -> Event {
        let delta = if governed.repeated {
            CellDelta::default()
        } else {
            let grid = self.sampler.sample(&governed.frame);
            self.differ.diff(grid)
        };
        Event {
            index: governed.slot,
            timestamp: governed.timestamp,
            delta,
        }
    }

    /// Render a single frame outside of a governed stream.
    pub fn process_frame(&mut self, index: u64, frame: &Frame) -> Event {
        let grid = self.sampler.sample(frame);
        Event {
            index,
            timestamp: frame.timestamp(),
            delta: self.differ.diff(grid),
        }
    }

    pub fn style_cache_stats(&self) -> CacheStats {
        self.sampler.style_cache_stats()
    }

    pub fn position_cache_stats(&self) -> CacheStats {
        self.sampler.position_cache_stats()
    }
}

/// Run a whole session: pull frames from `source` until it ends (or
/// `cancel` is set) and write the resulting events to `encoder`.
///
/// `encoder.finish` is called even when the session fails or is cancelled;
/// the first error is the one returned.
pub fn run<S, E>(
    config: &PipelineConfig,
    source: S,
    encoder: &mut E,
    cancel: &CancelToken,
) -> Result<SessionSummary, PipelineError>
where
    S: FrameSource + Send,
    E: EventEncoder + ?Sized,
{
    let mut session = Session::new(config.clone());
    let size = session.start();
    info!(
        "starting session: {}x{} cells, {} fps, colors {}, threshold {}, {:?}",
        size.cols,
        size.rows,
        config.fps(),
        config.color_depth(),
        config.threshold(),
        config.execution()
    );

    encoder
        .begin(size)
        .map_err(|e| PipelineError::sink(0.0, e))?;

    let mut summary = SessionSummary::default();
    let result = match config.execution() {
        ExecutionMode::Sequential => run_sequential(session, source, encoder, cancel, &mut summary),
        ExecutionMode::Staged { queue_capacity } => {
            run_staged(session, source, encoder, cancel, queue_capacity, &mut summary)
        }
    };
    let last_time = summary.slots as f64 / config.fps();
    let finished = encoder
        .finish()
        .map_err(|e| PipelineError::sink(last_time, e));
    result?;
    finished?;

    info!(
        "session {}: {} frames read, {} dropped, {} slots ({} held), {} events, {} cells, style cache {:.0}% hits, position cache {:.0}% hits",
        if summary.cancelled { "cancelled" } else { "finished" },
        summary.frames_read,
        summary.frames_dropped,
        summary.slots,
        summary.repeated_slots,
        summary.events_written,
        summary.cells_written,
        summary.style_cache.hit_rate() * 100.0,
        summary.position_cache.hit_rate() * 100.0,
    );
    Ok(summary)
}

fn run_sequential<S, E>(
    mut session: Session,
    source: S,
    encoder: &mut E,
    cancel: &CancelToken,
    summary: &mut SessionSummary,
) -> Result<(), PipelineError>
where
    S: FrameSource,
    E: EventEncoder + ?Sized,
{
    let mut governor = RateGovernor::new(source, session.config().fps());
    let result = drive(&mut governor, &mut session, encoder, cancel, summary);

    summary.frames_read = governor.frames_read();
    summary.frames_dropped = governor.frames_dropped();
    summary.style_cache = session.style_cache_stats();
    summary.position_cache = session.position_cache_stats();
    result
}

fn drive<S, E>(
    governor: &mut RateGovernor<S>,
    session: &mut Session,
    encoder: &mut E,
    cancel: &CancelToken,
    summary: &mut SessionSummary,
) -> Result<(), PipelineError>
where
    S: FrameSource,
    E: EventEncoder + ?Sized,
{
    for item in governor {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        let governed = item.map_err(PipelineError::input)?;
        let event = session.process(&governed);
        summary.record(governed.repeated, &event);
        write_event(encoder, &event)?;
    }
    Ok(())
}

/// What the render stage hands to the encode stage.
struct Rendered {
    repeated: bool,
    event: Event,
}

/// What the render stage reports when it exits.
struct RenderReport {
    session: Session,
    frames_read: u64,
    frames_dropped: u64,
}

fn run_staged<S, E>(
    session: Session,
    source: S,
    encoder: &mut E,
    cancel: &CancelToken,
    queue_capacity: usize,
    summary: &mut SessionSummary,
) -> Result<(), PipelineError>
where
    S: FrameSource + Send,
    E: EventEncoder + ?Sized,
{
    let (frame_tx, frame_rx) = mpsc::sync_channel(queue_capacity);
    let (event_tx, event_rx) = mpsc::sync_channel(queue_capacity);

    thread::scope(|scope| -> Result<(), PipelineError> {
        let decoder = scope.spawn(move || decode_stage(source, frame_tx, cancel));
        let renderer = scope.spawn(move || render_stage(session, frame_rx, event_tx, cancel));

        let result = encode_stage(&event_rx, encoder, cancel, summary);
        // Unblocks the render stage if it is waiting on a full queue.
        drop(event_rx);

        let report = renderer
            .join()
            .map_err(|_| PipelineError::StagePanicked { stage: "render" });
        let decoded = decoder
            .join()
            .map_err(|_| PipelineError::StagePanicked { stage: "decode" });

        if let Ok(report) = &report {
            summary.frames_read = report.frames_read;
            summary.frames_dropped = report.frames_dropped;
            summary.style_cache = report.session.style_cache_stats();
            summary.position_cache = report.session.position_cache_stats();
        }
        result?;
        report?;
        decoded?;
        Ok(())
    })
}

fn decode_stage<S: FrameSource>(
    source: S,
    frames: SyncSender<Result<Frame, DecodeError>>,
    cancel: &CancelToken,
) {
    for item in source {
        let failed = item.is_err();
        if cancel.is_cancelled() || frames.send(item).is_err() || failed {
            break;
        }
    }
    debug!("decode stage finished");
}

fn render_stage(
    mut session: Session,
    frames: Receiver<Result<Frame, DecodeError>>,
    events: SyncSender<Result<Rendered, PipelineError>>,
    cancel: &CancelToken,
) -> RenderReport {
    let mut governor = RateGovernor::new(frames.into_iter(), session.config().fps());
    while let Some(item) = governor.next() {
        if cancel.is_cancelled() {
            break;
        }
        let message = item.map_err(PipelineError::input).map(|governed| Rendered {
            repeated: governed.repeated,
            event: session.process(&governed),
        });
        let failed = message.is_err();
        if events.send(message).is_err() || failed {
            break;
        }
    }
    debug!("render stage finished");
    RenderReport {
        frames_read: governor.frames_read(),
        frames_dropped: governor.frames_dropped(),
        session,
    }
}

fn encode_stage<E: EventEncoder + ?Sized>(
    events: &Receiver<Result<Rendered, PipelineError>>,
    encoder: &mut E,
    cancel: &CancelToken,
    summary: &mut SessionSummary,
) -> Result<(), PipelineError> {
    for message in events.iter() {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        let rendered = message?;
        summary.record(rendered.repeated, &rendered.event);
        write_event(encoder, &rendered.event)?;
    }
    if cancel.is_cancelled() {
        summary.cancelled = true;
    }
    Ok(())
}

fn write_event<E: EventEncoder + ?Sized>(encoder: &mut E, event: &Event) -> Result<(), PipelineError> {
    if event.delta.is_empty() {
        return Ok(());
    }
    debug!(
        "event {} at {:.3}s: {} cells{}",
        event.index,
        event.timestamp,
        event.delta.len(),
        if event.delta.is_full() { " (full)" } else { "" }
    );
    encoder
        .encode(event)
        .map_err(|e| PipelineError::sink(event.timestamp, e))
}
