//! Real-time pacing and cast replay.

use std::io::{BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::encoder::{CastError, CastReader};
use crate::pipeline::CancelToken;

/// Lag beyond which falling behind real time is logged.
const LAG_WARN_THRESHOLD: Duration = Duration::from_millis(250);

/// A timestamp too far in the future to schedule on the monotonic clock.
#[derive(Debug, thiserror::Error)]
#[error("timestamp {0}s is out of range for real-time playback")]
pub struct PaceError(pub f64);

/// Sleeps until stream timestamps line up with wall-clock time.
///
/// The clock starts at the first `wait_until` call. When playback is
/// already late, the call returns immediately; events are never skipped.
#[derive(Debug, Default)]
pub struct Pacer {
    start: Option<Instant>,
    lagging: bool,
}

impl Pacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `timestamp` seconds after the clock started.
    pub fn wait_until(&mut self, timestamp: f64) -> Result<(), PaceError> {
        let start = *self.start.get_or_insert_with(Instant::now);
        let offset =
            Duration::try_from_secs_f64(timestamp.max(0.0)).map_err(|_| PaceError(timestamp))?;
        let target = start.checked_add(offset).ok_or(PaceError(timestamp))?;
        let now = Instant::now();

        if target > now {
            self.lagging = false;
            thread::sleep(target - now);
            return Ok(());
        }

        let lag = now - target;
        if lag > LAG_WARN_THRESHOLD && !self.lagging {
            warn!("playback is {:.0}ms behind real time", lag.as_secs_f64() * 1000.0);
            self.lagging = true;
        }
        Ok(())
    }
}

/// Replay the output events of a cast to `out`. Returns the number of
/// events written.
pub fn replay_cast<R: BufRead, W: Write>(
    reader: CastReader<R>,
    out: &mut W,
    mut pacer: Option<Pacer>,
    cancel: &CancelToken,
) -> Result<u64, CastError> {
    let header = reader.header().clone();
    info!(
        "replaying {}x{} cast{}",
        header.width,
        header.height,
        header.title.map(|t| format!(" \"{t}\"")).unwrap_or_default()
    );

    let mut written = 0;
    for event in reader {
        if cancel.is_cancelled() {
            info!("replay cancelled after {written} events");
            break;
        }
        let event = event?;
        if let Some(pacer) = pacer.as_mut() {
            pacer.wait_until(event.time)?;
        }
        out.write_all(event.data.as_bytes())?;
        out.flush()?;
        written += 1;
    }
    Ok(written)
}
