//! Live terminal output.

use std::io::{self, Write};

use log::debug;

use crate::grid::GridSize;
use crate::player::Pacer;

use super::ansi::AnsiEncoder;
use super::control;
use super::{Event, EventEncoder};

/// Writes events straight to a terminal as ANSI bytes.
///
/// The screen is cleared and the cursor hidden on `begin`; `finish`
/// restores attributes and the cursor below the picture. With a pacer,
/// each event waits until its timestamp.
pub struct LiveEncoder<W: Write> {
    out: W,
    ansi: AnsiEncoder,
    pacer: Option<Pacer>,
    size: Option<GridSize>,
    buf: String,
    finished: bool,
}

impl<W: Write> LiveEncoder<W> {
    pub fn new(out: W, ansi: AnsiEncoder) -> Self {
        Self {
            out,
            ansi,
            pacer: None,
            size: None,
            buf: String::new(),
            finished: false,
        }
    }

    /// Pace writes to wall-clock time.
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventEncoder for LiveEncoder<W> {
    fn begin(&mut self, size: GridSize) -> io::Result<()> {
        self.size = Some(size);
        self.finished = false;
        self.out.write_all(control::SETUP.as_bytes())?;
        self.out.flush()
    }

    fn encode(&mut self, event: &Event) -> io::Result<()> {
        if event.delta.is_empty() {
            return Ok(());
        }
        if let Some(pacer) = self.pacer.as_mut() {
            pacer
                .wait_until(event.timestamp)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        }
        self.buf.clear();
        self.ansi.encode_into(&event.delta, &mut self.buf);
        debug!(
            "event {} at {:.3}s: {} cells, {} bytes",
            event.index,
            event.timestamp,
            event.delta.len(),
            self.buf.len()
        );
        self.out.write_all(self.buf.as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let rows = self.size.map(|s| s.rows).unwrap_or(0);
        self.out.write_all(control::restore(rows).as_bytes())?;
        self.out.flush()
    }
}
