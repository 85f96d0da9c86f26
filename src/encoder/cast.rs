//! asciicast v2 recording format.
//!
//! A cast is a JSON header line followed by one `[time, "o", data]` array
//! per line, where `data` is the ANSI output written at `time` seconds.

use std::io::{self, BufRead, Write};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::GridSize;
use crate::player::PaceError;

use super::ansi::AnsiEncoder;
use super::control;
use super::{Event, EventEncoder};

/// The only asciicast version read or written.
pub const CAST_VERSION: u8 = 2;

/// The header line of a cast file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastHeader {
    pub version: u8,
    pub width: u16,
    pub height: u16,
    /// Unix time the recording started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CastHeader {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            version: CAST_VERSION,
            width,
            height,
            timestamp: None,
            title: None,
        }
    }
}

/// Records events as an asciicast v2 stream.
///
/// The header is written on `begin` with the grid size. The first written
/// event carries the screen setup sequence. Empty deltas are not recorded.
pub struct CastEncoder<W: Write> {
    out: W,
    ansi: AnsiEncoder,
    title: Option<String>,
    timestamp: Option<u64>,
    prelude_pending: bool,
    last_time: f64,
    buf: String,
    events_written: u64,
}

impl<W: Write> CastEncoder<W> {
    pub fn new(out: W, ansi: AnsiEncoder) -> Self {
        Self {
            out,
            ansi,
            title: None,
            timestamp: None,
            prelude_pending: true,
            last_time: 0.0,
            buf: String::new(),
            events_written: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Unix start time stored in the header. Left out when unset.
    pub fn with_timestamp(mut self, unix_seconds: u64) -> Self {
        self.timestamp = Some(unix_seconds);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write> EventEncoder for CastEncoder<W> {
    fn begin(&mut self, size: GridSize) -> io::Result<()> {
        let header = CastHeader {
            timestamp: self.timestamp,
            title: self.title.clone(),
            ..CastHeader::new(size.cols, size.rows)
        };
        self.prelude_pending = true;
        self.last_time = 0.0;
        self.write_line(&header)
    }

    fn encode(&mut self, event: &Event) -> io::Result<()> {
        if event.delta.is_empty() {
            return Ok(());
        }
        self.buf.clear();
        if self.prelude_pending {
            self.buf.push_str(control::SETUP);
            self.prelude_pending = false;
        }
        self.ansi.encode_into(&event.delta, &mut self.buf);

        let time = round_time(event.timestamp).max(self.last_time);
        self.last_time = time;
        let data = std::mem::take(&mut self.buf);
        let result = self.write_line(&(time, "o", data.as_str()));
        self.buf = data;
        result?;
        self.events_written += 1;
        debug!(
            "cast event #{} (slot {}) at {time}s: {} cells",
            self.events_written,
            event.index,
            event.delta.len()
        );
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Round to the 4 decimal places stored in casts.
fn round_time(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}

#[derive(Debug, thiserror::Error)]
pub enum CastError {
    #[error("cast I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cast is empty, expected a header line")]
    MissingHeader,

    #[error("invalid cast header: {0}")]
    Header(#[source] serde_json::Error),

    #[error("unsupported cast version {0}, expected {CAST_VERSION}")]
    UnsupportedVersion(u8),

    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: time {time} is earlier than previous event at {previous}")]
    NonMonotonic { line: usize, previous: f64, time: f64 },

    #[error(transparent)]
    Pacing(#[from] PaceError),
}

/// One output event read from a cast.
#[derive(Debug, Clone, PartialEq)]
pub struct CastEvent {
    pub time: f64,
    pub data: String,
}

/// Reads a cast: the header up front, then output events on iteration.
/// Events of other types are skipped.
pub struct CastReader<R> {
    reader: R,
    header: CastHeader,
    line: usize,
    last_time: f64,
    failed: bool,
}

impl<R: BufRead> CastReader<R> {
    pub fn new(mut reader: R) -> Result<Self, CastError> {
        let mut first = String::new();
        if reader.read_line(&mut first)? == 0 || first.trim().is_empty() {
            return Err(CastError::MissingHeader);
        }
        let header: CastHeader = serde_json::from_str(first.trim()).map_err(CastError::Header)?;
        if header.version != CAST_VERSION {
            return Err(CastError::UnsupportedVersion(header.version));
        }
        Ok(Self {
            reader,
            header,
            line: 1,
            last_time: 0.0,
            failed: false,
        })
    }

    pub fn header(&self) -> &CastHeader {
        &self.header
    }

    fn read_event(&mut self) -> Result<Option<CastEvent>, CastError> {
        let mut text = String::new();
        loop {
            text.clear();
            if self.reader.read_line(&mut text)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(event) = self.parse_line(trimmed)? {
                return Ok(Some(event));
            }
        }
    }

    fn parse_line(&mut self, text: &str) -> Result<Option<CastEvent>, CastError> {
        let line = self.line;
        let malformed = |reason: &str| CastError::Malformed {
            line,
            reason: reason.to_string(),
        };

        let value: Value =
            serde_json::from_str(text).map_err(|source| CastError::Json { line, source })?;
        let items = value
            .as_array()
            .ok_or_else(|| malformed("event is not a JSON array"))?;
        if items.len() != 3 {
            return Err(malformed("event must have exactly 3 elements"));
        }
        let time = items[0]
            .as_f64()
            .ok_or_else(|| malformed("event time is not a number"))?;
        let kind = items[1]
            .as_str()
            .ok_or_else(|| malformed("event type is not a string"))?;
        let data = items[2]
            .as_str()
            .ok_or_else(|| malformed("event data is not a string"))?;

        if time < self.last_time {
            return Err(CastError::NonMonotonic {
                line,
                previous: self.last_time,
                time,
            });
        }
        self.last_time = time;

        if kind != "o" {
            return Ok(None);
        }
        Ok(Some(CastEvent {
            time,
            data: data.to_string(),
        }))
    }
}

impl<R: BufRead> Iterator for CastReader<R> {
    type Item = Result<CastEvent, CastError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_event() {
            Ok(event) => event.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
