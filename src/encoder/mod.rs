//! Event serialization to terminal sinks.
//!
//! This module provides:
//! - ANSI rendering of cell deltas via [`AnsiEncoder`]
//! - Direct terminal output via [`LiveEncoder`]
//! - asciicast v2 recording via [`CastEncoder`] and reading via [`CastReader`]

mod ansi;
mod cast;
pub mod control;
mod live;

use std::io;

use crate::diff::CellDelta;
use crate::grid::GridSize;

pub use ansi::AnsiEncoder;
pub use cast::{CastEncoder, CastError, CastEvent, CastHeader, CastReader, CAST_VERSION};
pub use live::LiveEncoder;

/// A cell delta with its emission time, the unit written to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Output slot the event was produced for.
    pub index: u64,
    /// Seconds from stream start.
    pub timestamp: f64,
    pub delta: CellDelta,
}

/// A sink-facing serializer of events.
///
/// `begin` is called once before the first event, `finish` once after the
/// last one (also after cancellation). Sink errors are returned as-is and
/// never retried.
pub trait EventEncoder {
    fn begin(&mut self, size: GridSize) -> io::Result<()>;
    fn encode(&mut self, event: &Event) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;
}

impl<E: EventEncoder + ?Sized> EventEncoder for Box<E> {
    fn begin(&mut self, size: GridSize) -> io::Result<()> {
        (**self).begin(size)
    }

    fn encode(&mut self, event: &Event) -> io::Result<()> {
        (**self).encode(event)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
