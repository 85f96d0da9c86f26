//! ansicast library crate.
//!
//! Turns a stream of decoded RGB frames into terminal cell updates, written
//! either as live ANSI output or as an asciicast v2 recording.

pub mod cache;
pub mod cli;
pub mod color;
pub mod config;
pub mod diff;
pub mod encoder;
pub mod frame;
pub mod governor;
pub mod grid;
pub mod pipeline;
pub mod player;
