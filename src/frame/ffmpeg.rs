//! ffmpeg-backed frame source.
//!
//! Decoding stays inside ffmpeg: the child process is asked for raw RGB24
//! frames on stdout, and this module only slices that byte stream into
//! [`Frame`]s with timestamps derived from the output frame rate.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use super::source::DecodeError;
use super::types::{Frame, BYTES_PER_PIXEL};

/// Settings for an ffmpeg decode.
#[derive(Debug, Clone)]
pub struct FfmpegSettings {
    /// Input video path or URL understood by ffmpeg
    pub input: PathBuf,
    /// Output frame width in pixels
    pub width: u32,
    /// Output frame height in pixels
    pub height: u32,
    /// Frame rate ffmpeg should emit at. Timestamps are `index / rate`.
    pub rate: f64,
}

/// Frames decoded by an ffmpeg child process.
pub struct FfmpegSource {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr_thread: Option<JoinHandle<Vec<String>>>,
    width: u32,
    height: u32,
    rate: f64,
    index: u64,
    finished: bool,
}

impl FfmpegSource {
    /// Spawn ffmpeg for the given settings.
    pub fn spawn(settings: &FfmpegSettings) -> Result<Self, DecodeError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(DecodeError::Other(format!(
                "invalid decode size {}x{}",
                settings.width, settings.height
            )));
        }
        if !(settings.rate.is_finite() && settings.rate > 0.0) {
            return Err(DecodeError::Other(format!(
                "invalid decode rate {}",
                settings.rate
            )));
        }

        let args = build_ffmpeg_args(settings);
        log::debug!("spawning ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DecodeError::FfmpegNotFound
                } else {
                    DecodeError::SpawnFailed(e)
                }
            })?;

        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                drain_stderr(BufReader::new(stderr), |l| eprintln!("[ffmpeg] {}", l))
            })
        });
        let stdout = child.stdout.take();

        Ok(Self {
            child,
            stdout,
            stderr_thread,
            width: settings.width,
            height: settings.height,
            rate: settings.rate,
            index: 0,
            finished: false,
        })
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// Called once stdout is drained: reap the child and report failures.
    fn finish(&mut self) -> Option<Result<Frame, DecodeError>> {
        self.finished = true;
        self.stdout = None;
        let status = match self.child.wait() {
            Ok(status) => status,
            Err(e) => return Some(Err(DecodeError::Io(e))),
        };
        let stderr = self
            .stderr_thread
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        if status.success() {
            None
        } else {
            Some(Err(DecodeError::ProcessFailed {
                exit_code: status.code(),
                stderr: stderr.join("\n"),
            }))
        }
    }
}

impl Iterator for FfmpegSource {
    type Item = Result<Frame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let len = self.frame_len();
        let Some(stdout) = self.stdout.as_mut() else {
            return self.finish();
        };

        let mut buf = vec![0u8; len];
        match read_full(stdout, &mut buf) {
            Ok(n) if n == len => {
                let timestamp = self.index as f64 / self.rate;
                self.index += 1;
                match Frame::new(buf, self.width, self.height, timestamp) {
                    Ok(frame) => Some(Ok(frame)),
                    Err(e) => {
                        self.finished = true;
                        Some(Err(e.into()))
                    }
                }
            }
            Ok(n) => {
                if n > 0 {
                    log::warn!("discarding truncated trailing frame ({} of {} bytes)", n, len);
                }
                self.finish()
            }
            Err(e) => {
                self.finished = true;
                Some(Err(DecodeError::Io(e)))
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Pass each decoder stderr line to `emit` and keep them for error reports.
fn drain_stderr<R: BufRead>(reader: R, mut emit: impl FnMut(&str)) -> Vec<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        match line {
            Ok(l) => {
                emit(&l);
                lines.push(l);
            }
            Err(_) => break,
        }
    }
    lines
}

/// Read until `buf` is full or EOF. Returns the number of bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Build the ffmpeg argument list for a raw RGB24 decode to stdout.
pub fn build_ffmpeg_args(settings: &FfmpegSettings) -> Vec<String> {
    vec![
        "-loglevel".into(),
        "error".into(),
        "-nostdin".into(),
        "-i".into(),
        settings.input.to_string_lossy().into_owned(),
        "-an".into(),
        "-vf".into(),
        format!(
            "fps={},scale={}:{}",
            settings.rate, settings.width, settings.height
        ),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-".into(),
    ]
}

/// Ask ffprobe for the first video stream's `(width, height, frame rate)`.
pub fn probe_dimensions(input: &Path) -> Result<(u32, u32, f64), DecodeError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "csv=p=0",
        ])
        .arg(input)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DecodeError::FfmpegNotFound
            } else {
                DecodeError::SpawnFailed(e)
            }
        })?;

    if !output.status.success() {
        return Err(DecodeError::ProcessFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `width,height,num/den` as printed by ffprobe.
pub fn parse_probe_output(text: &str) -> Result<(u32, u32, f64), DecodeError> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| DecodeError::Probe("no video stream found".into()))?;
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 3 {
        return Err(DecodeError::Probe(format!("unexpected ffprobe output '{}'", line)));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| DecodeError::Probe(format!("invalid width '{}'", parts[0])))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| DecodeError::Probe(format!("invalid height '{}'", parts[1])))?;
    let rate = parse_rate(parts[2])
        .ok_or_else(|| DecodeError::Probe(format!("invalid frame rate '{}'", parts[2])))?;
    Ok((width, height, rate))
}

fn parse_rate(s: &str) -> Option<f64> {
    let rate = match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => s.trim().parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
