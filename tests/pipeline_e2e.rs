//! End-to-end tests for the frame-to-cast pipeline using synthetic frames.

use ansicast::color::{ColorDepth, DistanceMetric, Rgb};
use ansicast::config::{PipelineConfig, PipelineConfigBuilder};
use ansicast::encoder::{AnsiEncoder, CastEncoder, CastReader, LiveEncoder};
use ansicast::frame::{Frame, VecSource};
use ansicast::grid::GridSize;
use ansicast::pipeline::{run, CancelToken, ExecutionMode, Session, SessionSummary};

const WIDTH: u32 = 32;
const HEIGHT: u32 = 16;

/// A moving diagonal gradient with a bright square.
fn make_frames(count: usize, fps: f64) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let mut frame = Frame::solid(WIDTH, HEIGHT, Rgb::BLACK, i as f64 / fps).unwrap();
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let v = ((x + y) * 8 + i as u32 * 5) % 256;
                    frame.set_pixel(x, y, Rgb::new(v as u8, (255 - v) as u8, (v / 2) as u8));
                }
            }
            let sx = (i as u32 * 3) % (WIDTH - 4);
            for y in 4..8 {
                for x in sx..sx + 4 {
                    frame.set_pixel(x, y, Rgb::WHITE);
                }
            }
            frame
        })
        .collect()
}

fn base() -> PipelineConfigBuilder {
    PipelineConfig::builder()
        .fps(10.0)
        .grid(GridSize::new(16, 4))
        .threshold(5.0)
}

fn record(config: &PipelineConfig, frames: Vec<Frame>) -> (String, SessionSummary) {
    let mut encoder = CastEncoder::new(Vec::new(), AnsiEncoder::new(config.minimize_escapes()))
        .with_title("test")
        .with_timestamp(1_700_000_000);
    let summary = run(config, VecSource::new(frames), &mut encoder, &CancelToken::new()).unwrap();
    (String::from_utf8(encoder.into_inner()).unwrap(), summary)
}

#[test]
fn test_output_is_deterministic() {
    for depth in [ColorDepth::Ansi16, ColorDepth::Xterm256, ColorDepth::TrueColor] {
        let config = base().color_depth(depth).build().unwrap();
        let (a, _) = record(&config, make_frames(12, 10.0));
        let (b, _) = record(&config, make_frames(12, 10.0));
        assert_eq!(a, b, "depth {}", depth);
    }
}

#[test]
fn test_staged_output_matches_sequential() {
    let sequential = base().build().unwrap();
    let staged = base()
        .execution(ExecutionMode::Staged { queue_capacity: 2 })
        .build()
        .unwrap();
    let (a, sa) = record(&sequential, make_frames(20, 25.0));
    let (b, sb) = record(&staged, make_frames(20, 25.0));
    assert_eq!(a, b);
    assert_eq!(sa, sb);
}

#[test]
fn test_first_frame_is_complete_regardless_of_threshold() {
    for threshold in [0.0, 5.0, 1e9] {
        let config = base().threshold(threshold).build().unwrap();
        let mut session = Session::new(config);
        let frames = make_frames(2, 10.0);
        let first = session.process_frame(0, &frames[0]);
        assert!(first.delta.is_full());
        assert_eq!(first.delta.len(), 16 * 4);
    }
}

#[test]
fn test_huge_threshold_suppresses_later_events() {
    let config = base().threshold(1e9).build().unwrap();
    let (cast, summary) = record(&config, make_frames(10, 10.0));
    assert_eq!(summary.events_written, 1);
    assert_eq!(cast.lines().count(), 2);
}

#[test]
fn test_cache_toggles_do_not_change_bytes() {
    for depth in [ColorDepth::Ansi16, ColorDepth::Xterm256] {
        let mut outputs = Vec::new();
        for (style, position) in [(true, true), (true, false), (false, true), (false, false)] {
            let config = base()
                .color_depth(depth)
                .style_cache(style)
                .position_cache(position)
                .build()
                .unwrap();
            outputs.push(record(&config, make_frames(8, 10.0)).0);
        }
        assert!(outputs.windows(2).all(|w| w[0] == w[1]), "depth {}", depth);
    }
}

#[test]
fn test_caches_are_used_when_enabled() {
    let config = base().color_depth(ColorDepth::Xterm256).build().unwrap();
    let (_, summary) = record(&config, make_frames(8, 10.0));
    assert!(summary.position_cache.hits > 0);
    assert!(summary.style_cache.entries > 0);

    let config = base()
        .color_depth(ColorDepth::Xterm256)
        .style_cache(false)
        .position_cache(false)
        .build()
        .unwrap();
    let (_, summary) = record(&config, make_frames(8, 10.0));
    assert_eq!(summary.position_cache.hits, 0);
    assert_eq!(summary.style_cache.entries, 0);
}

#[test]
fn test_no_diff_emits_full_frames() {
    let config = base().differential(false).build().unwrap();
    let mut session = Session::new(config);
    for (i, frame) in make_frames(4, 10.0).iter().enumerate() {
        let event = session.process_frame(i as u64, frame);
        assert!(event.delta.is_full());
        assert_eq!(event.delta.len(), 64);
    }
}

#[test]
fn test_escape_minimization_keeps_rendered_state() {
    // Both forms must leave the same cells on screen; only the bytes differ.
    let minimized = base().build().unwrap();
    let verbose = base().minimize_escapes(false).build().unwrap();
    let (a, sa) = record(&minimized, make_frames(6, 10.0));
    let (b, sb) = record(&verbose, make_frames(6, 10.0));
    assert_eq!(sa.cells_written, sb.cells_written);
    assert!(a.len() < b.len());
}

#[test]
fn test_fast_source_is_resampled() {
    // 30 frames at 30 fps resampled to 10 fps
    let config = base().threshold(0.0).build().unwrap();
    let (cast, summary) = record(&config, make_frames(30, 30.0));
    assert_eq!(summary.frames_read, 30);
    assert!(summary.frames_dropped >= 18);
    let reader = CastReader::new(cast.as_bytes()).unwrap();
    let times: Vec<f64> = reader.map(|e| e.unwrap().time).collect();
    assert!(times.windows(2).all(|w| w[1] > w[0]));
    assert!(times.len() <= 11);
}

#[test]
fn test_live_output_restores_terminal() {
    let config = base().metric(DistanceMetric::Rgb).build().unwrap();
    let mut encoder = LiveEncoder::new(Vec::new(), AnsiEncoder::default());
    run(&config, VecSource::new(make_frames(3, 10.0)), &mut encoder, &CancelToken::new()).unwrap();
    let out = String::from_utf8(encoder.into_inner()).unwrap();
    assert!(out.starts_with("\x1b[2J\x1b[H\x1b[?25l"));
    assert!(out.ends_with("\x1b[0m\x1b[?25h\x1b[5;1H"));
}

#[test]
fn test_empty_source_writes_only_header() {
    let config = base().build().unwrap();
    let (cast, summary) = record(&config, Vec::new());
    assert_eq!(cast.lines().count(), 1);
    assert_eq!(summary, SessionSummary::default());
}
