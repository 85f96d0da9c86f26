use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{CommandFactory, Parser};

use ansicast::cli::{default_title, handle_config_action, terminal_size, Args, Command};
use ansicast::config::{Config, OutputMode, DEFAULT_FPS, MAX_FPS};
use ansicast::encoder::{control, AnsiEncoder, CastEncoder, CastReader, EventEncoder, LiveEncoder};
use ansicast::frame::{probe_dimensions, FfmpegSettings, FfmpegSource};
use ansicast::grid::{fit_grid, DEFAULT_CHAR_ASPECT_RATIO};
use ansicast::pipeline::{run, setup_ctrlc_handler, CancelToken};
use ansicast::player::{replay_cast, Pacer};

fn main() {
    let args = Args::parse();

    if let Some(Command::Config { action }) = &args.command {
        if let Err(e) = handle_config_action(action.clone(), args.config.as_deref()) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let Some(input) = args.input.clone() else {
        let _ = Args::command().print_help();
        std::process::exit(2);
    };

    let cancel = CancelToken::new();
    if let Err(e) = setup_ctrlc_handler(cancel.clone()) {
        eprintln!("Warning: failed to set Ctrl+C handler: {}", e);
    }

    let result = if is_cast(&input) {
        replay(&input, &args, &cancel)
    } else {
        play(&input, &args, &cancel)
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn is_cast(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cast"))
}

/// Replay an existing recording to the terminal.
fn replay(input: &Path, args: &Args, cancel: &CancelToken) -> Result<(), Box<dyn Error>> {
    let reader = CastReader::new(BufReader::new(File::open(input)?))?;
    let rows = reader.header().height;
    let pacer = (!args.no_pacing).then(Pacer::new);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = replay_cast(reader, &mut out, pacer, cancel);
    out.write_all(control::restore(rows).as_bytes())?;
    out.flush()?;
    let events = result?;
    log::info!("replayed {} events from {}", events, input.display());
    Ok(())
}

/// Decode a video with ffmpeg and play or record it.
fn play(input: &Path, args: &Args, cancel: &CancelToken) -> Result<(), Box<dyn Error>> {
    let file = Config::load(args.config.as_deref())?;
    let (src_width, src_height, src_rate) = probe_dimensions(input)?;

    let recording = args.output.is_some();
    let (term_cols, term_rows) = terminal_size();
    let max_cols = args.width.or(file.render.width).unwrap_or(term_cols);
    let max_rows = args
        .height
        .or(file.render.height)
        .unwrap_or(if recording {
            u16::MAX
        } else {
            term_rows.saturating_sub(1).max(1)
        });
    let grid = fit_grid(src_width, src_height, max_cols, max_rows, DEFAULT_CHAR_ASPECT_RATIO);

    let mut builder = file.to_builder().grid(grid);
    if args.fps.is_none() && file.render.fps.is_none() {
        let rate = if src_rate.is_finite() && src_rate > 0.0 {
            src_rate.min(MAX_FPS)
        } else {
            DEFAULT_FPS
        };
        builder = builder.fps(rate);
    }
    if let Some(path) = &args.output {
        builder = builder.output(OutputMode::Record(path.clone()));
    }
    let config = args.apply(builder).build()?;

    let source = FfmpegSource::spawn(&FfmpegSettings {
        input: input.to_path_buf(),
        width: u32::from(grid.cols) * 2,
        height: u32::from(grid.rows) * 4,
        rate: config.fps(),
    })?;
    let ansi = AnsiEncoder::new(config.minimize_escapes());

    let mut encoder: Box<dyn EventEncoder> = match config.output() {
        OutputMode::Live => {
            let live = LiveEncoder::new(BufWriter::new(io::stdout()), ansi);
            if args.no_pacing {
                Box::new(live)
            } else {
                Box::new(live.with_pacer(Pacer::new()))
            }
        }
        OutputMode::Record(path) => {
            let title = args.title.clone().unwrap_or_else(|| default_title(input));
            let mut cast = CastEncoder::new(BufWriter::new(File::create(path)?), ansi).with_title(title);
            if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
                cast = cast.with_timestamp(now.as_secs());
            }
            Box::new(cast)
        }
    };

    let summary = run(&config, source, &mut encoder, cancel)?;
    if let OutputMode::Record(path) = config.output() {
        eprintln!(
            "Recorded {} events ({} cells) to {}",
            summary.events_written,
            summary.cells_written,
            path.display()
        );
    }
    Ok(())
}
