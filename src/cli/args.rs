//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Colors, Metric};
use crate::config::{PipelineConfigBuilder, DEFAULT_QUEUE_CAPACITY};
use crate::pipeline::ExecutionMode;

/// Play a video as colored terminal cells, or record it as an asciicast file
#[derive(Parser, Debug)]
#[command(name = "ansicast")]
#[command(version, about = "Video to terminal cells, live or as asciicast recordings", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video file to play, or a .cast file to replay
    pub input: Option<PathBuf>,

    /// Record to this .cast file instead of playing in the terminal
    pub output: Option<PathBuf>,

    /// Maximum grid width in cells (default: terminal width)
    #[arg(short, long)]
    pub width: Option<u16>,

    /// Maximum grid height in cells (default: terminal height)
    #[arg(long)]
    pub height: Option<u16>,

    /// Output frames per second (default: source frame rate)
    #[arg(short, long)]
    pub fps: Option<f64>,

    /// Color distance a cell must exceed to be redrawn (0 = any change)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Color depth
    #[arg(long)]
    pub colors: Option<Colors>,

    /// Distance metric for cell changes
    #[arg(long)]
    pub metric: Option<Metric>,

    /// Disable the RGB to palette lookup cache
    #[arg(long)]
    pub no_style_cache: bool,

    /// Disable the cell style lookup cache
    #[arg(long)]
    pub no_position_cache: bool,

    /// Redraw every cell on every frame
    #[arg(long)]
    pub no_diff: bool,

    /// Redraw the full grid every N frames
    #[arg(long)]
    pub keyframe_interval: Option<u32>,

    /// Write a cursor move and full colors for every cell
    #[arg(long)]
    pub no_minimize: bool,

    /// Decode and render on separate threads
    #[arg(long)]
    pub staged: bool,

    /// Frames buffered between stages with --staged
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Recording title (default: "ansicast - <input file>")
    #[arg(long)]
    pub title: Option<String>,

    /// Write as fast as possible instead of in real time
    #[arg(long)]
    pub no_pacing: bool,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply(&self, mut builder: PipelineConfigBuilder) -> PipelineConfigBuilder {
        if let Some(fps) = self.fps {
            builder = builder.fps(fps);
        }
        if let Some(threshold) = self.threshold {
            builder = builder.threshold(threshold);
        }
        if let Some(colors) = self.colors {
            builder = builder.color_depth(colors.into());
        }
        if let Some(metric) = self.metric {
            builder = builder.metric(metric.into());
        }
        if self.no_style_cache {
            builder = builder.style_cache(false);
        }
        if self.no_position_cache {
            builder = builder.position_cache(false);
        }
        if self.no_diff {
            builder = builder.differential(false);
        }
        if self.keyframe_interval.is_some() {
            builder = builder.keyframe_interval(self.keyframe_interval);
        }
        if self.no_minimize {
            builder = builder.minimize_escapes(false);
        }
        if self.staged || self.queue_capacity.is_some() {
            builder = builder.execution(ExecutionMode::Staged {
                queue_capacity: self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
            });
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorDepth, DistanceMetric};
    use crate::config::PipelineConfig;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["ansicast", "video.mp4"]);
        assert_eq!(args.input, Some(PathBuf::from("video.mp4")));
        assert!(args.output.is_none());
        assert!(args.fps.is_none());
        assert!(args.threshold.is_none());
        assert!(args.colors.is_none());
        assert!(!args.no_style_cache);
        assert!(!args.no_position_cache);
        assert!(!args.no_diff);
        assert!(!args.staged);
        assert!(args.config.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_args_output_positional() {
        let args = Args::parse_from(["ansicast", "in.mkv", "out.cast"]);
        assert_eq!(args.output, Some(PathBuf::from("out.cast")));
    }

    #[test]
    fn test_args_short_flags() {
        let args = Args::parse_from(["ansicast", "in.mp4", "-w", "120", "-f", "24", "-t", "0"]);
        assert_eq!(args.width, Some(120));
        assert_eq!(args.fps, Some(24.0));
        assert_eq!(args.threshold, Some(0.0));
    }

    #[test]
    fn test_args_colors_values() {
        let args = Args::parse_from(["ansicast", "in.mp4", "--colors", "16"]);
        assert_eq!(args.colors, Some(Colors::Ansi16));

        let args = Args::parse_from(["ansicast", "in.mp4", "--colors", "256"]);
        assert_eq!(args.colors, Some(Colors::Xterm256));

        let args = Args::parse_from(["ansicast", "in.mp4", "--colors", "truecolor"]);
        assert_eq!(args.colors, Some(Colors::Truecolor));
    }

    #[test]
    fn test_args_config_show_subcommand() {
        let args = Args::parse_from(["ansicast", "config", "show"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Show,
            }) => (),
            _ => panic!("Expected Config Show subcommand"),
        }
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["ansicast", "config", "init"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Init,
            }) => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }

    #[test]
    fn test_apply_overrides() {
        let args = Args::parse_from([
            "ansicast",
            "in.mp4",
            "--fps",
            "15",
            "--colors",
            "256",
            "--metric",
            "rgb",
            "--no-style-cache",
            "--no-diff",
            "--queue-capacity",
            "3",
        ]);
        let config = args.apply(PipelineConfig::builder()).build().unwrap();
        assert_eq!(config.fps(), 15.0);
        assert_eq!(config.color_depth(), ColorDepth::Xterm256);
        assert_eq!(config.metric(), DistanceMetric::Rgb);
        assert!(!config.style_cache());
        assert!(config.position_cache());
        assert!(!config.differential());
        assert_eq!(config.execution(), ExecutionMode::Staged { queue_capacity: 3 });
    }

    #[test]
    fn test_apply_keeps_unset_values() {
        let args = Args::parse_from(["ansicast", "in.mp4"]);
        let builder = PipelineConfig::builder().threshold(12.0);
        let config = args.apply(builder).build().unwrap();
        assert_eq!(config.threshold(), 12.0);
    }
}
