//! Configuration for ansicast.
//!
//! Two layers: [`Config`] is the optional TOML file loaded from
//! `~/.config/ansicast/config.toml` (or `--config`), and [`PipelineConfig`]
//! is the validated set of values a session runs with. Invalid values are
//! rejected when the pipeline config is built, never clamped.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::color::{ColorDepth, DistanceMetric};
use crate::grid::GridSize;
use crate::pipeline::ExecutionMode;

pub const DEFAULT_FPS: f64 = 10.0;
/// Highest output rate whose slots stay distinct at the 4-decimal
/// precision of cast event times.
pub const MAX_FPS: f64 = 1000.0;
pub const DEFAULT_THRESHOLD: f64 = 5.0;
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Configuration file structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: ExecutionConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RenderConfig {
    pub fps: Option<f64>,
    pub threshold: Option<f64>,
    #[serde(default)]
    pub colors: ColorDepth,
    #[serde(default)]
    pub metric: DistanceMetric,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub keyframe_interval: Option<u32>,
    #[serde(default = "default_true")]
    pub differential: bool,
    #[serde(default = "default_true")]
    pub minimize_escapes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: None,
            threshold: None,
            colors: ColorDepth::default(),
            metric: DistanceMetric::default(),
            width: None,
            height: None,
            keyframe_interval: None,
            differential: true,
            minimize_escapes: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub style: bool,
    #[serde(default = "default_true")]
    pub position: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            style: true,
            position: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub staged: bool,
    pub queue_capacity: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Seed a pipeline config builder with the file's values.
    pub fn to_builder(&self) -> PipelineConfigBuilder {
        let mut builder = PipelineConfig::builder()
            .color_depth(self.render.colors)
            .metric(self.render.metric)
            .style_cache(self.cache.style)
            .position_cache(self.cache.position)
            .differential(self.render.differential)
            .minimize_escapes(self.render.minimize_escapes)
            .keyframe_interval(self.render.keyframe_interval);
        if let Some(fps) = self.render.fps {
            builder = builder.fps(fps);
        }
        if let Some(threshold) = self.render.threshold {
            builder = builder.threshold(threshold);
        }
        if self.pipeline.staged {
            builder = builder.execution(ExecutionMode::Staged {
                queue_capacity: self
                    .pipeline
                    .queue_capacity
                    .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            });
        }
        builder
    }
}

/// Write [`DEFAULT_CONFIG_TOML`] to `path`, creating parent directories.
/// Refuses to overwrite an existing file.
pub fn init_file(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML).map_err(write_err)
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ansicast").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/ansicast/config.toml")
        })
}

/// Contents written by `ansicast config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# ansicast configuration

[render]
# Output frames per second (default: source frame rate, or 10)
# fps = 10.0
# Color distance below which a cell is not redrawn (0 = any change)
threshold = 5.0
# Color depth: 16, 256, truecolor
colors = "truecolor"
# Cell distance metric: rgb, lab
metric = "lab"
# Grid size in cells (default: terminal width)
# width = 80
# height = 24
# Redraw the full grid every N frames
# keyframe_interval = 100
# Only redraw changed cells
differential = true
# Skip redundant cursor moves and color codes
minimize_escapes = true

[cache]
style = true
position = true

[pipeline]
# Run decoding and rendering on separate threads
staged = false
queue_capacity = 4
"#;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("failed to write config file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fps must be a finite number greater than 0, got {0}")]
    InvalidFps(f64),

    #[error("fps {fps} is too high, at most {max} frames per second are supported")]
    FpsTooHigh { fps: f64, max: f64 },

    #[error("threshold must be a finite number >= 0, got {0}")]
    InvalidThreshold(f64),

    #[error("grid must have at least one column and one row, got {cols}x{rows}")]
    EmptyGrid { cols: u16, rows: u16 },

    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("keyframe interval must be at least 1")]
    ZeroKeyframeInterval,
}

/// Where session output goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// ANSI bytes straight to the terminal, paced in real time.
    #[default]
    Live,
    /// An asciicast v2 file.
    Record(PathBuf),
}

/// Validated settings for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    fps: f64,
    threshold: f64,
    color_depth: ColorDepth,
    metric: DistanceMetric,
    grid: GridSize,
    style_cache: bool,
    position_cache: bool,
    differential: bool,
    keyframe_interval: Option<NonZeroU32>,
    minimize_escapes: bool,
    output: OutputMode,
    execution: ExecutionMode,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn color_depth(&self) -> ColorDepth {
        self.color_depth
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn style_cache(&self) -> bool {
        self.style_cache
    }

    pub fn position_cache(&self) -> bool {
        self.position_cache
    }

    pub fn differential(&self) -> bool {
        self.differential
    }

    pub fn keyframe_interval(&self) -> Option<NonZeroU32> {
        self.keyframe_interval
    }

    pub fn minimize_escapes(&self) -> bool {
        self.minimize_escapes
    }

    pub fn output(&self) -> &OutputMode {
        &self.output
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }
}

/// Builder for [`PipelineConfig`]. Unset values take their defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    fps: f64,
    threshold: f64,
    color_depth: ColorDepth,
    metric: DistanceMetric,
    grid: GridSize,
    style_cache: bool,
    position_cache: bool,
    differential: bool,
    keyframe_interval: Option<u32>,
    minimize_escapes: bool,
    output: OutputMode,
    execution: ExecutionMode,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            threshold: DEFAULT_THRESHOLD,
            color_depth: ColorDepth::default(),
            metric: DistanceMetric::default(),
            grid: GridSize::new(80, 24),
            style_cache: true,
            position_cache: true,
            differential: true,
            keyframe_interval: None,
            minimize_escapes: true,
            output: OutputMode::default(),
            execution: ExecutionMode::default(),
        }
    }
}

impl PipelineConfigBuilder {
    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    pub fn style_cache(mut self, enabled: bool) -> Self {
        self.style_cache = enabled;
        self
    }

    pub fn position_cache(mut self, enabled: bool) -> Self {
        self.position_cache = enabled;
        self
    }

    pub fn differential(mut self, enabled: bool) -> Self {
        self.differential = enabled;
        self
    }

    /// `None` disables keyframes. `Some(0)` is rejected by `build`.
    pub fn keyframe_interval(mut self, interval: Option<u32>) -> Self {
        self.keyframe_interval = interval;
        self
    }

    pub fn minimize_escapes(mut self, enabled: bool) -> Self {
        self.minimize_escapes = enabled;
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        if self.fps > MAX_FPS {
            return Err(ConfigError::FpsTooHigh {
                fps: self.fps,
                max: MAX_FPS,
            });
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.grid.cols == 0 || self.grid.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.grid.cols,
                rows: self.grid.rows,
            });
        }
        if let ExecutionMode::Staged { queue_capacity: 0 } = self.execution {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        let keyframe_interval = match self.keyframe_interval {
            None => None,
            Some(n) => Some(NonZeroU32::new(n).ok_or(ConfigError::ZeroKeyframeInterval)?),
        };

        Ok(PipelineConfig {
            fps: self.fps,
            threshold: self.threshold,
            color_depth: self.color_depth,
            metric: self.metric,
            grid: self.grid,
            style_cache: self.style_cache,
            position_cache: self.position_cache,
            differential: self.differential,
            keyframe_interval,
            minimize_escapes: self.minimize_escapes,
            output: self.output,
            execution: self.execution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.fps(), DEFAULT_FPS);
        assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
        assert_eq!(config.color_depth(), ColorDepth::TrueColor);
        assert!(config.style_cache());
        assert!(config.position_cache());
        assert_eq!(config.output(), &OutputMode::Live);
        assert_eq!(config.execution(), ExecutionMode::Sequential);
    }

    #[test]
    fn test_rejects_bad_fps() {
        for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = PipelineConfig::builder().fps(fps).build().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidFps(_)));
        }
    }

    #[test]
    fn test_rejects_fps_above_cast_precision() {
        let err = PipelineConfig::builder().fps(20_000.0).build().unwrap_err();
        assert!(matches!(err, ConfigError::FpsTooHigh { max, .. } if max == MAX_FPS));
        assert!(PipelineConfig::builder().fps(MAX_FPS).build().is_ok());
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let err = PipelineConfig::builder().threshold(-0.5).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));
        assert!(err.to_string().contains("-0.5"));
    }

    #[test]
    fn test_zero_threshold_allowed() {
        assert!(PipelineConfig::builder().threshold(0.0).build().is_ok());
    }

    #[test]
    fn test_rejects_empty_grid() {
        let err = PipelineConfig::builder()
            .grid(GridSize::new(0, 10))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid { cols: 0, rows: 10 }));
    }

    #[test]
    fn test_rejects_zero_queue_and_keyframe() {
        let err = PipelineConfig::builder()
            .execution(ExecutionMode::Staged { queue_capacity: 0 })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroQueueCapacity));

        let err = PipelineConfig::builder()
            .keyframe_interval(Some(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroKeyframeInterval));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.render.threshold, Some(5.0));
        assert_eq!(config.render.metric, DistanceMetric::Lab);
        assert!(!config.pipeline.staged);
        assert!(config.to_builder().build().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[render]\ncolors = \"256\"\n").unwrap();
        assert_eq!(config.render.colors, ColorDepth::Xterm256);
        assert!(config.render.differential);
        assert!(config.cache.style);
    }

    #[test]
    fn test_to_builder_staged() {
        let config: Config =
            toml::from_str("[pipeline]\nstaged = true\nqueue_capacity = 2\n").unwrap();
        let built = config.to_builder().build().unwrap();
        assert_eq!(built.execution(), ExecutionMode::Staged { queue_capacity: 2 });
    }

    #[test]
    fn test_init_file_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        init_file(&path).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.render.threshold, Some(DEFAULT_THRESHOLD));

        let err = init_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[render]\nfps = \"fast\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let config = Config::load(Some(Path::new("/nonexistent/ansicast.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
