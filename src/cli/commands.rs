//! Subcommand handlers and small helpers for the binary.

use std::path::Path;

use super::args::ConfigAction;
use crate::config::{self, default_path, Config, ConfigError};

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let file = Config::load(Some(&config_path))?;
            let effective = file.to_builder().build()?;

            println!("Current configuration:");
            match file.render.fps {
                Some(fps) => println!("  FPS: {}", fps),
                None => println!("  FPS: source rate"),
            }
            println!("  Threshold: {}", effective.threshold());
            println!("  Colors: {}", effective.color_depth());
            println!("  Metric: {}", effective.metric());
            println!("  Style cache: {}", yes_no(effective.style_cache()));
            println!("  Position cache: {}", yes_no(effective.position_cache()));
            println!("  Differential: {}", yes_no(effective.differential()));
            match effective.keyframe_interval() {
                Some(n) => println!("  Keyframe interval: {}", n),
                None => println!("  Keyframe interval: off"),
            }
            println!("  Minimize escapes: {}", yes_no(effective.minimize_escapes()));
            println!("  Execution: {:?}", effective.execution());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            config::init_file(&config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Default cast title for an input file.
pub fn default_title(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    format!("ansicast - {}", name)
}

/// Current terminal size as (cols, rows), or 80x24 when not a terminal.
pub fn terminal_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or((80, 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_uses_file_name() {
        assert_eq!(
            default_title(Path::new("/videos/clip.mp4")),
            "ansicast - clip.mp4"
        );
    }

    #[test]
    fn test_config_init_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        handle_config_action(ConfigAction::Init, Some(&path)).unwrap();
        assert!(path.exists());
        handle_config_action(ConfigAction::Show, Some(&path)).unwrap();
        assert!(matches!(
            handle_config_action(ConfigAction::Init, Some(&path)),
            Err(ConfigError::AlreadyExists(_))
        ));
    }
}
