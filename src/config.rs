//! Configuration module for Tusk

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

use crate::date::DateRenderPolicy;
use crate::dispatch::MediaKind;
use crate::error::Error;
use crate::paths;
use crate::router::Router;

/// Prefix marking a value that is the output of a shell command
const CMD_PREFIX: &str = "!CMD!";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Date display
    #[serde(default)]
    pub general: GeneralConfig,

    /// Viewer programs
    #[serde(default)]
    pub media: MediaConfig,

    /// Named programs the user can open a link with
    #[serde(default)]
    pub open_custom: Vec<CustomConfig>,

    /// URL patterns mapped to programs, first match wins
    #[serde(default)]
    pub open_pattern: Vec<PatternConfig>,
}

/// `[general]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// strftime format for dates before today
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// strftime format for dates today
    #[serde(default = "default_date_today_format")]
    pub date_today_format: String,

    /// Relative dates: -1 off, 0 always, n = for posts up to n days old
    #[serde(default = "default_date_relative")]
    pub date_relative: i64,
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_date_today_format() -> String {
    "%H:%M".to_string()
}

fn default_date_relative() -> i64 {
    -1
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            date_today_format: default_date_today_format(),
            date_relative: default_date_relative(),
        }
    }
}

impl GeneralConfig {
    /// Date policy for the formatter
    pub fn date_policy(&self) -> DateRenderPolicy {
        DateRenderPolicy {
            long_format: self.date_format.clone(),
            short_format: self.date_today_format.clone(),
            relative_threshold_days: self.date_relative,
        }
    }
}

/// `[media]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Image viewer
    #[serde(default)]
    pub image: ViewerConfig,
    /// Video player, also used for gifv
    #[serde(default)]
    pub video: ViewerConfig,
    /// Audio player
    #[serde(default)]
    pub audio: ViewerConfig,
    /// Web browser
    #[serde(default)]
    pub link: LinkConfig,
}

impl MediaConfig {
    /// Settings for one kind
    pub const fn viewer(&self, kind: MediaKind) -> &ViewerConfig {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
        }
    }

    fn viewer_mut(&mut self, kind: MediaKind) -> &mut ViewerConfig {
        match kind {
            MediaKind::Image => &mut self.image,
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
        }
    }
}

/// Viewer settings for one media kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Program and fixed arguments, e.g. `mpv --fs`
    #[serde(default = "default_viewer")]
    pub viewer: String,

    /// Run the viewer in Tusk's terminal
    #[serde(default)]
    pub terminal: bool,

    /// One invocation per file instead of one for all files
    #[serde(default = "default_single")]
    pub single: bool,

    /// Pass files in reverse order
    #[serde(default)]
    pub reverse: bool,
}

fn default_viewer() -> String {
    "xdg-open".to_string()
}

fn default_single() -> bool {
    true
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewer: default_viewer(),
            terminal: false,
            single: default_single(),
            reverse: false,
        }
    }
}

/// `[media.link]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Browser and fixed arguments
    #[serde(default = "default_viewer")]
    pub viewer: String,

    /// Run the browser in Tusk's terminal
    #[serde(default)]
    pub terminal: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            viewer: default_viewer(),
            terminal: false,
        }
    }
}

/// One `[[open_custom]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomConfig {
    /// Short label shown in the UI
    pub name: String,
    /// Program and fixed arguments
    pub program: String,
    /// Run in Tusk's terminal
    #[serde(default)]
    pub terminal: bool,
}

/// One `[[open_pattern]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Rule name
    pub name: String,
    /// Glob matched against the whole URL
    pub pattern: String,
    /// Program and fixed arguments
    pub program: String,
    /// Run in Tusk's terminal
    #[serde(default)]
    pub terminal: bool,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    ///
    /// `!CMD!` values are resolved and patterns compiled here, so a bad
    /// config is rejected before anything is opened.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        config.resolve_commands()?;
        config.validate()?;
        tracing::info!(
            "Loaded config with {} pattern rule(s), {} custom opener(s)",
            config.open_pattern.len(),
            config.open_custom.len()
        );
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Check everything that can be checked without running anything
    pub fn validate(&self) -> crate::error::Result<()> {
        check_date_format("date_format", &self.general.date_format)?;
        check_date_format("date_today_format", &self.general.date_today_format)?;
        if self.general.date_relative < -1 {
            return Err(Error::Config(format!(
                "date_relative must be -1 or more, got {}",
                self.general.date_relative
            )));
        }
        for kind in MediaKind::all() {
            crate::launch::split_command(&self.media.viewer(*kind).viewer).map_err(|_| {
                Error::Config(format!("media.{kind}.viewer must name a program"))
            })?;
        }
        Router::from_config(self)?;
        Ok(())
    }

    /// Replace every `!CMD!` value by the output of its command
    fn resolve_commands(&mut self) -> crate::error::Result<()> {
        for kind in MediaKind::all() {
            let viewer = self.media.viewer_mut(*kind);
            viewer.viewer = resolve_value(&viewer.viewer)?;
        }
        self.media.link.viewer = resolve_value(&self.media.link.viewer)?;
        for custom in &mut self.open_custom {
            custom.program = resolve_value(&custom.program)?;
        }
        for pattern in &mut self.open_pattern {
            pattern.program = resolve_value(&pattern.program)?;
        }
        Ok(())
    }
}

fn check_date_format(key: &str, format: &str) -> crate::error::Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!("{key} is not a valid date format: {format}")));
    }
    Ok(())
}

/// Value as written, or the trimmed output of its command if it starts with `!CMD!`
fn resolve_value(value: &str) -> crate::error::Result<String> {
    let Some(command) = value.strip_prefix(CMD_PREFIX) else {
        return Ok(value.to_string());
    };
    let (program, args) = crate::launch::split_command(command)?;
    let output = Command::new(&program)
        .args(&args)
        .output()
        .map_err(|source| Error::Launch {
            program: program.clone(),
            source,
        })?;
    if !output.status.success() {
        return Err(Error::Exited {
            program,
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.general.date_relative, -1);
        assert_eq!(config.media.image.viewer, "xdg-open");
        assert!(config.media.video.single);
        assert!(!config.media.audio.reverse);
        assert!(config.open_pattern.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[general]
date_format = "%d/%m/%Y"
date_relative = 28

[media.image]
viewer = "imv"
single = false
reverse = true

[media.video]
viewer = "mpv --fs"
terminal = true

[[open_custom]]
name = "img"
program = "imv"

[[open_pattern]]
name = "first"
pattern = "*youtube.com/watch*"
program = "mpv"

[[open_pattern]]
name = "second"
pattern = "*youtu.be/*"
program = "mpv"
terminal = true
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.general.date_format, "%d/%m/%Y");
        assert_eq!(config.general.date_today_format, "%H:%M");
        assert_eq!(config.general.date_relative, 28);
        assert!(!config.media.image.single);
        assert!(config.media.image.reverse);
        assert!(config.media.video.terminal);
        assert_eq!(config.media.audio.viewer, "xdg-open");
        // Configured order is preserved
        let names: Vec<_> = config.open_pattern.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(config.open_pattern[1].terminal);
    }

    #[test]
    fn test_bad_pattern_rejected_at_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[[open_pattern]]\nname = \"bad\"\npattern = \"[oops\"\nprogram = \"mpv\"\n",
        )
        .unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad"));
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let mut config = Config::default();
        config.general.date_format = "%Y-%".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.date_relative = -5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_viewer_rejected() {
        let mut config = Config::default();
        config.media.image.viewer = "   ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("media.image.viewer"));

        let mut config = Config::default();
        config.media.audio.viewer = String::new();
        assert!(config.validate().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_cmd_output_rejected_at_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[media.video]\nviewer = \"!CMD!true\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("media.video.viewer"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.media.audio.viewer = "mpv --no-video".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.media.audio.viewer, "mpv --no-video");
    }

    #[test]
    fn test_plain_value_untouched() {
        assert_eq!(resolve_value("mpv --fs").unwrap(), "mpv --fs");
    }

    #[cfg(unix)]
    #[test]
    fn test_cmd_value_resolved() {
        assert_eq!(resolve_value("!CMD!echo imv").unwrap(), "imv");
        assert!(resolve_value("!CMD!false").is_err());
    }
}
