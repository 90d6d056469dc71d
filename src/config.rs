use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lower::LowerOptions;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Where the user overlay lives unless `--config` names another file.
pub const USER_CONFIG_PATH: &str = "~/.config/shlower/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub channels: ChannelSettings,
    #[serde(default)]
    pub lowering: LoweringSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ChannelSettings {
    #[serde(default)]
    pub first_id: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoweringSettings {
    #[serde(default = "default_true")]
    pub verify_fragments: bool,
}

impl Default for LoweringSettings {
    fn default() -> Self {
        Self {
            verify_fragments: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// How the binary writes lowered IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Empty means stderr.
    #[serde(default)]
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: String::new(),
        }
    }
}

fn default_level() -> String {
    "warn".into()
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    channels: ChannelsOverlay,
    #[serde(default)]
    lowering: LoweringOverlay,
    #[serde(default)]
    output: OutputOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct ChannelsOverlay {
    first_id: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct LoweringOverlay {
    verify_fragments: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputOverlay {
    format: Option<OutputFormat>,
    pretty: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    file: Option<String>,
}

/// Expand a leading `~` or `$VAR`s in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).into_owned()),
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Embedded defaults merged with the user overlay at
    /// [`USER_CONFIG_PATH`], if it exists.
    ///
    /// A malformed overlay is reported on stderr and ignored.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        let path = expand_path(USER_CONFIG_PATH);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return config;
        };
        match toml::from_str(&content) {
            Ok(overlay) => config.apply_overlay(overlay),
            Err(e) => eprintln!("shlower: config parse error in {}: {e}", path.display()),
        }
        config
    }

    /// Embedded defaults merged with an explicitly named overlay file.
    ///
    /// Unlike [`Config::load`], a missing or malformed file is an error.
    pub fn load_from(path: &str) -> Result<Self> {
        let path = expand_path(path);
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::default_config();
        config.apply_overlay_str(&content, &path.display().to_string())?;
        Ok(config)
    }

    fn apply_overlay_str(&mut self, toml_str: &str, origin: &str) -> Result<()> {
        let overlay: ConfigOverlay = toml::from_str(toml_str).map_err(|source| Error::Config {
            path: origin.to_string(),
            source,
        })?;
        self.apply_overlay(overlay);
        Ok(())
    }

    /// Apply an overlay on top of this config. Set scalars override.
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.channels.first_id {
            self.channels.first_id = v;
        }
        if let Some(v) = overlay.lowering.verify_fragments {
            self.lowering.verify_fragments = v;
        }
        if let Some(v) = overlay.output.format {
            self.output.format = v;
        }
        if let Some(v) = overlay.output.pretty {
            self.output.pretty = v;
        }
        if let Some(v) = overlay.logging.level {
            self.logging.level = v;
        }
        if let Some(v) = overlay.logging.file {
            self.logging.file = v;
        }
    }

    /// Options for a lowering run built from this config.
    pub fn lower_options(&self) -> LowerOptions {
        LowerOptions {
            first_channel: self.channels.first_id,
            verify_fragments: self.lowering.verify_fragments,
        }
    }
}
