use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_FRAME_MS, DEFAULT_TICK_LENGTH_MS, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, DEFAULT_WORLD_HEIGHT,
    DEFAULT_WORLD_WIDTH,
};
use crate::error::{EngineError, EngineResult};
use crate::geometry::Color;

/// Prefix of environment variables overriding configuration, e.g. `MACAW_WORLD__WIDTH=1024`.
pub const ENV_PREFIX: &str = "MACAW_";

/// Bounds used by the collision system's border test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "macaw".to_string(),
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one fixed simulation tick.
    pub tick_length_ms: u32,
    /// Upper bound on the frame time fed to the accumulator.
    pub max_frame_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_length_ms: DEFAULT_TICK_LENGTH_MS,
            max_frame_ms: DEFAULT_MAX_FRAME_MS,
        }
    }
}

/// What the render system shows for a Physics entity that has no predicted position yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpredictedPosition {
    /// Draw it at its current position.
    #[default]
    Hold,
    /// Draw it at the world origin.
    SnapToOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: Color,
    pub unpredicted: UnpredictedPosition,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            unpredicted: UnpredictedPosition::default(),
        }
    }
}

/// Optional media used by the demo driver. Missing files only disable the feature using them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub font: Option<PathBuf>,
    pub font_size: u16,
    pub music: Option<PathBuf>,
    pub bounce_sound: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 18,
            music: None,
            bounce_sound: None,
        }
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub window: WindowConfig,
    pub timing: TimingConfig,
    pub render: RenderConfig,
    pub assets: AssetsConfig,
}

impl Config {
    /// Rejects values the systems cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        if self.timing.tick_length_ms == 0 {
            return Err(EngineError::InvalidConfig("timing.tick_length_ms must be positive".to_string()));
        }
        if self.timing.max_frame_ms < self.timing.tick_length_ms {
            return Err(EngineError::InvalidConfig(format!(
                "timing.max_frame_ms ({}) must be at least one tick ({})",
                self.timing.max_frame_ms, self.timing.tick_length_ms
            )));
        }
        if self.world.width == 0 || self.world.height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "world size must be non-zero, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        Ok(())
    }
}

/// Layered figment: built-in defaults, then the optional TOML file, then `MACAW_*` environment variables.
pub fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(file) = file {
        figment = figment.merge(Toml::file(file));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads and validates the configuration.
pub fn load_config(file: Option<&Path>) -> EngineResult<Config> {
    let config: Config = figment(file).extract()?;
    config.validate()?;
    Ok(config)
}
