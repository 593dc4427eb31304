use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::DEFAULT_FRAME_SIZE;
use crate::render::camera::CameraMode;
use crate::render::scene::DEFAULT_BAR_SCALE;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub camera: CameraMode,
    #[serde(default = "default_bar_scale")]
    pub bar_scale: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            camera: CameraMode::default(),
            bar_scale: default_bar_scale(),
        }
    }
}

fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_fps() -> u32 { 60 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }
fn default_frame_size() -> usize { DEFAULT_FRAME_SIZE }
fn default_bar_scale() -> f32 { DEFAULT_BAR_SCALE }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `./bandviz.toml`, then `~/.config/bandviz/config.toml`, then the platform config dir.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from("bandviz.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("bandviz").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("bandviz").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
