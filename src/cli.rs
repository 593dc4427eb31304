use clap::Parser;
use std::path::PathBuf;

use bandviz::config::Config;
use bandviz::render::camera::CameraMode;

#[derive(Parser, Debug)]
#[command(name = "bandviz", about = "Five-band 3D audio visualizer")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Config file (defaults to bandviz.toml or ~/.config/bandviz/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per analysis frame
    #[arg(long, default_value_t = 4096)]
    pub frame_size: usize,

    /// Camera used to view the bars
    #[arg(long, value_enum, default_value_t = CameraMode::Spherical)]
    pub camera: CameraMode,

    /// Height of a bar at its band's peak
    #[arg(long, default_value_t = 10.0)]
    pub bar_scale: f32,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Write the band analysis as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Stop after analysis (and export); do not render
    #[arg(long)]
    pub analyze_only: bool,
}

impl Cli {
    /// Apply config values wherever the CLI was left at its default.
    pub fn merge_config(&mut self, cfg: Config) {
        if self.width == 1280 { self.width = cfg.output.width; }
        if self.height == 720 { self.height = cfg.output.height; }
        if self.fps == 60 { self.fps = cfg.output.fps; }
        if self.crf == 18 { self.crf = cfg.output.crf; }
        if self.codec == "libx264" { self.codec = cfg.output.codec; }
        if self.frame_size == 4096 { self.frame_size = cfg.analysis.frame_size; }
        if self.camera == CameraMode::Spherical { self.camera = cfg.render.camera; }
        if self.bar_scale == 10.0 { self.bar_scale = cfg.render.bar_scale; }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_size == 0 {
            anyhow::bail!("--frame-size must be at least 1");
        }
        if self.fps == 0 {
            anyhow::bail!("--fps must be at least 1");
        }
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("Output size must be non-zero, got {}x{}", self.width, self.height);
        }
        Ok(())
    }
}
