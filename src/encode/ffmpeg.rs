use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

#[derive(Clone, Debug)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub pix_fmt: String,
    pub crf: u32,
    pub bitrate: Option<String>,
}

/// Raw RGBA frames on stdin, muxed with the source audio.
pub struct FfmpegEncoder {
    child: Child,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, input_audio: &Path, settings: &EncoderSettings) -> Result<Self> {
        let args = build_args(output_path, input_audio, settings);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width,
            settings.height,
            settings.fps,
            settings.codec
        );

        Ok(Self {
            child,
            frames_written: 0,
        })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Close stdin to signal EOF
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete ({} frames)", self.frames_written);
        Ok(())
    }
}

fn build_args(output_path: &Path, input_audio: &Path, s: &EncoderSettings) -> Vec<OsString> {
    let size = format!("{}x{}", s.width, s.height);
    let fps = s.fps.to_string();

    let mut args: Vec<OsString> = [
        "-y",
        "-nostats",
        "-loglevel", "error",
        "-f", "rawvideo",
        "-pixel_format", "rgba",
        "-video_size", size.as_str(),
        "-framerate", fps.as_str(),
        "-i", "pipe:0",
        "-i",
    ]
    .map(OsString::from)
    .into();
    args.push(input_audio.as_os_str().to_owned());
    args.extend(["-c:v", s.codec.as_str(), "-pix_fmt", s.pix_fmt.as_str()].map(OsString::from));

    if let Some(ref br) = s.bitrate {
        args.extend(["-b:v", br.as_str()].map(OsString::from));
    } else {
        let crf = s.crf.to_string();
        args.extend(["-crf", crf.as_str(), "-preset", "medium"].map(OsString::from));
    }

    args.extend(["-c:a", "aac", "-b:a", "192k", "-shortest"].map(OsString::from));
    args.push(output_path.as_os_str().to_owned());

    args
}
