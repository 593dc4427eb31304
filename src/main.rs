mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use bandviz::audio::analysis::SpectralAnalyzer;
use bandviz::audio::bands::BAND_COUNT;
use bandviz::audio::clock::{FrameClock, PlaybackClock};
use bandviz::config;
use bandviz::encode::ffmpeg::{EncoderSettings, FfmpegEncoder};
use bandviz::export;
use bandviz::render::camera::Camera;
use bandviz::render::frame::FrameRenderer;
use bandviz::render::gpu::GpuContext;
use bandviz::render::pipeline::{BarPipeline, BarUniforms};
use bandviz::render::scene::{bar_heights, build_uniforms};
use bandviz::sync::{SyncState, VisualSync};
use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = cli.config.clone().or_else(config::discover_config) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            cli.merge_config(cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    cli.validate()?;

    log::info!("bandviz - five-band audio visualizer");
    log::info!("Input: {}", cli.input.display());

    // 1. Decode + analyze (one blocking pass before any rendering)
    let mut analyzer = SpectralAnalyzer::open(&cli.input, cli.frame_size)
        .with_context(|| format!("Failed to load audio from {}", cli.input.display()))?;
    analyzer.analyze();

    if let Some(ref path) = cli.export {
        export::write_json(&analyzer, path)?;
    }

    if cli.analyze_only {
        log::info!("Analysis only; skipping render");
        return Ok(());
    }

    render_video(&cli, &analyzer)
}

fn render_video(cli: &Cli, analyzer: &SpectralAnalyzer) -> Result<()> {
    let duration = analyzer.duration();
    let total_frames = (duration * cli.fps as f32).ceil() as u64;

    log::info!("Output: {}", cli.output.display());
    log::info!(
        "Resolution: {}x{} @ {}fps, {} frames, camera {:?}",
        cli.width,
        cli.height,
        cli.fps,
        total_frames,
        cli.camera
    );

    // 2. GPU resources
    let gpu = GpuContext::new()?;
    let frame_renderer = FrameRenderer::new(&gpu, cli.width, cli.height);
    let bars = BarPipeline::new(&gpu.device);

    let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("bar_uniforms"),
        size: std::mem::size_of::<BarUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bars_bind_group"),
        layout: &bars.bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    // 3. Encoder
    let settings = EncoderSettings {
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        codec: cli.codec.clone(),
        pix_fmt: cli.pix_fmt.clone(),
        crf: cli.crf,
        bitrate: cli.bitrate.clone(),
    };
    let mut encoder = FfmpegEncoder::new(&cli.output, &cli.input, &settings)?;

    // 4. Render loop: one tick per video frame
    let maxima = analyzer.global_band_maxima();
    let mut sync = VisualSync::new(analyzer.frame_band_magnitudes(), analyzer.time_per_frame());
    let mut clock = FrameClock::new(cli.fps, duration);
    let mut camera = Camera::from_mode(cli.camera);

    clock.play();
    sync.reset();

    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let mut advanced = 0u64;
    for frame_idx in 0..total_frames {
        let offset = clock.offset_seconds();
        let current = sync.tick(offset, clock.is_playing());
        if sync.state() == SyncState::Advancing {
            advanced += 1;
        }

        let heights = bar_heights(&current, &maxima, cli.bar_scale);
        let uniforms = build_uniforms(&camera, &heights, cli.width, cli.height, offset);
        gpu.queue.write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let pixels = frame_renderer.render_bars(&gpu, &bars, &bind_group, BAND_COUNT as u32)?;
        encoder.write_frame(&pixels)?;

        camera.advance();
        clock.advance();
        pb.set_position(frame_idx + 1);
    }

    pb.finish_with_message("Rendering complete");
    log::info!(
        "Rendered {} frames, {} band rows shown of {} (cursor at row {})",
        total_frames,
        advanced,
        analyzer.frame_count(),
        sync.cursor().frame_index
    );

    // 5. Finish encoding
    log::info!("Finishing encoding...");
    encoder.finish()?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}
