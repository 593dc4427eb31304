use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::audio::analysis::SpectralAnalyzer;
use crate::audio::bands::{Band, BAND_COUNT};
use crate::audio::features::BandLevels;

#[derive(Debug, Serialize)]
pub struct AnalysisExport {
    pub sample_rate: u32,
    pub frame_size: usize,
    pub time_per_frame: f32,
    pub frame_count: usize,
    pub bands: [Band; BAND_COUNT],
    pub global_band_maxima: BandLevels,
    pub frames: Vec<BandLevels>,
}

impl AnalysisExport {
    pub fn from_analyzer(analyzer: &SpectralAnalyzer) -> Self {
        let table = analyzer.frame_band_magnitudes();
        let frames: Vec<BandLevels> = (0..table.rows()).filter_map(|i| table.row(i)).collect();
        Self {
            sample_rate: analyzer.sample_rate(),
            frame_size: analyzer.frame_size(),
            time_per_frame: analyzer.time_per_frame(),
            frame_count: frames.len(),
            bands: Band::ALL,
            global_band_maxima: analyzer.global_band_maxima(),
            frames,
        }
    }
}

pub fn write_json(analyzer: &SpectralAnalyzer, path: &Path) -> Result<()> {
    let export = AnalysisExport::from_analyzer(analyzer);
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer(&mut writer, &export)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush analysis to {}", path.display()))?;
    log::info!("Exported {} frames to {}", export.frame_count, path.display());
    Ok(())
}
