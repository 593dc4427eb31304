use crate::audio::bands::BAND_COUNT;
use crate::audio::features::BandLevels;

use super::camera::{projection, Camera};
use super::pipeline::BarUniforms;

/// Height of a bar playing at its band's global maximum.
pub const DEFAULT_BAR_SCALE: f32 = 10.0;

/// Scale current band values against the track's per-band maxima.
///
/// A band whose maximum is zero never produced energy, so it is drawn flat
/// instead of dividing by zero.
pub fn bar_heights(current: &BandLevels, maxima: &BandLevels, scale: f32) -> BandLevels {
    let mut heights = [0.0; BAND_COUNT];
    for (i, height) in heights.iter_mut().enumerate() {
        if maxima[i] > 0.0 {
            *height = (current[i] / maxima[i]).max(0.0) * scale;
        }
    }
    heights
}

pub fn build_uniforms(camera: &Camera, heights: &BandLevels, width: u32, height: u32, time: f32) -> BarUniforms {
    let aspect = width as f32 / height.max(1) as f32;
    let view_proj = projection(aspect) * camera.look_at();

    let mut packed = [[0.0f32; 4]; 2];
    for (i, &h) in heights.iter().enumerate() {
        packed[i / 4][i % 4] = h;
    }

    BarUniforms {
        view_proj: view_proj.to_cols_array_2d(),
        heights: packed,
        time,
        bar_count: BAND_COUNT as u32,
        _padding: [0.0; 2],
    }
}
