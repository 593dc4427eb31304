use super::bands::BAND_COUNT;

/// One value per band, ordered as `Band::ALL`.
pub type BandLevels = [f32; BAND_COUNT];

/// Per-frame peak band magnitudes, stored flat: frame-major, band-minor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BandTable {
    values: Vec<f32>,
}

impl BandTable {
    pub fn with_capacity(frames: usize) -> Self {
        Self {
            values: Vec::with_capacity(frames * BAND_COUNT),
        }
    }

    pub fn push_row(&mut self, row: &BandLevels) {
        self.values.extend_from_slice(row);
    }

    /// Number of analyzed frames (rows).
    pub fn rows(&self) -> usize {
        self.values.len() / BAND_COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<BandLevels> {
        let start = index.checked_mul(BAND_COUNT)?;
        let slice = self.values.get(start..start + BAND_COUNT)?;
        let mut row = [0.0; BAND_COUNT];
        row.copy_from_slice(slice);
        Some(row)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(BAND_COUNT)
    }

    /// The raw flat sequence, `rows() * BAND_COUNT` long.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
