use serde::Serialize;

/// Number of perceptual bands the analyzer buckets FFT bins into.
pub const BAND_COUNT: usize = 5;

/// Bins at or below this frequency (Hz) are dropped as DC / sub-audible.
pub const MIN_FREQUENCY_HZ: u32 = 19;

/// Upper edges (inclusive, Hz) of the first four bands. The last band is open.
const UPPER_EDGES: [u32; BAND_COUNT - 1] = [140, 400, 2600, 5200];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Bass,      // (19, 140]
    LowMid,    // (140, 400]
    Mid,       // (400, 2600]
    HighMid,   // (2600, 5200]
    Treble,    // (5200, inf)
}

impl Band {
    pub const ALL: [Band; BAND_COUNT] = [
        Band::Bass,
        Band::LowMid,
        Band::Mid,
        Band::HighMid,
        Band::Treble,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a bin frequency to its band, or `None` for frequencies <= 19 Hz.
    pub fn for_frequency(freq_hz: u32) -> Option<Band> {
        if freq_hz <= MIN_FREQUENCY_HZ {
            return None;
        }
        let idx = UPPER_EDGES
            .iter()
            .position(|&edge| freq_hz <= edge)
            .unwrap_or(BAND_COUNT - 1);
        Some(Band::ALL[idx])
    }
}
