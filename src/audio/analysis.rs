use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};
use std::path::Path;

use super::bands::{Band, BAND_COUNT};
use super::decode::{decode_audio, AudioData, AudioLoadError};
use super::features::{BandLevels, BandTable};

/// Default number of samples per analyzed frame.
pub const DEFAULT_FRAME_SIZE: usize = 4096;

/// Offline spectral analysis of a whole track.
///
/// The track is cut into non-overlapping frames of `frame_size` samples; each
/// frame is transformed and its bins are peak-held into five bands. The last
/// frame keeps its true length, so its transform size (and bin spacing) can
/// differ from the others.
pub struct SpectralAnalyzer {
    audio: AudioData,
    frame_size: usize,
    time_per_frame: f32,
    table: BandTable,
    maxima: BandLevels,
}

impl SpectralAnalyzer {
    pub fn open(path: &Path, frame_size: usize) -> Result<Self, AudioLoadError> {
        let audio = decode_audio(path)?;
        Ok(Self::new(audio, frame_size))
    }

    pub fn new(audio: AudioData, frame_size: usize) -> Self {
        let frame_size = frame_size.max(1);
        let time_per_frame = if audio.sample_rate == 0 {
            0.0
        } else {
            frame_size as f32 / audio.sample_rate as f32
        };
        Self {
            audio,
            frame_size,
            time_per_frame,
            table: BandTable::default(),
            maxima: [0.0; BAND_COUNT],
        }
    }

    /// Run the full analysis pass. Previous results are discarded first, so
    /// repeated calls produce identical output.
    pub fn analyze(&mut self) {
        let samples = &self.audio.samples;
        let sample_rate = self.audio.sample_rate;

        log::info!(
            "Analyzing {} samples in frames of {} ({:.1} ms/frame)...",
            samples.len(),
            self.frame_size,
            self.time_per_frame * 1000.0
        );

        let rows: Vec<BandLevels> = samples
            .par_chunks(self.frame_size)
            .map_init(FftPlanner::<f32>::new, |planner, frame| {
                frame_band_peaks(planner, frame, sample_rate)
            })
            .collect();

        self.table = BandTable::with_capacity(rows.len());
        self.maxima = [0.0; BAND_COUNT];
        for row in &rows {
            self.table.push_row(row);
            for (max, &value) in self.maxima.iter_mut().zip(row.iter()) {
                if value > *max {
                    *max = value;
                }
            }
        }

        log::info!(
            "Analysis complete: {} frames, band maxima {:?}",
            self.table.rows(),
            self.maxima
        );
    }

    pub fn frame_band_magnitudes(&self) -> &BandTable {
        &self.table
    }

    pub fn global_band_maxima(&self) -> BandLevels {
        self.maxima
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Nominal samples covered by one analyzed frame.
    pub fn samples_per_frame(&self) -> usize {
        self.frame_size
    }

    /// Seconds of audio each table row represents.
    pub fn time_per_frame(&self) -> f32 {
        self.time_per_frame
    }

    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    pub fn num_samples(&self) -> usize {
        self.audio.samples.len()
    }

    pub fn duration(&self) -> f32 {
        self.audio.duration()
    }

    /// Frames `analyze` will emit: full frames plus a non-empty tail.
    pub fn frame_count(&self) -> usize {
        self.num_samples().div_ceil(self.frame_size)
    }
}

/// Peak magnitude per band for a single frame.
fn frame_band_peaks(planner: &mut FftPlanner<f32>, frame: &[f32], sample_rate: u32) -> BandLevels {
    let len = frame.len();
    let mut peaks = [0.0f32; BAND_COUNT];
    if len == 0 {
        return peaks;
    }

    let fft = planner.plan_fft_forward(len);
    let mut buffer: Vec<Complex<f32>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    for (i, bin) in buffer[..len / 2].iter().enumerate() {
        // Integer bin frequency, truncated before the band test.
        let freq = (i as u64 * sample_rate as u64 / len as u64) as u32;
        let Some(band) = Band::for_frequency(freq) else {
            continue;
        };
        let mag = bin.norm();
        let slot = &mut peaks[band.index()];
        if mag > *slot {
            *slot = mag;
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(samples: Vec<f32>, sample_rate: u32, frame_size: usize) -> SpectralAnalyzer {
        let mut a = SpectralAnalyzer::new(AudioData { samples, sample_rate }, frame_size);
        a.analyze();
        a
    }

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let a = analyzer(Vec::new(), 44100, 1024);
        assert!(a.frame_band_magnitudes().is_empty());
        assert_eq!(a.global_band_maxima(), [0.0; BAND_COUNT]);
        assert_eq!(a.frame_count(), 0);
    }

    #[test]
    fn counts_tail_frame() {
        let a = analyzer(sine(440.0, 44100, 1000), 44100, 256);
        assert_eq!(a.frame_band_magnitudes().rows(), 4);
        assert_eq!(a.frame_count(), 4);
    }

    #[test]
    fn no_tail_frame_when_exact() {
        let a = analyzer(sine(440.0, 44100, 1024), 44100, 256);
        assert_eq!(a.frame_band_magnitudes().rows(), 4);
        assert_eq!(a.frame_band_magnitudes().as_slice().len(), 4 * BAND_COUNT);
    }

    #[test]
    fn time_per_frame_from_frame_size() {
        let a = SpectralAnalyzer::new(
            AudioData {
                samples: Vec::new(),
                sample_rate: 44100,
            },
            4410,
        );
        assert!((a.time_per_frame() - 0.1).abs() < 1e-6);
        assert_eq!(a.samples_per_frame(), 4410);
    }

    #[test]
    fn reanalysis_is_identical() {
        let mut samples = sine(220.0, 44100, 5000);
        for (i, s) in samples.iter_mut().enumerate() {
            *s += 0.3 * ((i * 7919) % 101) as f32 / 101.0;
        }
        let mut a = analyzer(samples.clone(), 44100, 512);
        let first_table = a.frame_band_magnitudes().clone();
        let first_max = a.global_band_maxima();

        a.analyze();
        assert_eq!(a.frame_band_magnitudes(), &first_table);
        assert_eq!(a.global_band_maxima(), first_max);

        let b = analyzer(samples, 44100, 512);
        assert_eq!(b.frame_band_magnitudes(), &first_table);
        assert_eq!(b.global_band_maxima(), first_max);
    }

    #[test]
    fn maxima_bound_every_frame() {
        let samples: Vec<f32> = sine(90.0, 44100, 9000)
            .iter()
            .zip(sine(3000.0, 44100, 9000))
            .enumerate()
            .map(|(i, (a, b))| a * (i as f32 / 9000.0) + 0.5 * b)
            .collect();
        let a = analyzer(samples, 44100, 1024);
        let maxima = a.global_band_maxima();

        for row in a.frame_band_magnitudes().iter_rows() {
            for (band, &value) in row.iter().enumerate() {
                assert!(value >= 0.0);
                assert!(maxima[band] >= value);
            }
        }
        for band in 0..BAND_COUNT {
            let observed = a
                .frame_band_magnitudes()
                .iter_rows()
                .map(|r| r[band])
                .fold(0.0f32, f32::max);
            assert_eq!(maxima[band], observed);
        }
    }

    #[test]
    fn silence_is_all_zero() {
        let a = analyzer(vec![0.0; 3000], 44100, 1024);
        assert_eq!(a.frame_band_magnitudes().rows(), 3);
        assert!(a.frame_band_magnitudes().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(a.global_band_maxima(), [0.0; BAND_COUNT]);
    }

    #[test]
    fn tone_lands_in_mid_band() {
        let a = analyzer(sine(1000.0, 44100, 1024 * 8), 44100, 1024);
        let mid = Band::Mid.index();
        assert_eq!(a.frame_band_magnitudes().rows(), 8);

        for row in a.frame_band_magnitudes().iter_rows() {
            assert!(row[mid] > 100.0, "mid band too weak: {:?}", row);
            for band in [Band::Bass, Band::LowMid, Band::HighMid, Band::Treble] {
                assert!(
                    row[band.index()] < row[mid] * 0.1,
                    "leakage into {:?}: {:?}",
                    band,
                    row
                );
            }
        }
    }

    #[test]
    fn tail_frame_uses_its_own_length() {
        // 1024 full samples plus a 512-sample tail of a 2 kHz tone.
        let a = analyzer(sine(2000.0, 48000, 1536), 48000, 1024);
        let table = a.frame_band_magnitudes();
        assert_eq!(table.rows(), 2);
        let tail = table.row(1).unwrap();
        // Bin spacing of the tail is 93.75 Hz; 2 kHz is still the Mid band.
        assert!(tail[Band::Mid.index()] > tail[Band::HighMid.index()]);
        // A 512-point transform peaks near half the 1024-point amplitude.
        let full = table.row(0).unwrap();
        assert!(tail[Band::Mid.index()] < full[Band::Mid.index()]);
    }

    #[test]
    fn single_sample_tail_is_zero_row() {
        let a = analyzer(vec![1.0; 1025], 44100, 1024);
        let table = a.frame_band_magnitudes();
        assert_eq!(table.rows(), 2);
        assert_eq!(table.row(1), Some([0.0; BAND_COUNT]));
    }
}
