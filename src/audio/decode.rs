use std::path::{Path, PathBuf};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioLoadError {
    #[error("failed to open audio file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to probe audio format")]
    Probe(#[source] SymphoniaError),
    #[error("no audio tracks found")]
    NoTrack,
    #[error("unknown sample rate")]
    UnknownSampleRate,
    #[error("failed to create audio decoder")]
    Decoder(#[source] SymphoniaError),
    #[error("failed to decode audio stream")]
    Decode(#[source] SymphoniaError),
}

/// Decoded mono samples at a fixed sample rate.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub fn decode_audio(path: &Path) -> Result<AudioData, AudioLoadError> {
    let file = std::fs::File::open(path).map_err(|source| AudioLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(AudioLoadError::Probe)?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioLoadError::NoTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioLoadError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(AudioLoadError::Decoder)?;

    let mut all_samples: Vec<f32> = Vec::new();
    let mut channels = 1;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(AudioLoadError::Decode(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(AudioLoadError::Decode(e)),
        };

        channels = append_mono(&mut all_samples, decoded);
    }

    let audio = AudioData {
        samples: all_samples,
        sample_rate,
    };

    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s ({} channel(s) downmixed to mono)",
        audio.samples.len(),
        sample_rate,
        audio.duration(),
        channels
    );

    Ok(audio)
}

/// Append one decoded packet as mono, using the packet's own channel layout.
/// Returns the channel count that was downmixed.
fn append_mono(out: &mut Vec<f32>, decoded: AudioBufferRef<'_>) -> usize {
    let spec = *decoded.spec();
    let channels = spec.channels.count();

    let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
    sample_buf.copy_interleaved_ref(decoded);

    downmix_into(out, sample_buf.samples(), channels);
    channels
}

/// Average interleaved channels into mono and append to `out`.
fn downmix_into(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
