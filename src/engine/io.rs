//! Audio file I/O for Voiceprep
//!
//! Reads whole WAV files into a mono `AudioBuffer` and writes buffers back
//! out. The source sample rate is kept as-is; no resampling happens here.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::AudioBuffer;
use crate::error::{Result, VoiceprepError};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Bit depth: 16, 24 (integer PCM) or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 16 }
    }
}

impl ExportFormat {
    /// Bit depths `export_audio` can write
    pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

    pub fn new(bit_depth: u16) -> Self {
        ExportFormat { bit_depth }
    }

    /// 32-bit float, lossless for in-memory samples
    pub fn float32() -> Self {
        ExportFormat { bit_depth: 32 }
    }
}

/// Import a WAV file as mono audio
///
/// Multi-channel files are down-mixed by averaging all channels.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedFormat` - If the bit depth cannot be decoded
/// * `EmptyAudio` - If the file decodes to zero frames
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(VoiceprepError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = WavReader::open(path).map_err(|e| VoiceprepError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    let buffer = AudioBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)?;
    if buffer.is_empty() {
        return Err(VoiceprepError::EmptyAudio);
    }

    Ok(buffer)
}

/// Export a mono AudioBuffer to a WAV file at the buffer's own sample rate
///
/// The file is written in place; a failure part-way leaves a truncated file.
///
/// # Errors
/// * `NonFiniteOutput` - If the buffer contains NaN/Inf
/// * `UnsupportedFormat` - If the bit depth is not 16, 24 or 32
/// * `FileWriteError` - If the file cannot be created or written
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if !buffer.is_finite() {
        return Err(VoiceprepError::NonFiniteOutput { stage: "export" });
    }
    if !ExportFormat::SUPPORTED_BIT_DEPTHS.contains(&format.bit_depth) {
        return Err(VoiceprepError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", format.bit_depth),
        });
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let write_err = |e: hound::Error| VoiceprepError::FileWriteError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;

    match format.bit_depth {
        16 => {
            for &sample in &buffer.samples {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        24 => {
            for &sample in &buffer.samples {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled).map_err(write_err)?;
            }
        }
        _ => {
            for &sample in &buffer.samples {
                writer.write_sample(sample).map_err(write_err)?;
            }
        }
    }

    writer.finalize().map_err(write_err)?;

    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let invalid = |bits: &str, e: hound::Error| VoiceprepError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", bits, e),
        source: Some(Box::new(e)),
    };

    match (sample_format, bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("8-bit", e)),
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("16-bit", e)),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("24-bit", e)),
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("32-bit int", e)),
        (format, bits) => Err(VoiceprepError::UnsupportedFormat {
            format: format!("{}-bit {:?} audio", bits, format),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tone(len: usize, sample_rate: u32) -> AudioBuffer {
        let samples = (0..len)
            .map(|i| (i as f32 * 0.05).sin() * 0.8)
            .collect();
        AudioBuffer::new(samples, sample_rate).unwrap()
    }

    fn write_stereo(path: &Path, frames: &[(i16, i16)], sample_rate: u32) {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &(l, r) in frames {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_round_trip_float32() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let original = tone(2048, 44100);

        export_audio(&original, &path, ExportFormat::float32()).unwrap();
        let imported = import_audio(&path).unwrap();

        assert_eq!(imported.sample_rate(), 44100);
        assert_eq!(imported.len(), original.len());
        for (a, b) in original.samples.iter().zip(imported.samples.iter()) {
            assert!((a - b).abs() < 1e-6, "Sample mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_round_trip_16bit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");
        let original = tone(1000, 22050);

        export_audio(&original, &path, ExportFormat::default()).unwrap();
        let imported = import_audio(&path).unwrap();

        assert_eq!(imported.len(), original.len());
        for (a, b) in original.samples.iter().zip(imported.samples.iter()) {
            assert!((a - b).abs() < 0.001, "Sample mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_stereo_import_is_downmixed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_stereo(&path, &[(16384, 0), (16384, 16384), (-16384, 16384)], 16000);

        let imported = import_audio(&path).unwrap();

        assert_eq!(imported.len(), 3);
        assert_eq!(imported.sample_rate(), 16000);
        assert!((imported.samples[0] - 0.25).abs() < 1e-4);
        assert!((imported.samples[1] - 0.5).abs() < 1e-4);
        assert!(imported.samples[2].abs() < 1e-4);
    }

    #[test]
    fn test_exported_file_is_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        export_audio(&tone(64, 8000), &path, ExportFormat::new(24)).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().bits_per_sample, 24);
    }

    #[test]
    fn test_import_nonexistent_file() {
        match import_audio(Path::new("/nonexistent/path/audio.wav")).unwrap_err() {
            VoiceprepError::FileNotFound { path } => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_import_garbage_is_invalid_audio() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"this is not a riff header").unwrap();

        let err = import_audio(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }

    #[test]
    fn test_export_rejects_nan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nan.wav");
        let buffer = AudioBuffer::new(vec![0.0, f32::NAN], 8000).unwrap();

        let err = export_audio(&buffer, &path, ExportFormat::default()).unwrap_err();
        assert!(matches!(err, VoiceprepError::NonFiniteOutput { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_rejects_unknown_bit_depth() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.wav");
        let err = export_audio(&tone(8, 8000), &path, ExportFormat::new(12)).unwrap_err();
        assert!(matches!(err, VoiceprepError::UnsupportedFormat { .. }));
    }
}
