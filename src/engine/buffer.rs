//! Audio Buffer Management
//!
//! Provides the mono audio buffer passed between file I/O and the
//! enhancement model. Multi-channel sources are down-mixed on construction.

use crate::error::{VoiceprepError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Single-channel audio with its sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples in [-1.0, 1.0] nominal range
    pub samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from mono samples.
    ///
    /// # Errors
    /// * `InvalidSampleRate` - If `sample_rate` is zero
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(VoiceprepError::InvalidSampleRate { rate: sample_rate });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create a mono buffer from interleaved multi-channel samples.
    ///
    /// Every frame is averaged across all channels, so each channel
    /// contributes equally. A trailing partial frame is dropped.
    ///
    /// # Errors
    /// * `InvalidSampleRate` - If `sample_rate` is zero
    /// * `UnsupportedFormat` - If `channels` is zero
    pub fn from_interleaved(interleaved: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(VoiceprepError::UnsupportedFormat {
                format: "0-channel audio".to_string(),
            });
        }
        Self::new(downmix(interleaved, channels), sample_rate)
    }

    /// Sample rate in Hz (always > 0)
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// True when no sample is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Peak level in dBFS. Returns -f32::INFINITY for empty or silent buffers.
    pub fn peak_db(&self) -> f32 {
        let peak = self
            .samples
            .iter()
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max);
        linear_to_db(peak)
    }

    /// RMS level in dBFS. Returns -f32::INFINITY for empty or silent buffers.
    pub fn rms_db(&self) -> f32 {
        if self.samples.is_empty() {
            return f32::NEG_INFINITY;
        }
        let sum_squares: f64 = self
            .samples
            .iter()
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        linear_to_db((sum_squares / self.samples.len() as f64).sqrt() as f32)
    }
}

/// Average interleaved frames [L,R,L,R,...] into a single channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    let scale = 1.0 / channels as f32;
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_sample_rate_rejected() {
        let err = AudioBuffer::new(vec![0.0; 4], 0).unwrap_err();
        assert!(matches!(err, VoiceprepError::InvalidSampleRate { rate: 0 }));
    }

    #[test]
    fn test_empty_buffer_allowed() {
        let buffer = AudioBuffer::new(Vec::new(), 16000).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_secs(), 0.0);
        assert_eq!(buffer.rms_db(), f32::NEG_INFINITY);
    }

    #[test]
    fn test_stereo_downmix_averages_channels() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let buffer = AudioBuffer::from_interleaved(&interleaved, 2, 22050).unwrap();

        assert_eq!(buffer.len(), 3);
        assert_relative_eq!(buffer.samples[0], 0.5);
        assert_relative_eq!(buffer.samples[1], 0.5);
        assert_relative_eq!(buffer.samples[2], 0.0);
    }

    #[test]
    fn test_four_channel_downmix() {
        let interleaved = [0.4, 0.0, 0.0, 0.0, 0.1, 0.1, 0.1, 0.1];
        let buffer = AudioBuffer::from_interleaved(&interleaved, 4, 48000).unwrap();

        assert_eq!(buffer.len(), 2);
        assert_relative_eq!(buffer.samples[0], 0.1);
        assert_relative_eq!(buffer.samples[1], 0.1);
    }

    #[test]
    fn test_partial_frame_dropped() {
        let buffer = AudioBuffer::from_interleaved(&[0.2, 0.4, 0.9], 2, 8000).unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_zero_channels_rejected() {
        assert!(AudioBuffer::from_interleaved(&[0.0], 0, 8000).is_err());
    }

    #[test]
    fn test_levels() {
        let buffer = AudioBuffer::new(vec![0.5, -0.5, 0.5, -0.5], 8000).unwrap();
        assert_relative_eq!(buffer.peak_db(), linear_to_db(0.5), epsilon = 1e-5);
        assert_relative_eq!(buffer.rms_db(), linear_to_db(0.5), epsilon = 1e-5);
    }

    #[test]
    fn test_is_finite() {
        let mut buffer = AudioBuffer::new(vec![0.1, 0.2], 8000).unwrap();
        assert!(buffer.is_finite());
        buffer.samples[1] = f32::NAN;
        assert!(!buffer.is_finite());
    }
}
