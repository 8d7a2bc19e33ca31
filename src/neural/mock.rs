//! Mock enhancement model for testing and dry runs
//!
//! Applies fixed, verifiable gains instead of real inference and records
//! every call it receives.

use super::device::ComputeDevice;
use super::model::{EnhanceParams, EnhancementModel};
use crate::engine::AudioBuffer;
use crate::error::{Result, VoiceprepError};
use std::sync::Mutex;

/// Gain applied by the mock denoise pass
pub const MOCK_DENOISE_GAIN: f32 = 0.5;

/// A call received by `MockEnhancer`
#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    Denoise {
        device: ComputeDevice,
        input: AudioBuffer,
    },
    Enhance {
        device: ComputeDevice,
        input: AudioBuffer,
        params: EnhanceParams,
    },
}

/// Deterministic stand-in for a real enhancement model
///
/// `denoise` scales samples by 0.5; `enhance` scales them by `1 - lambd`.
pub struct MockEnhancer {
    output_rate: Option<u32>,
    failure: Option<String>,
    calls: Mutex<Vec<ModelCall>>,
}

impl MockEnhancer {
    pub fn new() -> Self {
        Self {
            output_rate: None,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Resample-free rate change: outputs are tagged with `rate`
    pub fn with_output_rate(mut self, rate: u32) -> Self {
        self.output_rate = Some(rate);
        self
    }

    /// Fail every call with `reason`
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ModelCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check_failure(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(VoiceprepError::ModelProcessingError {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn scaled(&self, audio: &AudioBuffer, gain: f32) -> Result<AudioBuffer> {
        let rate = self.output_rate.unwrap_or_else(|| audio.sample_rate());
        AudioBuffer::new(audio.samples.iter().map(|s| s * gain).collect(), rate)
    }
}

impl Default for MockEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancementModel for MockEnhancer {
    fn name(&self) -> &str {
        "mock"
    }

    fn denoise(&self, audio: &AudioBuffer, device: ComputeDevice) -> Result<AudioBuffer> {
        self.record(ModelCall::Denoise {
            device,
            input: audio.clone(),
        });
        self.check_failure()?;
        self.scaled(audio, MOCK_DENOISE_GAIN)
    }

    fn enhance(
        &self,
        audio: &AudioBuffer,
        device: ComputeDevice,
        params: &EnhanceParams,
    ) -> Result<AudioBuffer> {
        self.record(ModelCall::Enhance {
            device,
            input: audio.clone(),
            params: params.clone(),
        });
        self.check_failure()?;
        self.scaled(audio, 1.0 - params.lambd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(lambd: f32) -> EnhanceParams {
        EnhanceParams {
            solver: "midpoint".to_string(),
            nfe: 8,
            lambd,
            tau: 0.5,
        }
    }

    #[test]
    fn test_mock_denoise_halves() {
        let model = MockEnhancer::new();
        let input = AudioBuffer::new(vec![0.8, -0.4], 16000).unwrap();

        let out = model.denoise(&input, ComputeDevice::Cpu).unwrap();

        assert_relative_eq!(out.samples[0], 0.4);
        assert_relative_eq!(out.samples[1], -0.2);
        assert_eq!(out.sample_rate(), 16000);
    }

    #[test]
    fn test_mock_enhance_uses_lambd() {
        let model = MockEnhancer::new().with_output_rate(44100);
        let input = AudioBuffer::new(vec![1.0], 16000).unwrap();

        let out = model.enhance(&input, ComputeDevice::Cuda, &params(0.1)).unwrap();

        assert_relative_eq!(out.samples[0], 0.9);
        assert_eq!(out.sample_rate(), 44100);
    }

    #[test]
    fn test_mock_records_calls() {
        let model = MockEnhancer::new();
        let input = AudioBuffer::new(vec![0.1], 8000).unwrap();

        model.denoise(&input, ComputeDevice::Cpu).unwrap();
        model.enhance(&input, ComputeDevice::Cpu, &params(0.9)).unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], ModelCall::Denoise { .. }));
        match &calls[1] {
            ModelCall::Enhance { params, .. } => assert_eq!(params.lambd, 0.9),
            other => panic!("Expected enhance call, got {:?}", other),
        }
    }

    #[test]
    fn test_mock_failure() {
        let model = MockEnhancer::new().failing("CUDA out of memory");
        let input = AudioBuffer::new(vec![0.1], 8000).unwrap();

        let err = model.denoise(&input, ComputeDevice::Cuda).unwrap_err();
        assert!(err.to_string().contains("CUDA out of memory"));
        assert_eq!(model.calls().len(), 1);
    }
}
