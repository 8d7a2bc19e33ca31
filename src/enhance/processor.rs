//! Single-file denoise + enhance
//!
//! Loads one file, down-mixes it to mono and runs both model passes over
//! the same buffer. Errors are not caught here.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::EnhanceConfig;
use crate::engine::{import_audio, AudioBuffer};
use crate::error::Result;
use crate::neural::{ComputeDevice, EnhanceParams, EnhancementModel};

/// What to run on one source file
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementRequest {
    pub source: PathBuf,
    pub solver: String,
    pub nfe: u32,
    pub tau: f32,
    pub denoising: bool,
}

impl EnhancementRequest {
    pub fn new(source: impl Into<PathBuf>, config: &EnhanceConfig) -> Self {
        Self {
            source: source.into(),
            solver: config.solver.clone(),
            nfe: config.nfe,
            tau: config.tau,
            denoising: config.denoising,
        }
    }

    /// Blend weight: 0.9 in denoising mode, 0.1 otherwise
    pub fn lambd(&self) -> f32 {
        EnhanceParams::lambd_for(self.denoising)
    }

    /// Normalised parameters for the enhance pass
    pub fn params(&self) -> EnhanceParams {
        EnhanceParams {
            solver: self.solver.to_lowercase(),
            nfe: self.nfe,
            lambd: self.lambd(),
            tau: self.tau,
        }
    }
}

/// Both outputs for one file, each at the model's output rate
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementResult {
    pub denoised: AudioBuffer,
    pub enhanced: AudioBuffer,
}

impl EnhancementResult {
    /// Take the enhanced output, or the denoised one
    pub fn select(self, use_enhanced: bool) -> AudioBuffer {
        if use_enhanced {
            self.enhanced
        } else {
            self.denoised
        }
    }
}

/// Runs the enhancement model on a fixed device
pub struct Enhancer<'m> {
    model: &'m dyn EnhancementModel,
    device: ComputeDevice,
}

impl<'m> Enhancer<'m> {
    pub fn new(model: &'m dyn EnhancementModel, device: ComputeDevice) -> Self {
        Self { model, device }
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Denoise and enhance a single audio file.
    pub fn denoise_and_enhance(&self, request: &EnhancementRequest) -> Result<EnhancementResult> {
        let audio = import_audio(&request.source)?;
        debug!(
            "{}: {:.2}s at {} Hz, peak {:.1} dBFS, rms {:.1} dBFS",
            display_name(&request.source),
            audio.duration_secs(),
            audio.sample_rate(),
            audio.peak_db(),
            audio.rms_db()
        );

        self.run(&audio, &request.params())
    }

    /// Run both passes over an already loaded buffer.
    pub fn run(&self, audio: &AudioBuffer, params: &EnhanceParams) -> Result<EnhancementResult> {
        let denoised = self.model.denoise(audio, self.device)?;
        let enhanced = self.model.enhance(audio, self.device, params)?;

        Ok(EnhancementResult { denoised, enhanced })
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
