//! Enhancement model trait and core types
//!
//! Defines the interface every speech enhancement backend implements.

use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::neural::device::ComputeDevice;
use serde::{Deserialize, Serialize};

/// Blend weight for a denoise-leaning enhance pass
pub const DENOISE_LAMBD: f32 = 0.9;

/// Blend weight for an enhance-leaning enhance pass
pub const ENHANCE_LAMBD: f32 = 0.1;

/// Parameters for the enhance pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceParams {
    /// ODE solver identifier, lower-cased (e.g. "midpoint", "euler", "rk4")
    pub solver: String,
    /// Number of function evaluations
    pub nfe: u32,
    /// Blend weight between denoising (high) and enhancement (low)
    pub lambd: f32,
    /// Prior temperature
    pub tau: f32,
}

impl EnhanceParams {
    /// Blend weight for the denoising-mode flag
    pub fn lambd_for(denoising: bool) -> f32 {
        if denoising {
            DENOISE_LAMBD
        } else {
            ENHANCE_LAMBD
        }
    }
}

/// Trait that all enhancement backends must implement
///
/// Both passes take the same loaded buffer and return a new buffer whose
/// sample rate is the model's output rate.
pub trait EnhancementModel: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Light-weight noise removal pass
    fn denoise(&self, audio: &AudioBuffer, device: ComputeDevice) -> Result<AudioBuffer>;

    /// Parameterised denoise + quality enhancement pass
    fn enhance(
        &self,
        audio: &AudioBuffer,
        device: ComputeDevice,
        params: &EnhanceParams,
    ) -> Result<AudioBuffer>;

    /// Check if the backend is ready to use
    fn is_available(&self) -> bool {
        true
    }
}
