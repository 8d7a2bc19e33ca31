//! Enhancement model interfaces and implementations
//!
//! This module provides:
//! - `EnhancementModel` trait for denoise/enhance backends
//! - Compute device selection
//! - HTTP bridge to a model server
//! - Mock implementation for testing

mod bridge;
mod device;
mod mock;
mod model;

pub use bridge::{BridgeEnhancer, DEFAULT_BRIDGE_URL, DEFAULT_TIMEOUT_MS};
pub use device::{ComputeDevice, DevicePreference, GpuInfo};
pub use mock::{MockEnhancer, ModelCall, MOCK_DENOISE_GAIN};
pub use model::{EnhanceParams, EnhancementModel, DENOISE_LAMBD, ENHANCE_LAMBD};
