//! HTTP bridge to a speech enhancement model server
//!
//! The server hosts the actual denoiser/enhancer weights; this side only
//! ships whole buffers and parameters over JSON and validates the reply.
//! Networking is compiled in with the `resemble` feature.

use crate::engine::AudioBuffer;
use crate::error::{Result, VoiceprepError};
use crate::neural::device::ComputeDevice;
use crate::neural::model::{EnhanceParams, EnhancementModel};

use serde::{Deserialize, Serialize};
use std::env;

/// Default bridge address
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:8002";

/// Default per-request timeout (5 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Request body for `/denoise` and `/enhance`
#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    request_id: String,
    samples: &'a [f32],
    sample_rate: u32,
    device: ComputeDevice,
    #[serde(flatten)]
    params: Option<&'a EnhanceParams>,
}

/// Response from the bridge
#[derive(Debug, Deserialize)]
struct BridgeResponse {
    success: bool,
    #[serde(default)]
    samples: Vec<f32>,
    sample_rate: Option<u32>,
    error_message: Option<String>,
}

impl BridgeResponse {
    fn into_buffer(self, stage: &'static str) -> Result<AudioBuffer> {
        if !self.success {
            return Err(VoiceprepError::ModelProcessingError {
                reason: self
                    .error_message
                    .unwrap_or_else(|| format!("Unknown {} error", stage)),
            });
        }

        let rate = self.sample_rate.ok_or_else(|| VoiceprepError::BridgeConnectionError {
            message: format!("{} response is missing sample_rate", stage),
        })?;
        let buffer = AudioBuffer::new(self.samples, rate)?;
        if !buffer.is_finite() {
            return Err(VoiceprepError::NonFiniteOutput { stage });
        }
        Ok(buffer)
    }
}

/// Enhancement model served over HTTP
pub struct BridgeEnhancer {
    bridge_url: String,
    timeout_ms: u64,
}

impl BridgeEnhancer {
    /// Create a bridge client configured from the environment
    ///
    /// Reads `VOICEPREP_BRIDGE_URL` and `VOICEPREP_BRIDGE_TIMEOUT_MS`.
    pub fn new() -> Self {
        let bridge_url =
            env::var("VOICEPREP_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BRIDGE_URL.into());
        let timeout_ms = env::var("VOICEPREP_BRIDGE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self::with_config(bridge_url, timeout_ms)
    }

    /// Create a bridge client with explicit settings
    pub fn with_config(bridge_url: String, timeout_ms: u64) -> Self {
        Self {
            bridge_url: bridge_url.trim_end_matches('/').to_string(),
            timeout_ms,
        }
    }

    pub fn bridge_url(&self) -> &str {
        &self.bridge_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    fn request<'a>(
        &self,
        audio: &'a AudioBuffer,
        device: ComputeDevice,
        params: Option<&'a EnhanceParams>,
    ) -> BridgeRequest<'a> {
        BridgeRequest {
            request_id: uuid::Uuid::new_v4().to_string(),
            samples: &audio.samples,
            sample_rate: audio.sample_rate(),
            device,
            params,
        }
    }

    /// Check if the bridge is reachable
    #[cfg(feature = "resemble")]
    fn check_bridge_health(&self) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
        {
            Ok(client) => client,
            Err(_) => return false,
        };

        let url = format!("{}/health", self.bridge_url);
        client
            .get(&url)
            .send()
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    #[cfg(not(feature = "resemble"))]
    fn check_bridge_health(&self) -> bool {
        false
    }

    /// Send request to the bridge
    #[cfg(feature = "resemble")]
    fn send(&self, endpoint: &str, request: &BridgeRequest<'_>) -> Result<BridgeResponse> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| VoiceprepError::BridgeConnectionError {
                message: e.to_string(),
            })?;

        let url = format!("{}/{}", self.bridge_url, endpoint);
        log::debug!(
            "POST {} ({} samples, request {})",
            url,
            request.samples.len(),
            request.request_id
        );

        let response = client.post(&url).json(request).send().map_err(|e| {
            if e.is_timeout() {
                VoiceprepError::BridgeTimeout {
                    timeout_ms: self.timeout_ms,
                }
            } else if e.is_connect() {
                VoiceprepError::ModelUnavailable {
                    reason: format!("Cannot connect to bridge at {}: {}", self.bridge_url, e),
                }
            } else {
                VoiceprepError::BridgeConnectionError {
                    message: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(VoiceprepError::BridgeConnectionError {
                message: format!("Bridge returned error: {}", response.status()),
            });
        }

        response
            .json::<BridgeResponse>()
            .map_err(|e| VoiceprepError::BridgeConnectionError {
                message: format!("Invalid response from bridge: {}", e),
            })
    }

    #[cfg(not(feature = "resemble"))]
    fn send(&self, _endpoint: &str, _request: &BridgeRequest<'_>) -> Result<BridgeResponse> {
        Err(VoiceprepError::ModelUnavailable {
            reason: "Enhancement bridge not compiled. Build with --features resemble".to_string(),
        })
    }
}

impl Default for BridgeEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancementModel for BridgeEnhancer {
    fn name(&self) -> &str {
        "bridge"
    }

    fn is_available(&self) -> bool {
        self.check_bridge_health()
    }

    fn denoise(&self, audio: &AudioBuffer, device: ComputeDevice) -> Result<AudioBuffer> {
        let request = self.request(audio, device, None);
        self.send("denoise", &request)?.into_buffer("denoise")
    }

    fn enhance(
        &self,
        audio: &AudioBuffer,
        device: ComputeDevice,
        params: &EnhanceParams,
    ) -> Result<AudioBuffer> {
        let request = self.request(audio, device, Some(params));
        self.send("enhance", &request)?.into_buffer("enhance")
    }
}
