//! Compute device detection for enhancement inference
//!
//! The device is resolved once per process and then passed by value into
//! every model call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// Device the enhancement model runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    /// NVIDIA GPU via CUDA
    Cuda,
    /// CPU fallback
    Cpu,
}

impl ComputeDevice {
    /// Probe the system for a usable accelerator.
    ///
    /// Currently supports NVIDIA GPUs via nvidia-smi. Falls back to CPU.
    pub fn detect() -> Self {
        match GpuInfo::detect() {
            Some(_) => ComputeDevice::Cuda,
            None => ComputeDevice::Cpu,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeDevice::Cuda => "cuda",
            ComputeDevice::Cpu => "cpu",
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured device choice, resolved to a `ComputeDevice` at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use CUDA when a GPU is found, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

impl DevicePreference {
    /// Resolve the preference. Only `Auto` touches the system.
    pub fn resolve(self) -> ComputeDevice {
        match self {
            DevicePreference::Auto => ComputeDevice::detect(),
            DevicePreference::Cpu => ComputeDevice::Cpu,
            DevicePreference::Cuda => ComputeDevice::Cuda,
        }
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(format!("unknown device '{}' (expected auto, cpu or cuda)", other)),
        }
    }
}

/// Information about a detected GPU
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuInfo {
    /// GPU name/model
    pub name: String,
    /// Total VRAM in GB
    pub vram_total_gb: f32,
    /// Driver version
    pub driver_version: String,
}

impl GpuInfo {
    /// Detect an NVIDIA GPU using nvidia-smi
    ///
    /// Returns None if nvidia-smi is missing, fails, or prints nothing usable.
    pub fn detect() -> Option<Self> {
        let output = Command::new("nvidia-smi")
            .args([
                "--query-gpu=name,memory.total,driver_version",
                "--format=csv,noheader,nounits",
            ])
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_query_line(stdout.lines().next()?)
    }

    /// Parse one line of `--format=csv,noheader,nounits` output
    fn parse_query_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if parts.len() < 3 {
            return None;
        }

        let vram_total_mb: f32 = parts[1].parse().ok()?;

        Some(Self {
            name: parts[0].to_string(),
            vram_total_gb: vram_total_mb / 1024.0,
            driver_version: parts[2].to_string(),
        })
    }
}
