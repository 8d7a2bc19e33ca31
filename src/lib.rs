//! Voiceprep - data preparation for TTS training
//!
//! Voiceprep provides three tools:
//! 1. Batch speech enhancement - denoise/enhance every file of a directory
//!    tree through an enhancement model and write the results flat
//! 2. Dataset export - write utterances to the `wavs/` + metadata CSV layout
//! 3. Publishing - upload trained model directories to a model hub
//!
//! # Architecture
//!
//! - `engine`: mono audio buffer and WAV I/O
//! - `neural`: enhancement model trait, device selection, HTTP bridge, mock
//! - `enhance`: single-file processor, batch runner, verifier, report
//! - `dataset`: manifest reading and metadata export
//! - `hub`: hub client trait, HTTP client and repo publishing

pub mod cli;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod enhance;
pub mod error;
pub mod hub;
pub mod neural;

pub use error::{Result, VoiceprepError};
