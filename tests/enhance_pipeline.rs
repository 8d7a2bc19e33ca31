//! Integration Tests
//!
//! End-to-end tests for the batch enhancement pipeline with the mock model.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tempfile::{tempdir, TempDir};

use voiceprep::config::EnhanceConfig;
use voiceprep::engine::{export_audio, AudioBuffer, ExportFormat};
use voiceprep::enhance::{verify_output, BatchRunner, Enhancer};
use voiceprep::neural::{ComputeDevice, MockEnhancer, ModelCall};

/// Helper to create a short sine clip on disk
fn write_clip(path: &Path, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..800 {
        let s = ((i as f32 * 0.07).sin() * 12000.0) as i16;
        for ch in 0..channels {
            writer.write_sample(if ch == 0 { s } else { s / 2 }).unwrap();
        }
    }
    writer.finalize().unwrap();
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("in")).unwrap();
        Self { dir }
    }

    fn input(&self) -> PathBuf {
        self.dir.path().join("in")
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn add(&self, relative: &str) -> PathBuf {
        let path = self.input().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_clip(&path, 1);
        path
    }

    fn config(&self) -> EnhanceConfig {
        EnhanceConfig {
            input_dir: self.input(),
            output_dir: self.output(),
            ..EnhanceConfig::default()
        }
    }

    fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.output())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// === Batch Runner ===

#[test]
fn test_all_files_succeed() {
    let fx = Fixture::new();
    for name in ["a.wav", "b.wav", "c.wav"] {
        fx.add(name);
    }

    let model = MockEnhancer::new();
    let runner = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config());
    let outcome = runner.process_directory().unwrap();

    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.succeeded, 3);
    assert!(outcome.all_succeeded());
    assert_eq!(fx.output_names(), vec!["a.wav", "b.wav", "c.wav"]);
}

#[test]
fn test_no_matching_files() {
    let fx = Fixture::new();
    fs::write(fx.input().join("readme.txt"), b"no audio here").unwrap();

    let model = MockEnhancer::new();
    let runner = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config());
    let outcome = runner.process_directory().unwrap();

    assert_eq!(outcome.discovered, 0);
    assert_eq!(outcome.succeeded, 0);
    assert!(fx.output().is_dir());
    assert!(fx.output_names().is_empty());
    assert!(model.calls().is_empty());
}

#[test]
fn test_missing_input_dir_is_empty_batch() {
    let fx = Fixture::new();
    let config = EnhanceConfig {
        input_dir: fx.dir.path().join("does-not-exist"),
        ..fx.config()
    };

    let model = MockEnhancer::new();
    let runner = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), config);
    let outcome = runner.process_directory().unwrap();

    assert_eq!(outcome.discovered, 0);
    assert!(fx.output().is_dir());
}

#[test]
fn test_corrupt_file_is_skipped() {
    let fx = Fixture::new();
    fx.add("good1.wav");
    fx.add("good2.wav");
    fs::write(fx.input().join("corrupt.wav"), b"RIFF....garbage").unwrap();

    let model = MockEnhancer::new();
    let runner = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config());
    let outcome = runner.process_directory().unwrap();

    assert_eq!(outcome.discovered, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed(), 1);
    assert_eq!(
        outcome.failures[0].source.file_name().unwrap(),
        "corrupt.wav"
    );
    assert_eq!(fx.output_names(), vec!["good1.wav", "good2.wav"]);

    for name in fx.output_names() {
        let reader = WavReader::open(fx.output().join(name)).unwrap();
        assert_eq!(reader.len(), 800);
    }
}

#[test]
fn test_model_failure_skips_every_file() {
    let fx = Fixture::new();
    fx.add("a.wav");
    fx.add("b.wav");

    let model = MockEnhancer::new().failing("CUDA error: out of memory");
    let runner = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cuda), fx.config());
    let outcome = runner.process_directory().unwrap();

    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed(), 2);
    assert!(outcome
        .failures
        .iter()
        .all(|f| f.error_code == "MODEL_PROCESSING_ERROR" && f.reason.contains("out of memory")));
    assert!(fx.output_names().is_empty());
}

#[test]
fn test_blend_weight_follows_denoising_flag() {
    for (denoising, expected) in [(true, 0.9_f32), (false, 0.1_f32)] {
        let fx = Fixture::new();
        fx.add("a.wav");

        let model = MockEnhancer::new();
        let config = EnhanceConfig {
            denoising,
            ..fx.config()
        };
        BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), config)
            .process_directory()
            .unwrap();

        let lambds: Vec<f32> = model
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ModelCall::Enhance { params, .. } => Some(params.lambd),
                ModelCall::Denoise { .. } => None,
            })
            .collect();
        assert_eq!(lambds, vec![expected]);
    }
}

#[test]
fn test_parameters_pass_through() {
    let fx = Fixture::new();
    fx.add("a.wav");

    let model = MockEnhancer::new();
    let config = EnhanceConfig {
        solver: "RK4".to_string(),
        nfe: 12,
        tau: 0.25,
        ..fx.config()
    };
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cuda), config)
        .process_directory()
        .unwrap();

    match &model.calls()[1] {
        ModelCall::Enhance { device, params, .. } => {
            assert_eq!(*device, ComputeDevice::Cuda);
            assert_eq!(params.solver, "rk4");
            assert_eq!(params.nfe, 12);
            assert_eq!(params.tau, 0.25);
        }
        other => panic!("Expected enhance call, got {:?}", other),
    }
}

#[test]
fn test_stereo_is_downmixed_before_model() {
    let fx = Fixture::new();
    write_clip(&fx.input().join("stereo.wav"), 2);

    let model = MockEnhancer::new();
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config())
        .process_directory()
        .unwrap();

    for call in model.calls() {
        let input = match call {
            ModelCall::Denoise { input, .. } | ModelCall::Enhance { input, .. } => input,
        };
        assert_eq!(input.len(), 800);
    }

    let reader = WavReader::open(fx.output().join("stereo.wav")).unwrap();
    assert_eq!(reader.spec().channels, 1);
}

#[test]
fn test_output_uses_model_sample_rate() {
    let fx = Fixture::new();
    fx.add("a.wav");

    let model = MockEnhancer::new().with_output_rate(44100);
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config())
        .process_directory()
        .unwrap();

    let reader = WavReader::open(fx.output().join("a.wav")).unwrap();
    assert_eq!(reader.spec().sample_rate, 44100);
}

#[test]
fn test_nested_input_is_flattened() {
    let fx = Fixture::new();
    fx.add("a/b/x.wav");
    fx.add("c/y.wav");

    let model = MockEnhancer::new();
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config())
        .process_directory()
        .unwrap();

    assert!(fx.output().join("x.wav").is_file());
    assert!(fx.output().join("y.wav").is_file());
    assert!(!fx.output().join("a").exists());
    assert_eq!(fx.output_names(), vec!["x.wav", "y.wav"]);
}

#[test]
fn test_existing_output_dir_is_reused() {
    let fx = Fixture::new();
    fs::create_dir(fx.output()).unwrap();
    fs::write(fx.output().join("keep.txt"), b"untouched").unwrap();
    fx.add("a.wav");

    let model = MockEnhancer::new();
    let outcome = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config())
        .process_directory()
        .unwrap();

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(
        fs::read(fx.output().join("keep.txt")).unwrap(),
        b"untouched".to_vec()
    );
}

// === Verifier ===

#[test]
fn test_verify_counts_batch_output() {
    let fx = Fixture::new();
    for name in ["a.wav", "n/b.wav", "n/m/c.wav", "d.wav"] {
        fx.add(name);
    }

    let model = MockEnhancer::new();
    let outcome = BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), fx.config())
        .process_directory()
        .unwrap();

    assert_eq!(outcome.succeeded, 4);
    assert_eq!(verify_output(&fx.output(), "wav"), 4);
}

#[test]
fn test_verify_missing_dir() {
    let fx = Fixture::new();
    assert_eq!(verify_output(&fx.output(), "wav"), 0);
}

// === Writer ===

#[test]
fn test_bit_depth_setting_applies() {
    let fx = Fixture::new();
    fx.add("a.wav");

    let model = MockEnhancer::new();
    let config = EnhanceConfig {
        bit_depth: 24,
        ..fx.config()
    };
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), config)
        .process_directory()
        .unwrap();

    let reader = WavReader::open(fx.output().join("a.wav")).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 24);
}

#[test]
fn test_written_samples_are_enhanced_output() {
    let fx = Fixture::new();
    let source = AudioBuffer::new(vec![0.5; 100], 16000).unwrap();
    export_audio(&source, &fx.input().join("flat.wav"), ExportFormat::float32()).unwrap();

    let model = MockEnhancer::new();
    let config = EnhanceConfig {
        denoising: false,
        bit_depth: 32,
        ..fx.config()
    };
    BatchRunner::new(Enhancer::new(&model, ComputeDevice::Cpu), config)
        .process_directory()
        .unwrap();

    let mut reader = WavReader::open(fx.output().join("flat.wav")).unwrap();
    let first: f32 = reader.samples::<f32>().next().unwrap().unwrap();
    approx::assert_relative_eq!(first, 0.45, epsilon = 1e-6);
}
