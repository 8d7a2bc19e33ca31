//! Hub publishing integration tests

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use voiceprep::hub::{publish, PublishOptions, RecordingHub};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Extractor, tokenizer and model directories as a training run leaves them
fn model_dirs(root: &Path) -> Vec<PathBuf> {
    let extractor = root.join("extractor");
    let tokenizer = root.join("tokenizer");
    let model = root.join("model");

    write(&extractor.join("preprocessor_config.json"), "{\"sampling_rate\": 44100}");
    write(&tokenizer.join("tokenizer.json"), "{}");
    write(&tokenizer.join("special_tokens_map.json"), "{}");
    write(&tokenizer.join("config.json"), "tokenizer");
    write(&model.join("config.json"), "model");
    write(&model.join("model.safetensors"), "weights");
    write(&model.join(".git/HEAD"), "ref: refs/heads/main");
    write(&model.join("runs/log.txt"), "step 1");

    vec![extractor, tokenizer, model]
}

#[test]
fn test_publish_uploads_all_sources_in_one_commit() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new();
    let options = PublishOptions {
        private: true,
        ..PublishOptions::new("me/parler_tts_600M", model_dirs(dir.path()))
    };

    let summary = publish(&hub, &options).unwrap();

    assert_eq!(
        summary.files,
        vec![
            "config.json",
            "model.safetensors",
            "preprocessor_config.json",
            "runs/log.txt",
            "special_tokens_map.json",
            "tokenizer.json",
        ]
    );
    assert_eq!(hub.created(), vec![("me/parler_tts_600M".to_string(), true)]);

    let commits = hub.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].message, "Upload model");
    assert_eq!(commits[0].files.len(), 6);
}

#[test]
fn test_later_source_wins_on_same_name() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new();
    let sources = model_dirs(dir.path());

    publish(&hub, &PublishOptions::new("tts", sources.clone())).unwrap();

    let commit = &hub.commits()[0];
    let config = commit
        .files
        .iter()
        .find(|f| f.path_in_repo == "config.json")
        .unwrap();
    assert_eq!(config.local, sources[2].join("config.json"));
    assert_eq!(config.size, "model".len() as u64);
}

#[test]
fn test_missing_source_dir() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new();
    let options = PublishOptions::new("me/tts", vec![dir.path().join("nope")]);

    let err = publish(&hub, &options).unwrap_err();
    assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    assert!(hub.created().is_empty());
}

#[test]
fn test_empty_source_dir() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new();
    let options = PublishOptions::new("me/tts", vec![dir.path().to_path_buf()]);

    assert_eq!(publish(&hub, &options).unwrap_err().error_code(), "INVALID_CONFIG");
    assert!(hub.commits().is_empty());
}

#[test]
fn test_invalid_repo_id_checked_first() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new();
    let options = PublishOptions::new("a/b/c", model_dirs(dir.path()));

    assert_eq!(publish(&hub, &options).unwrap_err().error_code(), "INVALID_REPO_ID");
    assert!(hub.created().is_empty());
}

#[test]
fn test_commit_failure_propagates() {
    let dir = tempdir().unwrap();
    let hub = RecordingHub::new().failing("403 Forbidden");
    let options = PublishOptions::new("me/tts", model_dirs(dir.path()));

    let err = publish(&hub, &options).unwrap_err();
    assert_eq!(err.error_code(), "HUB_REQUEST_ERROR");
    assert!(err.to_string().contains("403"));
}
