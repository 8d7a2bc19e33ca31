//! HTTP client for a Hugging Face compatible model hub
//!
//! Every file goes through the git-lfs batch API and is then referenced
//! from a single commit. Networking is compiled in with the `hub` feature.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{HubClient, HubFile};
use crate::error::{Result, VoiceprepError};

/// Default hub address
pub const DEFAULT_HUB_ENDPOINT: &str = "https://huggingface.co";

/// Environment variable holding the access token
pub const TOKEN_VAR: &str = "HF_TOKEN";

/// Older name of `TOKEN_VAR`, still honoured
const LEGACY_TOKEN_VAR: &str = "HUGGING_FACE_HUB_TOKEN";

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    private: bool,
    #[serde(rename = "type")]
    repo_type: &'static str,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct LfsObject {
    oid: String,
    size: u64,
}

#[derive(Debug, Serialize)]
struct LfsBatchRequest {
    operation: &'static str,
    transfers: Vec<&'static str>,
    objects: Vec<LfsObject>,
    hash_algo: &'static str,
}

#[derive(Debug, Deserialize)]
struct LfsBatchResponse {
    objects: Vec<LfsObjectResponse>,
}

#[derive(Debug, Deserialize)]
struct LfsObjectResponse {
    oid: String,
    #[serde(default)]
    actions: Option<LfsActions>,
    #[serde(default)]
    error: Option<LfsObjectError>,
}

#[derive(Debug, Deserialize)]
struct LfsActions {
    upload: Option<LfsAction>,
    verify: Option<LfsAction>,
}

#[derive(Debug, Deserialize)]
struct LfsAction {
    href: String,
    #[serde(default)]
    header: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LfsObjectError {
    message: String,
}

/// Split `org/name` into its parts; a bare name has no organisation
fn split_repo_id(repo_id: &str) -> (Option<&str>, &str) {
    match repo_id.split_once('/') {
        Some((org, name)) => (Some(org), name),
        None => (None, repo_id),
    }
}

fn batch_request(files: &[HubFile]) -> LfsBatchRequest {
    LfsBatchRequest {
        operation: "upload",
        transfers: vec!["basic"],
        objects: files
            .iter()
            .map(|f| LfsObject {
                oid: f.sha256.clone(),
                size: f.size,
            })
            .collect(),
        hash_algo: "sha256",
    }
}

/// Newline-delimited commit body: one header line, one line per file
fn commit_payload(files: &[HubFile], message: &str) -> Result<String> {
    let mut lines = vec![serde_json::to_string(&json!({
        "key": "header",
        "value": { "summary": message, "description": "" },
    }))?];

    for file in files {
        lines.push(serde_json::to_string(&json!({
            "key": "lfsFile",
            "value": { "path": file.path_in_repo, "algo": "sha256", "oid": file.sha256 },
        }))?);
    }

    Ok(lines.join("\n"))
}

fn request_error(context: &str, e: impl std::fmt::Display) -> VoiceprepError {
    VoiceprepError::HubRequestError {
        reason: format!("{}: {}", context, e),
    }
}

/// Hub client authenticated with an access token
pub struct HttpHub {
    endpoint: String,
    token: String,
}

impl HttpHub {
    /// Create a client configured from the environment
    ///
    /// Reads `HF_TOKEN` (or `HUGGING_FACE_HUB_TOKEN`) and `HF_ENDPOINT`.
    ///
    /// # Errors
    /// * `HubTokenMissing` - If no token is set
    pub fn from_env() -> Result<Self> {
        let token = env::var(TOKEN_VAR)
            .or_else(|_| env::var(LEGACY_TOKEN_VAR))
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(VoiceprepError::HubTokenMissing { var: TOKEN_VAR })?;
        let endpoint = env::var("HF_ENDPOINT").unwrap_or_else(|_| DEFAULT_HUB_ENDPOINT.into());

        Ok(Self::with_config(endpoint, token))
    }

    pub fn with_config(endpoint: String, token: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[cfg(feature = "hub")]
    fn client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(Option::<std::time::Duration>::None)
            .build()
            .map_err(|e| request_error("cannot build HTTP client", e))
    }

    #[cfg(feature = "hub")]
    fn check(response: reqwest::blocking::Response, what: &str) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(request_error(what, format!("{} {}", status, body.trim())))
    }

    /// Push every file that the hub does not already store to LFS storage.
    #[cfg(feature = "hub")]
    fn upload_objects(&self, repo_id: &str, files: &[HubFile]) -> Result<()> {
        use reqwest::header::{ACCEPT, CONTENT_TYPE};

        const LFS_JSON: &str = "application/vnd.git-lfs+json";

        let client = self.client()?;
        let url = format!("{}/{}.git/info/lfs/objects/batch", self.endpoint, repo_id);
        let body = serde_json::to_vec(&batch_request(files))?;

        let response = client
            .post(&url)
            .bearer_auth(&self.token)
            .header(ACCEPT, LFS_JSON)
            .header(CONTENT_TYPE, LFS_JSON)
            .body(body)
            .send()
            .map_err(|e| request_error("LFS batch", e))?;
        let batch: LfsBatchResponse = Self::check(response, "LFS batch")?
            .json()
            .map_err(|e| request_error("invalid LFS batch response", e))?;

        for object in batch.objects {
            if let Some(error) = object.error {
                return Err(request_error(&object.oid, error.message));
            }
            let Some(actions) = object.actions else {
                log::debug!("{} already stored", object.oid);
                continue;
            };
            let Some(file) = files.iter().find(|f| f.sha256 == object.oid) else {
                return Err(request_error("LFS batch", format!("unknown object {}", object.oid)));
            };

            if let Some(upload) = actions.upload {
                if upload.header.contains_key("chunk_size") {
                    return Err(request_error(
                        &file.path_in_repo,
                        "multipart upload requested, file is too large",
                    ));
                }
                log::info!("Uploading {} ({} bytes)", file.path_in_repo, file.size);

                let contents = std::fs::File::open(&file.local)?;
                let mut request = client.put(&upload.href).body(contents);
                for (key, value) in &upload.header {
                    request = request.header(key, value);
                }
                let response = request
                    .send()
                    .map_err(|e| request_error(&file.path_in_repo, e))?;
                Self::check(response, &file.path_in_repo)?;
            }

            if let Some(verify) = actions.verify {
                let mut request = client
                    .post(&verify.href)
                    .bearer_auth(&self.token)
                    .json(&LfsObject {
                        oid: file.sha256.clone(),
                        size: file.size,
                    });
                for (key, value) in &verify.header {
                    request = request.header(key, value);
                }
                let response = request
                    .send()
                    .map_err(|e| request_error("LFS verify", e))?;
                Self::check(response, "LFS verify")?;
            }
        }

        Ok(())
    }
}

impl HubClient for HttpHub {
    fn name(&self) -> &str {
        "hub"
    }

    #[cfg(feature = "hub")]
    fn create_repo(&self, repo_id: &str, private: bool) -> Result<()> {
        let (organization, name) = split_repo_id(repo_id);
        let url = format!("{}/api/repos/create", self.endpoint);

        let response = self
            .client()?
            .post(&url)
            .bearer_auth(&self.token)
            .json(&CreateRepoRequest {
                name,
                organization,
                private,
                repo_type: "model",
            })
            .send()
            .map_err(|e| request_error("create repo", e))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            log::debug!("{} already exists", repo_id);
            return Ok(());
        }
        Self::check(response, "create repo")?;
        Ok(())
    }

    #[cfg(not(feature = "hub"))]
    fn create_repo(&self, _repo_id: &str, _private: bool) -> Result<()> {
        Err(VoiceprepError::HubRequestError {
            reason: "Hub client not compiled. Build with --features hub".to_string(),
        })
    }

    #[cfg(feature = "hub")]
    fn commit(&self, repo_id: &str, files: &[HubFile], message: &str) -> Result<()> {
        self.upload_objects(repo_id, files)?;

        let url = format!("{}/api/models/{}/commit/main", self.endpoint, repo_id);
        let response = self
            .client()?
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(commit_payload(files, message)?)
            .send()
            .map_err(|e| request_error("commit", e))?;
        Self::check(response, "commit")?;
        Ok(())
    }

    #[cfg(not(feature = "hub"))]
    fn commit(&self, _repo_id: &str, _files: &[HubFile], _message: &str) -> Result<()> {
        Err(VoiceprepError::HubRequestError {
            reason: "Hub client not compiled. Build with --features hub".to_string(),
        })
    }
}
