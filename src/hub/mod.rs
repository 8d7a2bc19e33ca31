//! Model hub publishing
//!
//! Uploads trained model directories to a hub repo behind the `HubClient`
//! trait, with an HTTP implementation and a recording one for dry runs.

mod client;
mod http;
mod mock;
mod publish;

pub use client::{HubClient, HubFile};
pub use http::{HttpHub, DEFAULT_HUB_ENDPOINT, TOKEN_VAR};
pub use mock::{RecordedCommit, RecordingHub};
pub use publish::{collect_files, publish, PublishOptions, PublishSummary, DEFAULT_COMMIT_MESSAGE};
