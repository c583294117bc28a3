#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the ward map server.
//!
//! Ward rows themselves are served as `ward_map_ward_models::WardRecord`;
//! this crate only holds the envelopes around them.

use serde::{Deserialize, Serialize};

/// Server health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Body of `POST /v1/query/ask`.
///
/// Clients send the question under either `query` or `question`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    /// Question text (preferred key).
    #[serde(default)]
    pub query: Option<String>,
    /// Question text (alternate key).
    #[serde(default)]
    pub question: Option<String>,
}

impl AskRequest {
    /// Returns the question, preferring a non-empty `query` over `question`.
    #[must_use]
    pub fn question_text(&self) -> &str {
        self.query
            .as_deref()
            .filter(|q| !q.is_empty())
            .or(self.question.as_deref())
            .unwrap_or_default()
    }
}

/// Body of every `POST /v1/query/ask` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Answer text, or an explanation when no answer could be produced.
    pub result: String,
}

/// Query parameters for the top-priority endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TopPriorityParams {
    /// Number of wards to return.
    pub n: Option<usize>,
}
