//! Wire types for wld-daemon responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of GET /v1/health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

/// Body of GET /v1/stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_countries: i64,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Body of DELETE /v1/countries/:name on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Uniform error body. `error` distinguishes an upstream data-source
/// problem from a storage problem; `details` carries the specifics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn source_unavailable(details: impl Into<String>) -> Self {
        Self {
            error: "External data source unavailable".to_string(),
            details: Some(details.into()),
        }
    }

    pub fn storage_unavailable(details: impl Into<String>) -> Self {
        Self {
            error: "Storage unavailable".to_string(),
            details: Some(details.into()),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self {
            error: what.into(),
            details: None,
        }
    }
}
