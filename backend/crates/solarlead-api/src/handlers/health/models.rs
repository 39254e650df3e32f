use serde::{Deserialize, Serialize};

/// Probe response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether the access gate and its providers are wired up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_ready: Option<bool>,
}

impl HealthResponse {
    pub fn ok_with_version(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: Some(version.into()),
            gate_ready: None,
        }
    }

    pub fn readiness(gate_ready: bool) -> Self {
        Self {
            status: if gate_ready { "ok" } else { "unavailable" }.to_string(),
            version: None,
            gate_ready: Some(gate_ready),
        }
    }
}
