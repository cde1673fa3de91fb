//! Remote Simulation Backend
//!
//! Boundary to the demo backend that "executes" attack simulations. The
//! controller takes this as an injected collaborator so tests can substitute
//! doubles; the production implementation is a thin reqwest JSON client.

use crate::catalog::{AttackPayload, Intensity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// The six backend operations, keyed by catalog id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendOp {
    Fraud,
    Takeover,
    Bot,
    ApiAbuse,
    DataBreach,
    Ddos,
}

impl BackendOp {
    /// Route a catalog id to its operation. Unrecognized ids have no route;
    /// the caller treats that as fatal for the request (no fallback).
    pub fn from_simulation_id(id: &str) -> Option<Self> {
        match id {
            "credit_card_fraud" => Some(BackendOp::Fraud),
            "account_takeover" => Some(BackendOp::Takeover),
            "bot_attack" => Some(BackendOp::Bot),
            "api_abuse" => Some(BackendOp::ApiAbuse),
            "data_exfiltration" => Some(BackendOp::DataBreach),
            "ddos_attack" => Some(BackendOp::Ddos),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            BackendOp::Fraud => "/demo/simulate-fraud",
            BackendOp::Takeover => "/demo/simulate-takeover",
            BackendOp::Bot => "/demo/simulate-bot",
            BackendOp::ApiAbuse => "/demo/simulate-api-abuse",
            BackendOp::DataBreach => "/demo/simulate-data-breach",
            BackendOp::Ddos => "/demo/simulate-ddos",
        }
    }
}

/// Request body for an execute call.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExecuteRequest {
    pub attack_type: String,
    pub intensity: Intensity,
    pub timestamp: DateTime<Utc>,
    pub admin_initiated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_accounts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl ExecuteRequest {
    /// Build the wire request from a catalog payload plus the operator's
    /// intensity selection.
    pub fn from_payload(
        payload: &AttackPayload,
        intensity: Intensity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            attack_type: payload.attack_type.clone(),
            intensity,
            timestamp,
            admin_initiated: true,
            target_accounts: payload.target_accounts,
            requests_per_second: payload.requests_per_second,
            requests_per_minute: payload.requests_per_minute,
            data_type: payload.data_type.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExecuteResponse {
    pub success: bool,
    pub simulation_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_systems: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// One entry of the backend's active-simulation listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActiveSimulation {
    pub id: String,
    #[serde(rename = "type")]
    pub simulation_type: String,
    pub started_at: String,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub active_simulations: Vec<ActiveSimulation>,
}

#[derive(Debug, Clone)]
pub enum BackendError {
    /// Network-level failure (connect, DNS, non-2xx, body decode).
    Transport(String),
    /// The explicit call deadline elapsed.
    Timeout,
    /// The backend answered but refused the request.
    Rejected(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport failure: {}", e),
            Self::Timeout => write!(f, "remote call timed out"),
            Self::Rejected(msg) => write!(f, "backend rejected request: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// Remote collaborator the controller depends on. Injected at construction;
/// never imported as a module-level singleton.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    /// Execute one attack simulation.
    async fn execute(
        &self,
        op: BackendOp,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, BackendError>;

    /// Stop all running simulations.
    async fn stop_all(&self) -> Result<StopResponse, BackendError>;

    /// List simulations the backend believes are running. Degrades to an
    /// empty listing on failure; informational only.
    async fn status(&self) -> StatusResponse {
        StatusResponse::default()
    }
}

/// HTTP implementation over the demo backend's JSON API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_token: auth_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl SimulationBackend for HttpBackend {
    async fn execute(
        &self,
        op: BackendOp,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, BackendError> {
        let response = self
            .client
            .post(self.url(op.path()))
            .bearer_auth(&self.auth_token)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::Transport(format!(
                "HTTP error! status: {}",
                response.status()
            )));
        }

        response
            .json::<ExecuteResponse>()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    async fn stop_all(&self) -> Result<StopResponse, BackendError> {
        let response = self
            .client
            .post(self.url("/demo/stop-simulations"))
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::Transport(format!(
                "HTTP error! status: {}",
                response.status()
            )));
        }

        response
            .json::<StopResponse>()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    async fn status(&self) -> StatusResponse {
        let result = self
            .client
            .get(self.url("/demo/simulation-status"))
            .bearer_auth(&self.auth_token)
            .send()
            .await;

        match result {
            Ok(response) => response.json::<StatusResponse>().await.unwrap_or_else(|e| {
                warn!(error = %e, "simulation-status body malformed, degrading to empty");
                StatusResponse::default()
            }),
            Err(e) => {
                warn!(error = %e, "simulation-status query failed, degrading to empty");
                StatusResponse::default()
            }
        }
    }
}
