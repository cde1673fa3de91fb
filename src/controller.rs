//! Simulation Controller
//!
//! State machine governing which attack simulation is active. Start and stop
//! go through the remote backend, but neither can strand the controller: any
//! transport failure falls back to a locally minted demo run (start) or a
//! forced local stop. The operator always sees the simulation as started or
//! stopped; only the run mode distinguishes real from demo execution.

use crate::backend::{BackendError, BackendOp, ExecuteRequest, SimulationBackend};
use crate::catalog::{AttackSimulation, Intensity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Deadline for each remote call. An unresolved call would otherwise stall
/// the fallback path indefinitely.
pub const REMOTE_CALL_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    Idle,
    Starting,
    Running,
    Stopping,
}

/// Whether a run is backed by the remote engine or locally minted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Live,
    Demo,
}

/// The live simulation instance. Exists only between a successful start and
/// the next stop.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SimulationRun {
    /// Server-issued id, or `demo_<millis>` when minted locally.
    pub simulation_id: String,
    /// Catalog id of the selected simulation.
    pub catalog_id: String,
    pub intensity: Intensity,
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// No simulation selected before start.
    NoSelection,
    /// A run is already active; it is never silently replaced.
    AlreadyRunning,
    /// A previous start/stop remote call is still in flight.
    Busy,
    /// Catalog id has no backend route. Fatal for this call, no fallback.
    UnknownSimulation(String),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no attack simulation selected"),
            Self::AlreadyRunning => write!(f, "a simulation is already running"),
            Self::Busy => write!(f, "a start/stop request is already in flight"),
            Self::UnknownSimulation(id) => write!(f, "unknown simulation type: {}", id),
        }
    }
}

impl std::error::Error for ControlError {}

/// Result of a stop call. `mode` reports whether the backend acknowledged
/// the stop or the controller forced it locally.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopOutcome {
    pub mode: RunMode,
    pub message: String,
}

pub struct SimulationController {
    backend: Arc<dyn SimulationBackend>,
    remote_timeout: Duration,
    state: ControlState,
    run: Option<SimulationRun>,
}

impl SimulationController {
    pub fn new(backend: Arc<dyn SimulationBackend>) -> Self {
        Self::with_timeout(backend, REMOTE_CALL_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn SimulationBackend>, remote_timeout: Duration) -> Self {
        Self {
            backend,
            remote_timeout,
            state: ControlState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControlState::Running
    }

    pub fn current_run(&self) -> Option<&SimulationRun> {
        self.run.as_ref()
    }

    /// Start the selected simulation.
    ///
    /// Validation errors (`NoSelection`, `AlreadyRunning`, `Busy`,
    /// `UnknownSimulation`) leave the controller untouched. Once validation
    /// passes the call cannot fail: a backend refusal, transport error or
    /// timeout falls back to a locally minted `demo_<millis>` run, and the
    /// controller ends in `Running` either way.
    pub async fn start(
        &mut self,
        selection: Option<&AttackSimulation>,
        intensity: Intensity,
        now: DateTime<Utc>,
    ) -> Result<&SimulationRun, ControlError> {
        let simulation = selection.ok_or(ControlError::NoSelection)?;
        match self.state {
            ControlState::Running => return Err(ControlError::AlreadyRunning),
            ControlState::Starting | ControlState::Stopping => return Err(ControlError::Busy),
            ControlState::Idle => {}
        }

        let op = BackendOp::from_simulation_id(&simulation.id)
            .ok_or_else(|| ControlError::UnknownSimulation(simulation.id.clone()))?;

        self.state = ControlState::Starting;
        let request = ExecuteRequest::from_payload(&simulation.payload, intensity, now);

        let outcome = match timeout(self.remote_timeout, self.backend.execute(op, &request)).await
        {
            Ok(Ok(response)) if response.success => Ok(response),
            Ok(Ok(response)) => Err(BackendError::Rejected(response.message)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BackendError::Timeout),
        };

        let run = match outcome {
            Ok(response) => {
                info!(
                    simulation = %simulation.id,
                    simulation_id = %response.simulation_id,
                    "simulation started"
                );
                SimulationRun {
                    simulation_id: response.simulation_id,
                    catalog_id: simulation.id.clone(),
                    intensity,
                    mode: RunMode::Live,
                    started_at: now,
                }
            }
            Err(e) => {
                warn!(simulation = %simulation.id, error = %e, "start failed, running in demo mode");
                SimulationRun {
                    simulation_id: format!("demo_{}", now.timestamp_millis()),
                    catalog_id: simulation.id.clone(),
                    intensity,
                    mode: RunMode::Demo,
                    started_at: now,
                }
            }
        };

        self.state = ControlState::Running;
        self.run = Some(run);
        Ok(self.run.as_ref().expect("run was just set"))
    }

    /// Stop the active simulation.
    ///
    /// Safe no-op when already idle. Otherwise the remote stop is attempted,
    /// and the controller returns to `Idle` with the run cleared regardless
    /// of the outcome.
    pub async fn stop(&mut self) -> Result<StopOutcome, ControlError> {
        match self.state {
            ControlState::Idle => {
                return Ok(StopOutcome {
                    mode: RunMode::Demo,
                    message: "no simulation running".to_string(),
                });
            }
            ControlState::Starting | ControlState::Stopping => return Err(ControlError::Busy),
            ControlState::Running => {}
        }

        self.state = ControlState::Stopping;
        let outcome = match timeout(self.remote_timeout, self.backend.stop_all()).await {
            Ok(Ok(response)) if response.success => StopOutcome {
                mode: RunMode::Live,
                message: response.message,
            },
            Ok(Ok(response)) => {
                warn!(message = %response.message, "backend refused stop, forcing local stop");
                StopOutcome {
                    mode: RunMode::Demo,
                    message: "simulation stopped (demo mode)".to_string(),
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "stop failed, forcing local stop");
                StopOutcome {
                    mode: RunMode::Demo,
                    message: "simulation stopped (demo mode)".to_string(),
                }
            }
            Err(_) => {
                warn!("stop timed out, forcing local stop");
                StopOutcome {
                    mode: RunMode::Demo,
                    message: "simulation stopped (demo mode)".to_string(),
                }
            }
        };

        self.state = ControlState::Idle;
        self.run = None;
        Ok(outcome)
    }
}
