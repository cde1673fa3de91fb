//! Security Operations Engine
//!
//! Composes the controller, topology, metrics window, event log and live
//! feed behind one cooperative scheduler: a single clock and a due-time
//! queue of three task kinds, advanced explicitly via [`SecurityOpsEngine::advance_to`].
//! That makes the whole engine deterministically steppable in tests and
//! collapses cancellation to removing queue entries, so stopping a
//! simulation can never leak a stray timer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     SecurityOpsEngine                        │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────────────────┐  │
//! │  │ Controller │  │ Scheduler  │  │ State                  │  │
//! │  │ start/stop │──│ one clock, │──│ topology · metrics ·   │  │
//! │  │ + fallback │  │ 3 tasks    │  │ events · feed · alerts │  │
//! │  └────────────┘  └────────────┘  └────────────────────────┘  │
//! │                        │                                     │
//! │                        ▼                                     │
//! │                 EngineSnapshot (for the views)               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::backend::SimulationBackend;
use crate::catalog::{AttackCatalog, AttackSimulation, Intensity};
use crate::controller::{
    ControlError, ControlState, REMOTE_CALL_TIMEOUT, SimulationController, SimulationRun,
    StopOutcome,
};
use crate::event::SecurityEvent;
use crate::feed::{
    AlertCenter, LiveMessage, MonitorEvent, MonitorFeed, SecurityAlert, SystemStatus,
};
use crate::log::BoundedLog;
use crate::metrics::{METRICS_TICK_MS, MetricsWindow, ThreatMetricSample};
use crate::network::{NETWORK_TICK_MS, NetworkNode, NetworkTopology, ThreatPulse};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Security-event log depth for the command-center view.
pub const EVENT_LOG_CAP: usize = 50;

/// The three periodic concerns multiplexed onto the one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickTask {
    /// Node status transitions + pulse spawning (1.5s, only while running).
    Network,
    /// Threat-metric sampling (1.5s, only while running).
    Metrics,
    /// Generic monitoring feed (jittered 2-5s, always).
    Feed,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    due_ms: u64,
    task: TickTask,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed for all simulated randomness. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Clock origin in epoch milliseconds. `None` uses wall time. Tests pin
    /// this to step the engine deterministically.
    pub start_ms: Option<u64>,
    /// Deadline for remote start/stop calls.
    pub remote_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_ms: None,
            remote_timeout: REMOTE_CALL_TIMEOUT,
        }
    }
}

/// Serializable view of everything the dashboards render.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EngineSnapshot {
    pub state: ControlState,
    pub run: Option<SimulationRun>,
    pub system_status: SystemStatus,
    pub nodes: Vec<NetworkNode>,
    pub pulses: Vec<ThreatPulse>,
    pub events: Vec<SecurityEvent>,
    pub metrics: Vec<ThreatMetricSample>,
    pub feed: Vec<MonitorEvent>,
    pub alerts: Vec<SecurityAlert>,
}

pub struct SecurityOpsEngine {
    catalog: AttackCatalog,
    controller: SimulationController,
    topology: NetworkTopology,
    metrics: MetricsWindow,
    events: BoundedLog<SecurityEvent>,
    feed: MonitorFeed,
    alerts: AlertCenter,
    tasks: Vec<ScheduledTask>,
    now_ms: u64,
    rng: StdRng,
}

impl SecurityOpsEngine {
    pub fn new(config: EngineConfig, backend: Arc<dyn SimulationBackend>) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let now_ms = config
            .start_ms
            .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);

        // The feed runs from construction on, simulation or not.
        let first_feed = now_ms + MonitorFeed::next_delay_ms(&mut rng);
        let tasks = vec![ScheduledTask {
            due_ms: first_feed,
            task: TickTask::Feed,
        }];

        Self {
            catalog: AttackCatalog::new(),
            controller: SimulationController::with_timeout(backend, config.remote_timeout),
            topology: NetworkTopology::new(),
            metrics: MetricsWindow::new(),
            events: BoundedLog::with_capacity(EVENT_LOG_CAP),
            feed: MonitorFeed::new(),
            alerts: AlertCenter::new(),
            tasks,
            now_ms,
            rng,
        }
    }

    pub fn catalog(&self) -> &AttackCatalog {
        &self.catalog
    }

    pub fn state(&self) -> ControlState {
        self.controller.state()
    }

    pub fn current_run(&self) -> Option<&SimulationRun> {
        self.controller.current_run()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms as i64).unwrap_or_default()
    }

    /// Start the simulation selected by catalog id.
    ///
    /// `None` rejects with a validation error; an id missing from the
    /// catalog is fatal for the call. Past validation the controller's
    /// fallback guarantees a running outcome, after which the network and
    /// metrics tasks are armed.
    pub async fn start(
        &mut self,
        selection: Option<&str>,
        intensity: Intensity,
    ) -> Result<SimulationRun, ControlError> {
        let simulation: Option<&AttackSimulation> = match selection {
            Some(id) => Some(
                self.catalog
                    .get(id)
                    .ok_or_else(|| ControlError::UnknownSimulation(id.to_string()))?,
            ),
            None => None,
        };

        let now = self.timestamp();
        let run = self
            .controller
            .start(simulation, intensity, now)
            .await?
            .clone();

        self.cancel_periodic();
        self.schedule(TickTask::Network, self.now_ms + NETWORK_TICK_MS);
        self.schedule(TickTask::Metrics, self.now_ms + METRICS_TICK_MS);
        Ok(run)
    }

    /// Stop the active simulation. Regardless of the remote outcome, both
    /// periodic tasks are cancelled and the topology is reset in the same
    /// transition.
    pub async fn stop(&mut self) -> Result<StopOutcome, ControlError> {
        let outcome = self.controller.stop().await?;
        self.cancel_periodic();
        self.topology.reset();
        Ok(outcome)
    }

    /// Fold one inbound live message into the alert log and status flag.
    pub fn ingest(&mut self, message: LiveMessage) {
        let now = self.timestamp();
        self.alerts.ingest(message, now);
    }

    /// Advance the clock to `target_ms`, dispatching every due task in
    /// timestamp order.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(idx) = self.next_due(target_ms) {
            let ScheduledTask { due_ms, task } = self.tasks.remove(idx);
            if due_ms > self.now_ms {
                self.now_ms = due_ms;
            }
            self.topology.expire_pulses(self.now_ms);
            self.dispatch(task);
        }

        if target_ms > self.now_ms {
            self.now_ms = target_ms;
        }
        self.topology.expire_pulses(self.now_ms);
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance(&mut self, delta_ms: u64) {
        self.advance_to(self.now_ms + delta_ms);
    }

    fn dispatch(&mut self, task: TickTask) {
        match task {
            TickTask::Network => {
                let active = self
                    .controller
                    .current_run()
                    .map(|run| run.catalog_id.clone());
                if let Some(catalog_id) = active {
                    let emitted =
                        self.topology
                            .tick(&mut self.rng, Some(&catalog_id), self.now_ms);
                    for event in emitted {
                        debug!(
                            target_node = %event.target_node,
                            severity = %event.severity,
                            "node escalation"
                        );
                        self.events.push(event);
                    }
                    self.schedule(TickTask::Network, self.now_ms + NETWORK_TICK_MS);
                }
            }
            TickTask::Metrics => {
                if self.controller.is_running() {
                    let now = self.timestamp();
                    self.metrics.record(&mut self.rng, now);
                    self.schedule(TickTask::Metrics, self.now_ms + METRICS_TICK_MS);
                }
            }
            TickTask::Feed => {
                let now = self.timestamp();
                let active = self.controller.is_running();
                self.feed.record(&mut self.rng, active, now);
                let delay = MonitorFeed::next_delay_ms(&mut self.rng);
                self.schedule(TickTask::Feed, self.now_ms + delay);
            }
        }
    }

    fn schedule(&mut self, task: TickTask, due_ms: u64) {
        self.tasks.push(ScheduledTask { due_ms, task });
    }

    fn cancel_periodic(&mut self) {
        self.tasks
            .retain(|t| !matches!(t.task, TickTask::Network | TickTask::Metrics));
    }

    /// Index of the earliest task due at or before `target_ms`.
    fn next_due(&self, target_ms: u64) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= target_ms)
            .min_by_key(|(_, t)| t.due_ms)
            .map(|(idx, _)| idx)
    }

    /// Kinds of tasks currently scheduled, for tests and diagnostics.
    pub fn scheduled_tasks(&self) -> Vec<TickTask> {
        self.tasks.iter().map(|t| t.task).collect()
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.to_vec()
    }

    pub fn metrics(&self) -> &MetricsWindow {
        &self.metrics
    }

    pub fn topology(&self) -> &NetworkTopology {
        &self.topology
    }

    pub fn feed(&self) -> &MonitorFeed {
        &self.feed
    }

    pub fn system_status(&self) -> SystemStatus {
        self.alerts.status()
    }

    /// View handed to the presentation layer.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.controller.state(),
            run: self.controller.current_run().cloned(),
            system_status: self.alerts.status(),
            nodes: self.topology.nodes().to_vec(),
            pulses: self.topology.pulses().into_iter().cloned().collect(),
            events: self.events.to_vec(),
            metrics: self.metrics.to_vec(),
            feed: self.feed.to_vec(),
            alerts: self.alerts.alerts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, BackendOp, ExecuteRequest, ExecuteResponse, StopResponse};
    use async_trait::async_trait;

    struct OkBackend;

    #[async_trait]
    impl SimulationBackend for OkBackend {
        async fn execute(
            &self,
            _op: BackendOp,
            _request: &ExecuteRequest,
        ) -> Result<ExecuteResponse, BackendError> {
            Ok(ExecuteResponse {
                success: true,
                simulation_id: "sim_test".to_string(),
                message: String::new(),
                estimated_duration: None,
                affected_systems: None,
            })
        }

        async fn stop_all(&self) -> Result<StopResponse, BackendError> {
            Ok(StopResponse {
                success: true,
                message: String::new(),
            })
        }
    }

    const T0: u64 = 1_736_000_000_000;

    fn engine() -> SecurityOpsEngine {
        SecurityOpsEngine::new(
            EngineConfig {
                seed: Some(42),
                start_ms: Some(T0),
                ..EngineConfig::default()
            },
            Arc::new(OkBackend),
        )
    }

    #[tokio::test]
    async fn test_periodic_tasks_armed_on_start() {
        let mut engine = engine();
        engine
            .start(Some("ddos_attack"), Intensity::High)
            .await
            .unwrap();
        let tasks = engine.scheduled_tasks();
        assert!(tasks.contains(&TickTask::Network));
        assert!(tasks.contains(&TickTask::Metrics));
        assert!(tasks.contains(&TickTask::Feed));
    }

    #[tokio::test]
    async fn test_metrics_sample_per_tick() {
        let mut engine = engine();
        engine
            .start(Some("ddos_attack"), Intensity::High)
            .await
            .unwrap();
        engine.advance(4500);
        assert_eq!(engine.metrics().len(), 3);
    }

    #[tokio::test]
    async fn test_idle_engine_produces_no_metrics_or_events() {
        let mut engine = engine();
        engine.advance(30_000);
        assert!(engine.metrics().is_empty());
        assert!(engine.events().is_empty());
        // The feed keeps running while idle.
        assert!(!engine.feed().is_empty());
    }

    #[tokio::test]
    async fn test_stop_cancels_periodic_tasks() {
        let mut engine = engine();
        engine
            .start(Some("ddos_attack"), Intensity::High)
            .await
            .unwrap();
        engine.advance(6000);
        engine.stop().await.unwrap();

        let tasks = engine.scheduled_tasks();
        assert!(!tasks.contains(&TickTask::Network));
        assert!(!tasks.contains(&TickTask::Metrics));
        assert!(tasks.contains(&TickTask::Feed));

        // Advancing further must not grow metrics or events.
        let metrics_before = engine.metrics().len();
        let events_before = engine.events().len();
        engine.advance(30_000);
        assert_eq!(engine.metrics().len(), metrics_before);
        assert_eq!(engine.events().len(), events_before);
    }

    #[tokio::test]
    async fn test_stop_resets_topology_and_pulses() {
        let mut engine = engine();
        engine
            .start(Some("ddos_attack"), Intensity::High)
            .await
            .unwrap();
        engine.advance(15_000);
        engine.stop().await.unwrap();

        for node in engine.topology().nodes() {
            assert_eq!(node.status, crate::network::default_status(node.node_type));
        }
        assert!(engine.topology().pulses().is_empty());
        assert_eq!(engine.state(), ControlState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_catalog_id_is_fatal() {
        let mut engine = engine();
        let err = engine
            .start(Some("solar_flare"), Intensity::Low)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ControlError::UnknownSimulation("solar_flare".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_selection_is_rejected() {
        let mut engine = engine();
        let err = engine.start(None, Intensity::Low).await.unwrap_err();
        assert_eq!(err, ControlError::NoSelection);
    }

    #[tokio::test]
    async fn test_event_log_capped_at_fifty() {
        let mut engine = engine();
        engine
            .start(Some("ddos_attack"), Intensity::High)
            .await
            .unwrap();
        // Long run; gateway/firewall churn emits plenty of events.
        engine.advance(600_000);
        assert!(engine.events().len() <= EVENT_LOG_CAP);
    }

    #[tokio::test]
    async fn test_seeded_engines_agree() {
        let mut a = engine();
        let mut b = engine();
        a.start(Some("ddos_attack"), Intensity::High).await.unwrap();
        b.start(Some("ddos_attack"), Intensity::High).await.unwrap();
        a.advance(20_000);
        b.advance(20_000);

        assert_eq!(a.events().len(), b.events().len());
        for (ea, eb) in a.events().iter().zip(b.events().iter()) {
            assert_eq!(ea.severity, eb.severity);
            assert_eq!(ea.target_node, eb.target_node);
            assert_eq!(ea.agent, eb.agent);
            assert_eq!(ea.timestamp, eb.timestamp);
        }
    }

    #[tokio::test]
    async fn test_snapshot_serializes() {
        let mut engine = engine();
        engine
            .start(Some("data_exfiltration"), Intensity::Medium)
            .await
            .unwrap();
        engine.advance(10_000);
        engine.ingest(LiveMessage::SecurityAlert {
            id: "a1".to_string(),
            alert_type: "breach".to_string(),
            message: "exfil attempt".to_string(),
            severity: crate::feed::AlertSeverity::High,
        });

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, ControlState::Running);
        assert_eq!(snapshot.system_status, SystemStatus::Alert);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("data_exfiltration"));
    }
}
