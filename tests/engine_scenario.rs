//! End-to-end scenario tests driving the full engine against backend doubles.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use zerotrust_sim::backend::{
    BackendError, BackendOp, ExecuteRequest, ExecuteResponse, StopResponse,
};
use zerotrust_sim::network::default_status;
use zerotrust_sim::{
    ControlState, EngineConfig, Intensity, RunMode, SecurityOpsEngine, SimulationBackend, TickTask,
};

const T0: u64 = 1_736_000_000_000;

struct OkBackend;

#[async_trait]
impl SimulationBackend for OkBackend {
    async fn execute(
        &self,
        _op: BackendOp,
        request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, BackendError> {
        Ok(ExecuteResponse {
            success: true,
            simulation_id: format!("sim_{}", request.attack_type),
            message: "started".to_string(),
            estimated_duration: Some(300),
            affected_systems: None,
        })
    }

    async fn stop_all(&self) -> Result<StopResponse, BackendError> {
        Ok(StopResponse {
            success: true,
            message: "all simulations stopped".to_string(),
        })
    }
}

struct UnreachableBackend;

#[async_trait]
impl SimulationBackend for UnreachableBackend {
    async fn execute(
        &self,
        _op: BackendOp,
        _request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }

    async fn stop_all(&self) -> Result<StopResponse, BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }
}

fn engine_with(backend: Arc<dyn SimulationBackend>, seed: u64) -> SecurityOpsEngine {
    SecurityOpsEngine::new(
        EngineConfig {
            seed: Some(seed),
            start_ms: Some(T0),
            remote_timeout: Duration::from_millis(100),
        },
        backend,
    )
}

#[tokio::test]
async fn test_ddos_scenario_three_ticks_then_stop() {
    let mut engine = engine_with(Arc::new(OkBackend), 7);

    let run = engine
        .start(Some("ddos_attack"), Intensity::High)
        .await
        .unwrap();
    assert_eq!(run.mode, RunMode::Live);
    assert_eq!(run.intensity, Intensity::High);
    assert_eq!(engine.state(), ControlState::Running);

    // 3 network ticks = 4.5s simulated.
    engine.advance(4500);

    // (a) one metrics sample per tick, counters non-decreasing.
    let samples = engine.metrics().to_vec();
    assert_eq!(samples.len(), 3);
    for pair in samples.windows(2) {
        // Newest first: pair[0] is the later sample.
        assert!(pair[0].threats_detected >= pair[1].threats_detected);
        assert!(pair[0].threats_blocked >= pair[1].threats_blocked);
        assert!(pair[0].threats_blocked <= pair[0].threats_detected);
    }

    // (b) any emitted event belongs to this attack and hit a perimeter node.
    for event in engine.events() {
        assert_eq!(event.attack_type, "ddos_attack");
        assert!(matches!(event.target_node.as_str(), "gateway" | "firewall"));
    }

    // (c) stop resets everything synchronously.
    engine.stop().await.unwrap();
    assert_eq!(engine.state(), ControlState::Idle);
    assert!(engine.current_run().is_none());
    for node in engine.topology().nodes() {
        assert_eq!(node.status, default_status(node.node_type));
    }
    assert!(engine.topology().pulses().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_still_runs_in_demo_mode() {
    let mut engine = engine_with(Arc::new(UnreachableBackend), 9);

    let run = engine
        .start(Some("account_takeover"), Intensity::Medium)
        .await
        .unwrap();
    assert_eq!(run.mode, RunMode::Demo);
    assert!(run.simulation_id.starts_with("demo_"));
    assert_eq!(engine.state(), ControlState::Running);

    // The engine behaves identically in demo mode.
    engine.advance(9000);
    assert_eq!(engine.metrics().len(), 6);

    // Stop also survives the dead backend.
    let outcome = engine.stop().await.unwrap();
    assert_eq!(outcome.mode, RunMode::Demo);
    assert_eq!(engine.state(), ControlState::Idle);
}

#[tokio::test]
async fn test_no_periodic_task_survives_stop() {
    let mut engine = engine_with(Arc::new(OkBackend), 3);
    engine
        .start(Some("data_exfiltration"), Intensity::High)
        .await
        .unwrap();
    engine.advance(6000);
    engine.stop().await.unwrap();

    let tasks = engine.scheduled_tasks();
    assert!(!tasks.contains(&TickTask::Network));
    assert!(!tasks.contains(&TickTask::Metrics));
    // Only the always-on feed remains.
    assert_eq!(tasks, vec![TickTask::Feed]);
}

#[tokio::test]
async fn test_restart_after_stop_starts_a_fresh_run() {
    let mut engine = engine_with(Arc::new(OkBackend), 5);

    let first = engine
        .start(Some("ddos_attack"), Intensity::Low)
        .await
        .unwrap();
    engine.advance(3000);
    engine.stop().await.unwrap();

    let second = engine
        .start(Some("bot_attack"), Intensity::High)
        .await
        .unwrap();
    assert_eq!(second.catalog_id, "bot_attack");
    assert_ne!(first.catalog_id, second.catalog_id);
    assert_eq!(engine.state(), ControlState::Running);

    // Metrics resume sampling under the new run.
    let before = engine.metrics().len();
    engine.advance(3000);
    assert!(engine.metrics().len() > before);
}

#[tokio::test]
async fn test_feed_runs_across_simulation_boundaries() {
    let mut engine = engine_with(Arc::new(OkBackend), 11);

    engine.advance(20_000);
    let idle_feed = engine.feed().len();
    assert!(idle_feed > 0, "feed must tick while idle");

    engine
        .start(Some("api_abuse"), Intensity::Medium)
        .await
        .unwrap();
    engine.advance(20_000);
    assert!(engine.feed().len() >= idle_feed);
    // Feed cap holds no matter how long this runs.
    assert!(engine.feed().len() <= 10);
}
