//! # zerotrust-sim - Security Command Center Simulation Engine
//!
//! Client-side simulation core for a demo storefront's "Zero-Trust Security
//! Command Center". Nothing here detects anything: attack runs, security
//! events, threat metrics and network-node churn are all synthesized from
//! seeded randomness against hand-tuned thresholds, purely for the dashboards
//! to render.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          zerotrust-sim                             │
//! │                                                                    │
//! │   ┌────────────────────────────────────────────────────────────┐   │
//! │   │                   SecurityOpsEngine                        │   │
//! │   │                                                            │   │
//! │   │  ┌────────────┐  ┌─────────────┐  ┌────────────────────┐   │   │
//! │   │  │ Controller │  │  Scheduler  │  │  Observable state  │   │   │
//! │   │  │ start/stop │──│ (one clock, │──│  topology, events, │   │   │
//! │   │  │  fallback  │  │  3 tasks)   │  │  metrics, feed     │   │   │
//! │   │  └────────────┘  └─────────────┘  └────────────────────┘   │   │
//! │   │        │                                    │              │   │
//! │   │        ▼                                    ▼              │   │
//! │   │  SimulationBackend (injected)        EngineSnapshot        │   │
//! │   └────────────────────────────────────────────────────────────┘   │
//! │                                                                    │
//! │   Attack simulations:                                              │
//! │   ├── credit_card_fraud, account_takeover, bot_attack              │
//! │   └── api_abuse, data_exfiltration, ddos_attack                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Fallback always succeeds** - a start or stop can never strand the
//!    controller on backend failure; it falls back to a locally minted demo
//!    run. The operator always sees the simulation as started or stopped.
//!
//! 2. **One scheduler** - network ticks, metric samples and the jittered
//!    live feed share a single clock and due-time queue. Stopping removes
//!    the periodic entries in the same transition; no timer can leak.
//!
//! 3. **Injected collaborators** - the remote backend is a constructor
//!    parameter and the RNG is seedable, so tests run the whole engine
//!    deterministically against doubles.
//!
//! 4. **Bounded everything** - events (50), metrics (100), feed (10),
//!    alerts (10) and pulses (2s TTL) all evict; the demo can run forever.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zerotrust_sim::{EngineConfig, HttpBackend, Intensity, SecurityOpsEngine};
//!
//! # async fn demo() {
//! let backend = Arc::new(HttpBackend::new("https://backend.example", "demo-admin-token"));
//! let mut engine = SecurityOpsEngine::new(EngineConfig::default(), backend);
//!
//! engine.start(Some("ddos_attack"), Intensity::High).await.unwrap();
//! loop {
//!     engine.advance(250);
//!     let snapshot = engine.snapshot();
//!     // render snapshot.nodes / snapshot.events / snapshot.metrics ...
//! }
//! # }
//! ```

pub mod backend;
pub mod catalog;
pub mod controller;
pub mod engine;
pub mod event;
pub mod feed;
pub mod log;
pub mod metrics;
pub mod network;

pub use backend::{
    BackendError, BackendOp, ExecuteRequest, ExecuteResponse, HttpBackend, SimulationBackend,
    StopResponse,
};
pub use catalog::{
    AGENT_ROSTER, AttackCatalog, AttackPayload, AttackSimulation, Intensity, Severity,
};
pub use controller::{
    ControlError, ControlState, RunMode, SimulationController, SimulationRun, StopOutcome,
};
pub use engine::{EngineConfig, EngineSnapshot, SecurityOpsEngine, TickTask};
pub use event::{EventStatus, SecurityEvent, generate_event};
pub use feed::{
    AlertCenter, AlertSeverity, LiveMessage, MonitorEvent, MonitorFeed, SecurityAlert,
    SystemStatus,
};
pub use log::BoundedLog;
pub use metrics::{MetricsWindow, ThreatMetricSample, next_sample};
pub use network::{NetworkNode, NetworkTopology, NodeStatus, NodeType, ThreatPulse};
