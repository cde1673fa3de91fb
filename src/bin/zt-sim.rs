//! zt-sim - Zero-Trust Command Center demo runner
//!
//! Usage:
//!   zt-sim list
//!   zt-sim run --simulation ddos_attack --intensity high --duration 30s
//!   zt-sim run --simulation data_exfiltration --backend-url https://backend.example

use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use zerotrust_sim::backend::{
    BackendError, BackendOp, ExecuteRequest, ExecuteResponse, StopResponse,
};
use zerotrust_sim::{
    AttackCatalog, EngineConfig, HttpBackend, Intensity, RunMode, SecurityOpsEngine,
    SimulationBackend,
};

#[derive(Parser)]
#[command(name = "zt-sim")]
#[command(about = "Zero-Trust Security Command Center attack-simulation demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the attack-simulation catalog
    List,

    /// Run one attack simulation and stream its events
    Run {
        /// Catalog id (e.g. ddos_attack, data_exfiltration)
        #[arg(short, long)]
        simulation: String,

        /// Attack intensity
        #[arg(short, long, default_value = "medium")]
        intensity: String,

        /// How long to run (e.g. 30s, 2m)
        #[arg(short, long, default_value = "30s")]
        duration: String,

        /// Remote backend base URL; omit to run fully offline (demo mode)
        #[arg(long)]
        backend_url: Option<String>,

        /// Bearer token for the backend
        #[arg(long, default_value = "demo-admin-token")]
        auth_token: String,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Backend stand-in for offline runs. Every call fails with a transport
/// error, which lands the controller in demo mode by design.
struct OfflineBackend;

#[async_trait::async_trait]
impl SimulationBackend for OfflineBackend {
    async fn execute(
        &self,
        _op: BackendOp,
        _request: &ExecuteRequest,
    ) -> Result<ExecuteResponse, BackendError> {
        Err(BackendError::Transport("no backend configured".to_string()))
    }

    async fn stop_all(&self) -> Result<StopResponse, BackendError> {
        Err(BackendError::Transport("no backend configured".to_string()))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List => run_list(),
        Commands::Run {
            simulation,
            intensity,
            duration,
            backend_url,
            auth_token,
            seed,
        } => {
            let intensity = match Intensity::parse(&intensity) {
                Some(i) => i,
                None => {
                    eprintln!("invalid intensity '{}': expected low|medium|high", intensity);
                    std::process::exit(2);
                }
            };
            let duration = parse_duration(&duration);
            run_simulation(simulation, intensity, duration, backend_url, auth_token, seed).await;
        }
    }
}

fn run_list() {
    let catalog = AttackCatalog::new();
    println!("Available attack simulations:\n");
    for simulation in catalog.iter() {
        println!(
            "  {:20} [{:8}] {}",
            simulation.id,
            simulation.severity.as_str(),
            simulation.description
        );
    }
    println!("\nUsage: zt-sim run --simulation <ID> --intensity <low|medium|high>");
}

async fn run_simulation(
    simulation: String,
    intensity: Intensity,
    duration: Duration,
    backend_url: Option<String>,
    auth_token: String,
    seed: Option<u64>,
) {
    let backend: Arc<dyn SimulationBackend> = match &backend_url {
        Some(url) => Arc::new(HttpBackend::new(url.clone(), auth_token)),
        None => Arc::new(OfflineBackend),
    };

    let active = backend.status().await;
    if !active.active_simulations.is_empty() {
        tracing::warn!(
            count = active.active_simulations.len(),
            "backend reports simulations already running"
        );
    }

    let mut engine = SecurityOpsEngine::new(
        EngineConfig {
            seed,
            ..EngineConfig::default()
        },
        backend,
    );

    let run = match engine.start(Some(&simulation), intensity).await {
        Ok(run) => run,
        Err(e) => {
            eprintln!("failed to start simulation: {}", e);
            std::process::exit(1);
        }
    };

    match run.mode {
        RunMode::Live => tracing::info!(
            simulation_id = %run.simulation_id,
            "simulation started (live backend)"
        ),
        RunMode::Demo => tracing::info!(
            simulation_id = %run.simulation_id,
            "simulation started (demo mode)"
        ),
    }

    let deadline = tokio::time::Instant::now() + duration;
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut seen = std::collections::HashSet::new();
    let mut printed_samples = 0usize;
    let mut total_events = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.advance(250);

                // Stream newly emitted security events, oldest first.
                let events = engine.events();
                for event in events.iter().rev() {
                    if seen.insert(event.id.clone()) {
                        total_events += 1;
                        tracing::info!(
                            severity = %event.severity,
                            target = %event.target_node,
                            agent = %event.agent,
                            action = %event.action,
                            "{}",
                            event.description
                        );
                    }
                }

                let metrics = engine.metrics();
                if metrics.len() > printed_samples {
                    if let Some(sample) = metrics.latest() {
                        tracing::debug!(
                            detected = sample.threats_detected,
                            blocked = sample.threats_blocked,
                            response_ms = sample.response_time_ms,
                            "threat metrics"
                        );
                    }
                    printed_samples = metrics.len();
                }

                if tokio::time::Instant::now() >= deadline {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping simulation");
                break;
            }
        }
    }

    match engine.stop().await {
        Ok(outcome) => tracing::info!(message = %outcome.message, "simulation stopped"),
        Err(e) => tracing::warn!(error = %e, "stop reported an error"),
    }

    let snapshot = engine.snapshot();
    println!("\nRun summary:");
    println!("  events emitted:   {}", total_events);
    println!("  metric samples:   {}", snapshot.metrics.len());
    if let Some(sample) = snapshot.metrics.first() {
        println!(
            "  threats detected: {} (blocked {})",
            sample.threats_detected, sample.threats_blocked
        );
    }
}

fn parse_duration(s: &str) -> Duration {
    let s = s.trim();
    let seconds = if let Some(stripped) = s.strip_suffix('h') {
        stripped.parse::<u64>().unwrap_or(1) * 3600
    } else if let Some(stripped) = s.strip_suffix('m') {
        stripped.parse::<u64>().unwrap_or(1) * 60
    } else if let Some(stripped) = s.strip_suffix('s') {
        stripped.parse::<u64>().unwrap_or(30)
    } else {
        s.parse::<u64>().unwrap_or(30)
    };
    Duration::from_secs(seconds)
}
