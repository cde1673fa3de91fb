//! Network Topology State Machine
//!
//! Fixed six-node demo topology. Node status is the only mutable field,
//! re-derived on each tick from the active simulation type and randomness.
//! Ticks also spawn short-lived threat pulses between random node pairs for
//! the propagation animation.

use crate::event::{SecurityEvent, generate_event, mint_id};
use chrono::DateTime;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Tick period while a simulation is active.
pub const NETWORK_TICK_MS: u64 = 1500;

/// Pulses self-destruct this long after creation (wall clock).
pub const PULSE_TTL_MS: u64 = 2000;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Gateway,
    Firewall,
    Server,
    Database,
    Endpoint,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Secure,
    Normal,
    Warning,
    Critical,
}

/// Status a node returns to when no simulation is running.
pub fn default_status(node_type: NodeType) -> NodeStatus {
    match node_type {
        NodeType::Gateway | NodeType::Firewall | NodeType::Database => NodeStatus::Secure,
        NodeType::Server | NodeType::Endpoint => NodeStatus::Normal,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NetworkNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub status: NodeStatus,
    /// Layout coordinates for the topology view; not behaviorally significant.
    pub x: f32,
    pub y: f32,
    /// Directed adjacency, used only to render edges.
    pub connections: Vec<String>,
}

impl NetworkNode {
    fn new(
        id: &str,
        name: &str,
        node_type: NodeType,
        x: f32,
        y: f32,
        connections: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            node_type,
            status: default_status(node_type),
            x,
            y,
            connections: connections.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Transient propagation signal between two nodes.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ThreatPulse {
    pub id: String,
    pub from_node: String,
    pub to_node: String,
}

/// Pulse plus its internal removal deadline. The deadline never leaves this
/// module; consumers only see the pulse itself.
#[derive(Debug, Clone)]
struct ScheduledPulse {
    pulse: ThreatPulse,
    expires_at_ms: u64,
}

#[derive(Debug, Clone)]
pub struct NetworkTopology {
    nodes: Vec<NetworkNode>,
    pulses: Vec<ScheduledPulse>,
}

impl NetworkTopology {
    /// Build the fixed six-node topology.
    pub fn new() -> Self {
        let nodes = vec![
            NetworkNode::new(
                "gateway",
                "Security Gateway",
                NodeType::Gateway,
                50.0,
                200.0,
                &["firewall", "endpoint1"],
            ),
            NetworkNode::new(
                "firewall",
                "Main Firewall",
                NodeType::Firewall,
                200.0,
                100.0,
                &["server1", "server2"],
            ),
            NetworkNode::new(
                "server1",
                "Web Server",
                NodeType::Server,
                400.0,
                80.0,
                &["database"],
            ),
            NetworkNode::new(
                "server2",
                "API Server",
                NodeType::Server,
                400.0,
                150.0,
                &["database"],
            ),
            NetworkNode::new(
                "database",
                "Customer DB",
                NodeType::Database,
                600.0,
                120.0,
                &[],
            ),
            NetworkNode::new(
                "endpoint1",
                "User Device",
                NodeType::Endpoint,
                200.0,
                300.0,
                &["server1"],
            ),
        ];

        Self {
            nodes,
            pulses: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Active pulses, in creation order.
    pub fn pulses(&self) -> Vec<&ThreatPulse> {
        self.pulses.iter().map(|p| &p.pulse).collect()
    }

    /// Advance one tick under `active_simulation` (a catalog id, or `None`
    /// when idle). Returns the security events emitted by nodes that
    /// transitioned into warning or critical this tick.
    ///
    /// Ticking with `None` resets the topology to its defaults.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        active_simulation: Option<&str>,
        now_ms: u64,
    ) -> Vec<SecurityEvent> {
        let Some(simulation_id) = active_simulation else {
            self.reset();
            return Vec::new();
        };

        let timestamp = DateTime::from_timestamp_millis(now_ms as i64).unwrap_or_default();
        let mut events = Vec::new();

        for node in &mut self.nodes {
            let r = rng.random::<f64>();
            let next = match (simulation_id, node.node_type) {
                ("ddos_attack", NodeType::Gateway | NodeType::Firewall) => {
                    if r > 0.7 {
                        NodeStatus::Critical
                    } else if r > 0.4 {
                        NodeStatus::Warning
                    } else {
                        NodeStatus::Secure
                    }
                }
                ("data_exfiltration", NodeType::Database) => {
                    if r > 0.8 {
                        NodeStatus::Critical
                    } else if r > 0.5 {
                        NodeStatus::Warning
                    } else {
                        NodeStatus::Secure
                    }
                }
                ("account_takeover", NodeType::Endpoint) => {
                    if r > 0.6 {
                        NodeStatus::Warning
                    } else {
                        NodeStatus::Normal
                    }
                }
                _ => node.status,
            };

            let escalated = next != node.status
                && matches!(next, NodeStatus::Warning | NodeStatus::Critical);
            node.status = next;
            if escalated {
                events.push(generate_event(rng, simulation_id, &node.id, timestamp));
            }
        }

        // ~30% of ticks propagate a pulse between two distinct nodes.
        if rng.random::<f64>() > 0.7 {
            let from = rng.random_range(0..self.nodes.len());
            let mut to = rng.random_range(0..self.nodes.len() - 1);
            if to >= from {
                to += 1;
            }
            self.pulses.push(ScheduledPulse {
                pulse: ThreatPulse {
                    id: mint_id("pulse", timestamp),
                    from_node: self.nodes[from].id.clone(),
                    to_node: self.nodes[to].id.clone(),
                },
                expires_at_ms: now_ms + PULSE_TTL_MS,
            });
        }

        self.expire_pulses(now_ms);
        events
    }

    /// Drop pulses whose removal deadline has passed.
    pub fn expire_pulses(&mut self, now_ms: u64) {
        self.pulses.retain(|p| p.expires_at_ms > now_ms);
    }

    /// Deterministic return to the idle state: every node back to its
    /// type default, pulse set cleared.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.status = default_status(node.node_type);
        }
        self.pulses.clear();
    }
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self::new()
    }
}
