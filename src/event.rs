//! Security Event Generator
//!
//! Synthesizes the event records the dashboards render. Everything here is
//! demo fabrication: an attack type and a target node go in, a plausible
//! detected/blocked/mitigated record comes out, drawn from weighted catalogs
//! of remediation actions and descriptions.

use crate::catalog::{AGENT_ROSTER, Severity};
use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome attributed to a synthesized event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Detected,
    Blocked,
    Mitigated,
    Investigating,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Detected => "detected",
            EventStatus::Blocked => "blocked",
            EventStatus::Mitigated => "mitigated",
            EventStatus::Investigating => "investigating",
        }
    }
}

/// Immutable record of one simulated incident. Created by the generator,
/// appended to a bounded log, never mutated afterwards.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SecurityEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub attack_type: String,
    pub target_node: String,
    pub severity: Severity,
    pub agent: String,
    pub action: String,
    pub status: EventStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Candidate remediation actions and descriptions for one attack type.
struct EventTable {
    actions: [&'static str; 4],
    descriptions: [&'static str; 3],
}

const DDOS_TABLE: EventTable = EventTable {
    actions: [
        "Rate limiting applied",
        "Traffic filtered",
        "IP blocked",
        "Load balancing activated",
    ],
    descriptions: [
        "Volumetric attack detected",
        "Suspicious traffic patterns",
        "Connection flood detected",
    ],
};

const TAKEOVER_TABLE: EventTable = EventTable {
    actions: [
        "Account locked",
        "MFA triggered",
        "Session terminated",
        "Alert sent to user",
    ],
    descriptions: [
        "Credential stuffing attempt",
        "Multiple failed logins",
        "Suspicious login location",
    ],
};

const EXFIL_TABLE: EventTable = EventTable {
    actions: [
        "Data access blocked",
        "Connection terminated",
        "File quarantined",
        "Admin notified",
    ],
    descriptions: [
        "Unauthorized data access",
        "Suspicious file transfer",
        "Anomalous database query",
    ],
};

const FRAUD_TABLE: EventTable = EventTable {
    actions: [
        "Transaction blocked",
        "Card flagged",
        "Merchant notified",
        "Risk score updated",
    ],
    descriptions: [
        "Fraudulent transaction pattern",
        "Velocity check failed",
        "Geolocation mismatch",
    ],
};

const BOT_TABLE: EventTable = EventTable {
    actions: [
        "Bot signature detected",
        "CAPTCHA triggered",
        "Request throttled",
        "IP reputation checked",
    ],
    descriptions: [
        "Automated behavior detected",
        "Scraping attempt blocked",
        "Non-human interaction pattern",
    ],
};

const API_ABUSE_TABLE: EventTable = EventTable {
    actions: [
        "Rate limit exceeded",
        "API key suspended",
        "Request queued",
        "Endpoint protected",
    ],
    descriptions: [
        "API flooding detected",
        "Unusual request patterns",
        "Resource exhaustion attempt",
    ],
};

/// Table lookup by attack type. Unknown types fall back to the DDoS table
/// so the generator stays total over arbitrary string input.
fn table_for(attack_type: &str) -> &'static EventTable {
    match attack_type {
        "ddos_attack" => &DDOS_TABLE,
        "account_takeover" => &TAKEOVER_TABLE,
        "data_exfiltration" => &EXFIL_TABLE,
        "credit_card_fraud" => &FRAUD_TABLE,
        "bot_attack" => &BOT_TABLE,
        "api_abuse" => &API_ABUSE_TABLE,
        _ => &DDOS_TABLE,
    }
}

/// Mint a time+random derived id with the given prefix, e.g.
/// `event_1736081234567_3f9a1c2b`.
pub fn mint_id(prefix: &str, timestamp: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, timestamp.timestamp_millis(), &suffix[..8])
}

/// Synthesize one security event for `attack_type` against `target_node`.
///
/// Total over any string input: unknown attack types use the default table.
/// Severity and status are weighted draws; one uniform r each, r>0.7 critical
/// / r>0.4 high / else medium, and r>0.8 investigating / r>0.5 blocked /
/// else mitigated.
pub fn generate_event<R: Rng + ?Sized>(
    rng: &mut R,
    attack_type: &str,
    target_node: &str,
    timestamp: DateTime<Utc>,
) -> SecurityEvent {
    let table = table_for(attack_type);
    let agent = *AGENT_ROSTER.choose(rng).expect("roster is non-empty");
    let action = *table.actions.choose(rng).expect("actions are non-empty");
    let description = *table
        .descriptions
        .choose(rng)
        .expect("descriptions are non-empty");

    let r = rng.random::<f64>();
    let severity = if r > 0.7 {
        Severity::Critical
    } else if r > 0.4 {
        Severity::High
    } else {
        Severity::Medium
    };

    let r = rng.random::<f64>();
    let status = if r > 0.8 {
        EventStatus::Investigating
    } else if r > 0.5 {
        EventStatus::Blocked
    } else {
        EventStatus::Mitigated
    };

    let source_ip = format!(
        "{}.{}.{}.{}",
        rng.random::<u8>(),
        rng.random::<u8>(),
        rng.random::<u8>(),
        rng.random::<u8>(),
    );

    SecurityEvent {
        id: mint_id("event", timestamp),
        timestamp,
        attack_type: attack_type.to_string(),
        target_node: target_node.to_string(),
        severity,
        agent: agent.to_string(),
        action: action.to_string(),
        status,
        description: description.to_string(),
        source_ip: Some(source_ip),
        location: None,
        user: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_736_000_000_000).unwrap()
    }

    #[test]
    fn test_known_attack_type_uses_own_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let event = generate_event(&mut rng, "account_takeover", "endpoint1", ts());
        let table = [
            "Account locked",
            "MFA triggered",
            "Session terminated",
            "Alert sent to user",
        ];
        assert!(table.contains(&event.action.as_str()));
        assert_eq!(event.attack_type, "account_takeover");
        assert_eq!(event.target_node, "endpoint1");
    }

    #[test]
    fn test_unknown_attack_type_falls_back_to_ddos_table() {
        let mut rng = StdRng::seed_from_u64(42);
        let event = generate_event(&mut rng, "totally_unknown_type", "node_x", ts());
        assert!(DDOS_TABLE.actions.contains(&event.action.as_str()));
        assert!(DDOS_TABLE.descriptions.contains(&event.description.as_str()));
        // Attack type is carried through verbatim even when unrecognized.
        assert_eq!(event.attack_type, "totally_unknown_type");
    }

    #[test]
    fn test_agent_always_from_roster() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let event = generate_event(&mut rng, "ddos_attack", "gateway", ts());
            assert!(AGENT_ROSTER.contains(&event.agent.as_str()));
        }
    }

    #[test]
    fn test_source_ip_is_dotted_quad() {
        let mut rng = StdRng::seed_from_u64(3);
        let event = generate_event(&mut rng, "bot_attack", "server1", ts());
        let ip = event.source_ip.unwrap();
        let octets: Vec<&str> = ip.split('.').collect();
        assert_eq!(octets.len(), 4);
        for octet in octets {
            octet.parse::<u8>().unwrap();
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = generate_event(&mut StdRng::seed_from_u64(9), "api_abuse", "server2", ts());
        let b = generate_event(&mut StdRng::seed_from_u64(9), "api_abuse", "server2", ts());
        assert_eq!(a.severity, b.severity);
        assert_eq!(a.status, b.status);
        assert_eq!(a.agent, b.agent);
        assert_eq!(a.action, b.action);
        assert_eq!(a.source_ip, b.source_ip);
    }

    #[test]
    fn test_event_id_prefix_and_timestamp() {
        let mut rng = StdRng::seed_from_u64(5);
        let event = generate_event(&mut rng, "ddos_attack", "firewall", ts());
        assert!(event.id.starts_with("event_1736000000000_"));
    }
}
