//! Attack Simulation Catalog
//!
//! Fixed registry of demo attack scenarios plus the roster of named
//! security agents attributed on generated events. Entries are immutable;
//! the controller only ever selects from this set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event/scenario severity as shown on the dashboards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attack intensity selected by the operator before starting a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Intensity::Low),
            "medium" => Some(Intensity::Medium),
            "high" => Some(Intensity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attack-specific demo parameters forwarded to the backend verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AttackPayload {
    pub attack_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_accounts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// One selectable attack scenario.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AttackSimulation {
    /// Stable catalog key, e.g. `ddos_attack`.
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    /// Logical backend operation path for this scenario.
    pub endpoint: String,
    pub payload: AttackPayload,
}

/// Roster of Zero-Trust security agents credited on synthesized events.
pub const AGENT_ROSTER: [&str; 5] = [
    "Zero-Trust Agent Alpha",
    "Firewall Guardian Beta",
    "Data Shield Gamma",
    "Network Sentinel Delta",
    "Threat Hunter Epsilon",
];

/// Immutable catalog of the six demo attack simulations.
#[derive(Debug, Clone)]
pub struct AttackCatalog {
    entries: Vec<AttackSimulation>,
}

impl AttackCatalog {
    pub fn new() -> Self {
        let entries = vec![
            AttackSimulation {
                id: "credit_card_fraud".to_string(),
                name: "Credit Card Fraud".to_string(),
                description: "Simulate suspicious payment transactions with unusual patterns"
                    .to_string(),
                severity: Severity::High,
                endpoint: "/demo/simulate-fraud".to_string(),
                payload: AttackPayload {
                    attack_type: "credit_card_fraud".to_string(),
                    intensity: Some(Intensity::High),
                    ..AttackPayload::default()
                },
            },
            AttackSimulation {
                id: "account_takeover".to_string(),
                name: "Account Takeover".to_string(),
                description: "Simulate credential stuffing and brute force login attempts"
                    .to_string(),
                severity: Severity::Critical,
                endpoint: "/demo/simulate-takeover".to_string(),
                payload: AttackPayload {
                    attack_type: "credential_stuffing".to_string(),
                    target_accounts: Some(100),
                    ..AttackPayload::default()
                },
            },
            AttackSimulation {
                id: "bot_attack".to_string(),
                name: "Bot Scraping Attack".to_string(),
                description: "Simulate automated scraping and content harvesting bots".to_string(),
                severity: Severity::Medium,
                endpoint: "/demo/simulate-bot".to_string(),
                payload: AttackPayload {
                    attack_type: "scraping".to_string(),
                    requests_per_second: Some(1000),
                    ..AttackPayload::default()
                },
            },
            AttackSimulation {
                id: "api_abuse".to_string(),
                name: "API Rate Limit Abuse".to_string(),
                description: "Simulate API flooding and rate limit bypass attempts".to_string(),
                severity: Severity::High,
                endpoint: "/demo/simulate-api-abuse".to_string(),
                payload: AttackPayload {
                    attack_type: "rate_limit_bypass".to_string(),
                    requests_per_minute: Some(5000),
                    ..AttackPayload::default()
                },
            },
            AttackSimulation {
                id: "data_exfiltration".to_string(),
                name: "Data Exfiltration".to_string(),
                description: "Simulate unauthorized access to sensitive customer data".to_string(),
                severity: Severity::Critical,
                endpoint: "/demo/simulate-data-breach".to_string(),
                payload: AttackPayload {
                    attack_type: "data_exfiltration".to_string(),
                    data_type: Some("customer_pii".to_string()),
                    ..AttackPayload::default()
                },
            },
            AttackSimulation {
                id: "ddos_attack".to_string(),
                name: "DDoS Simulation".to_string(),
                description: "Simulate distributed denial of service attack patterns".to_string(),
                severity: Severity::Critical,
                endpoint: "/demo/simulate-ddos".to_string(),
                payload: AttackPayload {
                    attack_type: "volumetric_ddos".to_string(),
                    intensity: Some(Intensity::High),
                    ..AttackPayload::default()
                },
            },
        ];

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&AttackSimulation> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackSimulation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AttackCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_six_entries() {
        let catalog = AttackCatalog::new();
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = AttackCatalog::new();
        let ddos = catalog.get("ddos_attack").unwrap();
        assert_eq!(ddos.severity, Severity::Critical);
        assert_eq!(ddos.payload.attack_type, "volumetric_ddos");
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_payload_serialization_skips_unset_fields() {
        let catalog = AttackCatalog::new();
        let takeover = catalog.get("account_takeover").unwrap();
        let json = serde_json::to_value(&takeover.payload).unwrap();
        assert_eq!(json["attack_type"], "credential_stuffing");
        assert_eq!(json["target_accounts"], 100);
        assert!(json.get("requests_per_second").is_none());
    }

    #[test]
    fn test_intensity_round_trip() {
        assert_eq!(Intensity::parse("high"), Some(Intensity::High));
        assert_eq!(Intensity::parse("extreme"), None);
        assert_eq!(Intensity::High.as_str(), "high");
    }
}
