//! Live Monitoring Feed and Inbound Alert Ingestion
//!
//! Two independent streams feed the monitoring panel:
//!
//! - a locally synthesized feed of generic security happenings, ticking on a
//!   jittered timer whether or not a simulation is running;
//! - inbound live messages from the push channel (transport out of scope),
//!   folded into a bounded alert log and a coarse system-status flag.

use crate::catalog::Severity;
use crate::event::mint_id;
use crate::log::BoundedLog;
use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Feed cadence: 2s base plus up to 3s of jitter, re-drawn after each fire.
pub const FEED_BASE_MS: u64 = 2000;
pub const FEED_JITTER_MS: u64 = 3000;

/// Both the feed log and the inbound alert log keep the last 10 entries.
pub const FEED_CAP: usize = 10;
pub const ALERT_CAP: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    Fraud,
    Attack,
    Breach,
    Anomaly,
}

const MONITOR_KINDS: [MonitorKind; 4] = [
    MonitorKind::Fraud,
    MonitorKind::Attack,
    MonitorKind::Breach,
    MonitorKind::Anomaly,
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Active,
    Investigating,
    Blocked,
    Resolved,
}

/// One entry of the generic monitoring feed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MonitorEvent {
    pub id: String,
    pub kind: MonitorKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub user: String,
    pub action: String,
    pub status: MonitorStatus,
}

fn titles_for(kind: MonitorKind) -> [&'static str; 4] {
    match kind {
        MonitorKind::Fraud => [
            "Suspicious payment pattern detected",
            "Multiple failed payment attempts",
            "Unusual purchase behavior identified",
            "Credit card fraud indicators found",
        ],
        MonitorKind::Attack => [
            "Brute force login attempt detected",
            "SQL injection attempt blocked",
            "Bot scraping activity identified",
            "API rate limit exceeded",
        ],
        MonitorKind::Breach => [
            "Unauthorized data access attempt",
            "Privilege escalation detected",
            "Sensitive data exposure risk",
            "Account takeover attempt",
        ],
        MonitorKind::Anomaly => [
            "Unusual traffic pattern detected",
            "Geographic anomaly identified",
            "Time-based access anomaly",
            "Device fingerprint mismatch",
        ],
    }
}

const LOCATIONS: [&str; 5] = [
    "New York, NY",
    "London, UK",
    "Tokyo, JP",
    "São Paulo, BR",
    "Mumbai, IN",
];

const USERS: [&str; 4] = ["user_12345", "guest_67890", "admin_99999", "customer_54321"];

/// Synthesize one feed entry. During an active simulation everything reads
/// as high-pressure and auto-blocked; when idle, severity is uniform and
/// entries sit under investigation.
pub fn generate_monitor_event<R: Rng + ?Sized>(
    rng: &mut R,
    simulation_active: bool,
    timestamp: DateTime<Utc>,
) -> MonitorEvent {
    let kind = *MONITOR_KINDS.choose(rng).expect("kinds are non-empty");
    let severity = if simulation_active {
        if rng.random::<f64>() > 0.5 {
            Severity::High
        } else {
            Severity::Critical
        }
    } else {
        *[
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
        .choose(rng)
        .expect("severities are non-empty")
    };

    let title = *titles_for(kind).choose(rng).expect("titles are non-empty");
    let (action, status) = if simulation_active {
        ("Blocked automatically", MonitorStatus::Blocked)
    } else {
        ("Under investigation", MonitorStatus::Investigating)
    };

    MonitorEvent {
        id: mint_id("event", timestamp),
        kind,
        severity,
        title: title.to_string(),
        description: format!("{} - Automated detection by Zero-Trust agents", title),
        timestamp,
        location: LOCATIONS.choose(rng).expect("locations").to_string(),
        user: USERS.choose(rng).expect("users").to_string(),
        action: action.to_string(),
        status,
    }
}

/// Bounded feed window plus the jitter draw for the next tick.
#[derive(Debug, Clone)]
pub struct MonitorFeed {
    events: BoundedLog<MonitorEvent>,
}

impl MonitorFeed {
    pub fn new() -> Self {
        Self {
            events: BoundedLog::with_capacity(FEED_CAP),
        }
    }

    pub fn record<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        simulation_active: bool,
        timestamp: DateTime<Utc>,
    ) {
        let event = generate_monitor_event(rng, simulation_active, timestamp);
        self.events.push(event);
    }

    /// Delay until the next feed tick.
    pub fn next_delay_ms<R: Rng + ?Sized>(rng: &mut R) -> u64 {
        FEED_BASE_MS + rng.random_range(0..FEED_JITTER_MS)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonitorEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_vec(&self) -> Vec<MonitorEvent> {
        self.events.to_vec()
    }
}

impl Default for MonitorFeed {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Inbound live messages
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// Coarse system health flag shown in the storefront banner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    #[default]
    Secure,
    Warning,
    Alert,
}

impl From<AlertSeverity> for SystemStatus {
    fn from(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::Low => SystemStatus::Secure,
            AlertSeverity::Medium => SystemStatus::Warning,
            AlertSeverity::High => SystemStatus::Alert,
        }
    }
}

/// One entry of the inbound alert log.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SecurityAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

/// Message kinds the push channel delivers. The transport guarantees
/// well-formed payloads; anything with an unrecognized kind deserializes to
/// `Unknown` and is ignored on ingest.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LiveMessage {
    SecurityAlert {
        id: String,
        #[serde(rename = "type", default)]
        alert_type: String,
        message: String,
        severity: AlertSeverity,
    },
    SystemStatus {
        status: SystemStatus,
    },
    ThreatDetected {
        message: String,
        severity: AlertSeverity,
    },
    #[serde(other)]
    Unknown,
}

/// Folds inbound messages into observable state: the last 10 alerts and the
/// status derived from the most recent alert/status message.
#[derive(Debug, Clone)]
pub struct AlertCenter {
    alerts: BoundedLog<SecurityAlert>,
    status: SystemStatus,
}

impl AlertCenter {
    pub fn new() -> Self {
        Self {
            alerts: BoundedLog::with_capacity(ALERT_CAP),
            status: SystemStatus::Secure,
        }
    }

    pub fn ingest(&mut self, message: LiveMessage, now: DateTime<Utc>) {
        match message {
            LiveMessage::SecurityAlert {
                id,
                alert_type,
                message,
                severity,
            } => {
                self.alerts.push(SecurityAlert {
                    id,
                    alert_type,
                    message,
                    severity,
                    timestamp: now,
                });
                self.status = severity.into();
            }
            LiveMessage::SystemStatus { status } => {
                self.status = status;
            }
            // Threat notices only feed the log; the status flag follows
            // alert and status messages alone.
            LiveMessage::ThreatDetected { message, severity } => {
                self.alerts.push(SecurityAlert {
                    id: mint_id("alert", now),
                    alert_type: "threat".to_string(),
                    message,
                    severity,
                    timestamp: now,
                });
            }
            LiveMessage::Unknown => {}
        }
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn alerts(&self) -> Vec<SecurityAlert> {
        self.alerts.to_vec()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new()
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
    fn test_active_feed_entries_are_blocked() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let event = generate_monitor_event(&mut rng, true, ts());
            assert_eq!(event.status, MonitorStatus::Blocked);
            assert_eq!(event.action, "Blocked automatically");
            assert!(matches!(
                event.severity,
                Severity::High | Severity::Critical
            ));
        }
    }

    #[test]
    fn test_idle_feed_entries_under_investigation() {
        let mut rng = StdRng::seed_from_u64(2);
        let event = generate_monitor_event(&mut rng, false, ts());
        assert_eq!(event.status, MonitorStatus::Investigating);
        assert_eq!(event.action, "Under investigation");
    }

    #[test]
    fn test_feed_caps_at_ten() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut feed = MonitorFeed::new();
        for _ in 0..25 {
            feed.record(&mut rng, true, ts());
        }
        assert_eq!(feed.len(), FEED_CAP);
    }

    #[test]
    fn test_feed_delay_stays_in_jitter_window() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let delay = MonitorFeed::next_delay_ms(&mut rng);
            assert!((FEED_BASE_MS..FEED_BASE_MS + FEED_JITTER_MS).contains(&delay));
        }
    }

    #[test]
    fn test_ingest_alert_updates_log_and_status() {
        let mut center = AlertCenter::new();
        center.ingest(
            LiveMessage::SecurityAlert {
                id: "a1".to_string(),
                alert_type: "fraud".to_string(),
                message: "card testing burst".to_string(),
                severity: AlertSeverity::High,
            },
            ts(),
        );
        assert_eq!(center.alert_count(), 1);
        assert_eq!(center.status(), SystemStatus::Alert);
    }

    #[test]
    fn test_ingest_caps_alert_log() {
        let mut center = AlertCenter::new();
        for i in 0..30 {
            center.ingest(
                LiveMessage::ThreatDetected {
                    message: format!("threat {}", i),
                    severity: AlertSeverity::Medium,
                },
                ts(),
            );
        }
        assert_eq!(center.alert_count(), ALERT_CAP);
        assert_eq!(center.alerts()[0].message, "threat 29");
    }

    #[test]
    fn test_status_message_overrides_flag() {
        let mut center = AlertCenter::new();
        center.ingest(
            LiveMessage::SystemStatus {
                status: SystemStatus::Warning,
            },
            ts(),
        );
        assert_eq!(center.status(), SystemStatus::Warning);
    }

    #[test]
    fn test_unknown_kind_is_ignored() {
        let raw = r#"{"kind": "firmware_update", "version": 3}"#;
        let message: LiveMessage = serde_json::from_str(raw).unwrap();
        let mut center = AlertCenter::new();
        center.ingest(message, ts());
        assert_eq!(center.alert_count(), 0);
        assert_eq!(center.status(), SystemStatus::Secure);
    }

    #[test]
    fn test_live_message_parses_from_wire() {
        let raw = r#"{"kind": "threat_detected", "message": "port scan", "severity": "high"}"#;
        let message: LiveMessage = serde_json::from_str(raw).unwrap();
        let mut center = AlertCenter::new();
        center.ingest(message, ts());
        assert_eq!(center.alerts()[0].alert_type, "threat");
        // Threat notices do not touch the status flag.
        assert_eq!(center.status(), SystemStatus::Secure);
    }
}
