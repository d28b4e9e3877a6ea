// Fixed alert content: monitored sites, per-severity templates and the seed batch.

use chrono::{DateTime, Duration, Utc};

use super::model::{Alert, AlertId, Severity};

/// Named intersections covered by the monitoring network.
pub const LOCATIONS: [&str; 5] = [
    "Main St & 1st Ave",
    "Broadway & 2nd St",
    "Oak Ave & 3rd St",
    "Pine St & 4th Ave",
    "Elm St & 5th Ave",
];

/// Title and description used when an alert is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertTemplate {
    pub title: &'static str,
    pub description: &'static str,
}

const CRITICAL_TEMPLATES: [AlertTemplate; 3] = [
    AlertTemplate {
        title: "Traffic Light Malfunction",
        description: "Signal system failure requiring immediate attention",
    },
    AlertTemplate {
        title: "Emergency Vehicle Priority",
        description: "Emergency vehicle detected, adjusting traffic flow",
    },
    AlertTemplate {
        title: "Accident Detected",
        description: "Potential accident detected based on traffic patterns",
    },
];

const WARNING_TEMPLATES: [AlertTemplate; 3] = [
    AlertTemplate {
        title: "High Congestion",
        description: "Traffic volume exceeds normal threshold",
    },
    AlertTemplate {
        title: "Sensor Degraded",
        description: "Traffic sensor reporting inconsistent data",
    },
    AlertTemplate {
        title: "Weather Impact",
        description: "Weather conditions affecting traffic flow",
    },
];

const INFO_TEMPLATES: [AlertTemplate; 3] = [
    AlertTemplate {
        title: "Optimization Applied",
        description: "AI optimization successfully applied to intersection",
    },
    AlertTemplate {
        title: "Peak Hours Starting",
        description: "Entering peak traffic hours, adjusting timing",
    },
    AlertTemplate {
        title: "System Update",
        description: "Traffic management system updated successfully",
    },
];

/// Templates a generated alert of the given severity draws from
pub fn templates(severity: Severity) -> &'static [AlertTemplate] {
    match severity {
        Severity::Critical => &CRITICAL_TEMPLATES,
        Severity::Warning => &WARNING_TEMPLATES,
        Severity::Info => &INFO_TEMPLATES,
    }
}

struct SeedEntry {
    severity: Severity,
    title: &'static str,
    description: &'static str,
    location: &'static str,
    minutes_ago: i64,
    resolved: bool,
}

const SEED: [SeedEntry; 4] = [
    SeedEntry {
        severity: Severity::Critical,
        title: "Traffic Light Malfunction",
        description: "Traffic signal stuck on red causing major backup",
        location: "Oak Ave & 3rd St",
        minutes_ago: 5,
        resolved: false,
    },
    SeedEntry {
        severity: Severity::Warning,
        title: "High Traffic Volume",
        description: "Unusual traffic volume detected, consider signal timing adjustment",
        location: "Broadway & 2nd St",
        minutes_ago: 10,
        resolved: false,
    },
    SeedEntry {
        severity: Severity::Info,
        title: "Maintenance Scheduled",
        description: "Routine maintenance scheduled for tonight 2:00 AM",
        location: "Main St & 1st Ave",
        minutes_ago: 15,
        resolved: false,
    },
    SeedEntry {
        severity: Severity::Warning,
        title: "Sensor Communication Lost",
        description: "Lost connection to traffic sensor, using backup timing",
        location: "Pine St & 4th Ave",
        minutes_ago: 20,
        resolved: true,
    },
];

/// The starting condition of the network: ids 1..=4, newest first,
/// three active and one already resolved.
pub fn seed_alerts(now: DateTime<Utc>) -> Vec<Alert> {
    SEED.iter()
        .zip(1u64..)
        .map(|(entry, id)| Alert {
            id: AlertId::new(id),
            severity: entry.severity,
            title: entry.title.to_string(),
            description: entry.description.to_string(),
            location: entry.location.to_string(),
            created_at: now - Duration::minutes(entry.minutes_ago),
            resolved: entry.resolved,
        })
        .collect()
}
