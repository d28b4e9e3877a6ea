//! Presentation shell state: tabs, headline stat cards and the alert badge.
//!
//! Front-ends render whatever this holds; it never mutates alerts itself.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::alerts::catalog::LOCATIONS;
use super::alerts::{AlertStore, Severity};
use super::session::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Metrics,
    Map,
    Alerts,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Metrics => "Metrics",
            Self::Map => "Live Map",
            Self::Alerts => "Alerts",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metrics" => Ok(Self::Metrics),
            "map" => Ok(Self::Map),
            "alerts" => Ok(Self::Alerts),
            other => Err(format!("unknown tab '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// One headline card above the tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

impl StatCard {
    fn new(title: &str, value: String, change: String, trend: Trend) -> Self {
        Self {
            title: title.to_string(),
            value,
            change,
            trend,
        }
    }
}

/// A site pin on the map tab. Positions are grid coordinates, not geographic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

/// Site pins laid out on a diagonal grid. The map has no alert dependency.
pub fn map_markers() -> Vec<MapMarker> {
    LOCATIONS
        .iter()
        .enumerate()
        .map(|(i, name)| MapMarker {
            name: name.to_string(),
            x: 0.15 + 0.175 * i as f32,
            y: 0.2 + 0.15 * i as f32,
        })
        .collect()
}

/// The logged-in view.
pub struct Dashboard {
    user: Identity,
    tab: Tab,
    badge: watch::Receiver<usize>,
    clock: Option<DateTime<Utc>>,
}

impl Dashboard {
    pub fn new(user: Identity, badge: watch::Receiver<usize>) -> Self {
        Self {
            user,
            tab: Tab::default(),
            badge,
            clock: None,
        }
    }

    pub fn user(&self) -> &Identity {
        &self.user
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    /// Latest active-alert count published by the store.
    pub fn badge(&self) -> usize {
        *self.badge.borrow()
    }

    /// Wait for the next badge change. `None` once the store is gone.
    pub async fn badge_changed(&mut self) -> Option<usize> {
        self.badge.changed().await.ok()?;
        Some(*self.badge.borrow_and_update())
    }

    pub fn set_clock(&mut self, now: DateTime<Utc>) {
        self.clock = Some(now);
    }

    pub fn clock(&self) -> Option<DateTime<Utc>> {
        self.clock
    }

    pub fn greeting(&self) -> String {
        format!("Welcome back, {}", self.user.name)
    }

    /// Headline cards. Only the alerts card is live.
    pub fn stat_cards(&self, store: &AlertStore) -> Vec<StatCard> {
        vec![
            StatCard::new("Active Intersections", "247".into(), "+12".into(), Trend::Up),
            StatCard::new("Current Traffic Flow", "8,924".into(), "+5.2%".into(), Trend::Up),
            StatCard::new("Average Wait Time", "2.3 min".into(), "-0.8 min".into(), Trend::Down),
            StatCard::new(
                "Active Alerts",
                self.badge().to_string(),
                format!("Critical: {}", store.active_count_for(Severity::Critical)),
                Trend::Neutral,
            ),
        ]
    }
}
