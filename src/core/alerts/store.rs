//! In-memory alert store.
//!
//! Holds the ordered alert collection (newest first), the current severity
//! filter, and publishes the unfiltered active count to observers after
//! every successful mutation.

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::watch;

use super::catalog::{self, LOCATIONS};
use super::model::{Alert, AlertFilter, AlertId, Severity};
use crate::core::error::AlertError;
use crate::core::random::RandomSource;

/// Probability that a generation tick produces an alert
pub const DEFAULT_ALERT_PROBABILITY: f64 = 0.3;

#[derive(Debug)]
pub struct AlertStore {
    /// Newest first
    alerts: Vec<Alert>,
    filter: AlertFilter,
    next_id: u64,
    probability: f64,
    active_tx: watch::Sender<usize>,
}

impl AlertStore {
    /// Empty store with no alerts.
    pub fn new() -> Self {
        let (active_tx, _) = watch::channel(0);
        Self {
            alerts: Vec::new(),
            filter: AlertFilter::All,
            next_id: 1,
            probability: DEFAULT_ALERT_PROBABILITY,
            active_tx,
        }
    }

    /// Store populated with the seed batch.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut store = Self::new();
        store.initialize(now);
        store
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Replace the contents with the seed batch, timestamped relative to `now`.
    ///
    /// A fresh store keeps the catalog ids 1..=4. Once ids have been issued,
    /// the seed records draw new ids from the counter instead.
    pub fn initialize(&mut self, now: DateTime<Utc>) {
        let mut seed = catalog::seed_alerts(now);
        if self.next_id > 1 {
            for alert in &mut seed {
                alert.id = self.issue_id();
            }
        } else {
            let highest = seed.iter().map(|a| a.id.get()).max().unwrap_or(0);
            self.next_id = highest + 1;
        }
        self.alerts = seed;
        info!("Alert store seeded with {} alerts", self.alerts.len());
        self.publish();
    }

    /// One generation tick: with the store's probability, push a random alert.
    ///
    /// Returns the id of the new alert, or `None` when the roll missed.
    pub fn generate_random_alert<R>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Option<AlertId>
    where
        R: RandomSource + ?Sized,
    {
        if rng.chance(self.probability) {
            Some(self.push_random_alert(rng, now))
        } else {
            debug!("Alert tick produced nothing");
            None
        }
    }

    /// Unconditionally generate one alert and prepend it.
    pub fn push_random_alert<R>(&mut self, rng: &mut R, now: DateTime<Utc>) -> AlertId
    where
        R: RandomSource + ?Sized,
    {
        let severities = Severity::all();
        let severity = severities[rng.pick(severities.len())];
        let templates = catalog::templates(severity);
        let template = templates[rng.pick(templates.len())];
        let location = LOCATIONS[rng.pick(LOCATIONS.len())];

        let id = self.issue_id();
        self.alerts.insert(
            0,
            Alert {
                id,
                severity,
                title: template.title.to_string(),
                description: template.description.to_string(),
                location: location.to_string(),
                created_at: now,
                resolved: false,
            },
        );
        info!("New {} alert {}: {} at {}", severity, id, template.title, location);
        self.publish();
        id
    }

    /// Mark an alert resolved.
    ///
    /// Returns `Ok(true)` if it transitioned, `Ok(false)` if it was already
    /// resolved. Unknown ids are reported and leave the store untouched.
    pub fn resolve(&mut self, id: AlertId) -> Result<bool, AlertError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AlertError::NotFound(id))?;

        if alert.resolved {
            return Ok(false);
        }
        alert.resolved = true;
        info!("Resolved alert {}", id);
        self.publish();
        Ok(true)
    }

    /// Permanently remove an alert, resolved or not.
    pub fn dismiss(&mut self, id: AlertId) -> Result<Alert, AlertError> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or(AlertError::NotFound(id))?;

        let removed = self.alerts.remove(index);
        info!("Dismissed alert {}", id);
        self.publish();
        Ok(removed)
    }

    pub fn set_filter(&mut self, filter: AlertFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> AlertFilter {
        self.filter
    }

    /// Unresolved alerts matching the current filter, newest first.
    pub fn active_alerts(&self) -> Vec<&Alert> {
        self.filtered().filter(|a| !a.resolved).collect()
    }

    /// Resolved alerts matching the current filter, newest first.
    pub fn resolved_alerts(&self) -> Vec<&Alert> {
        self.filtered().filter(|a| a.resolved).collect()
    }

    /// Unresolved alerts in the whole store, ignoring the filter.
    pub fn active_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_active()).count()
    }

    /// Unresolved alerts of one severity, ignoring the filter.
    pub fn active_count_for(&self, severity: Severity) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.is_active() && a.severity == severity)
            .count()
    }

    /// Observe the active count. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.active_tx.subscribe()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    fn filtered(&self) -> impl Iterator<Item = &Alert> {
        let filter = self.filter;
        self.alerts.iter().filter(move |a| filter.matches(a.severity))
    }

    fn issue_id(&mut self) -> AlertId {
        let id = AlertId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn publish(&self) {
        let count = self.active_count();
        self.active_tx.send_replace(count);
        debug!("Active alert count is now {}", count);
    }
}

impl Default for AlertStore {
    fn default() -> Self {
        Self::new()
    }
}
