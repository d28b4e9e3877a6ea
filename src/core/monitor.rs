//! Background monitor: owns the timers and is the single writer of the alert store.
//!
//! Front-ends read the store through [`MonitorHandle::with_store`] and send
//! mutations as commands, so every change to the collection happens on the
//! monitor task in arrival order.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::alerts::{Alert, AlertFilter, AlertId, AlertStore};
use super::config::Settings;
use super::error::{AlertError, MonitorError};
use super::metrics::MetricsSnapshot;

enum MonitorCommand {
    Resolve(AlertId, oneshot::Sender<Result<bool, AlertError>>),
    Dismiss(AlertId, oneshot::Sender<Result<Alert, AlertError>>),
    SetFilter(AlertFilter),
    Stop,
}

/// Tick periods for the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub clock: Duration,
    pub alerts: Duration,
    pub metrics: Duration,
}

impl From<&Settings> for Intervals {
    fn from(settings: &Settings) -> Self {
        Self {
            clock: settings.clock_interval(),
            alerts: settings.alert_interval(),
            metrics: settings.metrics_interval(),
        }
    }
}

/// Client side of a running monitor.
pub struct MonitorHandle {
    tx: mpsc::Sender<MonitorCommand>,
    store: Arc<Mutex<AlertStore>>,
    metrics: Arc<RwLock<MetricsSnapshot>>,
    badge: watch::Receiver<usize>,
    clock: watch::Receiver<DateTime<Utc>>,
    task: JoinHandle<()>,
}

/// Start the monitor loop on the current tokio runtime.
pub fn spawn(store: AlertStore, intervals: Intervals) -> MonitorHandle {
    spawn_with_rng(store, intervals, StdRng::from_entropy())
}

/// Same as [`spawn`] with a caller-chosen generator, for reproducible runs.
pub fn spawn_with_rng(store: AlertStore, intervals: Intervals, mut rng: StdRng) -> MonitorHandle {
    let now = Utc::now();
    let badge = store.subscribe();
    let metrics = Arc::new(RwLock::new(MetricsSnapshot::generate(&mut rng, now)));
    let store = Arc::new(Mutex::new(store));
    let (clock_tx, clock) = watch::channel(now);
    let (tx, rx) = mpsc::channel(32);

    let task = tokio::spawn(run_loop(
        rx,
        Arc::clone(&store),
        Arc::clone(&metrics),
        clock_tx,
        intervals,
        rng,
    ));

    MonitorHandle {
        tx,
        store,
        metrics,
        badge,
        clock,
        task,
    }
}

fn ticker(period: Duration) -> time::Interval {
    // First tick one full period from now, not immediately.
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_loop(
    mut rx: mpsc::Receiver<MonitorCommand>,
    store: Arc<Mutex<AlertStore>>,
    metrics: Arc<RwLock<MetricsSnapshot>>,
    clock_tx: watch::Sender<DateTime<Utc>>,
    intervals: Intervals,
    mut rng: StdRng,
) {
    let mut clock_tick = ticker(intervals.clock);
    let mut alert_tick = ticker(intervals.alerts);
    let mut metrics_tick = ticker(intervals.metrics);
    info!(
        "Monitor started (alerts every {:?}, metrics every {:?})",
        intervals.alerts, intervals.metrics
    );

    loop {
        tokio::select! {
            _ = clock_tick.tick() => {
                clock_tx.send_replace(Utc::now());
            }
            _ = alert_tick.tick() => {
                let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
                store.generate_random_alert(&mut rng, Utc::now());
            }
            _ = metrics_tick.tick() => {
                let mut snapshot = metrics.write().unwrap_or_else(PoisonError::into_inner);
                snapshot.refresh_traffic(&mut rng, Utc::now());
                debug!("Traffic series refreshed");
            }
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
                match cmd {
                    MonitorCommand::Resolve(id, reply) => {
                        let _ = reply.send(store.resolve(id));
                    }
                    MonitorCommand::Dismiss(id, reply) => {
                        let _ = reply.send(store.dismiss(id));
                    }
                    MonitorCommand::SetFilter(filter) => store.set_filter(filter),
                    MonitorCommand::Stop => break,
                }
            }
        }
    }

    info!("Monitor stopped");
}

impl MonitorHandle {
    /// Read the store under its lock.
    pub fn with_store<T>(&self, f: impl FnOnce(&AlertStore) -> T) -> T {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    pub fn active_count(&self) -> usize {
        self.with_store(AlertStore::active_count)
    }

    /// Badge feed: the store's active count.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.badge.clone()
    }

    /// Clock feed, updated every clock tick.
    pub fn clock(&self) -> watch::Receiver<DateTime<Utc>> {
        self.clock.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn resolve(&self, id: AlertId) -> Result<bool, MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Resolve(id, reply)).await?;
        Ok(rx.await.map_err(|_| MonitorError::Stopped)??)
    }

    pub async fn dismiss(&self, id: AlertId) -> Result<Alert, MonitorError> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Dismiss(id, reply)).await?;
        Ok(rx.await.map_err(|_| MonitorError::Stopped)??)
    }

    pub async fn set_filter(&self, filter: AlertFilter) -> Result<(), MonitorError> {
        self.send(MonitorCommand::SetFilter(filter)).await
    }

    /// Stop the timers and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.tx.send(MonitorCommand::Stop).await;
        let _ = self.task.await;
    }

    async fn send(&self, cmd: MonitorCommand) -> Result<(), MonitorError> {
        self.tx.send(cmd).await.map_err(|_| MonitorError::Stopped)
    }
}
