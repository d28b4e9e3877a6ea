//! Display-only traffic datasets.
//!
//! Values are plausible-looking noise around fixed baselines; nothing
//! downstream depends on them except the charts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::alerts::catalog::LOCATIONS;
use super::random::RandomSource;

/// Points in the rolling traffic series, one per minute
pub const SERIES_POINTS: usize = 20;

const HOURS: [&str; 8] = ["6AM", "8AM", "10AM", "12PM", "2PM", "4PM", "6PM", "8PM"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPoint {
    /// `HH:MM`
    pub time: String,
    pub volume: f64,
    /// mph
    pub speed: f64,
    /// percent
    pub congestion: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalVolume {
    pub hour: String,
    pub northbound: u32,
    pub southbound: u32,
    pub eastbound: u32,
    pub westbound: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionStat {
    pub name: String,
    pub volume: u32,
    /// percent
    pub efficiency: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusShare {
    pub name: String,
    pub value: u32,
    pub color: String,
}

/// Rolling per-minute series ending at `now`, oldest first.
pub fn traffic_series<R>(rng: &mut R, now: DateTime<Utc>) -> Vec<TrafficPoint>
where
    R: RandomSource + ?Sized,
{
    (0..SERIES_POINTS)
        .rev()
        .map(|i| {
            let t = i as f64;
            let at = now - Duration::minutes(i as i64);
            TrafficPoint {
                time: at.format("%H:%M").to_string(),
                volume: f64::from(rng.range(0, 100)) + 200.0 + (t * 0.1).sin() * 50.0,
                speed: f64::from(rng.range(0, 15)) + 35.0 + (t * 0.15).cos() * 10.0,
                congestion: (f64::from(rng.range(0, 50)) + (t * 0.2).sin() * 25.0).max(0.0),
            }
        })
        .collect()
}

pub fn hourly_by_direction<R>(rng: &mut R) -> Vec<DirectionalVolume>
where
    R: RandomSource + ?Sized,
{
    HOURS
        .iter()
        .map(|hour| DirectionalVolume {
            hour: hour.to_string(),
            northbound: rng.range(0, 500) + 200,
            southbound: rng.range(0, 500) + 200,
            eastbound: rng.range(0, 500) + 200,
            westbound: rng.range(0, 500) + 200,
        })
        .collect()
}

pub fn intersection_stats<R>(rng: &mut R) -> Vec<IntersectionStat>
where
    R: RandomSource + ?Sized,
{
    LOCATIONS
        .iter()
        .map(|name| IntersectionStat {
            name: name.to_string(),
            volume: rng.range(0, 1000) + 500,
            efficiency: rng.range(0, 30) + 70,
        })
        .collect()
}

/// Fixed network status split shown on the pie chart.
pub fn status_distribution() -> Vec<StatusShare> {
    [("Normal", 85, "#10B981"), ("Warning", 12, "#F59E0B"), ("Critical", 3, "#EF4444")]
        .into_iter()
        .map(|(name, value, color)| StatusShare {
            name: name.to_string(),
            value,
            color: color.to_string(),
        })
        .collect()
}

/// Everything the metrics tab renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub traffic: Vec<TrafficPoint>,
    pub hourly: Vec<DirectionalVolume>,
    pub intersections: Vec<IntersectionStat>,
    pub status: Vec<StatusShare>,
    pub generated_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    pub fn generate<R>(rng: &mut R, now: DateTime<Utc>) -> Self
    where
        R: RandomSource + ?Sized,
    {
        Self {
            traffic: traffic_series(rng, now),
            hourly: hourly_by_direction(rng),
            intersections: intersection_stats(rng),
            status: status_distribution(),
            generated_at: now,
        }
    }

    /// Periodic tick: only the live series moves.
    pub fn refresh_traffic<R>(&mut self, rng: &mut R, now: DateTime<Utc>)
    where
        R: RandomSource + ?Sized,
    {
        self.traffic = traffic_series(rng, now);
        self.generated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedSource;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_series_shape_and_labels() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let series = traffic_series(&mut rng, now);

        assert_eq!(series.len(), SERIES_POINTS);
        assert_eq!(series.first().unwrap().time, "08:11");
        assert_eq!(series.last().unwrap().time, "08:30");
        for p in &series {
            assert!((150.0..=350.0).contains(&p.volume));
            assert!((25.0..=60.0).contains(&p.speed));
            assert!(p.congestion >= 0.0 && p.congestion < 75.0);
        }
    }

    #[test]
    fn test_series_exact_with_scripted_source() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let mut rng = ScriptedSource::new();
        let series = traffic_series(&mut rng, now);

        // last point is i = 0: sin(0) = 0, cos(0) = 1
        let last = series.last().unwrap();
        assert_eq!(last.volume, 200.0);
        assert_eq!(last.speed, 45.0);
        assert_eq!(last.congestion, 0.0);
    }

    #[test]
    fn test_hourly_and_intersections_ranges() {
        let mut rng = StdRng::seed_from_u64(5);
        let hourly = hourly_by_direction(&mut rng);
        assert_eq!(hourly.len(), 8);
        assert_eq!(hourly[0].hour, "6AM");
        assert!(hourly.iter().all(|h| (200..700).contains(&h.northbound) && (200..700).contains(&h.westbound)));

        let sites = intersection_stats(&mut rng);
        assert_eq!(sites.len(), LOCATIONS.len());
        assert!(sites.iter().all(|s| (500..1500).contains(&s.volume) && (70..100).contains(&s.efficiency)));
    }

    #[test]
    fn test_status_distribution_totals_100() {
        let total: u32 = status_distribution().iter().map(|s| s.value).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_refresh_only_moves_traffic() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut snapshot = MetricsSnapshot::generate(&mut rng, start);
        let hourly = snapshot.hourly.clone();

        let later = start + Duration::seconds(300);
        snapshot.refresh_traffic(&mut rng, later);
        assert_eq!(snapshot.hourly, hourly);
        assert_eq!(snapshot.generated_at, later);
        assert_eq!(snapshot.traffic.last().unwrap().time, "08:05");
    }
}
