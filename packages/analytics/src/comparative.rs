//! Before/after comparative metrics across the policy boundary.
//!
//! Both windows are the first calendar quarter of their year. Volume and
//! velocity use the congestion zone set; the border analysis looks at
//! every dropoff zone to show traffic displacement around the boundary.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use congestion_audit_analytics_models::{BorderRow, VelocityRow, VolumeRow};
use congestion_audit_geography_models::CongestionZoneSet;
use congestion_audit_trip_models::{TaxiType, TripRecord};

/// Velocity plausibility filter: minimum duration in seconds. This is a
/// signal-quality filter for speed averaging, separate from the anomaly
/// rules.
pub const VELOCITY_MIN_DURATION_SECONDS: i64 = 60;

/// Velocity plausibility filter: minimum distance in miles.
pub const VELOCITY_MIN_DISTANCE_MILES: f64 = 0.1;

/// Velocity plausibility filter: maximum speed in mph.
pub const VELOCITY_MAX_SPEED_MPH: f64 = 100.0;

/// Human-readable label for a first-quarter window, e.g. `"2024 Q1"`.
#[must_use]
pub fn period_label(year: i32) -> String {
    format!("{year} Q1")
}

/// Returns `true` if the trip was picked up in the first quarter of
/// `year`.
#[must_use]
pub fn in_first_quarter(trip: &TripRecord, year: i32) -> bool {
    trip.pickup_datetime.year() == year && trip.pickup_datetime.month() <= 3
}

/// Counts trips entering the priced area per (period, taxi type).
///
/// Groups with no matching trips are omitted, like a SQL `GROUP BY`.
/// Output order is baseline period first, then taxi types in canonical
/// order within each period.
#[must_use]
pub fn volume_comparison(
    baseline: &[TripRecord],
    audit: &[TripRecord],
    baseline_year: i32,
    audit_year: i32,
    zones: &CongestionZoneSet,
) -> Vec<VolumeRow> {
    let mut rows = Vec::new();

    for (trips, year) in [(baseline, baseline_year), (audit, audit_year)] {
        let mut counts: BTreeMap<TaxiType, u64> = BTreeMap::new();
        for trip in trips {
            if in_first_quarter(trip, year) && zones.contains_opt(trip.dropoff_zone) {
                *counts.entry(trip.taxi_type).or_default() += 1;
            }
        }
        for (taxi_type, trip_count) in counts {
            rows.push(VolumeRow {
                period: period_label(year),
                taxi_type,
                trip_count,
            });
        }
    }

    rows
}

/// A trip usable for speed averaging: fully inside the priced area, long
/// enough to measure, and not an obvious meter glitch.
#[must_use]
pub fn plausible_in_zone(trip: &TripRecord, zones: &CongestionZoneSet) -> bool {
    zones.contains_opt(trip.pickup_zone)
        && zones.contains_opt(trip.dropoff_zone)
        && trip.duration_seconds() > VELOCITY_MIN_DURATION_SECONDS
        && trip.trip_distance > VELOCITY_MIN_DISTANCE_MILES
        && trip.speed_mph() < VELOCITY_MAX_SPEED_MPH
}

/// Average in-zone speed per (period, day-of-week, hour-of-day).
///
/// Day of week is 0 = Sunday, matching the engine the reports were
/// originally built against.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn velocity_metrics(
    baseline: &[TripRecord],
    audit: &[TripRecord],
    baseline_year: i32,
    audit_year: i32,
    zones: &CongestionZoneSet,
) -> Vec<VelocityRow> {
    let mut rows = Vec::new();

    for (trips, year) in [(baseline, baseline_year), (audit, audit_year)] {
        let mut groups: BTreeMap<(u32, u32), (f64, u64)> = BTreeMap::new();
        for trip in trips {
            if !in_first_quarter(trip, year) || !plausible_in_zone(trip, zones) {
                continue;
            }
            let key = (
                trip.pickup_datetime.weekday().num_days_from_sunday(),
                trip.pickup_datetime.hour(),
            );
            let entry = groups.entry(key).or_insert((0.0, 0));
            entry.0 += trip.speed_mph();
            entry.1 += 1;
        }
        for ((day_of_week, hour_of_day), (speed_sum, count)) in groups {
            rows.push(VelocityRow {
                period: period_label(year),
                day_of_week,
                hour_of_day,
                avg_speed_mph: speed_sum / count as f64,
            });
        }
    }

    rows
}

/// Dropoff counts per zone for both periods, with the percent change.
///
/// A zone with no baseline trips reports a `0` percent change by
/// documented convention instead of an undefined/infinite value. Trips
/// with a missing dropoff zone are excluded entirely: the zone id is the
/// row's key, so there is no row to attribute them to.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn border_analysis(
    baseline: &[TripRecord],
    audit: &[TripRecord],
    baseline_year: i32,
    audit_year: i32,
) -> Vec<BorderRow> {
    let mut counts: BTreeMap<i32, (u64, u64)> = BTreeMap::new();

    for trip in baseline {
        if in_first_quarter(trip, baseline_year)
            && let Some(zone) = trip.dropoff_zone
        {
            counts.entry(zone).or_default().0 += 1;
        }
    }
    for trip in audit {
        if in_first_quarter(trip, audit_year)
            && let Some(zone) = trip.dropoff_zone
        {
            counts.entry(zone).or_default().1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(dropoff_zone, (baseline_count, audit_count))| {
            let pct_change = if baseline_count == 0 {
                0.0
            } else {
                (audit_count as f64 - baseline_count as f64) * 100.0 / baseline_count as f64
            };
            BorderRow {
                dropoff_zone,
                baseline_count,
                audit_count,
                pct_change,
            }
        })
        .collect()
}
