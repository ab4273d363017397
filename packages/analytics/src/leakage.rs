//! Surcharge leakage and compliance analysis.
//!
//! An *eligible* trip crosses into the priced area from outside it on or
//! after the policy start date. Leakage is an eligible trip where the
//! surcharge is absent or zero — an explicit two-way test, since a
//! missing surcharge and a recorded zero are distinct observations.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use congestion_audit_analytics_models::{ComplianceStats, LeakageFinding, LeakageLocation};
use congestion_audit_geography_models::CongestionZoneSet;
use congestion_audit_trip_models::TripRecord;

/// Pickup zones reported in the leakage ranking.
pub const TOP_LEAKAGE_LOCATIONS: usize = 3;

/// Returns `true` if the trip crossed from outside the priced area into
/// it, on or after the policy start. Trips with a missing zone id on
/// either end never qualify, matching SQL `IN`/`NOT IN` null semantics.
#[must_use]
pub fn is_eligible(
    trip: &TripRecord,
    zones: &CongestionZoneSet,
    policy_start: NaiveDateTime,
) -> bool {
    trip.pickup_datetime >= policy_start
        && trip.pickup_zone.is_some_and(|z| !zones.contains(z))
        && zones.contains_opt(trip.dropoff_zone)
}

/// Returns `true` if no surcharge was collected: the field is absent OR
/// it records an explicit zero.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn missing_surcharge(trip: &TripRecord) -> bool {
    trip.congestion_surcharge.is_none_or(|s| s == 0.0)
}

/// Counts leakage among eligible trips and ranks the offending pickup
/// zones.
///
/// The percentage denominator is *all* records picked up on or after the
/// policy start, not just eligible ones — preserved source behavior. Zero
/// post-policy records yield a `0` percentage, never a division error.
/// Ranking ties break by ascending zone id.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn leakage_finding(
    trips: &[TripRecord],
    zones: &CongestionZoneSet,
    policy_start: NaiveDateTime,
) -> LeakageFinding {
    let mut leakage_count = 0u64;
    let mut post_policy_total = 0u64;
    let mut by_zone: HashMap<i32, u64> = HashMap::new();

    for trip in trips {
        if trip.pickup_datetime >= policy_start {
            post_policy_total += 1;
        }
        if is_eligible(trip, zones, policy_start) && missing_surcharge(trip) {
            leakage_count += 1;
            if let Some(zone) = trip.pickup_zone {
                *by_zone.entry(zone).or_default() += 1;
            }
        }
    }

    let leakage_pct = if post_policy_total == 0 {
        0.0
    } else {
        leakage_count as f64 * 100.0 / post_policy_total as f64
    };

    let mut top_locations: Vec<LeakageLocation> = by_zone
        .into_iter()
        .map(|(pickup_zone, missing_surcharge_trips)| LeakageLocation {
            pickup_zone,
            missing_surcharge_trips,
        })
        .collect();
    top_locations.sort_by(|a, b| {
        b.missing_surcharge_trips
            .cmp(&a.missing_surcharge_trips)
            .then(a.pickup_zone.cmp(&b.pickup_zone))
    });
    top_locations.truncate(TOP_LEAKAGE_LOCATIONS);

    log::info!(
        "Leakage: {leakage_count} of {post_policy_total} post-policy trips ({leakage_pct:.2}%)"
    );

    LeakageFinding {
        leakage_count,
        leakage_pct,
        top_locations,
    }
}

/// Computes the compliance rate over eligible trips. Zero eligible trips
/// report zero counts and no rate rather than a division error.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compliance_stats(
    trips: &[TripRecord],
    zones: &CongestionZoneSet,
    policy_start: NaiveDateTime,
) -> ComplianceStats {
    let mut paid_trips = 0u64;
    let mut total_eligible_trips = 0u64;

    for trip in trips {
        if !is_eligible(trip, zones, policy_start) {
            continue;
        }
        total_eligible_trips += 1;
        if trip.congestion_surcharge.is_some_and(|s| s > 0.0) {
            paid_trips += 1;
        }
    }

    let compliance_rate = (total_eligible_trips > 0)
        .then(|| paid_trips as f64 * 100.0 / total_eligible_trips as f64);

    ComplianceStats {
        paid_trips,
        total_eligible_trips,
        compliance_rate,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use congestion_audit_trip_models::TaxiType;

    use super::*;

    fn policy_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn zone_set() -> CongestionZoneSet {
        [1, 2].into_iter().collect()
    }

    fn trip(
        day: u32,
        pickup_zone: Option<i32>,
        dropoff_zone: Option<i32>,
        surcharge: Option<f64>,
    ) -> TripRecord {
        let pickup = NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TripRecord {
            vendor_id: Some(1),
            pickup_datetime: pickup,
            dropoff_datetime: pickup + chrono::Duration::seconds(900),
            trip_distance: 3.0,
            fare_amount: 15.0,
            total_amount: 18.0,
            tip_amount: Some(3.0),
            congestion_surcharge: surcharge,
            pickup_zone,
            dropoff_zone,
            taxi_type: TaxiType::Yellow,
        }
    }

    #[test]
    fn absent_surcharge_on_inbound_trip_is_leakage() {
        let trips = vec![trip(10, Some(9), Some(1), None)];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        assert_eq!(finding.leakage_count, 1);
    }

    #[test]
    fn explicit_zero_surcharge_is_also_leakage() {
        let trips = vec![trip(10, Some(9), Some(1), Some(0.0))];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        assert_eq!(finding.leakage_count, 1);
    }

    #[test]
    fn charged_trip_is_not_leakage() {
        let trips = vec![trip(10, Some(9), Some(1), Some(2.75))];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        assert_eq!(finding.leakage_count, 0);
    }

    #[test]
    fn pre_policy_trips_do_not_count() {
        let trips = vec![trip(2, Some(9), Some(1), None)];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        assert_eq!(finding.leakage_count, 0);
        assert!(finding.leakage_pct.abs() < f64::EPSILON);
    }

    #[test]
    fn trips_inside_to_inside_are_not_eligible() {
        assert!(!is_eligible(
            &trip(10, Some(1), Some(2), None),
            &zone_set(),
            policy_start()
        ));
    }

    #[test]
    fn missing_zone_ids_are_never_eligible() {
        assert!(!is_eligible(
            &trip(10, None, Some(1), None),
            &zone_set(),
            policy_start()
        ));
        assert!(!is_eligible(
            &trip(10, Some(9), None, None),
            &zone_set(),
            policy_start()
        ));
    }

    #[test]
    fn percentage_denominator_is_all_post_policy_trips() {
        let trips = vec![
            trip(10, Some(9), Some(1), None), // leakage
            trip(10, Some(9), Some(9), None), // post-policy but not eligible
            trip(10, Some(1), Some(2), None), // post-policy but not eligible
            trip(10, Some(9), Some(2), None), // leakage
        ];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        assert_eq!(finding.leakage_count, 2);
        assert!((finding.leakage_pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn top_locations_rank_by_count_then_zone_id() {
        let trips = vec![
            trip(10, Some(9), Some(1), None),
            trip(10, Some(9), Some(1), None),
            trip(11, Some(7), Some(1), None),
            trip(11, Some(5), Some(1), None),
            trip(12, Some(8), Some(1), None),
            trip(12, Some(8), Some(1), None),
        ];
        let finding = leakage_finding(&trips, &zone_set(), policy_start());
        let zones: Vec<i32> = finding
            .top_locations
            .iter()
            .map(|l| l.pickup_zone)
            .collect();
        // 8 and 9 tie at two trips each; 5 and 7 tie at one, zone 5 wins
        assert_eq!(zones, vec![8, 9, 5]);
    }

    #[test]
    fn compliance_rate_over_eligible_trips() {
        let trips = vec![
            trip(10, Some(9), Some(1), Some(2.75)),
            trip(10, Some(9), Some(1), None),
        ];
        let stats = compliance_stats(&trips, &zone_set(), policy_start());
        assert_eq!(stats.paid_trips, 1);
        assert_eq!(stats.total_eligible_trips, 2);
        assert!((stats.compliance_rate.unwrap() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_eligible_trips_report_no_rate() {
        let trips = vec![trip(10, Some(1), Some(2), None)];
        let stats = compliance_stats(&trips, &zone_set(), policy_start());
        assert_eq!(stats.total_eligible_trips, 0);
        assert!(stats.compliance_rate.is_none());
    }
}
