//! Artifact writers.
//!
//! Every artifact is a full replacement of any prior file with the same
//! name; nothing is appended. Rows are already in a deterministic order
//! when they arrive here, so identical inputs produce byte-identical
//! files.

use std::path::Path;

use serde::Serialize;

use crate::PipelineError;

/// Writes `rows` to `path` as CSV with a header row derived from the row
/// type. An empty slice still produces the header row, so empty
/// artifacts stay parseable.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be created or a row
/// cannot be serialized.
pub fn write_csv<T: Serialize + Default>(path: &Path, rows: &[T]) -> Result<(), PipelineError> {
    if rows.is_empty() {
        return write_header_only::<T>(path);
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// The csv writer only learns the header names from a serialized value,
/// so the header of an empty artifact is recovered from a default row.
fn write_header_only<T: Serialize + Default>(path: &Path) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(T::default())?;
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let text = String::from_utf8_lossy(&bytes);
    let header = text.lines().next().unwrap_or_default();
    std::fs::write(path, format!("{header}\n"))?;
    log::info!("Wrote 0 rows to {}", path.display());
    Ok(())
}

/// Writes a single scalar value as plain text.
///
/// # Errors
///
/// Returns [`PipelineError`] if the file cannot be written.
pub fn write_scalar(path: &Path, value: f64) -> Result<(), PipelineError> {
    std::fs::write(path, format!("{value}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use congestion_audit_analytics_models::{
        ComplianceStats, EconomicMonthSummary, LeakageLocation, VendorGhostCount,
    };

    use super::*;

    #[test]
    fn csv_carries_camel_case_headers_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leakage_top_locations.csv");
        let rows = vec![
            LeakageLocation {
                pickup_zone: 7,
                missing_surcharge_trips: 42,
            },
            LeakageLocation {
                pickup_zone: 9,
                missing_surcharge_trips: 13,
            },
        ];

        write_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("pickupZone,missingSurchargeTrips"));
        assert_eq!(lines.next(), Some("7,42"));
        assert_eq!(lines.next(), Some("9,13"));
    }

    #[test]
    fn empty_artifact_still_carries_the_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leakage_top_locations.csv");
        let rows: Vec<LeakageLocation> = Vec::new();

        write_csv(&path, &rows).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "pickupZone,missingSurchargeTrips\n"
        );
    }

    #[test]
    fn missing_values_serialize_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        let rows = vec![ComplianceStats {
            paid_trips: 0,
            total_eligible_trips: 0,
            compliance_rate: None,
        }];

        write_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("paidTrips,totalEligibleTrips,complianceRate")
        );
        assert_eq!(lines.next(), Some("0,0,"));
    }

    #[test]
    fn absent_vendor_id_serializes_as_empty_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suspicious_vendors.csv");
        let rows = vec![VendorGhostCount {
            vendor_id: None,
            ghost_trip_count: 3,
        }];

        write_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(",3"));
    }

    #[test]
    fn economics_rows_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("economics_metrics.csv");
        let rows = vec![EconomicMonthSummary {
            year: 2025,
            month: 1,
            total_surcharge: 123.5,
            avg_surcharge: Some(2.5),
            avg_fare: 18.25,
            avg_tip_pct: None,
        }];

        write_csv(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let parsed: Vec<EconomicMonthSummary> =
            reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn identical_inputs_produce_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        let rows = vec![LeakageLocation {
            pickup_zone: 7,
            missing_surcharge_trips: 42,
        }];

        write_csv(&first, &rows).unwrap();
        write_csv(&second, &rows).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn scalar_writes_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("total_revenue.txt");
        write_scalar(&path, 1234.5).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1234.5");
    }
}
