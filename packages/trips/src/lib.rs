#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Schema unification for the raw taxi trip parquet drops.
//!
//! The two raw variants (Yellow/Green) share every column except the
//! pickup/dropoff timestamp names. Each variant is read through `DuckDB`
//! with its timestamp columns aliased to the canonical names, tagged with
//! its [`TaxiType`], and materialized as [`TripRecord`]s. The same raw
//! files always produce the same records, in the same order.

use std::path::Path;

use chrono::DateTime;
use congestion_audit_trip_models::{TaxiType, TripRecord};
use duckdb::Connection;
use thiserror::Error;

/// Errors that can occur while unifying raw trip data.
#[derive(Debug, Error)]
pub enum TripError {
    /// `DuckDB` operation failed.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// Filesystem inspection failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No raw files exist for a requested year.
    #[error("Data unavailable: {message}")]
    DataUnavailable {
        /// Description of what is missing.
        message: String,
    },
}

/// Opens an in-memory `DuckDB` connection for parquet scanning.
///
/// # Errors
///
/// Returns [`TripError`] if the connection cannot be created.
pub fn open_connection() -> Result<Connection, TripError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("SET threads = 4; SET memory_limit = '512MB';")?;
    Ok(conn)
}

/// Loads every trip of `year` from the raw parquet drops under `raw_dir`,
/// unified into canonical records.
///
/// A variant with no files on disk is skipped with a warning; if neither
/// variant has files the year is reported as unavailable. Rows missing a
/// pickup or dropoff timestamp are dropped (counted and logged) since no
/// duration can be derived for them.
///
/// # Errors
///
/// Returns [`TripError::DataUnavailable`] when no raw files exist for the
/// year, or [`TripError::Database`] if a parquet scan fails.
pub fn load_year(
    conn: &Connection,
    raw_dir: &Path,
    year: i32,
) -> Result<Vec<TripRecord>, TripError> {
    let mut records = Vec::new();
    let mut variants_found = 0;

    for &taxi_type in TaxiType::ALL {
        if !has_raw_files(raw_dir, year, taxi_type)? {
            log::warn!("No {taxi_type} parquet files for {year} under {raw_dir:?}");
            continue;
        }
        variants_found += 1;
        let before = records.len();
        scan_variant(conn, raw_dir, year, taxi_type, &mut records)?;
        log::info!(
            "Loaded {} {taxi_type} trips for {year}",
            records.len() - before
        );
    }

    if variants_found == 0 {
        return Err(TripError::DataUnavailable {
            message: format!("no trip data for {year} under {raw_dir:?}"),
        });
    }

    Ok(records)
}

/// SELECT for one variant, with the variant-specific timestamp columns
/// aliased to the canonical names. Timestamps come back as epoch seconds
/// so no `DuckDB` datetime feature flags are needed on the client side.
fn variant_query(raw_dir: &Path, year: i32, taxi_type: TaxiType) -> String {
    let glob = raw_dir
        .join(format!(
            "{}_tripdata_{year}-*.parquet",
            taxi_type.file_prefix()
        ))
        .display()
        .to_string();
    format!(
        "SELECT
            VendorID,
            epoch({pickup})::BIGINT AS pickup_epoch,
            epoch({dropoff})::BIGINT AS dropoff_epoch,
            trip_distance,
            fare_amount,
            total_amount,
            tip_amount,
            congestion_surcharge,
            PULocationID,
            DOLocationID
         FROM read_parquet('{glob}')",
        pickup = taxi_type.pickup_column(),
        dropoff = taxi_type.dropoff_column(),
    )
}

fn scan_variant(
    conn: &Connection,
    raw_dir: &Path,
    year: i32,
    taxi_type: TaxiType,
    records: &mut Vec<TripRecord>,
) -> Result<(), TripError> {
    let sql = variant_query(raw_dir, year, taxi_type);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut missing_timestamps = 0u64;

    while let Some(row) = rows.next()? {
        let pickup_epoch: Option<i64> = row.get(1)?;
        let dropoff_epoch: Option<i64> = row.get(2)?;

        let (Some(pickup), Some(dropoff)) = (
            pickup_epoch.and_then(|s| DateTime::from_timestamp(s, 0)),
            dropoff_epoch.and_then(|s| DateTime::from_timestamp(s, 0)),
        ) else {
            missing_timestamps += 1;
            continue;
        };

        records.push(TripRecord {
            vendor_id: row
                .get::<_, Option<i64>>(0)?
                .and_then(|v| i32::try_from(v).ok()),
            pickup_datetime: pickup.naive_utc(),
            dropoff_datetime: dropoff.naive_utc(),
            trip_distance: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            fare_amount: row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
            total_amount: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
            tip_amount: row.get(6)?,
            congestion_surcharge: row.get(7)?,
            pickup_zone: row
                .get::<_, Option<i64>>(8)?
                .and_then(|v| i32::try_from(v).ok()),
            dropoff_zone: row
                .get::<_, Option<i64>>(9)?
                .and_then(|v| i32::try_from(v).ok()),
            taxi_type,
        });
    }

    if missing_timestamps > 0 {
        log::warn!(
            "Dropped {missing_timestamps} {taxi_type} rows for {year} with missing timestamps"
        );
    }

    Ok(())
}

/// Returns `true` if at least one monthly parquet file exists for the
/// variant and year.
fn has_raw_files(raw_dir: &Path, year: i32, taxi_type: TaxiType) -> Result<bool, TripError> {
    let prefix = format!("{}_tripdata_{year}-", taxi_type.file_prefix());

    if !raw_dir.is_dir() {
        return Ok(false);
    }

    for entry in std::fs::read_dir(raw_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && name.ends_with(".parquet") {
            return Ok(true);
        }
    }

    Ok(false)
}
