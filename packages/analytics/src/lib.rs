#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Anomaly, leakage, comparative, and economic analyses over canonical
//! trip records.
//!
//! Every analysis is a pure function of the input snapshot (plus the
//! static congestion zone set), implemented as explicit aggregation
//! passes over the in-memory record collection. Arithmetic edge cases —
//! zero durations, empty groups, zero denominators — resolve to the
//! documented fallback values and never raise.

pub mod anomaly;
pub mod comparative;
pub mod economics;
pub mod leakage;
