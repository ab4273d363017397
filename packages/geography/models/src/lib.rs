#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Congestion zone membership types.
//!
//! The priced area is represented as a plain set of taxi zone ids, derived
//! once per run from zone geometry. Analyses only ever ask "is this zone
//! inside the priced area", so the geometry itself never leaves the
//! geography crate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of taxi zone ids inside the priced (congestion) area.
///
/// Backed by an ordered set so that iteration — and therefore every
/// artifact derived from it — is deterministic for identical input
/// geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongestionZoneSet(BTreeSet<i32>);

impl CongestionZoneSet {
    /// Returns `true` if `zone` is inside the priced area.
    #[must_use]
    pub fn contains(&self, zone: i32) -> bool {
        self.0.contains(&zone)
    }

    /// Returns `true` if a possibly-missing zone id is inside the priced
    /// area. A missing id never satisfies membership, matching SQL `IN`
    /// semantics over NULL.
    #[must_use]
    pub fn contains_opt(&self, zone: Option<i32>) -> bool {
        zone.is_some_and(|z| self.contains(z))
    }

    /// Number of zones in the priced area.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no zones matched the congestion predicate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Zone ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i32> for CongestionZoneSet {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
