//! Proximity query planning over a geohash-ordered index.
//!
//! A store that keeps listings sorted by their geohash can answer "everything
//! in this cell" as a single key-range scan. The planner picks a cell coarse
//! enough to hold the whole search circle when the center sits well inside it,
//! and hands back the half-open range `[prefix, prefix + "~")`. Results are
//! then post-filtered by true distance.
//!
//! # Known limitation
//!
//! Only the center's own cell is scanned. A listing within the radius but on
//! the far side of a cell edge sits under a different prefix and is missed.
//! Covering that case needs the eight neighbouring cells as extra ranges;
//! [`QueryPlan::ranges`] is a `Vec` so a planner that emits them can be
//! dropped in without changing callers.

use std::fmt;

use tracing::trace;

use crate::{
    Coordinate, GeoError, Result,
    geohash::{self, MAX_PRECISION, cell_dimensions_km},
};

/// Sorts after every symbol of the geohash alphabet.
pub const HIGH_SENTINEL: char = '~';

/// Half-open lexicographic range `[start, end)` over geohash strings.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoBoundingRange {
    pub start: String,
    pub end: String,
}

impl GeoBoundingRange {
    /// The range holding every geohash that starts with `prefix`.
    #[must_use]
    pub fn for_prefix(prefix: &str) -> Self {
        let mut end = String::with_capacity(prefix.len() + 1);
        end.push_str(prefix);
        end.push(HIGH_SENTINEL);
        Self {
            start: prefix.to_string(),
            end,
        }
    }

    #[must_use]
    pub fn contains(&self, hash: &str) -> bool {
        self.start.as_str() <= hash && hash < self.end.as_str()
    }
}

impl fmt::Display for GeoBoundingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Use this precision instead of deriving one from the radius
    pub fixed_precision: Option<usize>,
}

/// Everything a caller needs to run a proximity query.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Disjoint ranges to scan. Currently always exactly one.
    pub ranges: Vec<GeoBoundingRange>,
    /// Geohash precision of the scanned prefix
    pub precision: usize,
    /// Radius to post-filter scanned candidates with
    pub radius_km: f64,
}

/// Largest precision whose cell is at least as tall and as wide as the search
/// circle's diameter, or 1 when even the coarsest cell is smaller.
#[must_use]
pub fn precision_for_radius(radius_km: f64) -> usize {
    let diameter = radius_km * 2.0;
    (1..=MAX_PRECISION)
        .rev()
        .find(|&p| cell_dimensions_km(p).is_some_and(|(w, h)| w.min(h) >= diameter))
        .unwrap_or(1)
}

/// Plans a proximity query around `center` with the default options.
pub fn plan(center: Coordinate, radius_meters: f64) -> Result<QueryPlan> {
    plan_with_options(center, radius_meters, &PlannerOptions::default())
}

pub fn plan_with_options(
    center: Coordinate,
    radius_meters: f64,
    options: &PlannerOptions,
) -> Result<QueryPlan> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(GeoError::InvalidRadius(radius_meters));
    }
    let radius_km = radius_meters / 1000.0;
    let precision = options
        .fixed_precision
        .unwrap_or_else(|| precision_for_radius(radius_km));

    let prefix = geohash::encode(center, precision)?;
    let range = GeoBoundingRange::for_prefix(&prefix);
    trace!(%center, radius_km, precision, %range, "Planned proximity query");

    Ok(QueryPlan {
        ranges: vec![range],
        precision,
        radius_km,
    })
}

/// The single geohash range to scan for listings within `radius_meters` of `center`.
pub fn query_bounds(center: Coordinate, radius_meters: f64) -> Result<GeoBoundingRange> {
    let mut plan = plan(center, radius_meters)?;
    plan.ranges
        .pop()
        .ok_or_else(|| GeoError::InvalidRadius(radius_meters))
}
