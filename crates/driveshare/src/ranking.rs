//! Distance ranking of candidate listings around a center point.

use std::cmp::Ordering;

use driveshare_geo::{Coordinate, haversine_km};
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

pub use error::RankingError;
use error::Result;

use crate::listing::ListingLocation;

/// Candidate count from which distances are computed on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 2048;

/// A listing together with its distance from the search center.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    pub listing: ListingLocation,
    /// Great-circle distance in kilometres. `None` only for broad results
    /// whose listing has no usable coordinate.
    pub distance_km: Option<f64>,
}

impl RankedListing {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.listing.id
    }

    fn cmp_distance(&self, other: &Self) -> Ordering {
        let key = |r: &Self| r.distance_km.unwrap_or(f64::INFINITY);
        key(self).total_cmp(&key(other))
    }
}

fn distance_to(center: Coordinate, listing: &ListingLocation) -> Option<f64> {
    let Some(coordinate) = listing.coordinate else {
        debug!(listing_id = %listing.id, "Skipping listing without coordinate");
        return None;
    };
    if !coordinate.is_valid() {
        debug!(listing_id = %listing.id, %coordinate, "Skipping listing with invalid coordinate");
        return None;
    }
    Some(haversine_km(center, coordinate))
}

/// Ranks `candidates` by great-circle distance from `center`.
///
/// Listings without a usable coordinate are dropped rather than treated as
/// zero distance. Listings further than `max_distance_km` are dropped; the
/// bound itself is inclusive. Ties keep their input order.
///
/// # Examples
///
/// ```rust
/// use driveshare::{ListingLocation, geo::Coordinate, ranking};
///
/// let center = Coordinate::new(43.65, -79.38);
/// let candidates = vec![
///     ListingLocation::new("far", Coordinate::new(43.80, -79.38)),
///     ListingLocation::new("near", Coordinate::new(43.66, -79.38)),
/// ];
/// let ranked = ranking::rank(center, candidates, 10.0)?;
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].id(), "near");
/// # Ok::<(), driveshare::ranking::RankingError>(())
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(candidates = candidates.len(), max_distance_km = max_distance_km)
)]
pub fn rank(
    center: Coordinate,
    candidates: Vec<ListingLocation>,
    max_distance_km: f64,
) -> Result<Vec<RankedListing>> {
    let center = center.validate()?;
    if !max_distance_km.is_finite() || max_distance_km < 0.0 {
        return Err(RankingError::InvalidRadius(max_distance_km));
    }

    let measure = |listing: ListingLocation| {
        let distance = distance_to(center, &listing)?;
        if distance > max_distance_km {
            trace!(listing_id = %listing.id, distance, "Outside search radius");
            return None;
        }
        Some(RankedListing {
            listing,
            distance_km: Some(distance),
        })
    };

    let mut ranked: Vec<RankedListing> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.into_par_iter().filter_map(measure).collect()
    } else {
        candidates.into_iter().filter_map(measure).collect()
    };
    // `sort_by` is stable, which keeps ties in input order.
    ranked.sort_by(RankedListing::cmp_distance);

    debug!(kept = ranked.len(), "Ranked candidates");
    Ok(ranked)
}

/// Attaches distances without filtering or reordering.
///
/// Used for region-level results where proximity is not the ordering
/// criterion. Listings without a usable coordinate are kept with
/// `distance_km: None`, as is everything when `center` itself is invalid.
#[must_use]
pub fn annotate(center: Coordinate, candidates: Vec<ListingLocation>) -> Vec<RankedListing> {
    let center_is_valid = center.is_valid();
    candidates
        .into_iter()
        .map(|listing| {
            let distance_km = if center_is_valid {
                distance_to(center, &listing)
            } else {
                None
            };
            RankedListing {
                listing,
                distance_km,
            }
        })
        .collect()
}

mod error {
    use driveshare_geo::GeoError;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum RankingError {
        #[error("Geo error: {0}")]
        Geo(#[from] GeoError),
        #[error("Invalid maximum distance {0} km")]
        InvalidRadius(f64),
    }
    pub type Result<T> = std::result::Result<T, RankingError>;
}
