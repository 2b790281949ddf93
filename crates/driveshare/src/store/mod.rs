//! Collaborator interfaces the engine reads through.
//!
//! The engine never performs I/O itself. Implementations are called
//! synchronously and may be shared across the rayon pool during bulk search,
//! so every trait requires `Send + Sync`. Failures are reported as
//! [`anyhow::Error`] and wrapped by the calling module.

mod memory;

use chrono::NaiveDate;
use driveshare_geo::GeoBoundingRange;

pub use memory::{InMemoryStore, StaticGeocoder};

use crate::{
    availability::ExistingBooking,
    listing::{ListingLocation, RegionField, ResolvedPlace},
};

/// Resolves free text such as an address or city name to a place.
pub trait Geocoder: Send + Sync {
    fn geocode_text(&self, query: &str) -> anyhow::Result<ResolvedPlace>;
}

/// Read access to listings.
pub trait ListingStore: Send + Sync {
    /// Listings whose stored geohash `h` satisfies `range.start <= h < range.end`.
    fn query_by_geohash_range(&self, range: &GeoBoundingRange)
    -> anyhow::Result<Vec<ListingLocation>>;

    /// Listings whose region `field` equals `value`.
    fn query_by_field(&self, field: RegionField, value: &str)
    -> anyhow::Result<Vec<ListingLocation>>;
}

/// Read access to stored bookings.
pub trait BookingStore: Send + Sync {
    /// Approved bookings for `listing_id` on `date`.
    fn fetch_approved_bookings(
        &self,
        listing_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<ExistingBooking>>;
}
