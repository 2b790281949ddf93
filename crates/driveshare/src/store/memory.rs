use std::{collections::BTreeMap, ops::Bound};

use ahash::AHashMap;
use anyhow::anyhow;
use chrono::NaiveDate;
use driveshare_geo::{GeoBoundingRange, geohash};
use itertools::Itertools;
use tracing::{trace, warn};

use super::{BookingStore, Geocoder, ListingStore};
use crate::{
    availability::{BookingStatus, ExistingBooking},
    listing::{LISTING_GEOHASH_PRECISION, ListingLocation, RegionField, ResolvedPlace},
};

/// An in-process listing and booking store.
///
/// Listings are kept in a `BTreeMap` keyed by geohash so range queries are
/// real ordered scans. Listings without a usable position are kept aside and
/// only reachable through region lookups.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    by_geohash: BTreeMap<String, Vec<ListingLocation>>,
    unlocated: Vec<ListingLocation>,
    bookings: Vec<ExistingBooking>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listing, deriving its geohash from the coordinate when missing.
    pub fn insert_listing(&mut self, mut listing: ListingLocation) {
        if listing.geohash.is_none() {
            listing.geohash = listing
                .coordinate
                .and_then(|c| geohash::encode(c, LISTING_GEOHASH_PRECISION).ok());
        }
        match listing.geohash.clone() {
            Some(hash) => self.by_geohash.entry(hash).or_default().push(listing),
            None => {
                warn!(listing_id = %listing.id, "Listing has no usable position, region lookups only");
                self.unlocated.push(listing);
            }
        }
    }

    pub fn insert_booking(&mut self, booking: ExistingBooking) {
        self.bookings.push(booking);
    }

    #[must_use]
    pub fn with_listing(mut self, listing: ListingLocation) -> Self {
        self.insert_listing(listing);
        self
    }

    #[must_use]
    pub fn with_listings(mut self, listings: impl IntoIterator<Item = ListingLocation>) -> Self {
        for listing in listings {
            self.insert_listing(listing);
        }
        self
    }

    #[must_use]
    pub fn with_booking(mut self, booking: ExistingBooking) -> Self {
        self.insert_booking(booking);
        self
    }

    /// All listings, in geohash order followed by unlocated ones.
    pub fn listings(&self) -> impl Iterator<Item = &ListingLocation> {
        self.by_geohash.values().flatten().chain(&self.unlocated)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_geohash.values().map(Vec::len).sum::<usize>() + self.unlocated.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ListingStore for InMemoryStore {
    fn query_by_geohash_range(
        &self,
        range: &GeoBoundingRange,
    ) -> anyhow::Result<Vec<ListingLocation>> {
        if range.start > range.end {
            return Ok(Vec::new());
        }
        let bounds = (
            Bound::Included(range.start.as_str()),
            Bound::Excluded(range.end.as_str()),
        );
        let found = self
            .by_geohash
            .range::<str, _>(bounds)
            .flat_map(|(_, listings)| listings.iter().cloned())
            .collect_vec();
        trace!(%range, found = found.len(), "Scanned geohash range");
        Ok(found)
    }

    fn query_by_field(
        &self,
        field: RegionField,
        value: &str,
    ) -> anyhow::Result<Vec<ListingLocation>> {
        let wanted = value.trim();
        Ok(self
            .listings()
            .filter(|listing| {
                listing
                    .region
                    .normalized()
                    .get(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(wanted))
            })
            .cloned()
            .collect())
    }
}

impl BookingStore for InMemoryStore {
    fn fetch_approved_bookings(
        &self,
        listing_id: &str,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<ExistingBooking>> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Approved && b.listing_id == listing_id && b.date == date
            })
            .cloned()
            .collect())
    }
}

fn lookup_key(query: &str) -> String {
    query.split_whitespace().join(" ").to_lowercase()
}

/// A geocoder answering from a fixed table of places.
///
/// Lookups ignore case and surrounding or repeated whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: AHashMap<String, ResolvedPlace>,
}

impl StaticGeocoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_place(mut self, query: &str, place: ResolvedPlace) -> Self {
        self.places.insert(lookup_key(query), place);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode_text(&self, query: &str) -> anyhow::Result<ResolvedPlace> {
        self.places
            .get(&lookup_key(query))
            .cloned()
            .ok_or_else(|| anyhow!("No place found for {query:?}"))
    }
}

#[cfg(test)]
mod tests {
    use driveshare_geo::{Coordinate, planner};

    use super::*;
    use crate::{availability::TimeInterval, listing::AdministrativeFields};

    fn region(state: &str, country: &str) -> AdministrativeFields {
        AdministrativeFields {
            state: Some(state.to_string()),
            country: Some(country.to_string()),
            ..AdministrativeFields::default()
        }
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_listings([
            ListingLocation::new("toronto", Coordinate::new(43.6532, -79.3832))
                .with_region(region("ON", "CA")),
            ListingLocation::new("mississauga", Coordinate::new(43.5890, -79.6441))
                .with_region(region("on", "ca")),
            ListingLocation::new("montreal", Coordinate::new(45.5017, -73.5673))
                .with_region(region("QC", "CA")),
            ListingLocation::without_coordinate("nowhere").with_region(region("ON", "CA")),
        ])
    }

    #[test]
    fn test_range_scan() {
        let store = store();
        assert_eq!(store.len(), 4);

        let range = planner::query_bounds(Coordinate::new(43.65, -79.38), 30_000.0).unwrap();
        let found = store.query_by_geohash_range(&range).unwrap();
        // Mississauga is within 30 km but hashes to the neighbouring "dpx" cell.
        assert_eq!(range.start, "dpz");
        assert_eq!(found.iter().map(|l| l.id.as_str()).collect_vec(), ["toronto"]);
    }

    #[test]
    fn test_inverted_or_empty_range() {
        let store = store();
        let inverted = GeoBoundingRange {
            start: "z".to_string(),
            end: "a".to_string(),
        };
        assert!(store.query_by_geohash_range(&inverted).unwrap().is_empty());
        let empty = GeoBoundingRange {
            start: "d".to_string(),
            end: "d".to_string(),
        };
        assert!(store.query_by_geohash_range(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let store = store();
        let ontario = store.query_by_field(RegionField::State, " on ").unwrap();
        let ids = ontario.iter().map(|l| l.id.as_str()).sorted().collect_vec();
        assert_eq!(ids, ["mississauga", "nowhere", "toronto"]);
        assert_eq!(store.query_by_field(RegionField::Country, "CA").unwrap().len(), 4);
        assert!(store.query_by_field(RegionField::State, "BC").unwrap().is_empty());
    }

    #[test]
    fn test_only_approved_bookings_are_returned() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let slot = TimeInterval::parse("12:00", "13:00").unwrap();
        let store = InMemoryStore::new()
            .with_booking(ExistingBooking::new("a", date, slot, BookingStatus::Approved))
            .with_booking(ExistingBooking::new("a", date, slot, BookingStatus::Pending))
            .with_booking(ExistingBooking::new("b", date, slot, BookingStatus::Approved));
        let found = store.fetch_approved_bookings("a", date).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, BookingStatus::Approved);
        assert!(
            store
                .fetch_approved_bookings("a", date.succ_opt().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_static_geocoder() {
        let place = ResolvedPlace::new(Coordinate::new(43.65, -79.38), region("ON", "CA"));
        let geocoder = StaticGeocoder::new().with_place("Toronto,  ON", place.clone());
        assert_eq!(geocoder.geocode_text("  toronto, on ").unwrap(), place);
        assert!(geocoder.geocode_text("Paris").is_err());
    }
}
