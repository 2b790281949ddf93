//! The [`DriveshareEngine`] entry point.
//!
//! The engine bundles the collaborators (listing store, booking store and an
//! optional geocoder) with a default [`SearchConfig`] and exposes the two
//! request paths: listing search and booking validation.
//!
//! ```rust
//! use driveshare::{
//!     AdministrativeFields, DriveshareEngine, InMemoryStore, ListingLocation, ResolvedPlace,
//!     geo::Coordinate,
//! };
//!
//! let store = InMemoryStore::new()
//!     .with_listing(ListingLocation::new("l1", Coordinate::new(43.66, -79.38)).with_rate(5.0));
//! let engine = DriveshareEngine::in_memory(store);
//!
//! let place = ResolvedPlace::new(
//!     Coordinate::new(43.65, -79.38),
//!     AdministrativeFields {
//!         city: Some("Toronto".to_string()),
//!         ..AdministrativeFields::default()
//!     },
//! );
//! let results = engine.search(&place)?;
//! assert_eq!(results[0].id(), "l1");
//! # Ok::<(), driveshare::error::DriveshareError>(())
//! ```

use std::{fmt, sync::Arc};

use tracing::instrument;

use crate::{
    availability::{AvailabilityWindow, BookingForm, BookingValidator, PricedBooking},
    error::{DriveshareError, Result},
    listing::{ListingLocation, ResolvedPlace},
    ranking::RankedListing,
    search::{self, SearchConfig},
    store::{BookingStore, Geocoder, InMemoryStore, ListingStore},
};

/// Search and booking validation over a set of collaborators.
///
/// Cloning is cheap; collaborators are shared.
#[derive(Clone)]
pub struct DriveshareEngine {
    listings: Arc<dyn ListingStore>,
    bookings: Arc<dyn BookingStore>,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: SearchConfig,
}

impl DriveshareEngine {
    #[must_use]
    pub fn builder() -> DriveshareEngineBuilder {
        DriveshareEngineBuilder::new()
    }

    /// An engine backed by one [`InMemoryStore`] for both listings and bookings.
    #[must_use]
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            listings: store.clone(),
            bookings: store,
            geocoder: None,
            config: SearchConfig::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches around `place` with the engine's configuration.
    pub fn search(&self, place: &ResolvedPlace) -> Result<Vec<RankedListing>> {
        self.search_with_config(place, &self.config)
    }

    pub fn search_with_config(
        &self,
        place: &ResolvedPlace,
        config: &SearchConfig,
    ) -> Result<Vec<RankedListing>> {
        search::search(self.listings.as_ref(), place, config).map_err(From::from)
    }

    /// Geocodes `query` and searches around the result.
    ///
    /// Fails with a configuration error when the engine has no geocoder.
    pub fn search_text(&self, query: &str) -> Result<Vec<RankedListing>> {
        let geocoder = self
            .geocoder
            .as_deref()
            .ok_or_else(|| DriveshareError::ConfigError("No geocoder configured".to_string()))?;
        search::search_text(geocoder, self.listings.as_ref(), query, &self.config)
            .map_err(From::from)
    }

    /// One result per place, in input order.
    pub fn search_bulk(&self, places: &[ResolvedPlace]) -> Vec<Result<Vec<RankedListing>>> {
        search::search_bulk(self.listings.as_ref(), places, &self.config)
            .into_iter()
            .map(|result| result.map_err(From::from))
            .collect()
    }

    /// Validates and prices a booking, reading existing bookings from the
    /// engine's booking store.
    #[instrument(name = "Engine Validate And Price", level = "debug", skip_all)]
    pub fn validate_and_price(
        &self,
        listing: &ListingLocation,
        window: &AvailabilityWindow,
        form: &BookingForm,
    ) -> Result<PricedBooking> {
        BookingValidator::new(self.bookings.as_ref())
            .validate_and_price(listing, window, form)
            .map_err(From::from)
    }
}

impl fmt::Debug for DriveshareEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveshareEngine")
            .field("has_geocoder", &self.geocoder.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a `DriveshareEngine` from individual collaborators.
#[derive(Clone, Default)]
pub struct DriveshareEngineBuilder {
    listings: Option<Arc<dyn ListingStore>>,
    bookings: Option<Arc<dyn BookingStore>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    config: SearchConfig,
}

impl DriveshareEngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn listing_store(mut self, store: Arc<dyn ListingStore>) -> Self {
        self.listings = Some(store);
        self
    }

    #[must_use]
    pub fn booking_store(mut self, store: Arc<dyn BookingStore>) -> Self {
        self.bookings = Some(store);
        self
    }

    /// Use one value as both the listing and the booking store.
    #[must_use]
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: ListingStore + BookingStore + 'static,
    {
        self.listing_store(store.clone()).booking_store(store)
    }

    #[must_use]
    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    #[must_use]
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the `DriveshareEngine`.
    pub fn build(self) -> Result<DriveshareEngine> {
        let listings = self
            .listings
            .ok_or_else(|| DriveshareError::ConfigError("Listing store is required".to_string()))?;
        let bookings = self
            .bookings
            .ok_or_else(|| DriveshareError::ConfigError("Booking store is required".to_string()))?;
        Ok(DriveshareEngine {
            listings,
            bookings,
            geocoder: self.geocoder,
            config: self.config,
        })
    }
}
