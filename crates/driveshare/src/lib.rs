//! driveshare - Proximity Search and Booking Availability Engine
//!
//! The engine answers two questions for a driveway rental marketplace:
//! which listings are near a place, and whether a listing can be booked for a
//! given time slot (and at what price).
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use driveshare::{
//!     AvailabilityWindow, BookingForm, BookingStatus, DriveshareEngine, ExistingBooking,
//!     InMemoryStore, ListingLocation, TimeInterval, geo::Coordinate,
//! };
//!
//! let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let listing = ListingLocation::new("car-1", Coordinate::new(43.6532, -79.3832)).with_rate(5.0);
//! let store = InMemoryStore::new()
//!     .with_listing(listing.clone())
//!     .with_booking(ExistingBooking::new(
//!         "car-1",
//!         date,
//!         TimeInterval::parse("12:00", "13:00")?,
//!         BookingStatus::Approved,
//!     ));
//! let engine = DriveshareEngine::in_memory(store);
//!
//! let window = AvailabilityWindow::parse("car-1", date, "08:00", "20:00")?;
//! let priced = engine.validate_and_price(
//!     &listing,
//!     &window,
//!     &BookingForm::new("car-1", date, "09:00", "11:00"),
//! )?;
//! assert_eq!(priced.total_price, 10.0);
//! # Ok::<(), driveshare::error::DriveshareError>(())
//! ```
//!
//! # Modules
//!
//! - [`geo`]: coordinates, geohash codec, haversine distance, query planning
//! - [`ranking`]: distance filtering and ordering of candidates
//! - [`search`]: broad (region) and narrow (proximity) listing search
//! - [`availability`]: booking validation and pricing
//! - [`store`]: collaborator traits and an in-memory implementation
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod availability;
mod config;
mod core;
pub mod error;
mod listing;
pub mod ranking;
pub mod search;
pub mod store;

pub use crate::core::{DriveshareEngine, DriveshareEngineBuilder};

pub use availability::{
    AvailabilityWindow, BookingForm, BookingRequest, BookingStatus, BookingValidator,
    ExistingBooking, PricedBooking, TimeInterval, TimeOfDay, parse_rate, validate_and_price,
};
pub use config::{MAX_RADIUS_KM, MIN_RADIUS_KM, SearchConfigBuilder};
pub use driveshare_geo as geo;
pub use error::ErrorKind;
pub use listing::{
    AdministrativeFields, LISTING_GEOHASH_PRECISION, ListingLocation, PlaceSpecificity,
    RegionField, ResolvedPlace,
};
pub use ranking::RankedListing;
pub use search::{SearchConfig, SearchStrategy};
pub use store::{BookingStore, Geocoder, InMemoryStore, ListingStore, StaticGeocoder};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the driveshare engine.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this more than
/// once is a no-op.
///
/// # Examples
///
/// ```rust
/// use driveshare::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), driveshare::error::DriveshareError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::DriveshareError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("rayon=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;
        Ok(())
    })
}
