//! Geospatial primitives for the driveshare engine.
//!
//! Everything in this crate is a pure function over immutable values:
//!
//! - [`Coordinate`] - a validated latitude/longitude pair in degrees
//! - [`geohash`] - base-32 geohash encoding and decoding
//! - [`distance`] - great-circle (haversine) distance in kilometres
//! - [`planner`] - turns a center and a radius into geohash prefix ranges
//!   that a key-range-queryable store can scan
//!
//! # Example
//!
//! ```rust
//! use driveshare_geo::{Coordinate, geohash, planner};
//!
//! let toronto = Coordinate::try_new(43.6532, -79.3832)?;
//! let hash = geohash::encode(toronto, 6)?;
//! assert_eq!(hash.len(), 6);
//!
//! let range = planner::query_bounds(toronto, 30_000.0)?;
//! assert!(range.contains(&hash));
//! # Ok::<(), driveshare_geo::GeoError>(())
//! ```

mod coordinate;
pub mod distance;
pub mod geohash;
pub mod planner;

pub use coordinate::{Coordinate, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use self::geohash::{GeohashCell, MAX_PRECISION};
pub use planner::{GeoBoundingRange, HIGH_SENTINEL, PlannerOptions, QueryPlan};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum GeoError {
        #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
        InvalidCoordinate { latitude: f64, longitude: f64 },
        #[error("Invalid geohash precision {0}, expected 1..={max}", max = crate::MAX_PRECISION)]
        InvalidPrecision(usize),
        #[error("Invalid geohash '{0}'")]
        InvalidGeohash(String),
        #[error("Invalid search radius {0} m, expected a positive finite value")]
        InvalidRadius(f64),
    }

    pub type Result<T> = std::result::Result<T, GeoError>;
}

pub use error::{GeoError, Result};
