//! Base-32 geohash encoding.
//!
//! A geohash interleaves the bits of a binary search over longitude and
//! latitude (longitude first) and packs them five at a time into the
//! 32-symbol alphabet below. Longer hashes name smaller cells and every
//! hash is a prefix of the hashes of the cells it contains, which is what
//! makes prefix range scans work as proximity queries.

use crate::{Coordinate, GeoError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON, Result};

/// Geohash alphabet, in lexicographic order.
pub const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest hash this codec produces. Twelve symbols resolve to a few centimetres.
pub const MAX_PRECISION: usize = 12;

const BITS_PER_CHAR: usize = 5;

/// Approximate cell width x height in kilometres at the equator, indexed by
/// `precision - 1`.
const CELL_DIMENSIONS_KM: [(f64, f64); MAX_PRECISION] = [
    (5009.4, 4992.6),
    (1252.3, 624.1),
    (156.5, 156.0),
    (39.1, 19.5),
    (4.89, 4.89),
    (1.22, 0.61),
    (0.153, 0.153),
    (0.0382, 0.0191),
    (0.00477, 0.00477),
    (0.00119, 0.000596),
    (0.000149, 0.000149),
    (0.0000372, 0.0000186),
];

/// Width and height (km) of a cell at `precision`, or `None` outside `1..=MAX_PRECISION`.
#[must_use]
pub fn cell_dimensions_km(precision: usize) -> Option<(f64, f64)> {
    precision
        .checked_sub(1)
        .and_then(|idx| CELL_DIMENSIONS_KM.get(idx))
        .copied()
}

fn check_precision(precision: usize) -> Result<usize> {
    if (1..=MAX_PRECISION).contains(&precision) {
        Ok(precision)
    } else {
        Err(GeoError::InvalidPrecision(precision))
    }
}

/// Encodes `coordinate` as a geohash of exactly `precision` symbols.
///
/// A value sitting exactly on a bisection midpoint goes to the upper half,
/// so cells are closed at their lower edges and open at their upper edges.
///
/// # Errors
///
/// [`GeoError::InvalidPrecision`] for `precision` outside `1..=MAX_PRECISION`
/// and [`GeoError::InvalidCoordinate`] for out-of-range coordinates. A zero
/// precision is rejected rather than clamped.
///
/// # Examples
///
/// ```rust
/// use driveshare_geo::{Coordinate, geohash};
///
/// let hash = geohash::encode(Coordinate::new(57.64911, 10.40744), 11)?;
/// assert_eq!(hash, "u4pruydqqvj");
/// # Ok::<(), driveshare_geo::GeoError>(())
/// ```
pub fn encode(coordinate: Coordinate, precision: usize) -> Result<String> {
    let precision = check_precision(precision)?;
    let coordinate = coordinate.validate()?;

    let mut lat = (MIN_LAT, MAX_LAT);
    let mut lon = (MIN_LON, MAX_LON);
    let mut hash = String::with_capacity(precision);
    let mut is_lon = true;

    while hash.len() < precision {
        let mut index = 0usize;
        for _ in 0..BITS_PER_CHAR {
            let (range, value) = if is_lon {
                (&mut lon, coordinate.longitude)
            } else {
                (&mut lat, coordinate.latitude)
            };
            let mid = (range.0 + range.1) / 2.0;
            index <<= 1;
            if value >= mid {
                index |= 1;
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            is_lon = !is_lon;
        }
        hash.push(char::from(BASE32[index]));
    }

    Ok(hash)
}

/// The rectangle named by a geohash.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeohashCell {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeohashCell {
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Half the cell height, in degrees.
    #[must_use]
    pub fn lat_error(&self) -> f64 {
        (self.max_lat - self.min_lat) / 2.0
    }

    /// Half the cell width, in degrees.
    #[must_use]
    pub fn lon_error(&self) -> f64 {
        (self.max_lon - self.min_lon) / 2.0
    }

    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinate.latitude)
            && (self.min_lon..=self.max_lon).contains(&coordinate.longitude)
    }
}

fn symbol_index(symbol: u8) -> Option<usize> {
    BASE32.iter().position(|&s| s == symbol.to_ascii_lowercase())
}

/// Decodes a geohash into the cell it names.
///
/// Upper-case input is accepted. Empty input or symbols outside the
/// alphabet (`a`, `i`, `l`, `o`, punctuation) fail with
/// [`GeoError::InvalidGeohash`].
pub fn decode(hash: &str) -> Result<GeohashCell> {
    if hash.is_empty() {
        return Err(GeoError::InvalidGeohash(hash.to_string()));
    }

    let mut lat = (MIN_LAT, MAX_LAT);
    let mut lon = (MIN_LON, MAX_LON);
    let mut is_lon = true;

    for symbol in hash.bytes() {
        let index =
            symbol_index(symbol).ok_or_else(|| GeoError::InvalidGeohash(hash.to_string()))?;
        for shift in (0..BITS_PER_CHAR).rev() {
            let range = if is_lon { &mut lon } else { &mut lat };
            let mid = (range.0 + range.1) / 2.0;
            if (index >> shift) & 1 == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            is_lon = !is_lon;
        }
    }

    Ok(GeohashCell {
        min_lat: lat.0,
        max_lat: lat.1,
        min_lon: lon.0,
        max_lon: lon.1,
    })
}
