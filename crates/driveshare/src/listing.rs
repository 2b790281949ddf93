//! Listing and place value types shared by search and booking.

use std::fmt;

use driveshare_geo::{Coordinate, geohash};
use itertools::Itertools;

/// Precision of the geohash stored alongside each listing.
pub const LISTING_GEOHASH_PRECISION: usize = 10;

/// Administrative address fields as returned by the geocoder.
///
/// Use [`AdministrativeFields::normalized`] before comparing or deriving
/// specificity; it is the single canonical address policy for the engine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AdministrativeFields {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

fn clean(value: Option<&String>, upper: bool) -> Option<String> {
    let collapsed = value?.split_whitespace().join(" ");
    if collapsed.is_empty() {
        None
    } else if upper {
        Some(collapsed.to_uppercase())
    } else {
        Some(collapsed)
    }
}

impl AdministrativeFields {
    /// Trims and collapses whitespace, drops empty fields and upper-cases the
    /// code-like fields (state, postal code, country).
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            street: clean(self.street.as_ref(), false),
            city: clean(self.city.as_ref(), false),
            state: clean(self.state.as_ref(), true),
            postal_code: clean(self.postal_code.as_ref(), true),
            country: clean(self.country.as_ref(), true),
        }
    }

    /// Narrow when the place carries street or city detail, broad otherwise.
    #[must_use]
    pub fn specificity(&self) -> PlaceSpecificity {
        let normalized = self.normalized();
        if normalized.street.is_some() || normalized.city.is_some() {
            PlaceSpecificity::Narrow
        } else {
            PlaceSpecificity::Broad
        }
    }

    #[must_use]
    pub fn get(&self, field: RegionField) -> Option<&str> {
        match field {
            RegionField::State => self.state.as_deref(),
            RegionField::Country => self.country.as_deref(),
        }
    }
}

impl fmt::Display for AdministrativeFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ];
        write!(f, "{}", parts.iter().filter_map(|p| p.as_deref()).join(", "))
    }
}

/// Region field a broad search filters on.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionField {
    State,
    Country,
}

impl RegionField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for RegionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How specific a resolved place is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceSpecificity {
    /// State or country level, no street or city detail
    Broad,
    /// Has street or city detail
    Narrow,
}

/// A location resolved by the geocoding collaborator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub coordinate: Coordinate,
    pub fields: AdministrativeFields,
}

impl ResolvedPlace {
    #[must_use]
    pub fn new(coordinate: Coordinate, fields: AdministrativeFields) -> Self {
        Self { coordinate, fields }
    }

    #[must_use]
    pub fn specificity(&self) -> PlaceSpecificity {
        self.fields.specificity()
    }
}

/// A listing as read from the store.
///
/// Only `id`, `coordinate`, `hourly_rate`, `active` and `region` are read by
/// the engine. `coordinate` is optional because store rows can be incomplete;
/// such listings never rank.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLocation {
    pub id: String,
    pub coordinate: Option<Coordinate>,
    pub geohash: Option<String>,
    /// Price per hour in the marketplace currency
    pub hourly_rate: f64,
    pub address: Option<String>,
    pub region: AdministrativeFields,
    pub active: bool,
}

impl ListingLocation {
    /// An active listing at `coordinate` with its geohash filled in.
    ///
    /// The geohash is left empty when the coordinate is out of range.
    #[must_use]
    pub fn new(id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            coordinate: Some(coordinate),
            geohash: geohash::encode(coordinate, LISTING_GEOHASH_PRECISION).ok(),
            hourly_rate: 0.0,
            address: None,
            region: AdministrativeFields::default(),
            active: true,
        }
    }

    /// An active listing with no known position.
    #[must_use]
    pub fn without_coordinate(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinate: None,
            geohash: None,
            hourly_rate: 0.0,
            address: None,
            region: AdministrativeFields::default(),
            active: true,
        }
    }

    #[must_use]
    pub fn with_rate(mut self, hourly_rate: f64) -> Self {
        self.hourly_rate = hourly_rate;
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: AdministrativeFields) -> Self {
        self.region = region;
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}
