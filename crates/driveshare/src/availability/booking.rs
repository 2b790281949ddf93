use std::{fmt, str::FromStr};

use chrono::NaiveDate;

use super::{AvailabilityError, Result, TimeInterval};

/// Lifecycle state of a stored booking. Only `Approved` reserves its slot.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn blocks_slot(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(AvailabilityError::UnknownStatus(s.to_string())),
        }
    }
}

/// The hours a listing is published as available on one date.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub listing_id: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
}

impl AvailabilityWindow {
    #[must_use]
    pub fn new(listing_id: impl Into<String>, date: NaiveDate, interval: TimeInterval) -> Self {
        Self {
            listing_id: listing_id.into(),
            date,
            interval,
        }
    }

    /// Builds a window from the listing's published `"HH:MM"` strings.
    pub fn parse(
        listing_id: impl Into<String>,
        date: NaiveDate,
        start: &str,
        end: &str,
    ) -> Result<Self> {
        Ok(Self::new(listing_id, date, TimeInterval::parse(start, end)?))
    }
}

/// A booking request as submitted, before any validation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub listing_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

impl BookingForm {
    #[must_use]
    pub fn new(
        listing_id: impl Into<String>,
        date: NaiveDate,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            date,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// Runs the format and order checks.
    pub fn parse(&self) -> Result<BookingRequest> {
        Ok(BookingRequest {
            listing_id: self.listing_id.clone(),
            date: self.date,
            requested: TimeInterval::parse(&self.start_time, &self.end_time)?,
        })
    }
}

/// A well-formed booking request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub listing_id: String,
    pub date: NaiveDate,
    pub requested: TimeInterval,
}

/// A booking already stored for a listing.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingBooking {
    pub listing_id: String,
    pub date: NaiveDate,
    pub interval: TimeInterval,
    pub status: BookingStatus,
}

impl ExistingBooking {
    #[must_use]
    pub fn new(
        listing_id: impl Into<String>,
        date: NaiveDate,
        interval: TimeInterval,
        status: BookingStatus,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            date,
            interval,
            status,
        }
    }

    /// True if this booking reserves `interval` on `listing_id` and `date`.
    #[must_use]
    pub fn blocks(&self, listing_id: &str, date: NaiveDate, interval: &TimeInterval) -> bool {
        self.status.blocks_slot()
            && self.listing_id == listing_id
            && self.date == date
            && self.interval.overlaps(interval)
    }
}

/// A validated request with its price.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PricedBooking {
    pub request: BookingRequest,
    /// `hours * hourly_rate`, rounded half-up to cents
    pub total_price: f64,
}
