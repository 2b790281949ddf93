//! Booking request validation and pricing.
//!
//! A request is checked in a single pass that stops at the first failure:
//! the `"HH:MM"` times must parse, the start must come before the end, the
//! interval must sit inside the listing's published window for that date,
//! and it must not overlap an approved booking. Intervals are half-open, so
//! back-to-back bookings are allowed.

mod booking;
mod rate;
mod time;
mod validate;

pub use booking::{
    AvailabilityWindow, BookingForm, BookingRequest, BookingStatus, ExistingBooking,
    PricedBooking,
};
pub use error::AvailabilityError;
use error::Result;
pub use rate::{MAX_HOURLY_RATE, PRICE_DECIMALS, RateError, parse_rate, price_for, round_half_up};
pub use time::{TimeInterval, TimeOfDay};
pub use validate::{BookingValidator, validate_and_price, validate_request};

mod error {
    use chrono::NaiveDate;
    use thiserror::Error;

    use super::{TimeInterval, TimeOfDay};

    #[derive(Error, Debug)]
    pub enum AvailabilityError {
        #[error("Invalid time {0:?}, expected HH:MM")]
        InvalidTimeFormat(String),
        #[error("End time {end} must be after start time {start}")]
        EndBeforeStart { start: TimeOfDay, end: TimeOfDay },
        #[error("Requested {requested} is outside available hours {available}")]
        OutsideAvailableHours {
            requested: TimeInterval,
            available: TimeInterval,
        },
        #[error("Listing {listing_id} has no availability on {date}")]
        ListingUnavailableOnDate { listing_id: String, date: NaiveDate },
        #[error("Requested {requested} conflicts with an approved booking at {existing}")]
        TimeSlotConflict {
            requested: TimeInterval,
            existing: TimeInterval,
        },
        #[error("Listing {0} is not accepting bookings")]
        ListingInactive(String),
        #[error("Booking is for listing {found} but was checked against {expected}")]
        ListingMismatch { expected: String, found: String },
        #[error("Listing has an invalid hourly rate: {0}")]
        InvalidRate(f64),
        #[error("Unknown booking status {0:?}")]
        UnknownStatus(String),
        #[error("Booking store error")]
        Store(#[source] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, AvailabilityError>;
}
