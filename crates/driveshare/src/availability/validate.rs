use tracing::{debug, instrument};

use super::{
    AvailabilityError, AvailabilityWindow, BookingForm, BookingRequest, ExistingBooking,
    PricedBooking, Result, rate::price_for,
};
use crate::{listing::ListingLocation, store::BookingStore};

fn check_listing(listing: &ListingLocation, requested_id: &str) -> Result<()> {
    if !listing.active {
        return Err(AvailabilityError::ListingInactive(listing.id.clone()));
    }
    if !listing.hourly_rate.is_finite() || listing.hourly_rate < 0.0 {
        return Err(AvailabilityError::InvalidRate(listing.hourly_rate));
    }
    if listing.id != requested_id {
        return Err(AvailabilityError::ListingMismatch {
            expected: listing.id.clone(),
            found: requested_id.to_string(),
        });
    }
    Ok(())
}

fn check_request(
    listing: &ListingLocation,
    window: &AvailabilityWindow,
    request: BookingRequest,
    existing: &[ExistingBooking],
) -> Result<PricedBooking> {
    if window.listing_id != request.listing_id || window.date != request.date {
        return Err(AvailabilityError::ListingUnavailableOnDate {
            listing_id: request.listing_id,
            date: request.date,
        });
    }
    if !window.interval.contains(&request.requested) {
        return Err(AvailabilityError::OutsideAvailableHours {
            requested: request.requested,
            available: window.interval,
        });
    }
    if let Some(conflict) = existing
        .iter()
        .find(|b| b.blocks(&request.listing_id, request.date, &request.requested))
    {
        debug!(existing = %conflict.interval, requested = %request.requested, "Slot already booked");
        return Err(AvailabilityError::TimeSlotConflict {
            requested: request.requested,
            existing: conflict.interval,
        });
    }

    let total_price = price_for(&request.requested, listing.hourly_rate);
    debug!(total_price, "Booking priced");
    Ok(PricedBooking {
        request,
        total_price,
    })
}

/// Validates a submitted booking against the listing's published window and
/// its existing bookings, then prices it.
///
/// Checks run in order and the first failure is returned:
/// listing state, time format, time order, date and window containment,
/// conflicts with approved bookings, and finally pricing.
#[instrument(name = "Validate booking", level = "debug", skip_all, fields(listing_id = %form.listing_id, date = %form.date))]
pub fn validate_and_price(
    listing: &ListingLocation,
    window: &AvailabilityWindow,
    form: &BookingForm,
    existing: &[ExistingBooking],
) -> Result<PricedBooking> {
    check_listing(listing, &form.listing_id)?;
    let request = form.parse()?;
    check_request(listing, window, request, existing)
}

/// Same as [`validate_and_price`] for a request that is already parsed.
pub fn validate_request(
    listing: &ListingLocation,
    window: &AvailabilityWindow,
    request: BookingRequest,
    existing: &[ExistingBooking],
) -> Result<PricedBooking> {
    check_listing(listing, &request.listing_id)?;
    check_request(listing, window, request, existing)
}

/// Validates bookings using a [`BookingStore`] for the existing reservations.
///
/// Malformed forms are rejected before the store is consulted.
pub struct BookingValidator<'a, B: BookingStore + ?Sized> {
    store: &'a B,
}

impl<'a, B: BookingStore + ?Sized> BookingValidator<'a, B> {
    pub fn new(store: &'a B) -> Self {
        Self { store }
    }

    #[instrument(name = "Validate booking with store", level = "debug", skip_all, fields(listing_id = %form.listing_id, date = %form.date))]
    pub fn validate_and_price(
        &self,
        listing: &ListingLocation,
        window: &AvailabilityWindow,
        form: &BookingForm,
    ) -> Result<PricedBooking> {
        check_listing(listing, &form.listing_id)?;
        let request = form.parse()?;
        let existing = self
            .store
            .fetch_approved_bookings(&request.listing_id, request.date)
            .map_err(AvailabilityError::Store)?;
        debug!(existing = existing.len(), "Fetched approved bookings");
        check_request(listing, window, request, &existing)
    }
}
