// examples/search_and_book.rs
use std::sync::Arc;

use chrono::NaiveDate;
use driveshare::{
    AdministrativeFields, AvailabilityWindow, BookingForm, BookingStatus, DriveshareEngine,
    ExistingBooking, InMemoryStore, ListingLocation, ResolvedPlace, SearchConfigBuilder,
    StaticGeocoder, TimeInterval, error::DriveshareError, geo::Coordinate, parse_rate,
};
use tracing::Level;

fn toronto_fields(street: Option<&str>) -> AdministrativeFields {
    AdministrativeFields {
        street: street.map(String::from),
        city: Some("Toronto".to_string()),
        state: Some("ON".to_string()),
        country: Some("CA".to_string()),
        ..AdministrativeFields::default()
    }
}

fn main() -> Result<(), DriveshareError> {
    driveshare::init_logging(Level::INFO)?;

    let date = NaiveDate::from_ymd_opt(2024, 6, 1)
        .ok_or_else(|| DriveshareError::ConfigError("bad demo date".to_string()))?;

    let store = InMemoryStore::new()
        .with_listing(
            ListingLocation::new("queen-st", Coordinate::new(43.6532, -79.3832))
                .with_rate(parse_rate("$5.00")?)
                .with_address("100 Queen St W")
                .with_region(toronto_fields(Some("100 Queen St W"))),
        )
        .with_listing(
            ListingLocation::new("yonge-eg", Coordinate::new(43.7066, -79.3985))
                .with_rate(parse_rate("7.50")?)
                .with_region(toronto_fields(None)),
        )
        .with_booking(ExistingBooking::new(
            "queen-st",
            date,
            TimeInterval::parse("12:00", "13:00")?,
            BookingStatus::Approved,
        ));
    let store = Arc::new(store);

    let geocoder = StaticGeocoder::new().with_place(
        "Toronto City Hall",
        ResolvedPlace::new(
            Coordinate::new(43.6534, -79.3841),
            toronto_fields(Some("100 Queen St W")),
        ),
    );

    let engine = DriveshareEngine::builder()
        .store(store.clone())
        .geocoder(Arc::new(geocoder))
        .config(SearchConfigBuilder::neighbourhood().limit(5).build())
        .build()?;

    println!("🔍 Searching near Toronto City Hall");
    for result in engine.search_text("Toronto City Hall")? {
        println!(
            "   {} at {:.2} km",
            result.id(),
            result.distance_km.unwrap_or_default()
        );
    }

    let Some(listing) = store.listings().find(|l| l.id == "queen-st").cloned() else {
        return Err(DriveshareError::ConfigError("demo listing missing".to_string()));
    };
    let window = AvailabilityWindow::parse("queen-st", date, "08:00", "20:00")?;

    for (start, end) in [("12:30", "13:30"), ("09:00", "11:00")] {
        let form = BookingForm::new("queen-st", date, start, end);
        match engine.validate_and_price(&listing, &window, &form) {
            Ok(priced) => println!("✅ {start}-{end}: ${:.2}", priced.total_price),
            Err(err) => println!("❌ {start}-{end}: {err} ({:?})", err.kind()),
        }
    }

    Ok(())
}
