use driveshare_geo::GeoError;
use thiserror::Error;

use crate::{
    availability::{AvailabilityError, RateError},
    ranking::RankingError,
    search::SearchError,
};

#[derive(Error, Debug)]
pub enum DriveshareError {
    #[error("Geo error: {0}")]
    Geo(#[from] GeoError),
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
    #[error("Availability error: {0}")]
    Availability(#[from] AvailabilityError),
    #[error("Rate error: {0}")]
    Rate(#[from] RateError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DriveshareError>;

/// Coarse failure category, for choosing what to tell the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCoordinate,
    InvalidRadius,
    InvalidPrecision,
    InvalidGeohash,
    InvalidTimeFormat,
    EndBeforeStart,
    OutsideAvailableHours,
    TimeSlotConflict,
    ListingUnavailable,
    InvalidRate,
    MissingRegion,
    NoCandidatesFound,
    Collaborator,
    Config,
    Internal,
}

fn geo_kind(err: &GeoError) -> ErrorKind {
    match err {
        GeoError::InvalidCoordinate { .. } => ErrorKind::InvalidCoordinate,
        GeoError::InvalidPrecision(_) => ErrorKind::InvalidPrecision,
        GeoError::InvalidGeohash(_) => ErrorKind::InvalidGeohash,
        GeoError::InvalidRadius(_) => ErrorKind::InvalidRadius,
    }
}

fn ranking_kind(err: &RankingError) -> ErrorKind {
    match err {
        RankingError::Geo(err) => geo_kind(err),
        RankingError::InvalidRadius(_) => ErrorKind::InvalidRadius,
    }
}

impl DriveshareError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Geo(err) => geo_kind(err),
            Self::Ranking(err) => ranking_kind(err),
            Self::Search(err) => match err {
                SearchError::Geo(err) => geo_kind(err),
                SearchError::Ranking(err) => ranking_kind(err),
                SearchError::Store(_) | SearchError::Geocoding(_) => ErrorKind::Collaborator,
                SearchError::MissingRegion => ErrorKind::MissingRegion,
                SearchError::NoCandidatesFound => ErrorKind::NoCandidatesFound,
            },
            Self::Availability(err) => match err {
                AvailabilityError::InvalidTimeFormat(_) => ErrorKind::InvalidTimeFormat,
                AvailabilityError::EndBeforeStart { .. } => ErrorKind::EndBeforeStart,
                AvailabilityError::OutsideAvailableHours { .. } => ErrorKind::OutsideAvailableHours,
                AvailabilityError::TimeSlotConflict { .. } => ErrorKind::TimeSlotConflict,
                AvailabilityError::ListingUnavailableOnDate { .. }
                | AvailabilityError::ListingInactive(_)
                | AvailabilityError::ListingMismatch { .. } => ErrorKind::ListingUnavailable,
                AvailabilityError::InvalidRate(_) => ErrorKind::InvalidRate,
                AvailabilityError::UnknownStatus(_) => ErrorKind::Internal,
                AvailabilityError::Store(_) => ErrorKind::Collaborator,
            },
            Self::Rate(_) => ErrorKind::InvalidRate,
            Self::ConfigError(_) | Self::InitLoggingError(_) => ErrorKind::Config,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::TimeInterval;

    #[test]
    fn test_kinds_follow_the_source_error() {
        let err: DriveshareError = GeoError::InvalidCoordinate {
            latitude: 91.0,
            longitude: 0.0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidCoordinate);

        let err: DriveshareError =
            SearchError::Ranking(RankingError::Geo(GeoError::InvalidCoordinate {
                latitude: 0.0,
                longitude: 200.0,
            }))
            .into();
        assert_eq!(err.kind(), ErrorKind::InvalidCoordinate);

        let err: DriveshareError = SearchError::NoCandidatesFound.into();
        assert_eq!(err.kind(), ErrorKind::NoCandidatesFound);

        let slot = TimeInterval::parse("12:00", "13:00").unwrap();
        let err: DriveshareError = AvailabilityError::TimeSlotConflict {
            requested: slot,
            existing: slot,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::TimeSlotConflict);

        let err: DriveshareError = RateError::OutOfRange(0.0).into();
        assert_eq!(err.kind(), ErrorKind::InvalidRate);

        let err: DriveshareError = anyhow::anyhow!("boom").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages_include_the_cause() {
        let err: DriveshareError = AvailabilityError::InvalidTimeFormat("9am".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Availability error: Invalid time \"9am\", expected HH:MM"
        );
    }
}
