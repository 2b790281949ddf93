//! Listing search around a resolved place.
//!
//! A place with street or city detail is searched by proximity: its center is
//! turned into a geohash range, the range is scanned, and the candidates are
//! ranked by great-circle distance. A place known only at state or country
//! level is searched by region equality instead. There is no fallback from one
//! strategy to the other.

pub use error::SearchError;
mod search_orchestration;

use error::Result;
pub use search_orchestration::{
    DEFAULT_RADIUS_KM, SearchConfig, SearchStrategy, search, search_bulk, search_text,
    search_with_specificity,
};

mod error {
    use driveshare_geo::GeoError;
    use thiserror::Error;

    use crate::ranking::RankingError;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("Geo error: {0}")]
        Geo(#[from] GeoError),
        #[error("Ranking error: {0}")]
        Ranking(#[from] RankingError),
        #[error("Listing store error")]
        Store(#[source] anyhow::Error),
        #[error("Geocoding failed")]
        Geocoding(#[source] anyhow::Error),
        #[error("Place has neither a state nor a country to search by")]
        MissingRegion,
        #[error("No listings matched the search")]
        NoCandidatesFound,
    }
    pub type Result<T> = std::result::Result<T, SearchError>;
}
