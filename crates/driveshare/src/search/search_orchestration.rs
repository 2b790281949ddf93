use std::fmt;

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use anyhow::anyhow;
use driveshare_geo::{GeoBoundingRange, PlannerOptions, QueryPlan, planner};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use super::{Result, SearchError};
use crate::{
    config::SearchConfigBuilder,
    listing::{ListingLocation, PlaceSpecificity, RegionField, ResolvedPlace},
    ranking::{self, RankedListing},
    store::{Geocoder, ListingStore},
};

/// City-scale search radius used when none is configured.
pub const DEFAULT_RADIUS_KM: f64 = 30.0;

/// Configuration for listing searches.
///
/// Use [`SearchConfigBuilder`] for presets and clamped setters.
///
/// # Examples
///
/// ```rust
/// use driveshare::SearchConfig;
///
/// let config = SearchConfig::builder().radius_km(10.0).limit(20).build();
/// assert_eq!(config.limit, Some(20));
/// ```
///
/// ```rust
/// use driveshare::SearchConfigBuilder;
///
/// let walking = SearchConfigBuilder::neighbourhood().build();
/// assert_eq!(walking.radius_km, 5.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Search radius for proximity searches, in kilometres
    pub radius_km: f64,
    /// Maximum number of results to return
    pub limit: Option<usize>,
    /// Keep listings that are not currently accepting bookings
    pub include_inactive: bool,
    /// Report an empty result as [`SearchError::NoCandidatesFound`]
    pub require_results: bool,
    pub planner: PlannerOptions,
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            limit: None,
            include_inactive: false,
            require_results: false,
            planner: PlannerOptions::default(),
        }
    }
}

/// How candidates for a place are fetched.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStrategy {
    /// Listings whose region field equals the place's value, in store order
    Broad { field: RegionField, value: String },
    /// Listings inside the planned geohash ranges, ranked by distance
    Narrow(QueryPlan),
}

impl SearchStrategy {
    /// Picks the strategy for `place` at the given specificity.
    ///
    /// Broad searches filter on the state when present, otherwise the country.
    pub fn for_place(
        place: &ResolvedPlace,
        specificity: PlaceSpecificity,
        config: &SearchConfig,
    ) -> Result<Self> {
        match specificity {
            PlaceSpecificity::Broad => {
                let fields = place.fields.normalized();
                let (field, value) = [RegionField::State, RegionField::Country]
                    .into_iter()
                    .find_map(|field| fields.get(field).map(|v| (field, v.to_string())))
                    .ok_or(SearchError::MissingRegion)?;
                Ok(Self::Broad { field, value })
            }
            PlaceSpecificity::Narrow => {
                let plan = planner::plan_with_options(
                    place.coordinate,
                    config.radius_km * 1000.0,
                    &config.planner,
                )?;
                Ok(Self::Narrow(plan))
            }
        }
    }

    fn fetch_key(&self) -> FetchKey {
        match self {
            Self::Broad { field, value } => FetchKey::Region(*field, value.clone()),
            Self::Narrow(plan) => FetchKey::Ranges(plan.ranges.clone()),
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broad { field, value } => write!(f, "broad({field} = {value})"),
            Self::Narrow(plan) => write!(
                f,
                "narrow({} within {} km)",
                plan.ranges.iter().join(", "),
                plan.radius_km
            ),
        }
    }
}

/// Identifies one store call, so identical calls can be shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FetchKey {
    Ranges(Vec<GeoBoundingRange>),
    Region(RegionField, String),
}

fn fetch<S: ListingStore + ?Sized>(
    store: &S,
    key: &FetchKey,
) -> anyhow::Result<Vec<ListingLocation>> {
    match key {
        FetchKey::Region(field, value) => store.query_by_field(*field, value),
        FetchKey::Ranges(ranges) => {
            let mut seen = HashSet::new();
            let mut candidates = Vec::new();
            for range in ranges {
                for listing in store.query_by_geohash_range(range)? {
                    if seen.insert(listing.id.clone()) {
                        candidates.push(listing);
                    }
                }
            }
            Ok(candidates)
        }
    }
}

fn finish(
    place: &ResolvedPlace,
    strategy: &SearchStrategy,
    mut candidates: Vec<ListingLocation>,
    config: &SearchConfig,
) -> Result<Vec<RankedListing>> {
    if !config.include_inactive {
        let before = candidates.len();
        candidates.retain(|listing| listing.active);
        if candidates.len() < before {
            debug!(dropped = before - candidates.len(), "Dropped inactive listings");
        }
    }

    let mut results = match strategy {
        SearchStrategy::Broad { .. } => ranking::annotate(place.coordinate, candidates),
        SearchStrategy::Narrow(plan) => {
            ranking::rank(place.coordinate, candidates, plan.radius_km)?
        }
    };
    if let Some(limit) = config.limit {
        results.truncate(limit);
    }

    if results.is_empty() && config.require_results {
        return Err(SearchError::NoCandidatesFound);
    }
    Ok(results)
}

/// Searches listings around `place`, choosing the strategy from its specificity.
pub fn search<S: ListingStore + ?Sized>(
    store: &S,
    place: &ResolvedPlace,
    config: &SearchConfig,
) -> Result<Vec<RankedListing>> {
    search_with_specificity(store, place, place.specificity(), config)
}

/// Like [`search`], with the specificity supplied by the caller.
#[instrument(name = "Listing Search", level = "info", skip_all, fields(center = %place.coordinate, specificity = ?specificity))]
pub fn search_with_specificity<S: ListingStore + ?Sized>(
    store: &S,
    place: &ResolvedPlace,
    specificity: PlaceSpecificity,
    config: &SearchConfig,
) -> Result<Vec<RankedListing>> {
    let t_start = std::time::Instant::now();
    let strategy = SearchStrategy::for_place(place, specificity, config)?;
    debug!(%strategy, "Chose search strategy");

    let candidates = fetch(store, &strategy.fetch_key()).map_err(SearchError::Store)?;
    debug!(candidates = candidates.len(), "Fetched candidates");

    let results = finish(place, &strategy, candidates, config)?;
    info!(
        elapsed = ?t_start.elapsed(),
        results = results.len(),
        "Listing search complete"
    );
    Ok(results)
}

/// Resolves `query` through `geocoder`, then runs [`search`].
///
/// A blank query returns no results without calling the geocoder.
#[instrument(name = "Text Search", level = "info", skip_all, fields(query = query))]
pub fn search_text<G, S>(
    geocoder: &G,
    store: &S,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<RankedListing>>
where
    G: Geocoder + ?Sized,
    S: ListingStore + ?Sized,
{
    if query.trim().is_empty() {
        warn!("Empty search query");
        return Ok(Vec::new());
    }
    let place = geocoder
        .geocode_text(query)
        .map_err(SearchError::Geocoding)?;
    debug!(center = %place.coordinate, fields = %place.fields, "Resolved query");
    search(store, &place, config)
}

/// Searches around many places at once.
///
/// Places that need the same store call (same geohash ranges, or same region
/// filter) share one call. Store calls and ranking run on the rayon pool. The
/// output has one entry per input place, in input order, and a failure for one
/// place does not affect the others.
#[instrument(
    name = "Bulk Listing Search",
    level = "info",
    skip_all,
    fields(num_places = places.len())
)]
pub fn search_bulk<S: ListingStore + ?Sized>(
    store: &S,
    places: &[ResolvedPlace],
    config: &SearchConfig,
) -> Vec<Result<Vec<RankedListing>>> {
    let t_start = std::time::Instant::now();

    let strategies = places
        .iter()
        .map(|place| SearchStrategy::for_place(place, place.specificity(), config))
        .collect_vec();

    let mut key_ids: HashMap<FetchKey, usize> = HashMap::new();
    let mut unique_keys = Vec::new();
    let key_for_place = strategies
        .iter()
        .map(|strategy| {
            let strategy = strategy.as_ref().ok()?;
            let key = strategy.fetch_key();
            let id = *key_ids.entry(key.clone()).or_insert_with(|| {
                unique_keys.push(key);
                unique_keys.len() - 1
            });
            Some(id)
        })
        .collect_vec();
    info!(
        unique_fetches = unique_keys.len(),
        "Deduplicated {} places to {} store calls.",
        places.len(),
        unique_keys.len()
    );

    let fetched = unique_keys
        .par_iter()
        .map(|key| fetch(store, key))
        .collect::<Vec<_>>();

    let results = places
        .par_iter()
        .zip(strategies.into_par_iter())
        .zip(key_for_place.into_par_iter())
        .map(|((place, strategy), key_id)| {
            let strategy = strategy?;
            let Some(key_id) = key_id else {
                return Err(SearchError::Store(anyhow!("Missing store call for place")));
            };
            let candidates = match &fetched[key_id] {
                Ok(listings) => listings.clone(),
                Err(err) => {
                    warn!(error = %err, "Shared store call failed");
                    return Err(SearchError::Store(anyhow!("{err:#}")));
                }
            };
            finish(place, &strategy, candidates, config)
        })
        .collect::<Vec<_>>();

    info!(
        total_elapsed = ?t_start.elapsed(),
        succeeded = results.iter().filter(|r| r.is_ok()).count(),
        "Bulk listing search finished for {} places.",
        results.len()
    );
    results
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use driveshare_geo::{Coordinate, distance::km_per_degree_lat};

    use super::*;
    use crate::{listing::AdministrativeFields, store::InMemoryStore};

    const CENTER: Coordinate = Coordinate::new(43.6532, -79.3832);

    fn north(km: f64) -> Coordinate {
        Coordinate::new(CENTER.latitude + km / km_per_degree_lat(), CENTER.longitude)
    }

    fn ontario() -> AdministrativeFields {
        AdministrativeFields {
            state: Some("ON".to_string()),
            country: Some("CA".to_string()),
            ..AdministrativeFields::default()
        }
    }

    fn city_place() -> ResolvedPlace {
        ResolvedPlace::new(
            CENTER,
            AdministrativeFields {
                city: Some("Toronto".to_string()),
                ..ontario()
            },
        )
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_listings([
            ListingLocation::new("two", north(2.0)).with_region(ontario()),
            ListingLocation::new("one", north(1.0)).with_region(ontario()),
            ListingLocation::new("closed", north(0.5))
                .with_region(ontario())
                .with_active(false),
            ListingLocation::new("ottawa", Coordinate::new(45.4215, -75.6972))
                .with_region(ontario()),
        ])
    }

    struct CountingStore {
        inner: InMemoryStore,
        calls: AtomicUsize,
    }

    impl ListingStore for CountingStore {
        fn query_by_geohash_range(
            &self,
            range: &GeoBoundingRange,
        ) -> anyhow::Result<Vec<ListingLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.query_by_geohash_range(range)
        }

        fn query_by_field(
            &self,
            field: RegionField,
            value: &str,
        ) -> anyhow::Result<Vec<ListingLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.query_by_field(field, value)
        }
    }

    struct BrokenStore;

    impl ListingStore for BrokenStore {
        fn query_by_geohash_range(
            &self,
            _: &GeoBoundingRange,
        ) -> anyhow::Result<Vec<ListingLocation>> {
            anyhow::bail!("range scan failed")
        }

        fn query_by_field(&self, _: RegionField, _: &str) -> anyhow::Result<Vec<ListingLocation>> {
            anyhow::bail!("field lookup failed")
        }
    }

    fn ids(results: &[RankedListing]) -> Vec<&str> {
        results.iter().map(RankedListing::id).collect()
    }

    #[test]
    fn test_strategy_selection() {
        let config = SearchConfig::default();
        let narrow =
            SearchStrategy::for_place(&city_place(), PlaceSpecificity::Narrow, &config).unwrap();
        let SearchStrategy::Narrow(plan) = narrow else {
            panic!("expected narrow strategy");
        };
        assert_eq!(plan.precision, 3);
        assert_eq!(plan.ranges[0].start, "dpz");

        let broad =
            SearchStrategy::for_place(&city_place(), PlaceSpecificity::Broad, &config).unwrap();
        assert_eq!(
            broad,
            SearchStrategy::Broad {
                field: RegionField::State,
                value: "ON".to_string()
            }
        );

        let country_only = ResolvedPlace::new(
            CENTER,
            AdministrativeFields {
                country: Some(" ca ".to_string()),
                ..AdministrativeFields::default()
            },
        );
        assert_eq!(
            SearchStrategy::for_place(&country_only, PlaceSpecificity::Broad, &config).unwrap(),
            SearchStrategy::Broad {
                field: RegionField::Country,
                value: "CA".to_string()
            }
        );

        let nothing = ResolvedPlace::new(CENTER, AdministrativeFields::default());
        assert!(matches!(
            SearchStrategy::for_place(&nothing, PlaceSpecificity::Broad, &config),
            Err(SearchError::MissingRegion)
        ));
    }

    #[test]
    fn test_narrow_search_ranks_and_drops_inactive() {
        let results = search(&store(), &city_place(), &SearchConfig::default()).unwrap();
        assert_eq!(ids(&results), ["one", "two"]);
        assert!(results.iter().all(|r| r.distance_km.is_some()));
    }

    #[test]
    fn test_include_inactive_and_limit() {
        let config = SearchConfig {
            include_inactive: true,
            limit: Some(2),
            ..SearchConfig::default()
        };
        let results = search(&store(), &city_place(), &config).unwrap();
        assert_eq!(ids(&results), ["closed", "one"]);
    }

    #[test]
    fn test_broad_search_keeps_store_order() {
        let province = ResolvedPlace::new(CENTER, ontario());
        let results = search(&store(), &province, &SearchConfig::default()).unwrap();
        let expected = store()
            .listings()
            .filter(|l| l.active)
            .map(|l| l.id.clone())
            .collect_vec();
        assert_eq!(ids(&results), expected);
        assert!(ids(&results).contains(&"ottawa"));
    }

    #[test]
    fn test_empty_narrow_result_has_no_fallback() {
        let far = ResolvedPlace::new(
            Coordinate::new(49.2827, -123.1207),
            AdministrativeFields {
                city: Some("Vancouver".to_string()),
                ..ontario()
            },
        );
        assert!(search(&store(), &far, &SearchConfig::default()).unwrap().is_empty());

        let strict = SearchConfig {
            require_results: true,
            ..SearchConfig::default()
        };
        assert!(matches!(
            search(&store(), &far, &strict),
            Err(SearchError::NoCandidatesFound)
        ));
    }

    #[test]
    fn test_store_failure_is_wrapped() {
        let err = search(&BrokenStore, &city_place(), &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::Store(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_search_text_blank_query() {
        let geocoder = crate::store::StaticGeocoder::new();
        let results = search_text(&geocoder, &store(), "   ", &SearchConfig::default()).unwrap();
        assert!(results.is_empty());
        assert!(matches!(
            search_text(&geocoder, &store(), "Atlantis", &SearchConfig::default()),
            Err(SearchError::Geocoding(_))
        ));
    }

    #[test]
    fn test_bulk_search_shares_store_calls() {
        let counting = CountingStore {
            inner: store(),
            calls: AtomicUsize::new(0),
        };
        let nearby = ResolvedPlace::new(
            Coordinate::new(43.66, -79.39),
            AdministrativeFields {
                city: Some("Toronto".to_string()),
                ..ontario()
            },
        );
        let places = vec![
            city_place(),
            ResolvedPlace::new(CENTER, ontario()),
            nearby,
            ResolvedPlace::new(CENTER, AdministrativeFields::default()),
            city_place(),
        ];
        let results = search_bulk(&counting, &places, &SearchConfig::default());

        assert_eq!(results.len(), 5);
        // Three narrow places share the "dpz" range, one broad place uses the region filter.
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ids(results[0].as_ref().unwrap()), ["one", "two"]);
        assert!(ids(results[1].as_ref().unwrap()).contains(&"ottawa"));
        assert!(matches!(results[3], Err(SearchError::MissingRegion)));
        assert_eq!(
            ids(results[4].as_ref().unwrap()),
            ids(results[0].as_ref().unwrap())
        );
    }

    #[test]
    fn test_bulk_search_reports_failures_per_place() {
        let places = vec![city_place(), city_place()];
        let results = search_bulk(&BrokenStore, &places, &SearchConfig::default());
        assert!(results.iter().all(|r| matches!(r, Err(SearchError::Store(_)))));
    }
}
