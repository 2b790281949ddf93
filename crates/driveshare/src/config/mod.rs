use crate::search::SearchConfig;

/// Smallest radius accepted by [`SearchConfigBuilder::radius_km`].
pub const MIN_RADIUS_KM: f64 = 0.1;
/// Largest radius accepted by [`SearchConfigBuilder::radius_km`].
pub const MAX_RADIUS_KM: f64 = 500.0;

/// Builder for creating search configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with city-scale defaults
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Walking distance around the center
    pub fn neighbourhood() -> Self {
        Self::new().radius_km(5.0)
    }

    /// City-scale search, same as the default
    pub fn city() -> Self {
        Self::new()
    }

    /// Metropolitan area and surroundings
    pub fn regional() -> Self {
        Self::new().radius_km(100.0)
    }

    /// Set the search radius in kilometres, clamped to a sane range
    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.config.radius_km = if radius_km.is_nan() {
            MIN_RADIUS_KM
        } else {
            radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
        };
        self
    }

    /// Set the maximum number of results to return
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = Some(limit);
        self
    }

    /// Return every match
    pub fn unlimited(mut self) -> Self {
        self.config.limit = None;
        self
    }

    /// Keep listings that are not accepting bookings
    pub fn include_inactive(mut self, include: bool) -> Self {
        self.config.include_inactive = include;
        self
    }

    /// Report "nothing matched" as an error instead of an empty result
    pub fn require_results(mut self, require: bool) -> Self {
        self.config.require_results = require;
        self
    }

    /// Scan at a fixed geohash precision instead of deriving it from the radius
    pub fn fixed_precision(mut self, precision: usize) -> Self {
        self.config.planner.fixed_precision = Some(precision);
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = SearchConfigBuilder::new().build();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.radius_km, 30.0);
        assert_eq!(config.limit, None);
        assert!(!config.include_inactive);
        assert!(!config.require_results);
        assert_eq!(config.planner.fixed_precision, None);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SearchConfigBuilder::neighbourhood().build().radius_km, 5.0);
        assert_eq!(SearchConfigBuilder::city().build().radius_km, 30.0);
        assert_eq!(SearchConfigBuilder::regional().build().radius_km, 100.0);
    }

    #[test]
    fn test_method_chaining() {
        let config = SearchConfig::builder()
            .radius_km(12.5)
            .limit(20)
            .include_inactive(true)
            .require_results(true)
            .fixed_precision(5)
            .build();

        assert_eq!(config.radius_km, 12.5);
        assert_eq!(config.limit, Some(20));
        assert!(config.include_inactive);
        assert!(config.require_results);
        assert_eq!(config.planner.fixed_precision, Some(5));
    }

    #[test]
    fn test_radius_is_clamped() {
        assert_eq!(SearchConfigBuilder::new().radius_km(0.0).build().radius_km, MIN_RADIUS_KM);
        assert_eq!(SearchConfigBuilder::new().radius_km(-3.0).build().radius_km, MIN_RADIUS_KM);
        assert_eq!(SearchConfigBuilder::new().radius_km(10_000.0).build().radius_km, MAX_RADIUS_KM);
        assert_eq!(
            SearchConfigBuilder::new().radius_km(f64::INFINITY).build().radius_km,
            MAX_RADIUS_KM
        );
        assert_eq!(SearchConfigBuilder::new().radius_km(f64::NAN).build().radius_km, MIN_RADIUS_KM);
    }

    #[test]
    fn test_override_presets() {
        let config = SearchConfigBuilder::neighbourhood()
            .limit(3)
            .unlimited()
            .radius_km(8.0)
            .build();
        assert_eq!(config.radius_km, 8.0);
        assert_eq!(config.limit, None);
    }
}
