//! The immutable endpoint descriptor set and URL resolution.

use std::collections::{BTreeMap, HashMap};

use crate::catalogue::{AvailableYears, Catalogue, Defaults};
use crate::endpoint::{EndpointDescriptor, EndpointKind, ResolveRequest, MAX_RACE_ROUND};
use crate::errors::CatalogueError;
use crate::template::{self, Bindings};

#[derive(Debug, Clone)]
pub struct Registry {
    endpoints: Vec<EndpointDescriptor>,
    index: HashMap<String, usize>,
    patterns: BTreeMap<String, String>,
    defaults: Defaults,
    years: AvailableYears,
    base_url: String,
}

impl Registry {
    /// Validates every endpoint in `catalogue` and builds the descriptor set.
    ///
    /// Fails on the first invalid entry, on a name declared in more than one
    /// section, and on default year/round values that could never resolve.
    pub fn from_catalogue(catalogue: &Catalogue) -> Result<Self, CatalogueError> {
        let defaults = catalogue.defaults;
        let years = catalogue.available_years;
        if !years.contains(defaults.year) {
            return Err(CatalogueError::InvalidDefault {
                name: "defaults".to_string(),
                field: "year",
                value: defaults.year,
                min: years.start_year,
                max: years.end_year,
            });
        }
        if defaults.race_round < 1 || defaults.race_round > MAX_RACE_ROUND {
            return Err(CatalogueError::InvalidDefault {
                name: "defaults".to_string(),
                field: "race_round",
                value: defaults.race_round,
                min: 1,
                max: MAX_RACE_ROUND,
            });
        }

        let mut endpoints: Vec<EndpointDescriptor> = vec![];
        let mut index: HashMap<String, usize> = HashMap::new();
        for (kind, section) in catalogue.sections() {
            for (name, entry) in section.iter() {
                if let Some(&at) = index.get(name) {
                    let first: &EndpointDescriptor = &endpoints[at];
                    return Err(CatalogueError::DuplicateEndpoint {
                        name: name.to_string(),
                        first: first.kind,
                        second: kind,
                    });
                }
                let descriptor = EndpointDescriptor::from_entry(name, kind, entry, &defaults)?;
                debug!("Registered {} endpoint {}: {}", kind, name, descriptor.url);
                index.insert(name.to_string(), endpoints.len());
                endpoints.push(descriptor);
            }
        }

        let registry = Registry {
            endpoints,
            index,
            patterns: catalogue.url_patterns.clone(),
            defaults,
            years,
            base_url: catalogue.api_config.base_url.clone(),
        };
        info!(
            "Loaded {} endpoints ({} static, {} year-dependent, {} race-specific)",
            registry.len(),
            registry.of_kind(EndpointKind::Static).count(),
            registry.of_kind(EndpointKind::YearDependent).count(),
            registry.of_kind(EndpointKind::RaceSpecific).count()
        );
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EndpointDescriptor> {
        self.index.get(name).map(|&at| &self.endpoints[at])
    }

    /// Descriptors in catalogue order: static, year-dependent, race-specific.
    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter()
    }

    pub fn of_kind(&self, kind: EndpointKind) -> impl Iterator<Item = &EndpointDescriptor> {
        self.endpoints.iter().filter(move |d| d.kind == kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|d| d.name.as_str())
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn available_years(&self) -> &AvailableYears {
        &self.years
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolve(&self, request: &ResolveRequest) -> Result<String, CatalogueError> {
        self.resolve_url(&request.name, request.year, request.race_round)
    }

    /// Resolved URL for endpoint `name`, with `year` and `race_round`
    /// defaulting to the catalogue defaults.
    ///
    /// Static endpoints ignore both overrides, and year-dependent endpoints
    /// ignore `race_round`.
    pub fn resolve_url(
        &self,
        name: &str,
        year: Option<u32>,
        race_round: Option<u32>,
    ) -> Result<String, CatalogueError> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| CatalogueError::UnknownEndpoint {
                name: name.to_string(),
            })?;
        let bindings = match descriptor.kind {
            EndpointKind::Static => {
                if year.is_some() || race_round.is_some() {
                    debug!("Ignoring year/round overrides for static endpoint {}", name);
                }
                return Ok(descriptor.url.clone());
            }
            EndpointKind::YearDependent => {
                if race_round.is_some() {
                    debug!("Ignoring race round override for endpoint {}", name);
                }
                Bindings {
                    year: Some(self.year_or_default(year)?),
                    ..Bindings::default()
                }
            }
            EndpointKind::RaceSpecific => Bindings {
                year: Some(self.year_or_default(year)?),
                race_round: Some(self.round_or_default(race_round)?),
                endpoint: None,
            },
        };
        let template_url =
            descriptor
                .template_url
                .as_ref()
                .ok_or_else(|| CatalogueError::MissingTemplate {
                    name: name.to_string(),
                    kind: descriptor.kind,
                })?;
        template::render(template_url, &bindings)
    }

    /// Fills one of the generic `url_patterns` with an endpoint path segment.
    ///
    /// Year and round are only checked when the pattern uses them.
    pub fn resolve_pattern(
        &self,
        pattern: &str,
        endpoint: &str,
        year: Option<u32>,
        race_round: Option<u32>,
    ) -> Result<String, CatalogueError> {
        let template_url = self
            .patterns
            .get(pattern)
            .ok_or_else(|| CatalogueError::UnknownPattern {
                name: pattern.to_string(),
            })?;
        let year = if template_url.contains(template::YEAR) {
            Some(self.year_or_default(year)?)
        } else {
            None
        };
        let race_round = if template_url.contains(template::RACE_ROUND) {
            Some(self.round_or_default(race_round)?)
        } else {
            None
        };
        let endpoint = endpoint.trim_matches('/');
        if endpoint.is_empty() {
            return Err(CatalogueError::EmptyEndpointSegment {
                pattern: pattern.to_string(),
            });
        }
        let bindings = Bindings {
            year,
            race_round,
            endpoint: Some(endpoint),
        };
        template::render(template_url, &bindings)
    }

    fn year_or_default(&self, year: Option<u32>) -> Result<u32, CatalogueError> {
        self.years.check(year.unwrap_or(self.defaults.year))
    }

    fn round_or_default(&self, race_round: Option<u32>) -> Result<u32, CatalogueError> {
        let round = race_round.unwrap_or(self.defaults.race_round);
        if round < 1 || round > MAX_RACE_ROUND {
            return Err(CatalogueError::RoundOutOfRange {
                round,
                max: MAX_RACE_ROUND,
            });
        }
        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{EndpointEntry, Section};
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> Registry {
        let catalogue = Catalogue::builtin().expect("builtin catalogue");
        Registry::from_catalogue(&catalogue).expect("valid catalogue")
    }

    fn entry(url: &str) -> EndpointEntry {
        EndpointEntry {
            url: Some(url.to_string()),
            ..EndpointEntry::default()
        }
    }

    #[rstest]
    fn registers_every_endpoint(registry: Registry) {
        assert_eq!(registry.len(), 13);
        assert_eq!(registry.of_kind(EndpointKind::YearDependent).count(), 8);
        let first: Vec<&str> = registry.names().take(4).collect();
        assert_eq!(first, vec!["status", "season", "circuit", "race"]);
        assert_eq!(registry.base_url(), "https://api.jolpi.ca/ergast/f1");
        assert_eq!(registry.defaults().year, 2025);
        assert_eq!(registry.available_years().end_year, 2025);
        assert!(!registry.is_empty());
    }

    #[rstest]
    #[case("status", None, None, "https://api.jolpi.ca/ergast/f1/status")]
    #[case("status", Some(1999), Some(3), "https://api.jolpi.ca/ergast/f1/status")]
    #[case("race", None, None, "https://api.jolpi.ca/ergast/f1/2025/races")]
    #[case("race", Some(1988), None, "https://api.jolpi.ca/ergast/f1/1988/races")]
    #[case("result", Some(2010), Some(4), "https://api.jolpi.ca/ergast/f1/2010/results")]
    #[case("pitstop", None, None, "https://api.jolpi.ca/ergast/f1/2025/1/pitstops")]
    #[case("lap", Some(2019), Some(21), "https://api.jolpi.ca/ergast/f1/2019/21/laps")]
    #[case("lap", None, Some(12), "https://api.jolpi.ca/ergast/f1/2025/12/laps")]
    fn resolves_with_defaults_and_overrides(
        registry: Registry,
        #[case] name: &str,
        #[case] year: Option<u32>,
        #[case] race_round: Option<u32>,
        #[case] expected: &str,
    ) {
        let url = registry
            .resolve_url(name, year, race_round)
            .expect("resolvable");
        assert_eq!(url, expected);
    }

    #[rstest]
    fn resolves_built_requests(registry: Registry) {
        let request = ResolveRequest::builder()
            .name("driverstanding")
            .year(2008u32)
            .finish()
            .expect("complete request");
        assert_eq!(
            registry.resolve(&request).expect("resolvable"),
            "https://api.jolpi.ca/ergast/f1/2008/driverstandings"
        );
    }

    #[rstest]
    fn unknown_endpoint_is_rejected(registry: Registry) {
        let err = registry.resolve_url("weather", None, None).expect_err("unknown");
        match err {
            CatalogueError::UnknownEndpoint { name } => assert_eq!(name, "weather"),
            other => panic!("expected UnknownEndpoint, found {:?}", other),
        }
    }

    #[rstest]
    #[case(1949)]
    #[case(2026)]
    fn years_outside_the_available_range_are_rejected(registry: Registry, #[case] year: u32) {
        let err = registry
            .resolve_url("race", Some(year), None)
            .expect_err("out of range");
        assert!(matches!(err, CatalogueError::YearOutOfRange { start: 1950, end: 2025, .. }));
    }

    #[rstest]
    #[case(0)]
    #[case(31)]
    fn rounds_outside_a_season_are_rejected(registry: Registry, #[case] round: u32) {
        let err = registry
            .resolve_url("pitstop", None, Some(round))
            .expect_err("out of range");
        assert!(matches!(err, CatalogueError::RoundOutOfRange { .. }));
    }

    #[rstest]
    #[case("base_pattern", "status", None, "https://api.jolpi.ca/ergast/f1/status")]
    #[case("year_pattern", "/drivers/", Some(2001), "https://api.jolpi.ca/ergast/f1/2001/drivers")]
    #[case("race_pattern", "results", None, "https://api.jolpi.ca/ergast/f1/2025/1/results")]
    fn resolves_generic_patterns(
        registry: Registry,
        #[case] pattern: &str,
        #[case] endpoint: &str,
        #[case] year: Option<u32>,
        #[case] expected: &str,
    ) {
        let url = registry
            .resolve_pattern(pattern, endpoint, year, None)
            .expect("resolvable");
        assert_eq!(url, expected);
    }

    #[rstest]
    fn base_pattern_ignores_year_range(registry: Registry) {
        let url = registry
            .resolve_pattern("base_pattern", "seasons", Some(1800), None)
            .expect("year unused");
        assert_eq!(url, "https://api.jolpi.ca/ergast/f1/seasons");
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("//")]
    fn empty_pattern_segment_is_rejected(registry: Registry, #[case] endpoint: &str) {
        let err = registry
            .resolve_pattern("race_pattern", endpoint, None, None)
            .expect_err("empty segment");
        match err {
            CatalogueError::EmptyEndpointSegment { pattern } => assert_eq!(pattern, "race_pattern"),
            other => panic!("expected EmptyEndpointSegment, found {:?}", other),
        }
    }

    #[rstest]
    #[case("static_endpoints:\n  status:\n    url: \"https://x/status\"\n    year_dependent: true\n    race_dependent: true\n")]
    #[case("year_dependent_endpoints:\n  race:\n    url: \"https://x/1999/races\"\n    template_url: \"https://x/{year}/races\"\n    year_dependent: false\n")]
    #[case("race_specific_endpoints:\n  lap:\n    template_url: \"https://x/{year}/{race_round}/laps\"\n    year_dependent: false\n")]
    fn entries_with_contradicting_flags_do_not_load(#[case] yaml: &str) {
        let catalogue = Catalogue::from_yaml_str(yaml, "test").expect("parse");
        let err = Registry::from_catalogue(&catalogue).expect_err("contradicting flags");
        assert!(matches!(err, CatalogueError::FlagMismatch { .. }));
    }

    #[rstest]
    fn unknown_pattern_is_rejected(registry: Registry) {
        let err = registry
            .resolve_pattern("session_pattern", "laps", None, None)
            .expect_err("unknown");
        assert!(matches!(err, CatalogueError::UnknownPattern { .. }));
    }

    #[rstest]
    fn names_must_be_unique_across_sections() {
        let catalogue = Catalogue {
            static_endpoints: Section::new(vec![(
                "race".to_string(),
                entry("https://x/races"),
            )]),
            year_dependent_endpoints: Section::new(vec![(
                "race".to_string(),
                EndpointEntry {
                    template_url: Some("https://x/{year}/races".to_string()),
                    year_dependent: true,
                    ..EndpointEntry::default()
                },
            )]),
            ..Catalogue::default()
        };
        let err = Registry::from_catalogue(&catalogue).expect_err("duplicate");
        match err {
            CatalogueError::DuplicateEndpoint {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "race");
                assert_eq!(first, EndpointKind::Static);
                assert_eq!(second, EndpointKind::YearDependent);
            }
            other => panic!("expected DuplicateEndpoint, found {:?}", other),
        }
    }

    #[rstest]
    fn default_year_outside_available_range_fails_fast() {
        let mut catalogue = Catalogue::builtin().expect("builtin catalogue");
        catalogue.defaults.year = 2030;
        let err = Registry::from_catalogue(&catalogue).expect_err("invalid default");
        assert!(matches!(
            err,
            CatalogueError::InvalidDefault { field: "year", value: 2030, .. }
        ));
    }

    #[rstest]
    fn changed_defaults_flow_into_resolution() {
        let mut catalogue = Catalogue::builtin().expect("builtin catalogue");
        catalogue.defaults.year = 2023;
        catalogue.defaults.race_round = 6;
        let registry = Registry::from_catalogue(&catalogue).expect("valid catalogue");
        assert_eq!(
            registry.resolve_url("pitstop", None, None).expect("resolvable"),
            "https://api.jolpi.ca/ergast/f1/2023/6/pitstops"
        );
        // descriptors keep the url baked into the catalogue
        assert_eq!(
            registry.get("pitstop").map(|d| d.url.as_str()),
            Some("https://api.jolpi.ca/ergast/f1/2025/1/pitstops")
        );
    }
}
