use std::fmt;
use std::str::FromStr;

use crate::catalogue::{Defaults, EndpointEntry};
use crate::errors::CatalogueError;
use crate::template::{self, Bindings};

/// First world championship season.
pub const MIN_YEAR: u32 = 1950;
pub const MAX_YEAR: u32 = 2100;
pub const MAX_RACE_ROUND: u32 = 30;

/// Which catalogue section an endpoint was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Static,
    YearDependent,
    RaceSpecific,
}

impl EndpointKind {
    pub const ALL: &'static [EndpointKind] = &[
        EndpointKind::Static,
        EndpointKind::YearDependent,
        EndpointKind::RaceSpecific,
    ];

    /// Catalogue key holding endpoints of this kind.
    pub fn section(self) -> &'static str {
        match self {
            EndpointKind::Static => "static_endpoints",
            EndpointKind::YearDependent => "year_dependent_endpoints",
            EndpointKind::RaceSpecific => "race_specific_endpoints",
        }
    }

    /// Required values of the `year_dependent` and `race_dependent` flags.
    pub fn flags(self) -> (bool, bool) {
        match self {
            EndpointKind::Static => (false, false),
            EndpointKind::YearDependent => (true, false),
            EndpointKind::RaceSpecific => (true, true),
        }
    }

    /// Tokens a template of this kind must contain, and the only ones it may.
    pub fn placeholders(self) -> &'static [&'static str] {
        match self {
            EndpointKind::Static => &[],
            EndpointKind::YearDependent => &[template::YEAR],
            EndpointKind::RaceSpecific => &[template::YEAR, template::RACE_ROUND],
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            EndpointKind::Static => "static",
            EndpointKind::YearDependent => "year-dependent",
            EndpointKind::RaceSpecific => "race-specific",
        })
    }
}

impl FromStr for EndpointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(EndpointKind::Static),
            "year" | "year-dependent" => Ok(EndpointKind::YearDependent),
            "race" | "race-specific" => Ok(EndpointKind::RaceSpecific),
            x => Err(format!(
                "unknown endpoint kind '{}' (expected static, year or race)",
                x
            )),
        }
    }
}

/// A validated endpoint, ready for URL resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub name: String,
    pub kind: EndpointKind,
    /// Fully resolved URL for the endpoint's own defaults.
    pub url: String,
    pub template_url: Option<String>,
    pub description: String,
    pub year_dependent: bool,
    pub race_dependent: bool,
    pub current_year: Option<u32>,
    pub current_race: Option<u32>,
}

impl EndpointDescriptor {
    /// Builds a descriptor from its catalogue entry, rejecting entries whose
    /// flags or template do not match the section they were declared in.
    ///
    /// Templated entries without a `url` get one rendered from their
    /// `current_year`/`current_race`, falling back to `defaults`.
    pub fn from_entry(
        name: &str,
        kind: EndpointKind,
        entry: &EndpointEntry,
        defaults: &Defaults,
    ) -> Result<Self, CatalogueError> {
        check_bounds(name, "current_year", entry.current_year, MIN_YEAR, MAX_YEAR)?;
        check_bounds(name, "current_race", entry.current_race, 0, MAX_RACE_ROUND)?;
        check_flags(name, kind, entry)?;
        let url = match kind {
            EndpointKind::Static => {
                if entry.template_url.is_some() {
                    return Err(CatalogueError::UnexpectedTemplate {
                        name: name.to_string(),
                    });
                }
                entry.url.clone().ok_or_else(|| CatalogueError::MissingUrl {
                    name: name.to_string(),
                })?
            }
            EndpointKind::YearDependent | EndpointKind::RaceSpecific => {
                let template_url =
                    entry
                        .template_url
                        .as_ref()
                        .ok_or_else(|| CatalogueError::MissingTemplate {
                            name: name.to_string(),
                            kind,
                        })?;
                check_placeholders(name, kind, template_url)?;
                match entry.url {
                    Some(ref url) => url.clone(),
                    None => {
                        let bindings = Bindings {
                            year: Some(entry.current_year.unwrap_or(defaults.year)),
                            race_round: Some(entry.current_race.unwrap_or(defaults.race_round)),
                            endpoint: None,
                        };
                        template::render(template_url, &bindings)?
                    }
                }
            }
        };
        Ok(EndpointDescriptor {
            name: name.to_string(),
            kind,
            url,
            template_url: entry.template_url.clone(),
            description: entry.description.clone(),
            year_dependent: entry.year_dependent,
            race_dependent: entry.race_dependent,
            current_year: entry.current_year,
            current_race: entry.current_race,
        })
    }
}

fn check_bounds(
    name: &str,
    field: &'static str,
    value: Option<u32>,
    min: u32,
    max: u32,
) -> Result<(), CatalogueError> {
    match value {
        Some(value) if value < min || value > max => Err(CatalogueError::InvalidDefault {
            name: name.to_string(),
            field,
            value,
            min,
            max,
        }),
        _ => Ok(()),
    }
}

fn check_flags(name: &str, kind: EndpointKind, entry: &EndpointEntry) -> Result<(), CatalogueError> {
    let (year_dependent, race_dependent) = kind.flags();
    let flags = [
        ("year_dependent", entry.year_dependent, year_dependent),
        ("race_dependent", entry.race_dependent, race_dependent),
    ];
    for &(field, actual, expected) in flags.iter() {
        if actual != expected {
            return Err(CatalogueError::FlagMismatch {
                name: name.to_string(),
                kind,
                field,
                expected,
            });
        }
    }
    Ok(())
}

fn check_placeholders(
    name: &str,
    kind: EndpointKind,
    template_url: &str,
) -> Result<(), CatalogueError> {
    let expected = kind.placeholders();
    for token in expected {
        if !template_url.contains(token) {
            return Err(CatalogueError::MissingPlaceholder {
                name: name.to_string(),
                token: *token,
            });
        }
    }
    for token in template::placeholders(template_url) {
        if !expected.iter().any(|allowed| *allowed == token) {
            return Err(CatalogueError::UnexpectedPlaceholder {
                name: name.to_string(),
                token: token.to_string(),
            });
        }
    }
    Ok(())
}

/// Request for a resolved URL. Unset parameters fall back to the catalogue
/// defaults.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct ResolveRequest {
    pub name: String,
    #[builder(default)]
    pub year: Option<u32>,
    #[builder(default)]
    pub race_round: Option<u32>,
}

impl ResolveRequest {
    pub fn builder() -> ResolveRequestBuilder {
        ResolveRequestBuilder::default()
    }
}

impl ResolveRequestBuilder {
    /// Like `build`, with the builder's message wrapped in a catalogue error.
    pub fn finish(&self) -> Result<ResolveRequest, CatalogueError> {
        self.build()
            .map_err(|reason| CatalogueError::IncompleteRequest { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn templated(template_url: &str) -> EndpointEntry {
        EndpointEntry {
            template_url: Some(template_url.to_string()),
            year_dependent: true,
            current_year: Some(2024),
            ..EndpointEntry::default()
        }
    }

    #[rstest]
    #[case("static", EndpointKind::Static)]
    #[case("year", EndpointKind::YearDependent)]
    #[case("race-specific", EndpointKind::RaceSpecific)]
    fn parses_kind_names(#[case] input: &str, #[case] kind: EndpointKind) {
        assert_eq!(input.parse::<EndpointKind>(), Ok(kind));
    }

    #[rstest]
    fn rejects_unknown_kind() {
        assert!("season".parse::<EndpointKind>().is_err());
    }

    #[rstest]
    fn renders_missing_url_from_template() {
        let entry = templated("https://x/{year}/drivers");
        let descriptor = EndpointDescriptor::from_entry(
            "driver",
            EndpointKind::YearDependent,
            &entry,
            &Defaults::default(),
        )
        .expect("valid entry");
        assert_eq!(descriptor.url, "https://x/2024/drivers");
    }

    #[rstest]
    fn race_entry_without_round_uses_default_round() {
        let mut entry = templated("https://x/{year}/{race_round}/laps");
        entry.race_dependent = true;
        let defaults = Defaults {
            year: 2025,
            race_round: 7,
        };
        let descriptor =
            EndpointDescriptor::from_entry("lap", EndpointKind::RaceSpecific, &entry, &defaults)
                .expect("valid entry");
        assert_eq!(descriptor.url, "https://x/2024/7/laps");
    }

    #[rstest]
    fn year_template_without_year_token_is_rejected() {
        let entry = templated("https://x/drivers");
        let err = EndpointDescriptor::from_entry(
            "driver",
            EndpointKind::YearDependent,
            &entry,
            &Defaults::default(),
        )
        .expect_err("missing {year}");
        match err {
            CatalogueError::MissingPlaceholder { token, .. } => assert_eq!(token, "{year}"),
            other => panic!("expected MissingPlaceholder, found {:?}", other),
        }
    }

    #[rstest]
    fn year_template_with_round_token_is_rejected() {
        let entry = templated("https://x/{year}/{race_round}/results");
        let err = EndpointDescriptor::from_entry(
            "result",
            EndpointKind::YearDependent,
            &entry,
            &Defaults::default(),
        )
        .expect_err("{race_round} not allowed");
        match err {
            CatalogueError::UnexpectedPlaceholder { token, .. } => {
                assert_eq!(token, "{race_round}")
            }
            other => panic!("expected UnexpectedPlaceholder, found {:?}", other),
        }
    }

    #[rstest]
    fn static_entry_needs_url_and_no_template() {
        let defaults = Defaults::default();
        let missing = EndpointDescriptor::from_entry(
            "status",
            EndpointKind::Static,
            &EndpointEntry::default(),
            &defaults,
        );
        assert!(matches!(missing, Err(CatalogueError::MissingUrl { .. })));

        let entry = EndpointEntry {
            url: Some("https://x/status".to_string()),
            template_url: Some("https://x/{year}/status".to_string()),
            ..EndpointEntry::default()
        };
        let templated =
            EndpointDescriptor::from_entry("status", EndpointKind::Static, &entry, &defaults);
        assert!(matches!(
            templated,
            Err(CatalogueError::UnexpectedTemplate { .. })
        ));
    }

    #[rstest]
    #[case(Some(1949), None)]
    #[case(None, Some(31))]
    fn out_of_range_entry_defaults_are_rejected(
        #[case] current_year: Option<u32>,
        #[case] current_race: Option<u32>,
    ) {
        let mut entry = templated("https://x/{year}/{race_round}/pitstops");
        entry.race_dependent = true;
        entry.current_year = current_year;
        entry.current_race = current_race;
        let err = EndpointDescriptor::from_entry(
            "pitstop",
            EndpointKind::RaceSpecific,
            &entry,
            &Defaults::default(),
        )
        .expect_err("out of range");
        assert!(matches!(err, CatalogueError::InvalidDefault { .. }));
    }

    #[rstest]
    #[case(EndpointKind::Static, true, false, "year_dependent", false)]
    #[case(EndpointKind::Static, false, true, "race_dependent", false)]
    #[case(EndpointKind::YearDependent, false, false, "year_dependent", true)]
    #[case(EndpointKind::YearDependent, true, true, "race_dependent", false)]
    #[case(EndpointKind::RaceSpecific, false, true, "year_dependent", true)]
    #[case(EndpointKind::RaceSpecific, true, false, "race_dependent", true)]
    fn flags_contradicting_the_section_are_rejected(
        #[case] kind: EndpointKind,
        #[case] year_dependent: bool,
        #[case] race_dependent: bool,
        #[case] field: &str,
        #[case] expected: bool,
    ) {
        let entry = match kind {
            EndpointKind::Static => EndpointEntry {
                url: Some("https://x/status".to_string()),
                ..EndpointEntry::default()
            },
            EndpointKind::YearDependent => EndpointEntry {
                url: Some("https://x/1999/races".to_string()),
                template_url: Some("https://x/{year}/races".to_string()),
                ..EndpointEntry::default()
            },
            EndpointKind::RaceSpecific => EndpointEntry {
                template_url: Some("https://x/{year}/{race_round}/laps".to_string()),
                ..EndpointEntry::default()
            },
        };
        let entry = EndpointEntry {
            year_dependent,
            race_dependent,
            ..entry
        };
        let err = EndpointDescriptor::from_entry("x", kind, &entry, &Defaults::default())
            .expect_err("flags contradict the section");
        match err {
            CatalogueError::FlagMismatch {
                field: actual_field,
                expected: actual_expected,
                kind: actual_kind,
                ..
            } => {
                assert_eq!(actual_field, field);
                assert_eq!(actual_expected, expected);
                assert_eq!(actual_kind, kind);
            }
            other => panic!("expected FlagMismatch, found {:?}", other),
        }
    }

    #[rstest]
    fn builder_requires_a_name() {
        let err = ResolveRequest::builder()
            .year(2020u32)
            .finish()
            .expect_err("name is required");
        assert!(matches!(err, CatalogueError::IncompleteRequest { .. }));
    }

    #[rstest]
    fn builder_leaves_unset_parameters_empty() {
        let request = ResolveRequest::builder()
            .name("pitstop")
            .race_round(4u32)
            .finish()
            .expect("complete request");
        assert_eq!(request.name, "pitstop");
        assert_eq!(request.year, None);
        assert_eq!(request.race_round, Some(4));
    }
}
