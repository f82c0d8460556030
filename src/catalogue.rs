//! serde model of the endpoint catalogue (`config/race_config.yaml`).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::endpoint::{EndpointKind, MAX_YEAR, MIN_YEAR};
use crate::errors::CatalogueError;

/// The catalogue shipped with the crate.
pub const BUILTIN: &str = include_str!("../config/race_config.yaml");

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Catalogue {
    #[serde(default)]
    pub api_config: ApiConfig,
    #[serde(default)]
    pub static_endpoints: Section,
    #[serde(default)]
    pub year_dependent_endpoints: Section,
    #[serde(default)]
    pub race_specific_endpoints: Section,
    #[serde(default)]
    pub endpoint_summary: Option<EndpointSummary>,
    #[serde(default)]
    pub url_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub available_years: AvailableYears,
}

impl Catalogue {
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, CatalogueError> {
        serde_yaml::from_str(yaml).map_err(|cause| CatalogueError::Parse {
            origin: origin.to_string(),
            cause,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        info!("Loading endpoint catalogue from {}", path.display());
        let yaml = fs::read_to_string(path).map_err(|cause| CatalogueError::Io {
            path: path.display().to_string(),
            cause,
        })?;
        Self::from_yaml_str(&yaml, &path.display().to_string())
    }

    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_yaml_str(BUILTIN, "<builtin>")
    }

    pub fn section(&self, kind: EndpointKind) -> &Section {
        match kind {
            EndpointKind::Static => &self.static_endpoints,
            EndpointKind::YearDependent => &self.year_dependent_endpoints,
            EndpointKind::RaceSpecific => &self.race_specific_endpoints,
        }
    }

    /// All three endpoint sections, static first.
    pub fn sections(&self) -> impl Iterator<Item = (EndpointKind, &Section)> {
        EndpointKind::ALL
            .iter()
            .map(move |&kind| (kind, self.section(kind)))
    }

    /// Looks `name` up in every section, returning the first match.
    pub fn find(&self, name: &str) -> Option<(EndpointKind, &EndpointEntry)> {
        self.sections()
            .filter_map(|(kind, section)| section.get(name).map(|entry| (kind, entry)))
            .next()
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: String,
    pub current_year: Option<u32>,
    pub response_format: Option<String>,
    pub description: Option<String>,
}

/// One endpoint as written in the catalogue, before validation.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EndpointEntry {
    pub url: Option<String>,
    pub template_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub year_dependent: bool,
    #[serde(default)]
    pub race_dependent: bool,
    pub current_year: Option<u32>,
    pub current_race: Option<u32>,
}

/// Endpoint entries of one section, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section(Vec<(String, EndpointEntry)>);

impl Section {
    pub fn new(entries: Vec<(String, EndpointEntry)>) -> Self {
        Section(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EndpointEntry> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionVisitor;

        impl<'de> Visitor<'de> for SectionVisitor {
            type Value = Section;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of endpoint names to endpoint entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Section, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, EndpointEntry>()? {
                    entries.push((name, entry));
                }
                Ok(Section(entries))
            }
        }

        deserializer.deserialize_map(SectionVisitor)
    }
}

/// The catalogue's own index of its endpoints.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EndpointSummary {
    pub total_endpoints: Option<usize>,
    pub static_endpoints: Option<usize>,
    pub year_dependent_endpoints: Option<usize>,
    pub race_specific_endpoints: Option<usize>,
    #[serde(default)]
    pub static_endpoint_list: Vec<String>,
    #[serde(default)]
    pub endpoints_with_year_variable: Vec<String>,
    #[serde(default)]
    pub race_specific_endpoint_list: Vec<String>,
}

impl EndpointSummary {
    pub fn count(&self, kind: EndpointKind) -> Option<usize> {
        match kind {
            EndpointKind::Static => self.static_endpoints,
            EndpointKind::YearDependent => self.year_dependent_endpoints,
            EndpointKind::RaceSpecific => self.race_specific_endpoints,
        }
    }

    pub fn list(&self, kind: EndpointKind) -> &[String] {
        match kind {
            EndpointKind::Static => &self.static_endpoint_list,
            EndpointKind::YearDependent => &self.endpoints_with_year_variable,
            EndpointKind::RaceSpecific => &self.race_specific_endpoint_list,
        }
    }

    /// Catalogue key of the list for `kind`.
    pub fn list_key(kind: EndpointKind) -> &'static str {
        match kind {
            EndpointKind::Static => "static_endpoint_list",
            EndpointKind::YearDependent => "endpoints_with_year_variable",
            EndpointKind::RaceSpecific => "race_specific_endpoint_list",
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Defaults {
    pub year: u32,
    pub race_round: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            year: 2025,
            race_round: 1,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct AvailableYears {
    pub start_year: u32,
    pub end_year: u32,
    pub current_season: Option<u32>,
}

impl Default for AvailableYears {
    fn default() -> Self {
        AvailableYears {
            start_year: MIN_YEAR,
            end_year: MAX_YEAR,
            current_season: None,
        }
    }
}

impl AvailableYears {
    pub fn contains(&self, year: u32) -> bool {
        year >= self.start_year && year <= self.end_year
    }

    pub fn check(&self, year: u32) -> Result<u32, CatalogueError> {
        if self.contains(year) {
            Ok(year)
        } else {
            Err(CatalogueError::YearOutOfRange {
                year,
                start: self.start_year,
                end: self.end_year,
            })
        }
    }
}
