//! Error type shared by catalogue loading, registry construction and URL
//! resolution.

use std::io;

use crate::endpoint::EndpointKind;

#[derive(Debug, Fail)]
pub enum CatalogueError {
    #[fail(display = "failed to read {}: {}", path, cause)]
    Io {
        path: String,
        #[fail(cause)]
        cause: io::Error,
    },
    #[fail(display = "failed to parse catalogue {}: {}", origin, cause)]
    Parse {
        origin: String,
        #[fail(cause)]
        cause: serde_yaml::Error,
    },
    #[fail(display = "failed to parse settings {}: {}", origin, cause)]
    Settings {
        origin: String,
        #[fail(cause)]
        cause: toml::de::Error,
    },
    #[fail(display = "endpoint '{}' is defined in both {} and {}", name, first, second)]
    DuplicateEndpoint {
        name: String,
        first: EndpointKind,
        second: EndpointKind,
    },
    #[fail(display = "unknown endpoint '{}'", name)]
    UnknownEndpoint { name: String },
    #[fail(display = "unknown url pattern '{}'", name)]
    UnknownPattern { name: String },
    #[fail(display = "{} endpoint '{}' has no template_url", kind, name)]
    MissingTemplate { name: String, kind: EndpointKind },
    #[fail(display = "static endpoint '{}' has no url", name)]
    MissingUrl { name: String },
    #[fail(display = "static endpoint '{}' must not carry a template_url", name)]
    UnexpectedTemplate { name: String },
    #[fail(display = "template for '{}' is missing {}", name, token)]
    MissingPlaceholder { name: String, token: &'static str },
    #[fail(display = "template for '{}' contains unexpected placeholder {}", name, token)]
    UnexpectedPlaceholder { name: String, token: String },
    #[fail(display = "{} endpoint '{}' must have {} set to {}", kind, name, field, expected)]
    FlagMismatch {
        name: String,
        kind: EndpointKind,
        field: &'static str,
        expected: bool,
    },
    #[fail(display = "url pattern '{}' needs a non-empty endpoint segment", pattern)]
    EmptyEndpointSegment { pattern: String },
    #[fail(display = "{} inconsistencies found in the catalogue", count)]
    Inconsistent { count: usize },
    #[fail(display = "placeholder {} left unresolved in {}", token, template)]
    UnresolvedPlaceholder { template: String, token: String },
    #[fail(display = "year {} is outside the available range {}-{}", year, start, end)]
    YearOutOfRange { year: u32, start: u32, end: u32 },
    #[fail(display = "race round {} is outside 1-{}", round, max)]
    RoundOutOfRange { round: u32, max: u32 },
    #[fail(display = "{} {} for '{}' is outside {}-{}", field, value, name, min, max)]
    InvalidDefault {
        name: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[fail(display = "incomplete resolve request: {}", reason)]
    IncompleteRequest { reason: String },
}
