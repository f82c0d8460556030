//! Placeholder handling for template URLs.
//!
//! Templates use `{name}` tokens. Only `{year}`, `{race_round}` and, in the
//! generic url patterns, `{endpoint}` are ever substituted; anything else
//! surviving substitution is an error.

use crate::errors::CatalogueError;

pub const YEAR: &str = "{year}";
pub const RACE_ROUND: &str = "{race_round}";
pub const ENDPOINT: &str = "{endpoint}";

/// Values to substitute. `None` leaves the token in place.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Bindings<'a> {
    pub year: Option<u32>,
    pub race_round: Option<u32>,
    pub endpoint: Option<&'a str>,
}

/// Every `{...}` token in `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = vec![];
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let tail = &rest[open..];
        match tail.find('}') {
            Some(close) => {
                found.push(&tail[..=close]);
                rest = &tail[close + 1..];
            }
            None => break,
        }
    }
    found
}

pub fn substitute(template: &str, bindings: &Bindings) -> String {
    let mut url = template.to_string();
    if let Some(year) = bindings.year {
        url = url.replace(YEAR, &year.to_string());
    }
    if let Some(round) = bindings.race_round {
        url = url.replace(RACE_ROUND, &round.to_string());
    }
    if let Some(endpoint) = bindings.endpoint {
        url = url.replace(ENDPOINT, endpoint);
    }
    url
}

/// Substitutes `bindings` and fails if any token is left over.
pub fn render(template: &str, bindings: &Bindings) -> Result<String, CatalogueError> {
    let url = substitute(template, bindings);
    if let Some(token) = placeholders(&url).first() {
        return Err(CatalogueError::UnresolvedPlaceholder {
            template: template.to_string(),
            token: token.to_string(),
        });
    }
    Ok(url)
}
