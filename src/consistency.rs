//! Data-level checks over a parsed catalogue.
//!
//! Unlike `Registry::from_catalogue`, which stops at the first entry it cannot
//! use, `check` walks the whole document and reports every inconsistency it
//! finds. The shipped catalogue produces exactly one finding: its
//! `total_endpoints` disagrees with the per-category counts.

use std::collections::HashMap;
use std::fmt;

use crate::catalogue::{Catalogue, EndpointEntry, EndpointSummary};
use crate::endpoint::EndpointKind;
use crate::errors::CatalogueError;
use crate::template::{self, Bindings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// A static endpoint is flagged as year or race dependent.
    StaticFlag,
    /// A static endpoint carries a `template_url`.
    StaticTemplate,
    /// A templated endpoint has no `template_url`.
    MissingTemplate,
    /// A template lacks a token its section requires.
    MissingPlaceholder,
    /// A template's tokens disagree with its `year_dependent`/`race_dependent` flags.
    FlagMismatch,
    /// A template still has tokens after substituting its defaults.
    UnresolvedPlaceholder,
    /// `url` is not the template rendered with the entry's defaults.
    UrlMismatch,
    /// `total_endpoints` differs from the sum of the category counts.
    SummaryTotal,
    /// A category count differs from the number of entries in its section.
    CategoryCount,
    /// A summary list and its section name different endpoints.
    ListMismatch,
    /// A summary list names an endpoint that is not defined anywhere.
    UnknownListedEndpoint,
    /// The same name is declared in more than one section.
    DuplicateName,
    /// The current year/season values disagree or fall outside the range.
    YearDisagreement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub kind: FindingKind,
    /// Endpoint name or catalogue key the finding concerns.
    pub subject: String,
    pub message: String,
}

impl Finding {
    fn new<S: Into<String>>(kind: FindingKind, subject: S, message: String) -> Self {
        Finding {
            kind,
            subject: subject.into(),
            message,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Every inconsistency in `catalogue`, in document order.
pub fn check(catalogue: &Catalogue) -> Vec<Finding> {
    let mut findings = vec![];
    check_duplicates(catalogue, &mut findings);
    for (kind, section) in catalogue.sections() {
        for (name, entry) in section.iter() {
            check_entry(catalogue, name, kind, entry, &mut findings);
        }
    }
    if let Some(ref summary) = catalogue.endpoint_summary {
        check_summary(catalogue, summary, &mut findings);
    }
    check_years(catalogue, &mut findings);
    for finding in &findings {
        debug!("Catalogue finding: {}", finding);
    }
    findings
}

/// Fails when `strict` is set and there is anything to report.
pub fn enforce(findings: &[Finding], strict: bool) -> Result<(), CatalogueError> {
    if strict && !findings.is_empty() {
        return Err(CatalogueError::Inconsistent {
            count: findings.len(),
        });
    }
    Ok(())
}

fn check_duplicates(catalogue: &Catalogue, findings: &mut Vec<Finding>) {
    let mut seen: HashMap<&str, EndpointKind> = HashMap::new();
    for (kind, section) in catalogue.sections() {
        for name in section.names() {
            if let Some(first) = seen.get(name) {
                findings.push(Finding::new(
                    FindingKind::DuplicateName,
                    name,
                    format!("declared as both {} and {}", first, kind),
                ));
            } else {
                seen.insert(name, kind);
            }
        }
    }
}

fn check_entry(
    catalogue: &Catalogue,
    name: &str,
    kind: EndpointKind,
    entry: &EndpointEntry,
    findings: &mut Vec<Finding>,
) {
    if kind == EndpointKind::Static {
        if entry.year_dependent || entry.race_dependent {
            findings.push(Finding::new(
                FindingKind::StaticFlag,
                name,
                "static endpoint is flagged year_dependent or race_dependent".to_string(),
            ));
        }
        if entry.template_url.is_some() {
            findings.push(Finding::new(
                FindingKind::StaticTemplate,
                name,
                "static endpoint has a template_url".to_string(),
            ));
        }
        return;
    }

    let template_url = match entry.template_url {
        Some(ref template_url) => template_url,
        None => {
            findings.push(Finding::new(
                FindingKind::MissingTemplate,
                name,
                format!("{} endpoint has no template_url", kind),
            ));
            return;
        }
    };
    for token in kind.placeholders() {
        if !template_url.contains(token) {
            findings.push(Finding::new(
                FindingKind::MissingPlaceholder,
                name,
                format!("template_url {} does not contain {}", template_url, token),
            ));
        }
    }
    let flagged = [
        (template::YEAR, entry.year_dependent, "year_dependent"),
        (template::RACE_ROUND, entry.race_dependent, "race_dependent"),
    ];
    for &(token, flag, field) in flagged.iter() {
        if template_url.contains(token) != flag {
            findings.push(Finding::new(
                FindingKind::FlagMismatch,
                name,
                format!(
                    "{} is {} but template_url {} {}",
                    field,
                    flag,
                    if flag { "lacks" } else { "contains" },
                    token
                ),
            ));
        }
    }

    let bindings = Bindings {
        year: Some(entry.current_year.unwrap_or(catalogue.defaults.year)),
        race_round: Some(entry.current_race.unwrap_or(catalogue.defaults.race_round)),
        endpoint: None,
    };
    match template::render(template_url, &bindings) {
        Ok(rendered) => {
            if let Some(ref url) = entry.url {
                if *url != rendered {
                    findings.push(Finding::new(
                        FindingKind::UrlMismatch,
                        name,
                        format!("url {} but template renders {}", url, rendered),
                    ));
                }
            }
        }
        Err(e) => findings.push(Finding::new(
            FindingKind::UnresolvedPlaceholder,
            name,
            e.to_string(),
        )),
    }
}

fn check_summary(catalogue: &Catalogue, summary: &EndpointSummary, findings: &mut Vec<Finding>) {
    let mut counted = 0;
    for (kind, section) in catalogue.sections() {
        let count = summary.count(kind);
        if let Some(count) = count {
            if count != section.len() {
                findings.push(Finding::new(
                    FindingKind::CategoryCount,
                    format!("endpoint_summary.{}", kind.section()),
                    format!("states {} but the section defines {}", count, section.len()),
                ));
            }
        }
        counted += count.unwrap_or_else(|| section.len());

        let key = EndpointSummary::list_key(kind);
        let listed = summary.list(kind);
        for name in listed {
            match catalogue.find(name) {
                None => findings.push(Finding::new(
                    FindingKind::UnknownListedEndpoint,
                    name.as_str(),
                    format!("listed in {} but not defined", key),
                )),
                Some((declared, _)) if declared != kind => findings.push(Finding::new(
                    FindingKind::ListMismatch,
                    name.as_str(),
                    format!("listed in {} but declared as {}", key, declared),
                )),
                Some(_) => {}
            }
        }
        for name in section.names() {
            if !listed.iter().any(|n| n == name) {
                findings.push(Finding::new(
                    FindingKind::ListMismatch,
                    name,
                    format!("declared as {} but missing from {}", kind, key),
                ));
            }
        }
    }

    if let Some(total) = summary.total_endpoints {
        if total != counted {
            let defined: usize = catalogue.sections().map(|(_, s)| s.len()).sum();
            findings.push(Finding::new(
                FindingKind::SummaryTotal,
                "endpoint_summary.total_endpoints",
                format!(
                    "states {} but the category counts sum to {} ({} endpoints defined)",
                    total, counted, defined
                ),
            ));
        }
    }
}

fn check_years(catalogue: &Catalogue, findings: &mut Vec<Finding>) {
    let defaults = catalogue.defaults;
    let years = catalogue.available_years;
    let stated = [
        ("api_config.current_year", catalogue.api_config.current_year),
        ("available_years.current_season", years.current_season),
    ];
    for &(key, year) in stated.iter() {
        if let Some(year) = year {
            if year != defaults.year {
                findings.push(Finding::new(
                    FindingKind::YearDisagreement,
                    key,
                    format!("is {} but defaults.year is {}", year, defaults.year),
                ));
            }
        }
    }
    if !years.contains(defaults.year) {
        findings.push(Finding::new(
            FindingKind::YearDisagreement,
            "defaults.year",
            format!(
                "{} is outside available_years {}-{}",
                defaults.year, years.start_year, years.end_year
            ),
        ));
    }
}
