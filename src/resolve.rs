use crate::tmdb::TmdbClient;
use crate::tokens::ParsedTokens;

/// Where the authoritative release year came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    Metadata,
    Filename,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedYear {
    pub value: Option<String>,
    pub source: YearSource,
}

impl ResolvedYear {
    pub fn metadata(year: &str) -> Self {
        Self {
            value: Some(year.to_string()),
            source: YearSource::Metadata,
        }
    }

    pub fn filename(year: &str) -> Self {
        Self {
            value: Some(year.to_string()),
            source: YearSource::Filename,
        }
    }

    pub fn none() -> Self {
        Self {
            value: None,
            source: YearSource::None,
        }
    }

    /// Best-effort year without any metadata: the single year when there is
    /// exactly one, the pre-resolution year when there are several, otherwise
    /// nothing (inline years stay where they are).
    pub fn from_filename(tokens: &ParsedTokens) -> Self {
        match tokens.years.len() {
            0 => Self::none(),
            1 => Self::filename(&tokens.years[0].value),
            _ => match tokens.trailing_year() {
                Some(year) => Self::filename(year),
                None => Self::none(),
            },
        }
    }
}

/// Outcome of the first (unfiltered) lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Resolved(ResolvedYear),
    /// A single filename year disagrees with the top candidate; a second,
    /// year-filtered query must confirm the candidate before it may win.
    Confirm { existing: String, candidate: String },
}

/// Disambiguate using the top candidate of an unfiltered search.
pub fn decide(tokens: &ParsedTokens, top: Option<&str>) -> Decision {
    let existing = tokens.year_values();
    match existing.len() {
        // Nothing to protect: take the top candidate verbatim.
        0 => Decision::Resolved(match top {
            Some(year) => ResolvedYear::metadata(year),
            None => ResolvedYear::none(),
        }),
        1 => {
            let year = existing[0];
            match top {
                None => Decision::Resolved(ResolvedYear::filename(year)),
                Some(m) if m == year => Decision::Resolved(ResolvedYear::metadata(year)),
                Some(m) => Decision::Confirm {
                    existing: year.to_string(),
                    candidate: m.to_string(),
                },
            }
        }
        // Two or more years: only the trailing (pre-resolution) slot may be
        // confirmed or corrected; sequel numbering is never reinterpreted.
        _ => {
            let trailing = tokens.trailing_year();
            let fallback = || match trailing {
                Some(year) => ResolvedYear::filename(year),
                None => ResolvedYear::none(),
            };
            Decision::Resolved(match top {
                None => fallback(),
                Some(m) if trailing == Some(m) => ResolvedYear::metadata(m),
                Some(m) if existing.contains(&m) => fallback(),
                Some(m) => ResolvedYear::metadata(m),
            })
        }
    }
}

/// Resolve a single-year disagreement against the year-filtered candidates.
/// The candidate wins only on an exact-year match; otherwise the filename
/// year stands.
pub fn decide_confirmed(existing: &str, candidate: &str, filtered: &[String]) -> ResolvedYear {
    if filtered.iter().any(|year| year == candidate) {
        ResolvedYear::metadata(candidate)
    } else {
        ResolvedYear::filename(existing)
    }
}

/// Full resolution against TMDb. Lookup failures and a missing client both
/// degrade to the filename-derived year; this never errors.
pub async fn resolve_year(
    client: Option<&TmdbClient>,
    title: &str,
    tokens: &ParsedTokens,
) -> ResolvedYear {
    let Some(client) = client else {
        return ResolvedYear::from_filename(tokens);
    };
    let candidates = client.candidate_years(title, None).await;
    match decide(tokens, candidates.first().map(String::as_str)) {
        Decision::Resolved(resolved) => resolved,
        Decision::Confirm { existing, candidate } => {
            let filtered = client.candidate_years(title, Some(&existing)).await;
            decide_confirmed(&existing, &candidate, &filtered)
        }
    }
}
