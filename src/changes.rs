use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

static RESOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{3,4}p|4k)\b").unwrap());

/// What changed between the old and the new name. Reporting only — these tags
/// never gate whether a rename happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeTag {
    #[serde(rename = "Add Year")]
    AddYear,
    #[serde(rename = "Correct Year")]
    CorrectYear,
    #[serde(rename = "Add Resolution")]
    AddResolution,
    #[serde(rename = "Correct Resolution")]
    CorrectResolution,
    #[serde(rename = "Remove Duplicate Tokens")]
    RemoveDuplicateTokens,
    #[serde(rename = "Reorder Tokens")]
    ReorderTokens,
    #[serde(rename = "Standardize Casing")]
    StandardizeCasing,
    #[serde(rename = "Normalize Format")]
    NormalizeFormat,
}

impl ChangeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTag::AddYear => "Add Year",
            ChangeTag::CorrectYear => "Correct Year",
            ChangeTag::AddResolution => "Add Resolution",
            ChangeTag::CorrectResolution => "Correct Resolution",
            ChangeTag::RemoveDuplicateTokens => "Remove Duplicate Tokens",
            ChangeTag::ReorderTokens => "Reorder Tokens",
            ChangeTag::StandardizeCasing => "Standardize Casing",
            ChangeTag::NormalizeFormat => "Normalize Format",
        }
    }
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render a tag list the way the progress lines show it.
pub fn describe(tags: &[ChangeTag]) -> String {
    tags.iter()
        .map(ChangeTag::as_str)
        .collect::<Vec<_>>()
        .join(" + ")
}

fn normalize_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_duplicate_tokens(tokens: &[&str]) -> bool {
    let mut seen = HashSet::new();
    tokens.iter().any(|t| !seen.insert(t.to_lowercase()))
}

fn tokens_reordered(old: &[&str], new: &[&str]) -> bool {
    let lower_old: Vec<String> = old.iter().map(|t| t.to_lowercase()).collect();
    let lower_new: Vec<String> = new.iter().map(|t| t.to_lowercase()).collect();
    if lower_old == lower_new {
        return false;
    }
    let mut sorted_old = lower_old;
    let mut sorted_new = lower_new;
    sorted_old.sort();
    sorted_new.sort();
    sorted_old == sorted_new
}

fn tokens_casing_changed(old: &[&str], new: &[&str]) -> bool {
    let lower_old: Vec<String> = old.iter().map(|t| t.to_lowercase()).collect();
    let lower_new: Vec<String> = new.iter().map(|t| t.to_lowercase()).collect();
    lower_old == lower_new && old != new
}

/// Classify the difference between the two names. `None` means the names are
/// effectively identical and the rename must be skipped.
pub fn detect_changes(old_name: &str, new_name: &str) -> Option<Vec<ChangeTag>> {
    if old_name == new_name {
        return None;
    }

    let old_norm = normalize_whitespace(old_name);
    let new_norm = normalize_whitespace(new_name);
    if old_norm == new_norm {
        return Some(vec![ChangeTag::NormalizeFormat]);
    }

    let mut tags = Vec::new();

    let old_year = YEAR_RE.find(old_name).map(|m| m.as_str());
    let new_year = YEAR_RE.find(new_name).map(|m| m.as_str());
    match (old_year, new_year) {
        (None, Some(_)) => tags.push(ChangeTag::AddYear),
        (Some(old), Some(new)) if old != new => tags.push(ChangeTag::CorrectYear),
        _ => {}
    }

    let old_res = RESOLUTION_RE.find(old_name).map(|m| m.as_str());
    let new_res = RESOLUTION_RE.find(new_name).map(|m| m.as_str());
    match (old_res, new_res) {
        (None, Some(_)) => tags.push(ChangeTag::AddResolution),
        (Some(old), Some(new)) if !old.eq_ignore_ascii_case(new) => {
            tags.push(ChangeTag::CorrectResolution)
        }
        _ => {}
    }

    let old_tokens: Vec<&str> = old_name.split_whitespace().collect();
    let new_tokens: Vec<&str> = new_name.split_whitespace().collect();

    if has_duplicate_tokens(&old_tokens) && !has_duplicate_tokens(&new_tokens) {
        tags.push(ChangeTag::RemoveDuplicateTokens);
    }
    if tokens_reordered(&old_tokens, &new_tokens) {
        tags.push(ChangeTag::ReorderTokens);
    }
    if tokens_casing_changed(&old_tokens, &new_tokens) {
        tags.push(ChangeTag::StandardizeCasing);
    }

    // The names differ even after whitespace normalization, so something
    // changed; without a specific tag the report still needs an explanation.
    if tags.is_empty() {
        tags.push(ChangeTag::NormalizeFormat);
    }

    Some(tags)
}
