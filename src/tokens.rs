use crate::config::NamingConfig;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// Year tokens are word-bounded 4-digit sequences starting 19 or 20.
static YEAR_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}$").unwrap());

static WRAPPED_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(\[]((?:19|20)\d{2})[)\]]").unwrap());

static RESOLUTION_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(\d{3,4}p|4k)$").unwrap());

static RESOLUTION_FIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{3,4}p|4k)\b").unwrap());

// Release-source and audio-layout noise that never belongs in a title.
static SOURCE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bblu-?ray\b").unwrap());

static AUDIO_LAYOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[24567]\.1\b").unwrap());

// Abbreviation like S.W.A.T — inner dots are not separators. The trailing dot
// is deliberately left out so a glued year (S.W.A.T.2003) still splits off.
static ABBREV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:[A-Za-z]{1,3}\.){1,}[A-Za-z]{1,3}").unwrap());

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[._]+").unwrap());

const DOT_GUARD: char = '\u{1}';

pub fn is_year_token(word: &str) -> bool {
    YEAR_WORD_RE.is_match(word)
}

pub fn is_resolution_token(word: &str) -> bool {
    RESOLUTION_WORD_RE.is_match(word)
}

/// First resolution-shaped token anywhere in `text`, original casing.
pub fn find_resolution_token(text: &str) -> Option<String> {
    RESOLUTION_FIND_RE.find(text).map(|m| m.as_str().to_string())
}

/// A non-title marker, preserved verbatim and repositioned canonically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialTag {
    Imax(String),
    Hdr(String),
    Upscale(Vec<String>),
}

impl SpecialTag {
    pub fn words(&self) -> Vec<&str> {
        match self {
            SpecialTag::Imax(raw) | SpecialTag::Hdr(raw) => vec![raw.as_str()],
            SpecialTag::Upscale(words) => words.iter().map(String::as_str).collect(),
        }
    }
}

/// A year occurrence, with its position in the title+year word sequence so
/// sequel years can be put back exactly where they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearToken {
    pub value: String,
    pub index: usize,
}

/// Semantic tokens extracted from a raw directory name. Never mutated; every
/// transformation downstream produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTokens {
    pub title_words: Vec<String>,
    pub years: Vec<YearToken>,
    /// Original casing, canonicalized later.
    pub resolution: Option<String>,
    /// Already in canonical spelling from the configuration.
    pub language: Option<String>,
    pub special_tags: Vec<SpecialTag>,
    /// True when the raw name used dot/underscore scene-style separators.
    pub scene_separators: bool,
}

impl ParsedTokens {
    /// Title words with year tokens re-interleaved at their original positions.
    pub fn merged_words(&self) -> Vec<String> {
        let total = self.title_words.len() + self.years.len();
        let mut titles = self.title_words.iter();
        let mut out = Vec::with_capacity(total);
        for index in 0..total {
            if let Some(year) = self.years.iter().find(|y| y.index == index) {
                out.push(year.value.clone());
            } else if let Some(word) = titles.next() {
                out.push(word.clone());
            }
        }
        out
    }

    /// The year occupying the canonical pre-resolution slot: the last word of
    /// the title+year sequence, when that word is a year.
    pub fn trailing_year(&self) -> Option<&str> {
        let total = self.title_words.len() + self.years.len();
        self.years
            .last()
            .filter(|y| y.index + 1 == total)
            .map(|y| y.value.as_str())
    }

    pub fn year_values(&self) -> Vec<&str> {
        self.years.iter().map(|y| y.value.as_str()).collect()
    }

    /// Title used for metadata lookup, with every classified token stripped.
    pub fn lookup_title(&self) -> String {
        self.title_words.join(" ")
    }
}

fn guard_abbreviation_dots(text: &str) -> String {
    ABBREV_RE
        .replace_all(text, |caps: &Captures| caps[0].replace('.', &DOT_GUARD.to_string()))
        .into_owned()
}

/// Split a raw directory name into semantic tokens.
pub fn parse_name(raw: &str, cfg: &NamingConfig) -> ParsedTokens {
    let unwrapped = WRAPPED_YEAR_RE.replace_all(raw, "$1");
    let cleaned = AUDIO_LAYOUT_RE.replace_all(&unwrapped, " ");
    let cleaned = SOURCE_TAG_RE.replace_all(&cleaned, " ");
    let guarded = guard_abbreviation_dots(&cleaned);
    let spaced = SEPARATOR_RE.replace_all(&guarded, " ");
    let scene_separators = !raw.contains(' ') && spaced.as_ref() != guarded.as_str();
    let restored = spaced.replace(DOT_GUARD, ".");

    let mut words: Vec<String> = restored.split_whitespace().map(String::from).collect();

    // The upscale marker is atomic: only the exact word sequence counts, and
    // the captured group is never split.
    let group = &cfg.upscale_group;
    let mut upscale: Option<Vec<String>> = None;
    let mut kept = Vec::with_capacity(words.len());
    let mut i = 0;
    while i < words.len() {
        if !group.is_empty()
            && i + group.len() <= words.len()
            && words[i..i + group.len()]
                .iter()
                .zip(group)
                .all(|(w, g)| w.eq_ignore_ascii_case(g))
        {
            if upscale.is_none() {
                upscale = Some(words[i..i + group.len()].to_vec());
            }
            i += group.len();
            continue;
        }
        kept.push(words[i].clone());
        i += 1;
    }
    words = kept;

    let mut imax: Option<String> = None;
    let mut hdr: Option<String> = None;
    words.retain(|w| {
        if w.eq_ignore_ascii_case("IMAX") {
            if imax.is_none() {
                imax = Some(w.clone());
            }
            false
        } else if w.eq_ignore_ascii_case("HDR") {
            if hdr.is_none() {
                hdr = Some(w.clone());
            }
            false
        } else {
            true
        }
    });

    let mut language: Option<String> = None;
    words.retain(|w| match cfg.canonical_language(w) {
        Some(canonical) => {
            if language.is_none() {
                language = Some(canonical.to_string());
            }
            false
        }
        None => true,
    });

    let mut resolution: Option<String> = None;
    words.retain(|w| {
        if is_resolution_token(w) {
            if resolution.is_none() {
                resolution = Some(w.clone());
            }
            false
        } else {
            true
        }
    });

    let mut title_words = Vec::new();
    let mut years = Vec::new();
    for (index, word) in words.into_iter().enumerate() {
        if is_year_token(&word) {
            years.push(YearToken { value: word, index });
        } else {
            title_words.push(word);
        }
    }

    let mut special_tags = Vec::new();
    if let Some(raw) = imax {
        special_tags.push(SpecialTag::Imax(raw));
    }
    if let Some(raw) = hdr {
        special_tags.push(SpecialTag::Hdr(raw));
    }
    if let Some(group) = upscale {
        special_tags.push(SpecialTag::Upscale(group));
    }

    ParsedTokens {
        title_words,
        years,
        resolution,
        language,
        special_tags,
        scene_separators,
    }
}
