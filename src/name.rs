use crate::resolve::ResolvedYear;
use crate::tokens::ParsedTokens;
use sanitize_filename::sanitize;

/// Canonical form of a resolution token: `4k`/`4K` become `2160p`, everything
/// else is lowercased.
pub fn canonical_resolution(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("4k") {
        "2160p".to_string()
    } else {
        raw.to_lowercase()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reassemble tokens into the canonical name:
/// `Title Year Resolution [IMAX] [HDR] [AI-group] Language`, absent parts
/// omitted. Returns `None` when no title remains — the entry must be skipped.
///
/// Year placement: a single year token is replaced by the canonical year slot
/// wherever it sat; with several year tokens only the trailing one is
/// consumed, so sequel years embedded in the title stay exactly where they
/// were. Running tokenize + canonicalize on the result is a no-op.
pub fn canonicalize(
    tokens: &ParsedTokens,
    year: &ResolvedYear,
    resolution: Option<&str>,
) -> Option<String> {
    if tokens.title_words.is_empty() {
        return None;
    }

    let mut words = tokens.merged_words();
    if year.value.is_some() {
        match tokens.years.len() {
            0 => {}
            1 => words.retain(|w| *w != tokens.years[0].value),
            _ => {
                if tokens.trailing_year().is_some() {
                    words.pop();
                }
            }
        }
    }

    // Scene-style names arrive all-lowercase more often than not; names the
    // user spaced by hand keep their casing as given.
    if tokens.scene_separators {
        words = words.iter().map(|w| capitalize(w)).collect();
    }

    let mut parts: Vec<String> = Vec::new();
    if !words.is_empty() {
        parts.push(words.join(" "));
    }
    if let Some(value) = &year.value {
        parts.push(value.clone());
    }
    if let Some(raw) = resolution {
        parts.push(canonical_resolution(raw));
    }
    for tag in &tokens.special_tags {
        for word in tag.words() {
            parts.push(word.to_string());
        }
    }
    if let Some(language) = &tokens.language {
        parts.push(language.clone());
    }

    let joined = parts.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    Some(sanitize(collapsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::tokens::parse_name;

    /// The offline pipeline: tokenize, resolve from the filename alone,
    /// canonicalize.
    fn rebuild(name: &str) -> Option<String> {
        let cfg = NamingConfig::default();
        let tokens = parse_name(name, &cfg);
        let year = ResolvedYear::from_filename(&tokens);
        let resolution = tokens.resolution.clone();
        canonicalize(&tokens, &year, resolution.as_deref())
    }

    #[test]
    fn test_scene_release_is_normalized() {
        assert_eq!(
            rebuild("the.matrix.1999.1080p.dual").as_deref(),
            Some("The Matrix 1999 1080p Dual")
        );
    }

    #[test]
    fn test_wrapped_year_and_4k() {
        assert_eq!(rebuild("Movie (2020) 4K").as_deref(), Some("Movie 2020 2160p"));
    }

    #[test]
    fn test_resolution_casing() {
        assert_eq!(rebuild("Movie 2020 1080P").as_deref(), Some("Movie 2020 1080p"));
        assert_eq!(rebuild("Movie 2020 4k").as_deref(), Some("Movie 2020 2160p"));
    }

    #[test]
    fn test_spaced_title_keeps_casing() {
        assert_eq!(
            rebuild("lord of the rings 2001 1080p").as_deref(),
            Some("lord of the rings 2001 1080p")
        );
    }

    #[test]
    fn test_sequel_number_is_untouched() {
        assert_eq!(
            rebuild("Movie Part 2 1999 1080p").as_deref(),
            Some("Movie Part 2 1999 1080p")
        );
    }

    #[test]
    fn test_embedded_year_stays_in_title() {
        assert_eq!(
            rebuild("2001 A Space Odyssey 1968 1080p").as_deref(),
            Some("2001 A Space Odyssey 1968 1080p")
        );
    }

    #[test]
    fn test_metadata_year_corrects_single_year() {
        let cfg = NamingConfig::default();
        let tokens = parse_name("Movie 1998 1080p", &cfg);
        let name = canonicalize(&tokens, &ResolvedYear::metadata("1999"), Some("1080p"));
        assert_eq!(name.as_deref(), Some("Movie 1999 1080p"));
    }

    #[test]
    fn test_metadata_year_appended_when_absent() {
        let cfg = NamingConfig::default();
        let tokens = parse_name("The Matrix 1080p", &cfg);
        let name = canonicalize(&tokens, &ResolvedYear::metadata("1999"), Some("1080p"));
        assert_eq!(name.as_deref(), Some("The Matrix 1999 1080p"));
    }

    #[test]
    fn test_special_tags_in_canonical_order() {
        assert_eq!(
            rebuild("Movie HDR 2020 AI Upscaled 60FPS IMAX 1080p Dual").as_deref(),
            Some("Movie 2020 1080p IMAX HDR AI Upscaled 60FPS Dual")
        );
    }

    #[test]
    fn test_language_canonical_spelling() {
        assert_eq!(
            rebuild("Movie 2020 1080p LEGENDADO").as_deref(),
            Some("Movie 2020 1080p Legendado")
        );
    }

    #[test]
    fn test_title_only_name_passes_through() {
        assert_eq!(rebuild("Some Random Folder").as_deref(), Some("Some Random Folder"));
    }

    #[test]
    fn test_empty_title_yields_none() {
        assert_eq!(rebuild("1080p Dual"), None);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(rebuild("Movie   2020    1080p").as_deref(), Some("Movie 2020 1080p"));
    }

    #[test]
    fn test_idempotence() {
        for name in [
            "the.matrix.1999.1080p.dual",
            "Movie (2020) 4K",
            "Movie Part 2 1999 1080p",
            "2001 A Space Odyssey 1968 1080p",
            "1984 Movie 2010 Remaster 1080p",
            "Movie HDR 2020 AI Upscaled 60FPS IMAX 1080p Dual",
            "Movie 720p 1080p 2020",
            "Movie Dual Dublado 2020 1080p",
            "S.W.A.T.2003.1080p",
            "Some Random Folder",
        ] {
            let once = rebuild(name).unwrap();
            let twice = rebuild(&once).unwrap();
            assert_eq!(once, twice, "second pass changed {:?}", name);
        }
    }
}
