use regex::Regex;

/// Vocabulary the pipeline recognizes. Passed explicitly into every component
/// so a deployment can swap language tags or extensions without touching code.
#[derive(Debug, Clone)]
pub struct NamingConfig {
    /// Canonical spellings for language suffixes. Matching is case-insensitive;
    /// output always uses the spelling listed here.
    pub languages: Vec<String>,
    /// Lowercase video extensions, without the dot.
    pub video_exts: Vec<String>,
    /// The AI-upscale marker, recognized only as this exact word sequence.
    pub upscale_group: Vec<String>,
    /// Top-level directories that are never renamed (extras, featurettes, ...).
    pub ignore_dirs: Regex,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            languages: ["Dual", "Dublado", "English", "Legendado", "Nacional"]
                .into_iter()
                .map(String::from)
                .collect(),
            video_exts: [
                "mkv", "mp4", "avi", "mov", "m4v", "webm", "ts", "flv", "mpg", "mpeg", "wmv",
                "m2ts",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            upscale_group: ["AI", "Upscaled", "60FPS"].into_iter().map(String::from).collect(),
            ignore_dirs: Regex::new(
                r"(?i)^(featurettes|extras|making[-_\s]?of|behind[ _-]?the[ _-]?scenes|specials)$",
            )
            .unwrap(),
        }
    }
}

impl NamingConfig {
    /// Canonical spelling for a language word, if it is one.
    pub fn canonical_language(&self, word: &str) -> Option<&str> {
        self.languages
            .iter()
            .find(|lang| lang.eq_ignore_ascii_case(word))
            .map(String::as_str)
    }

    pub fn is_video_ext(&self, ext: &str) -> bool {
        self.video_exts.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.is_match(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_language() {
        let cfg = NamingConfig::default();
        assert_eq!(cfg.canonical_language("dual"), Some("Dual"));
        assert_eq!(cfg.canonical_language("LEGENDADO"), Some("Legendado"));
        assert_eq!(cfg.canonical_language("French"), None);
    }

    #[test]
    fn test_is_video_ext() {
        let cfg = NamingConfig::default();
        assert!(cfg.is_video_ext("mkv"));
        assert!(cfg.is_video_ext("MP4"));
        assert!(!cfg.is_video_ext("srt"));
        assert!(!cfg.is_video_ext("jpg"));
    }

    #[test]
    fn test_is_ignored_dir() {
        let cfg = NamingConfig::default();
        assert!(cfg.is_ignored_dir("Featurettes"));
        assert!(cfg.is_ignored_dir("behind the scenes"));
        assert!(cfg.is_ignored_dir(" extras "));
        assert!(!cfg.is_ignored_dir("The Matrix 1999"));
    }
}
