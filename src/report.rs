use crate::changes::ChangeTag;
use crate::config::NamingConfig;
use crate::name::canonical_resolution;
use crate::tokens::{is_resolution_token, is_year_token};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

pub const RENAME_REPORT_FILE: &str = "movies_renaming_report.json";
pub const DUPLICATE_REPORT_FILE: &str = "duplicate_movies_report.json";

pub const REASON_SYNC_VIDEO: &str = "Sync Video With Directory";
pub const REASON_SYNC_SUBTITLE: &str = "Sync Subtitle With Video";

/// One renamed directory. Created once, never mutated, replayed backwards by
/// the reverter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirRecord {
    pub old_name: String,
    pub new_name: String,
    pub changes: Vec<ChangeTag>,
}

/// One file renamed in lockstep with its directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub old_name: String,
    pub new_name: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootRecords {
    pub directories_modified: Vec<DirRecord>,
    pub video_files_renamed: Vec<FileRecord>,
}

/// The run-scoped report, written once at the end of a run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(default)]
    pub generated_at: String,
    pub input_dirs: BTreeMap<String, RootRecords>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_root(&mut self, root: &Path) -> &mut RootRecords {
        self.input_dirs.entry(root.display().to_string()).or_default()
    }

    pub fn record_directory(&mut self, root: &Path, old_name: &str, new_name: &str, changes: Vec<ChangeTag>) {
        self.ensure_root(root).directories_modified.push(DirRecord {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            changes,
        });
    }

    pub fn record_file(&mut self, root: &Path, old_name: &str, new_name: &str, reason: &str) {
        self.ensure_root(root).video_files_renamed.push(FileRecord {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Stamp the report and write it pretty-printed. Renames are not
    /// transactional with reporting; the caller logs a failure and moves on.
    pub fn write(&mut self, path: &Path) -> Result<()> {
        self.generated_at = chrono::Local::now().to_rfc3339();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid report in {}", path.display()))
    }
}

/// The title with year, resolution and language stripped — the grouping key
/// for duplicate detection.
pub fn base_title(name: &str, cfg: &NamingConfig) -> String {
    name.split_whitespace()
        .filter(|word| {
            !is_year_token(word)
                && !is_resolution_token(word)
                && cfg.canonical_language(word).is_none()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub input_root: String,
    pub old_name: String,
    pub new_name: String,
    pub resolution: Option<String>,
    pub language: Option<String>,
}

/// Read-only view over the run report: base titles that exist in more than
/// one (resolution, language) combination. For manual review only.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    #[serde(default)]
    pub generated_at: String,
    pub duplicates: BTreeMap<String, Vec<DuplicateEntry>>,
}

impl DuplicateReport {
    pub fn from_run(report: &RunReport, cfg: &NamingConfig) -> Self {
        let mut groups: BTreeMap<String, Vec<DuplicateEntry>> = BTreeMap::new();
        for (root, records) in &report.input_dirs {
            for record in &records.directories_modified {
                let title = base_title(&record.new_name, cfg);
                if title.is_empty() {
                    continue;
                }
                let resolution = record
                    .new_name
                    .split_whitespace()
                    .find(|w| is_resolution_token(w))
                    .map(canonical_resolution);
                let language = record
                    .new_name
                    .split_whitespace()
                    .find_map(|w| cfg.canonical_language(w))
                    .map(String::from);
                groups.entry(title).or_default().push(DuplicateEntry {
                    input_root: root.clone(),
                    old_name: record.old_name.clone(),
                    new_name: record.new_name.clone(),
                    resolution,
                    language,
                });
            }
        }

        let duplicates = groups
            .into_iter()
            .filter(|(_, entries)| {
                let combos: HashSet<_> = entries
                    .iter()
                    .map(|e| (e.resolution.clone(), e.language.clone()))
                    .collect();
                entries.len() > 1 && combos.len() > 1
            })
            .collect();

        Self {
            generated_at: String::new(),
            duplicates,
        }
    }

    pub fn write(&mut self, path: &Path) -> Result<()> {
        self.generated_at = chrono::Local::now().to_rfc3339();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}
