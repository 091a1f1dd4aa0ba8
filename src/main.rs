use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use moviar::{
    changes,
    config::NamingConfig,
    name, probe, rename,
    report::{DUPLICATE_REPORT_FILE, DuplicateReport, RENAME_REPORT_FILE, RunReport},
    resolve, revert,
    tmdb::TmdbClient,
    tokens,
};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled, settings::Style};
use walkdir::WalkDir;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize and rename movie directories under the given roots
    Rename {
        /// Roots whose immediate subdirectories are processed
        #[arg(required = true)]
        roots: Vec<PathBuf>,
        /// Show what would change without touching the filesystem
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Where to write the rename report
        #[arg(long, default_value = RENAME_REPORT_FILE)]
        report: PathBuf,
    },
    /// Revert the renames recorded in a previous run's report
    Revert {
        #[arg(long, default_value = RENAME_REPORT_FILE)]
        report: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Tabled)]
struct RenameRow {
    #[tabled(rename = "Old Name")]
    old: String,
    #[tabled(rename = "New Name")]
    new: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

#[derive(Debug, Default)]
struct RunSummary {
    processed: usize,
    renamed: usize,
    skipped: usize,
    failed: usize,
}

fn subdirectories(root: &Path) -> Option<Vec<walkdir::DirEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => entries.push(entry),
            Ok(_) => {}
            Err(err) => {
                eprintln!(
                    "{} cannot read {}: {}",
                    "warning:".yellow(),
                    root.display(),
                    err
                );
                return None;
            }
        }
    }
    Some(entries)
}

/// Process every immediate subdirectory of every root, strictly sequentially.
/// A failure inside one directory never aborts the run; only a root that
/// cannot be enumerated is abandoned.
async fn run_rename(
    roots: &[PathBuf],
    dry_run: bool,
    client: Option<&TmdbClient>,
    cfg: &NamingConfig,
    report: &mut RunReport,
) -> (RunSummary, Vec<RenameRow>) {
    let mut summary = RunSummary::default();
    let mut rows = Vec::new();

    for root in roots {
        if !root.exists() {
            eprintln!(
                "{} input path not found, skipping: {}",
                "warning:".yellow(),
                root.display()
            );
            continue;
        }
        let Some(entries) = subdirectories(root) else {
            continue;
        };

        report.ensure_root(root);
        let total = entries.len();
        for (idx, entry) in entries.iter().enumerate() {
            let old_name = entry.file_name().to_string_lossy().into_owned();
            println!(
                "{} {}/{}: {}",
                "Processing".green(),
                idx + 1,
                total,
                old_name.cyan()
            );
            summary.processed += 1;

            if cfg.is_ignored_dir(&old_name) {
                summary.skipped += 1;
                continue;
            }

            let parsed = tokens::parse_name(&old_name, cfg);
            if parsed.title_words.is_empty() {
                println!("  {} empty title after cleanup", "skip:".yellow());
                summary.skipped += 1;
                continue;
            }

            let year = resolve::resolve_year(client, &parsed.lookup_title(), &parsed).await;
            let resolution = match &parsed.resolution {
                Some(resolution) => Some(resolution.clone()),
                None => probe::probe_resolution(entry.path(), cfg),
            };

            let Some(new_name) = name::canonicalize(&parsed, &year, resolution.as_deref()) else {
                summary.skipped += 1;
                continue;
            };
            if new_name == old_name {
                summary.skipped += 1;
                continue;
            }
            let Some(tags) = changes::detect_changes(&old_name, &new_name) else {
                summary.skipped += 1;
                continue;
            };

            println!(
                "  {} ({}): {} -> {}",
                (if dry_run { "would rename" } else { "renaming" }).yellow(),
                changes::describe(&tags),
                old_name.cyan(),
                new_name.green()
            );

            if dry_run {
                rows.push(RenameRow {
                    old: old_name,
                    new: new_name,
                    changes: changes::describe(&tags),
                });
                summary.renamed += 1;
                continue;
            }

            let new_path = match rename::rename_directory(entry.path(), &new_name) {
                Ok(path) => path,
                Err(err) => {
                    eprintln!("  {} {}", "error:".red(), err);
                    summary.failed += 1;
                    continue;
                }
            };
            report.record_directory(root, &old_name, &new_name, tags.clone());
            summary.renamed += 1;

            // A sync failure only loses the sync step, never the rename.
            match rename::sync_main_video(&new_path, &old_name, &new_name, cfg) {
                Ok(records) => {
                    for record in records {
                        report.record_file(root, &record.old_name, &record.new_name, record.reason);
                    }
                }
                Err(err) => eprintln!("  {} video sync: {}", "error:".red(), err),
            }

            rows.push(RenameRow {
                old: old_name,
                new: new_name,
                changes: changes::describe(&tags),
            });
        }
        println!();
    }

    (summary, rows)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match args.command {
        Commands::Rename {
            roots,
            dry_run,
            yes,
            report,
        } => {
            let cfg = NamingConfig::default();
            let client = match TmdbClient::new() {
                Ok(client) => Some(client),
                Err(_) => {
                    eprintln!(
                        "{} TMDB_API_TOKEN not set; release years come from names only",
                        "warning:".yellow()
                    );
                    None
                }
            };

            if !dry_run && !yes {
                let prompt = format!("Rename directories under {} root(s)?", roots.len());
                if !inquire::Confirm::new(&prompt).with_default(false).prompt()? {
                    return Ok(());
                }
            }

            let mut run_report = RunReport::new();
            let (summary, rows) =
                run_rename(&roots, dry_run, client.as_ref(), &cfg, &mut run_report).await;

            if !rows.is_empty() {
                let mut table = Table::new(rows);
                table.with(Style::sharp());
                println!("{table}");
            }
            println!(
                "{} {} processed, {} renamed, {} skipped, {} failed",
                "Done:".green().bold(),
                summary.processed,
                summary.renamed,
                summary.skipped,
                summary.failed
            );

            if dry_run {
                return Ok(());
            }

            if let Err(err) = run_report.write(&report) {
                eprintln!("{} {}", "error:".red(), err);
            }
            let mut duplicates = DuplicateReport::from_run(&run_report, &cfg);
            let groups = duplicates.duplicates.len();
            if let Err(err) = duplicates.write(Path::new(DUPLICATE_REPORT_FILE)) {
                eprintln!("{} {}", "error:".red(), err);
            }
            if groups > 0 {
                let note = format!(
                    "{} base title(s) exist in more than one resolution/language \
                     combination; see {} for manual review.",
                    groups, DUPLICATE_REPORT_FILE
                );
                println!("{}", textwrap::fill(&note, textwrap::termwidth().min(100)));
            }
            Ok(())
        }
        Commands::Revert { report } => {
            let report = RunReport::read(&report)?;
            let counters = revert::revert_run(&report);
            revert::print_summary(&counters);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn movie_dir(root: &Path, name: &str, with_video: bool) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        if with_video {
            File::create(dir.join(format!("{}.mkv", name))).unwrap();
            File::create(dir.join(format!("{}.srt", name))).unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_run_rename_offline() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        movie_dir(&root, "the.matrix.1999.1080p.dual", true);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, rows) = run_rename(&[root.clone()], false, None, &cfg, &mut report).await;

        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(rows.len(), 1);

        let renamed = root.join("The Matrix 1999 1080p Dual");
        assert!(renamed.exists());
        assert!(renamed.join("The Matrix 1999 1080p Dual.mkv").exists());
        assert!(renamed.join("The Matrix 1999 1080p Dual.srt").exists());

        let records = &report.input_dirs[&root.display().to_string()];
        assert_eq!(records.directories_modified.len(), 1);
        assert_eq!(records.directories_modified[0].old_name, "the.matrix.1999.1080p.dual");
        assert_eq!(records.video_files_renamed.len(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        let dir = movie_dir(&root, "the.matrix.1999.1080p.dual", true);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, rows) = run_rename(&[root.clone()], true, None, &cfg, &mut report).await;

        assert_eq!(summary.renamed, 1);
        assert_eq!(rows.len(), 1);
        assert!(dir.exists());
        assert!(!root.join("The Matrix 1999 1080p Dual").exists());
        let records = &report.input_dirs[&root.display().to_string()];
        assert!(records.directories_modified.is_empty());
    }

    #[tokio::test]
    async fn test_canonical_directory_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        movie_dir(&root, "Movie 2020 2160p Dual", false);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, rows) = run_rename(&[root.clone()], false, None, &cfg, &mut report).await;

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.skipped, 1);
        assert!(rows.is_empty());
        assert!(root.join("Movie 2020 2160p Dual").exists());
    }

    #[tokio::test]
    async fn test_ignored_and_empty_title_directories_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        movie_dir(&root, "Featurettes", false);
        movie_dir(&root, "1080p Dual", false);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, _) = run_rename(&[root.clone()], false, None, &cfg, &mut report).await;

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.skipped, 2);
        assert!(root.join("Featurettes").exists());
        assert!(root.join("1080p Dual").exists());
    }

    #[tokio::test]
    async fn test_destination_conflict_is_a_logged_skip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        movie_dir(&root, "Movie (2020) 2160p", false);
        movie_dir(&root, "Movie 2020 2160p", false);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, _) = run_rename(&[root.clone()], false, None, &cfg, &mut report).await;

        assert_eq!(summary.failed, 1);
        assert!(root.join("Movie (2020) 2160p").exists());
        assert!(root.join("Movie 2020 2160p").exists());
        let records = &report.input_dirs[&root.display().to_string()];
        assert!(records.directories_modified.is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_skipped() {
        let temp = TempDir::new().unwrap();
        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let missing = temp.path().join("nope");
        let (summary, _) = run_rename(&[missing], false, None, &cfg, &mut report).await;
        assert_eq!(summary.processed, 0);
    }

    #[tokio::test]
    async fn test_rename_then_revert_round_trip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("movies");
        movie_dir(&root, "the.matrix.1999.1080p.dual", true);
        movie_dir(&root, "Movie (2020) 4K", false);

        let cfg = NamingConfig::default();
        let mut report = RunReport::new();
        let (summary, _) = run_rename(&[root.clone()], false, None, &cfg, &mut report).await;
        assert_eq!(summary.renamed, 2);

        let counters = revert::revert_run(&report);
        assert_eq!(counters.reverted_now, counters.expected);

        assert!(root.join("the.matrix.1999.1080p.dual").exists());
        assert!(
            root.join("the.matrix.1999.1080p.dual")
                .join("the.matrix.1999.1080p.dual.mkv")
                .exists()
        );
        assert!(root.join("Movie (2020) 4K").exists());
        assert!(!root.join("The Matrix 1999 1080p Dual").exists());
    }
}
