use crate::report::{DirRecord, FileRecord, RunReport};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Aggregate outcome of replaying a report backwards.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RevertCounters {
    pub expected: usize,
    pub reverted_now: usize,
    pub already_reverted: usize,
    pub missing: usize,
    pub conflicts: usize,
}

impl RevertCounters {
    pub fn verified(&self) -> usize {
        self.reverted_now + self.already_reverted
    }
}

fn safe_rename(src: &Path, dst: &Path, counters: &mut RevertCounters) {
    if !src.exists() {
        if dst.exists() {
            counters.already_reverted += 1;
        } else {
            counters.missing += 1;
            println!("{} not found: {}", "[SKIP]".yellow(), src.display());
        }
        return;
    }
    if dst.exists() {
        counters.conflicts += 1;
        println!("{} destination already exists: {}", "[SKIP]".yellow(), dst.display());
        return;
    }
    match fs::rename(src, dst) {
        Ok(()) => {
            counters.reverted_now += 1;
            println!("{} reverted: {} -> {}", "[OK]".green(), src.display(), dst.display());
        }
        Err(err) => {
            counters.conflicts += 1;
            eprintln!("{} failed to revert {}: {}", "[SKIP]".red(), src.display(), err);
        }
    }
}

/// A synced file may sit inside the directory under its new name (directory
/// not yet reverted), under its old name (directory reverted first), or at
/// the root for records written by older runs.
fn revert_file_entry(
    base: &Path,
    record: &FileRecord,
    dirs: &[DirRecord],
    counters: &mut RevertCounters,
) {
    let candidates: Vec<(PathBuf, PathBuf)> = dirs
        .iter()
        .flat_map(|dir| {
            [
                (
                    base.join(&dir.new_name).join(&record.new_name),
                    base.join(&dir.new_name).join(&record.old_name),
                ),
                (
                    base.join(&dir.old_name).join(&record.new_name),
                    base.join(&dir.old_name).join(&record.old_name),
                ),
            ]
        })
        .chain([(base.join(&record.new_name), base.join(&record.old_name))])
        .collect();

    for (src, dst) in candidates {
        if src.exists() || dst.exists() {
            safe_rename(&src, &dst, counters);
            return;
        }
    }

    counters.missing += 1;
    println!("{} unresolved entry: {}", "[SKIP]".yellow(), record.new_name);
}

/// Replay every record of the report backwards: files first (while their
/// directories still carry the new names), then the directories themselves.
pub fn revert_run(report: &RunReport) -> RevertCounters {
    let mut counters = RevertCounters::default();

    for (base, records) in &report.input_dirs {
        let base = Path::new(base);
        counters.expected +=
            records.video_files_renamed.len() + records.directories_modified.len();

        for record in &records.video_files_renamed {
            revert_file_entry(base, record, &records.directories_modified, &mut counters);
        }
        for record in &records.directories_modified {
            safe_rename(
                &base.join(&record.new_name),
                &base.join(&record.old_name),
                &mut counters,
            );
        }
    }

    counters
}

pub fn print_summary(counters: &RevertCounters) {
    println!();
    println!("{}", "========== SUMMARY ==========".bold());
    println!("Expected operations : {}", counters.expected);
    println!("Reverted now        : {}", counters.reverted_now);
    println!("Already reverted    : {}", counters.already_reverted);
    println!("Missing             : {}", counters.missing);
    println!("Conflicts           : {}", counters.conflicts);
    println!();
    println!("Verified total      : {}", counters.verified());
    if counters.verified() == counters.expected {
        println!("Status              : {}", "OK — nothing missing".green());
    } else {
        println!("Status              : {}", "WARNING — mismatch detected".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{REASON_SYNC_SUBTITLE, REASON_SYNC_VIDEO};
    use std::fs::File;
    use tempfile::TempDir;

    fn report_for(root: &Path) -> RunReport {
        let mut report = RunReport::new();
        report.record_directory(root, "old dir", "new dir", vec![]);
        report.record_file(root, "old dir.mkv", "new dir.mkv", REASON_SYNC_VIDEO);
        report.record_file(root, "old dir.srt", "new dir.srt", REASON_SYNC_SUBTITLE);
        report
    }

    #[test]
    fn test_full_revert_restores_original_names() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("new dir");
        fs::create_dir(&dir).unwrap();
        File::create(dir.join("new dir.mkv")).unwrap();
        File::create(dir.join("new dir.srt")).unwrap();

        let counters = revert_run(&report_for(root.path()));
        assert_eq!(counters.expected, 3);
        assert_eq!(counters.reverted_now, 3);
        assert_eq!(counters.missing, 0);
        assert_eq!(counters.conflicts, 0);

        let restored = root.path().join("old dir");
        assert!(restored.exists());
        assert!(restored.join("old dir.mkv").exists());
        assert!(restored.join("old dir.srt").exists());
        assert!(!root.path().join("new dir").exists());
    }

    #[test]
    fn test_already_reverted_is_not_an_error() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("old dir");
        fs::create_dir(&dir).unwrap();
        File::create(dir.join("old dir.mkv")).unwrap();
        File::create(dir.join("old dir.srt")).unwrap();

        let counters = revert_run(&report_for(root.path()));
        assert_eq!(counters.already_reverted, 3);
        assert_eq!(counters.reverted_now, 0);
        assert_eq!(counters.verified(), counters.expected);
    }

    #[test]
    fn test_missing_entries_are_counted() {
        let root = TempDir::new().unwrap();
        let counters = revert_run(&report_for(root.path()));
        assert_eq!(counters.missing, 3);
        assert_eq!(counters.reverted_now, 0);
    }

    #[test]
    fn test_directory_conflict_is_skipped() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("new dir")).unwrap();
        fs::create_dir(root.path().join("old dir")).unwrap();

        let mut report = RunReport::new();
        report.record_directory(root.path(), "old dir", "new dir", vec![]);

        let counters = revert_run(&report);
        assert_eq!(counters.conflicts, 1);
        assert!(root.path().join("new dir").exists());
    }

    #[test]
    fn test_file_revert_after_directory_was_reverted() {
        // The directory already carries its old name; the file inside does not.
        let root = TempDir::new().unwrap();
        let dir = root.path().join("old dir");
        fs::create_dir(&dir).unwrap();
        File::create(dir.join("new dir.mkv")).unwrap();

        let mut report = RunReport::new();
        report.record_directory(root.path(), "old dir", "new dir", vec![]);
        report.record_file(root.path(), "old dir.mkv", "new dir.mkv", REASON_SYNC_VIDEO);

        let counters = revert_run(&report);
        assert!(dir.join("old dir.mkv").exists());
        assert_eq!(counters.reverted_now, 1);
        // The directory record itself counts as already reverted.
        assert_eq!(counters.already_reverted, 1);
    }
}
