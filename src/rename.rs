use crate::config::NamingConfig;
use crate::report::{REASON_SYNC_SUBTITLE, REASON_SYNC_VIDEO};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// A file renamed in lockstep with its directory, for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub old_name: String,
    pub new_name: String,
    pub reason: &'static str,
}

/// Rename a directory in place. An existing destination is a hard refusal —
/// the caller logs it and skips; nothing is ever overwritten.
pub fn rename_directory(dir: &Path, new_name: &str) -> Result<PathBuf> {
    let parent = dir.parent().context("directory has no parent")?;
    let destination = parent.join(new_name);
    if destination.exists() {
        bail!("destination already exists: {}", destination.display());
    }
    fs::rename(dir, &destination)
        .with_context(|| format!("failed to rename {}", dir.display()))?;
    Ok(destination)
}

fn sorted_video_files(dir: &Path, cfg: &NamingConfig) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| cfg.is_video_ext(ext))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Keep the main video file (and its `.srt` sibling) named after the
/// directory. Applies only when the directory holds exactly one video file
/// whose stem equals the old directory name. Destination conflicts are
/// detected before anything is touched, so a conflict fails the whole sync
/// step — the directory rename itself is never rolled back.
pub fn sync_main_video(
    dir: &Path,
    old_stem: &str,
    new_stem: &str,
    cfg: &NamingConfig,
) -> Result<Vec<SyncRecord>> {
    let videos = sorted_video_files(dir, cfg)?;
    let [video] = videos.as_slice() else {
        return Ok(Vec::new());
    };

    let stem = video
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if stem != old_stem {
        return Ok(Vec::new());
    }
    let Some(ext) = video.extension().and_then(|e| e.to_str()) else {
        return Ok(Vec::new());
    };

    let new_video = dir.join(format!("{}.{}", new_stem, ext));
    if new_video.exists() {
        bail!("destination video exists: {}", new_video.display());
    }

    let subtitle = video.with_extension("srt");
    let new_subtitle = dir.join(format!("{}.srt", new_stem));
    if subtitle.exists() && new_subtitle.exists() {
        bail!("destination subtitle exists: {}", new_subtitle.display());
    }

    let mut records = Vec::new();

    let old_video_name = video.file_name().unwrap_or_default().to_string_lossy().into_owned();
    fs::rename(video, &new_video)
        .with_context(|| format!("failed to rename {}", video.display()))?;
    records.push(SyncRecord {
        old_name: old_video_name,
        new_name: format!("{}.{}", new_stem, ext),
        reason: REASON_SYNC_VIDEO,
    });

    if subtitle.exists() {
        let old_subtitle_name = subtitle
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        fs::rename(&subtitle, &new_subtitle)
            .with_context(|| format!("failed to rename {}", subtitle.display()))?;
        records.push(SyncRecord {
            old_name: old_subtitle_name,
            new_name: format!("{}.srt", new_stem),
            reason: REASON_SYNC_SUBTITLE,
        });
    }

    Ok(records)
}
