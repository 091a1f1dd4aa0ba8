use crate::config::NamingConfig;
use crate::tokens::find_resolution_token;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Map a pixel height to the canonical resolution label.
pub fn height_label(height: i64) -> Option<&'static str> {
    if height >= 2160 {
        Some("2160p")
    } else if height >= 1080 {
        Some("1080p")
    } else if height >= 720 {
        Some("720p")
    } else if height >= 480 {
        Some("480p")
    } else {
        None
    }
}

fn ffprobe_height(path: &Path) -> Option<i64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=height",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}

fn video_files(dir: &Path, cfg: &NamingConfig) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
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
    files
}

/// Derive a resolution token from the first video file in `dir`: the filename
/// regex when it matches, otherwise the probed stream height. Only the first
/// video file is consulted. Any failure is `None`, never an error.
pub fn probe_resolution(dir: &Path, cfg: &NamingConfig) -> Option<String> {
    let first = video_files(dir, cfg).into_iter().next()?;
    let name = first.file_name()?.to_string_lossy().into_owned();
    if let Some(resolution) = find_resolution_token(&name) {
        return Some(resolution);
    }
    ffprobe_height(&first)
        .and_then(height_label)
        .map(String::from)
}
