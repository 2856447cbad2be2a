use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

/// Where fetched artifacts land, relative to the working directory.
pub const DOWNLOAD_DIR: &str = "downloads";

/// Saves artifact bytes under `dir` atomically (temp file, then rename).
///
/// The filename comes from the remote side, so any path components are
/// stripped; an empty name falls back to a timestamped one.
pub fn save_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    ensure_dir(dir)?;

    let name = sanitize_filename(filename);
    let target = dir.join(name);

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    // Replace existing file if present to keep reruns deterministic.
    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(target)
}

fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        if !fs::metadata(dir)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "download path is not a directory",
            ));
        }
        return Ok(());
    }
    fs::create_dir_all(dir)
}

fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    if base.is_empty() {
        format!("artifact-{}.txt", Utc::now().format("%Y%m%d%H%M%S"))
    } else {
        base.to_string()
    }
}
