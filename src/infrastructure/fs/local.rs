//! Local file helpers

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Write `content` to `path` through a temp file in the same directory.
///
/// Readers see either the old file or the new one, never a partial write.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
