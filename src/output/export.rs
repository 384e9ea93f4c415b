use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;

/// Write rendered output to `path` atomically. A trailing newline is added
/// when missing.
pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = contents.len(), "export written");
    Ok(())
}
