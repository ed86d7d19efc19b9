//! Writing generated artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write one artifact under the output directory, creating the directory on
/// demand. Files are fully overwritten on every run; concurrent runs are
/// expected to be serialized by the external scheduler.
pub fn write_artifact(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}
