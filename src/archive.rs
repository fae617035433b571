//! Bundles downloaded artifacts into a single zip archive.

use crate::error::Result;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;
use zip::write::SimpleFileOptions;

/// Zip every regular file in `dir` (flat, non-recursive) into
/// `archive_path`, using filename-only entries.
///
/// Re-running overwrites the previous archive wholesale. Returns the number
/// of entries written.
pub fn archive_dir(dir: &Path, archive_path: &Path) -> Result<usize> {
    let file = File::create(archive_path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    // Sorted for a deterministic entry order.
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut added = 0;
    for name in &names {
        let mut content = Vec::new();
        File::open(dir.join(name))?.read_to_end(&mut content)?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&content)?;
        added += 1;
    }
    zip.finish()?;

    info!(path = %archive_path.display(), entries = added, "Wrote archive");
    Ok(added)
}
