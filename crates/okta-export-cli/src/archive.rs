//! Output directory lifecycle and zip packaging
//!
//! A run owns the `*.csv` files directly under its output directory: they
//! are cleared before the run exports anything and packed after it.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use okta_export_core::{ExportError, Result};

/// Remove CSV files left in `output_dir` by an earlier run, creating the
/// directory when it is missing. Returns how many files were removed.
#[instrument]
pub fn reset_output_dir(output_dir: &Path) -> Result<usize> {
    fs::create_dir_all(output_dir)?;

    let stale = collect_csv_files(output_dir)?;
    for (_, path) in &stale {
        fs::remove_file(path)?;
    }

    if !stale.is_empty() {
        info!(
            "Removed {} file(s) left in {} by an earlier run",
            stale.len(),
            output_dir.display()
        );
    }
    Ok(stale.len())
}

/// Zip every CSV file directly under `output_dir` into `archive_path`.
///
/// Entries use bare file names in name order. Returns `None` without
/// writing anything when there is nothing to pack; a missing output
/// directory is created.
#[instrument]
pub fn create_archive(output_dir: &Path, archive_path: &Path) -> Result<Option<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let files = collect_csv_files(output_dir)?;
    if files.is_empty() {
        info!("No CSV files in {}, skipping archive", output_dir.display());
        return Ok(None);
    }

    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = ZipWriter::new(BufWriter::new(File::create(archive_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, path) in &files {
        debug!("Adding {}", name);
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ExportError::archive(format!("Failed to add {}: {}", name, e)))?;
        io::copy(&mut File::open(path)?, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| ExportError::archive(format!("Failed to finish archive: {}", e)))?;

    info!(
        "Created {} with {} file(s)",
        archive_path.display(),
        files.len()
    );
    Ok(Some(archive_path.to_path_buf()))
}

fn collect_csv_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_csv = path.extension().map_or(false, |ext| ext == "csv");
        if !entry.file_type()?.is_file() || !is_csv {
            continue;
        }
        files.push((entry.file_name().to_string_lossy().into_owned(), path));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
