//! Shapefile import/export through GDAL's `ogr2ogr`.
//!
//! DESIGN
//! ======
//! ogr2ogr talks to PostGIS directly using the `PG:` datasource from
//! config; this module only builds argument lists and runs the tools.
//! Argument building is kept separate from process spawning so it can be
//! checked without GDAL installed.
//!
//! ERROR HANDLING
//! ==============
//! A non-zero exit is an error carrying the tool's stderr, so a failed
//! import never reports success to the uploader.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tokio::process::Command;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;

/// Target table for imports and source layer for exports.
pub const FEATURE_LAYER: &str = "feature";
/// Subdirectory of an export working directory that receives the shapefile.
pub const EXPORT_SUBDIR: &str = "output_shp";
pub const EXPORT_ARCHIVE: &str = "output_shp.zip";

#[derive(Debug, thiserror::Error)]
pub enum OgrError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed { tool: String, status: ExitStatus, stderr: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// GDAL datasource name for an uploaded file. Zip archives are read in
/// place through the `/vsizip/` virtual filesystem.
#[must_use]
pub fn source_path(path: &Path) -> String {
    let display = path.to_string_lossy();
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip { format!("/vsizip/{display}") } else { display.into_owned() }
}

#[must_use]
pub fn import_args(config: &Config, path: &Path) -> Vec<String> {
    vec![
        "-f".into(),
        "PostgreSQL".into(),
        config.ogr_datasource(),
        source_path(path),
        "-nln".into(),
        FEATURE_LAYER.into(),
        "-append".into(),
    ]
}

#[must_use]
pub fn export_args(config: &Config, shapefile: &Path) -> Vec<String> {
    vec![
        "-f".into(),
        "ESRI Shapefile".into(),
        shapefile.to_string_lossy().into_owned(),
        config.ogr_datasource(),
        FEATURE_LAYER.into(),
        "-overwrite".into(),
    ]
}

/// Paths used by one export rooted at `root`: `(output directory, shapefile, archive)`.
#[must_use]
pub fn export_paths(root: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let dir = root.join(EXPORT_SUBDIR);
    let shapefile = dir.join(format!("{FEATURE_LAYER}.shp"));
    let archive = root.join(EXPORT_ARCHIVE);
    (dir, shapefile, archive)
}

/// Fresh per-request working directory under `EXPORT_DIR`.
#[must_use]
pub fn export_root(config: &Config) -> PathBuf {
    config.export_dir.join(Uuid::new_v4().simple().to_string())
}

async fn run(tool: &str, args: &[String], cwd: Option<&Path>) -> Result<(), OgrError> {
    let mut command = Command::new(tool);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|source| OgrError::Spawn { tool: tool.to_owned(), source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        warn!(tool, status = %output.status, %stderr, "external tool failed");
        return Err(OgrError::Failed { tool: tool.to_owned(), status: output.status, stderr });
    }
    Ok(())
}

/// Append the contents of a vector file into the `feature` table.
///
/// # Errors
///
/// Returns `Spawn` if ogr2ogr cannot be started and `Failed` on non-zero exit.
pub async fn import_shapefile(config: &Config, path: &Path) -> Result<(), OgrError> {
    run(&config.ogr2ogr_bin, &import_args(config, path), None).await?;
    info!(path = %path.display(), "imported upload into PostGIS");
    Ok(())
}

/// Export the `feature` table as a zipped shapefile and return the archive bytes.
///
/// Each call works in its own directory under `EXPORT_DIR`, removed afterwards,
/// so concurrent downloads never share files.
///
/// # Errors
///
/// Returns `Spawn`/`Failed` for tool failures and `Io` for filesystem errors.
pub async fn export_shapefile(config: &Config) -> Result<Vec<u8>, OgrError> {
    let root = export_root(config);
    let result = export_into(config, &root).await;
    if let Err(e) = tokio::fs::remove_dir_all(&root).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, dir = %root.display(), "failed to remove export directory");
        }
    }
    result
}

async fn export_into(config: &Config, root: &Path) -> Result<Vec<u8>, OgrError> {
    let (dir, shapefile, archive) = export_paths(root);
    tokio::fs::create_dir_all(&dir).await?;

    run(&config.ogr2ogr_bin, &export_args(config, &shapefile), None).await?;

    let zip_args = vec!["-r".to_owned(), EXPORT_ARCHIVE.to_owned(), EXPORT_SUBDIR.to_owned()];
    run(&config.zip_bin, &zip_args, Some(root)).await?;

    let bytes = tokio::fs::read(&archive).await?;
    info!(bytes = bytes.len(), "exported feature table as shapefile");
    Ok(bytes)
}

#[cfg(test)]
#[path = "ogr_test.rs"]
mod tests;
