//! Shapefile upload and download routes.
//!
//! Uploads are written to a fresh directory under `UPLOAD_DIR` so that the
//! sidecar files of a shapefile (`.shx`, `.dbf`, `.prj`) keep their names
//! next to the `.shp` that ogr2ogr opens.

use std::path::{Path, PathBuf};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use tracing::{error, info};
use uuid::Uuid;

use crate::services::ogr::{self, OgrError};
use crate::state::AppState;

pub const UPLOAD_MESSAGE: &str = "Upload berhasil dan data tersimpan di PostGIS.";
pub const NO_FILE_NAME_MESSAGE: &str = "Can't find out file name";
/// Name offered to the browser for the exported archive.
pub const DOWNLOAD_FILE_NAME: &str = "bangunan.zip";

/// `POST /upload`: store the multipart file fields and import them.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<&'static str, (StatusCode, String)> {
    let batch_dir = state.config.upload_dir.join(Uuid::new_v4().simple().to_string());
    let mut saved = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        let Some(raw_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let file_name = sanitize_file_name(&raw_name).ok_or_else(no_file_name)?;
        let data = field.bytes().await.map_err(|e| (e.status(), e.body_text()))?;

        let path = batch_dir.join(&file_name);
        save_upload(&path, &data).await.map_err(|e| {
            error!(error = %e, path = %path.display(), "failed to store upload");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to store upload: {e}"))
        })?;
        info!(path = %path.display(), bytes = data.len(), "upload stored");
        saved.push(path);
    }

    let target = import_target(&saved).ok_or_else(no_file_name)?;
    ogr::import_shapefile(&state.config, target)
        .await
        .map_err(|e| ogr_error_response(&e))?;
    Ok(UPLOAD_MESSAGE)
}

/// `GET /download`: the feature table as a zipped shapefile.
pub async fn download(State(state): State<AppState>) -> Result<Response, (StatusCode, String)> {
    let bytes = ogr::export_shapefile(&state.config)
        .await
        .map_err(|e| ogr_error_response(&e))?;

    Ok((
        [
            (CONTENT_TYPE, "application/zip"),
            (CONTENT_DISPOSITION, &format!("attachment; filename={DOWNLOAD_FILE_NAME}")),
        ],
        bytes,
    )
        .into_response())
}

/// Reduce a client-supplied file name to a safe basename.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`. Returns `None` when nothing usable remains.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { None } else { Some(cleaned.to_owned()) }
}

/// Pick the file ogr2ogr should open: a zip archive, else the `.shp`, else
/// the first file (GeoJSON, KML and other single-file formats).
#[must_use]
pub fn import_target(paths: &[PathBuf]) -> Option<&Path> {
    let with_extension = |wanted: &str| {
        paths.iter().find(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
        })
    };
    with_extension("zip")
        .or_else(|| with_extension("shp"))
        .or_else(|| paths.first())
        .map(PathBuf::as_path)
}

async fn save_upload(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, data).await
}

fn no_file_name() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, NO_FILE_NAME_MESSAGE.to_owned())
}

fn ogr_error_response(err: &OgrError) -> (StatusCode, String) {
    error!(error = %err, "shapefile conversion failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[cfg(test)]
#[path = "shapefile_test.rs"]
mod tests;
