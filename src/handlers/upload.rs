use axum::extract::{multipart::MultipartError, Multipart};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::{fs::File, io::AsyncWriteExt};

use crate::{
    error::{PortalError, PortalResult},
    services::lecture::StagedFile,
    utils::text::secure_filename,
};

/// A parsed multipart form. File parts are streamed to a temporary
/// directory that is removed when the form is dropped.
pub struct StagedForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
    _dir: TempDir,
}

impl StagedForm {
    /// Trimmed text value, empty when missing.
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).map(|v| v.trim().to_string()).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<StagedFile> {
        self.files.remove(name)
    }
}

pub async fn stage_multipart(mut multipart: Multipart, max_file_size: u64) -> PortalResult<StagedForm> {
    let dir = tempfile::Builder::new()
        .prefix("lecture-upload-")
        .tempdir()
        .map_err(|e| PortalError::Internal(e.into()))?;

    let mut fields = HashMap::new();
    let mut files = HashMap::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, max_file_size))? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(|e| multipart_error(e, max_file_size))?;
            fields.insert(name, value);
            continue;
        };

        // Browsers send an empty part for optional file inputs left blank
        if file_name.is_empty() {
            continue;
        }

        let path: PathBuf = dir.path().join(format!("{}_{}", files.len(), secure_filename(&file_name)));
        let mut out = File::create(&path).await.map_err(|e| PortalError::Internal(e.into()))?;
        let mut size: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max_file_size))? {
            size += chunk.len() as u64;
            if size > max_file_size {
                return Err(too_large(max_file_size));
            }
            out.write_all(&chunk).await.map_err(|e| PortalError::Internal(e.into()))?;
        }
        out.flush().await.map_err(|e| PortalError::Internal(e.into()))?;

        tracing::debug!("Staged '{}' field '{}' ({} bytes)", file_name, name, size);
        files.insert(
            name,
            StagedFile {
                path,
                original_name: file_name,
                size,
            },
        );
    }

    Ok(StagedForm {
        fields,
        files,
        _dir: dir,
    })
}

fn too_large(max_file_size: u64) -> PortalError {
    PortalError::FileTooLarge {
        limit_gb: max_file_size / (1024 * 1024 * 1024),
    }
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> PortalError {
    if err.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_file_size)
    } else {
        PortalError::Validation(err.body_text())
    }
}
