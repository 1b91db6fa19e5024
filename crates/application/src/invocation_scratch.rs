use std::path::{Path, PathBuf};

use ppecheck_core::{AppError, AppResult, InvocationId};
use ppecheck_domain::ObjectLocation;
use tempfile::TempDir;

const FALLBACK_FILE_NAME: &str = "object";

/// Scratch directory owned by exactly one invocation.
///
/// Every invocation gets its own directory, so two events carrying the same
/// object key never share a file. The directory is removed by
/// [`InvocationScratch::release`], or on drop when an invocation ends early.
#[derive(Debug)]
pub struct InvocationScratch {
    invocation_id: InvocationId,
    directory: TempDir,
}

impl InvocationScratch {
    /// Creates a fresh scratch directory under `root`.
    pub async fn acquire(root: &Path, invocation_id: InvocationId) -> AppResult<Self> {
        tokio::fs::create_dir_all(root).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to create scratch root '{}': {error}",
                root.display()
            ))
        })?;

        let root = root.to_path_buf();
        let directory = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&format!("ppecheck-{invocation_id}-"))
                .tempdir_in(root)
        })
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "scratch allocation task for invocation {invocation_id} failed: {error}"
            ))
        })?
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to create scratch directory for invocation {invocation_id}: {error}"
            ))
        })?;

        Ok(Self {
            invocation_id,
            directory,
        })
    }

    /// Returns the scratch directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.directory.path()
    }

    /// Returns the file path an object should be downloaded to.
    #[must_use]
    pub fn path_for(&self, location: &ObjectLocation) -> PathBuf {
        self.directory
            .path()
            .join(scratch_file_name(location.object_basename()))
    }

    /// Removes the scratch directory and everything in it.
    pub async fn release(self) -> AppResult<()> {
        let invocation_id = self.invocation_id;
        let directory = self.directory;

        tokio::task::spawn_blocking(move || directory.close())
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "scratch release task for invocation {invocation_id} failed: {error}"
                ))
            })?
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to remove scratch directory for invocation {invocation_id}: {error}"
                ))
            })
    }
}

fn scratch_file_name(basename: &str) -> String {
    let sanitized: String = basename
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
                character
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|character| character == '.') {
        return FALLBACK_FILE_NAME.to_owned();
    }

    sanitized
}
