// crates/client/src/actions.rs
//! Cancel and download actions against server-owned jobs.
//!
//! Neither action mutates the cached job list: the server is the sole
//! authority on job state and the polling engine reconciles within one
//! cycle. An "optimistic" local status flip would let the UI disagree
//! with a server that refused the action.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use morphbox_types::{ConversionJob, JobStatus};
use uuid::Uuid;

use crate::error::{Error, Result, ValidationError};
use crate::transport::Transport;

/// Gateway for per-job actions.
pub struct JobActions {
    transport: Arc<Transport>,
}

impl JobActions {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Fetch a single job's current server state.
    pub async fn fetch(&self, id: Uuid) -> Result<ConversionJob> {
        self.transport.get_json(&format!("/jobs/{id}/"), &[]).await
    }

    /// Request cancellation of a non-terminal job.
    ///
    /// Caller contract: the user has already confirmed, and `job` is the
    /// last-known state — a terminal job is rejected here before any
    /// network call. Returns the server's updated job record; the cached
    /// list is left alone for the next poll tick to reconcile.
    pub async fn cancel(&self, job: &ConversionJob) -> Result<ConversionJob> {
        if job.status.is_terminal() {
            return Err(ValidationError::JobAlreadyTerminal {
                id: job.id,
                status: job.status,
            }
            .into());
        }
        self.transport
            .post(&format!("/jobs/{}/cancel/", job.id))
            .await
    }

    /// Download a completed job's result to `dest` (a directory or a file
    /// path; `None` = current directory, server-suggested filename).
    ///
    /// The write is atomic (temp file + rename) and nothing else changes
    /// locally — a failed download leaves no half-written file behind.
    pub async fn download(&self, job: &ConversionJob, dest: Option<&Path>) -> Result<PathBuf> {
        if job.status != JobStatus::Completed {
            return Err(ValidationError::ResultNotReady {
                id: job.id,
                status: job.status,
            }
            .into());
        }

        let bytes = self
            .transport
            .get_bytes(&format!("/jobs/{}/download/", job.id))
            .await?;

        let target = resolve_target(job, dest);
        write_atomic(&target, &bytes)?;
        tracing::info!(job = %job.id, path = %target.display(), bytes = bytes.len(), "result saved");
        Ok(target)
    }
}

/// Where to save a result: explicit file path wins, a directory gets the
/// suggested filename appended, no destination means the working dir.
fn resolve_target(job: &ConversionJob, dest: Option<&Path>) -> PathBuf {
    match dest {
        Some(path) if path.is_dir() => path.join(job.result_filename()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(job.result_filename()),
    }
}

fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |source| Error::Io {
        path: target.to_path_buf(),
        source,
    };
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.persist(target).map_err(|e| io_err(e.error))?;
    Ok(())
}
