// crates/types/src/job.rs
//! Conversion job wire types.
//!
//! Jobs are owned by the server; the client holds read-only snapshots that
//! are replaced wholesale on each poll — never field-patched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Status of a conversion job.
///
/// `Completed`, `Failed` and `Cancelled` are terminal: the server never
/// transitions a job out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(String);

impl FromStr for JobStatus {
    type Err = ParseJobStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseJobStatusError(other.to_string())),
        }
    }
}

/// A single server-tracked conversion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionJob {
    pub id: Uuid,
    pub input_filename: String,
    #[serde(default)]
    pub output_filename: String,
    pub input_format: String,
    pub output_format: String,
    pub status: JobStatus,
    /// Integer percentage, meaningful only while `Processing`. Display the
    /// latest value as-is — a misbehaving server may regress it.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub tool_used: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl ConversionJob {
    /// Filename to save the result under when the caller gives none.
    ///
    /// Prefers the server-reported output filename; falls back to the input
    /// stem with the output format as extension.
    pub fn result_filename(&self) -> String {
        if !self.output_filename.is_empty() {
            return self.output_filename.clone();
        }
        let stem = self
            .input_filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.input_filename);
        format!("{stem}.{}", self.output_format)
    }
}

/// Paginated job listing as the server returns it.
///
/// The client consumes `results` from a single page per poll tick and does
/// not follow `next`/`previous` links, so every snapshot comes from one
/// consistent server read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<ConversionJob>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job_json(status: &str) -> String {
        format!(
            r#"{{
                "id": "3e2f1a34-1111-2222-3333-444455556666",
                "user": 1,
                "user_email": "a@b.c",
                "input_filename": "song.mp3",
                "output_filename": "song.wav",
                "input_format": "mp3",
                "output_format": "wav",
                "status": "{status}",
                "progress": 40,
                "file_size": 2097152,
                "error_message": null,
                "tool_used": "ffmpeg",
                "created_at": "2026-03-01T10:00:00Z",
                "started_at": "2026-03-01T10:00:05Z",
                "completed_at": null
            }}"#
        )
    }

    #[test]
    fn test_job_parse_snake_case_wire_fields() {
        let job: ConversionJob = serde_json::from_str(&job_json("processing")).unwrap();
        assert_eq!(job.input_filename, "song.mp3");
        assert_eq!(job.input_format, "mp3");
        assert_eq!(job.output_format, "wav");
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 40);
        assert_eq!(job.user_email.as_deref(), Some("a@b.c"));
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_status_terminal_partition() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "processing", "completed", "failed", "cancelled"] {
            let status: JobStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{s}\""));
        }
        assert!("running".parse::<JobStatus>().is_err());
        // filter input from the CLI is case-insensitive
        assert_eq!("Completed".parse::<JobStatus>(), Ok(JobStatus::Completed));
    }

    #[test]
    fn test_result_filename_fallback() {
        let mut job: ConversionJob = serde_json::from_str(&job_json("completed")).unwrap();
        assert_eq!(job.result_filename(), "song.wav");
        job.output_filename = String::new();
        assert_eq!(job.result_filename(), "song.wav");
        job.input_filename = "noext".into();
        assert_eq!(job.result_filename(), "noext.wav");
    }

    #[test]
    fn test_job_page_parse() {
        let json = format!(
            r#"{{"count": 1, "next": null, "previous": null, "results": [{}]}}"#,
            job_json("pending")
        );
        let page: JobPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].status, JobStatus::Pending);
    }
}
