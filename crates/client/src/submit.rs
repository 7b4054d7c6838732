// crates/client/src/submit.rs
//! Job submission: client-side validation, advisory catalog checks, and
//! the multipart upload itself.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use morphbox_types::{ConversionJob, FormatCatalog};
use reqwest::multipart::{Form, Part};

use crate::error::{Result, ValidationError};
use crate::transport::Transport;

/// The transient state of one conversion request being prepared.
///
/// Mirrors a form: pick a file (the input format is inferred from its
/// extension, editable afterwards), pick an output format, submit. On a
/// successful submit the selection is reset; the new job then shows up on
/// the polling engine's next tick — submission never touches the job list
/// directly.
#[derive(Debug, Default, Clone)]
pub struct Submission {
    pub file: Option<PathBuf>,
    pub input_format: String,
    pub output_format: String,
}

impl Submission {
    /// Start from a selected file, inferring the input format from the
    /// extension (lowercased).
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let input_format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        Self {
            file: Some(path),
            input_format,
            output_format: String::new(),
        }
    }

    /// Check the submit preconditions. Each failure is distinct; all are
    /// resolved client-side before any network call.
    pub fn validate(&self) -> std::result::Result<&Path, ValidationError> {
        let file = self.file.as_deref().ok_or(ValidationError::MissingFile)?;
        if self.input_format.trim().is_empty() {
            return Err(ValidationError::MissingInputFormat);
        }
        if self.output_format.trim().is_empty() {
            return Err(ValidationError::MissingOutputFormat);
        }
        Ok(file)
    }

    /// Advisory warnings against the catalog. The server is the authority
    /// on format pairs, so an out-of-catalog format warns and never blocks.
    pub fn advisory_warnings(&self, catalog: &FormatCatalog, category: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.input_format.is_empty() && !catalog.is_known_input(category, &self.input_format) {
            warnings.push(format!(
                "input format '{}' is not listed for category '{category}'",
                self.input_format
            ));
        }
        if !self.output_format.is_empty() && !catalog.is_known_output(category, &self.output_format)
        {
            warnings.push(format!(
                "output format '{}' is not listed for category '{category}'",
                self.output_format
            ));
        }
        warnings
    }

    fn reset(&mut self) {
        self.file = None;
        self.input_format.clear();
        self.output_format.clear();
    }
}

/// Uploads validated submissions.
pub struct SubmitFlow {
    transport: Arc<Transport>,
}

impl SubmitFlow {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Validate, upload, and return the created job.
    ///
    /// The multipart body carries three parts: the file contents and the
    /// two format codes. On success the submission's transient selection
    /// is reset.
    pub async fn submit(&self, submission: &mut Submission) -> Result<ConversionJob> {
        let file = submission.validate()?;

        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let contents = tokio::fs::read(file)
            .await
            .map_err(|source| ValidationError::FileUnreadable {
                path: file.to_path_buf(),
                source,
            })?;

        tracing::info!(
            file = %filename,
            from = %submission.input_format,
            to = %submission.output_format,
            bytes = contents.len(),
            "submitting conversion"
        );

        let form = Form::new()
            .part("file", Part::bytes(contents).file_name(filename))
            .text("inputFormat", submission.input_format.to_lowercase())
            .text("outputFormat", submission.output_format.to_lowercase());

        let job: ConversionJob = self
            .transport
            .post_multipart("/conversions/upload/", form)
            .await?;

        submission.reset();
        Ok(job)
    }
}
