//! Error types for the document-analyzer library.
//!
//! Two error types reflect two different propagation policies:
//!
//! * [`RasterError`]: the PDF rasterizer's structured taxonomy. The
//!   rasterizer never lets a fault escape as a panic; every failure is one of
//!   these variants, and the JSON tool adapter ([`crate::tool`]) turns each
//!   one into an error payload instead of an `Err`.
//!
//! * [`AnalyzerError`]: **Fatal** for a pipeline run. Any stage failure
//!   aborts the run and surfaces here; no report is written.

use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single PDF→PNG conversion request.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The request carried no `pdf_path`.
    #[error("PDF path is required")]
    MissingArgument,

    /// The source path does not exist after `~` expansion.
    #[error("PDF file not found at path: {}", path.display())]
    NotFound { path: PathBuf },

    /// A request field could not be coerced or violates the page-range rules.
    #[error("Invalid value for '{field}': {detail}")]
    InvalidArgument { field: &'static str, detail: String },

    /// The rendering backend failed: malformed PDF, missing pdfium, or a
    /// panic inside the render thread.
    #[error("Error converting PDF to PNG: {detail}")]
    ConversionFailure { path: PathBuf, detail: String },

    /// Creating the output directory or saving a page image failed.
    #[error("I/O failure on '{}': {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Machine-readable discriminant of a [`RasterError`], used in tool payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterErrorKind {
    MissingArgument,
    NotFound,
    InvalidArgument,
    ConversionFailure,
    IoFailure,
}

impl RasterError {
    pub fn kind(&self) -> RasterErrorKind {
        match self {
            RasterError::MissingArgument => RasterErrorKind::MissingArgument,
            RasterError::NotFound { .. } => RasterErrorKind::NotFound,
            RasterError::InvalidArgument { .. } => RasterErrorKind::InvalidArgument,
            RasterError::ConversionFailure { .. } => RasterErrorKind::ConversionFailure,
            RasterError::IoFailure { .. } => RasterErrorKind::IoFailure,
        }
    }
}

/// All fatal errors returned by a pipeline run.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The documents directory could not be listed.
    #[error("Cannot read documents directory '{}': {source}", path.display())]
    DocumentsDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image document was listed but its bytes could not be read.
    #[error("Failed to read document '{}': {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A PDF input could not be rasterized by the analyzer stage.
    #[error("Failed to rasterize '{}': {source}", path.display())]
    Rasterization {
        path: PathBuf,
        #[source]
        source: RasterError,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A stage's model call failed; `message` is the provider's error text.
    #[error("{stage} stage failed: {message}")]
    Stage { stage: Stage, message: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create the output directory or write the report file.
    #[error("Failed to write report '{}': {source}", path.display())]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
