//! Output types for a completed pipeline run.

use crate::document::SkippedDocument;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Where the report was written.
    pub report_path: PathBuf,

    /// Raw text the report builder produced, before cleanup.
    pub trace: String,

    /// The analyzer's summary, exactly as handed to the report builder.
    pub analysis: String,

    /// Files in the documents directory that were not analysed.
    pub skipped: Vec<SkippedDocument>,

    pub stats: PipelineStats,
}

/// Counts and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Images sent to the analyzer, rasterized PDF pages included.
    pub images_analyzed: usize,
    pub pdfs_rasterized: usize,
    pub pdf_pages: usize,
    pub skipped_documents: usize,

    pub analyzer_input_tokens: u64,
    pub analyzer_output_tokens: u64,
    pub report_input_tokens: u64,
    pub report_output_tokens: u64,

    /// Time spent rasterizing PDFs inside the analyzer stage.
    pub rasterize_duration_ms: u64,
    /// Whole analyzer stage, rasterization included.
    pub analyzer_duration_ms: u64,
    /// Report builder stage, file write included.
    pub report_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl PipelineStats {
    pub fn total_input_tokens(&self) -> u64 {
        self.analyzer_input_tokens + self.report_input_tokens
    }

    pub fn total_output_tokens(&self) -> u64 {
        self.analyzer_output_tokens + self.report_output_tokens
    }
}
