//! Pipeline stages for document analysis.
//!
//! Each submodule implements one step. Keeping them separate makes each
//! independently testable and keeps the network-bound code ([`model`]) away
//! from the filesystem-bound code ([`input`], [`rasterize`]).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterize ──▶ encode ──▶ model ──▶ postprocess
//! (dir scan)  (pdfium)     (base64)   (LLM)    (cleanup)
//!                └──────────── machine ───────────┘
//! ```
//!
//! 1. [`input`]: expand `~`, list the documents directory, load images
//! 2. [`engine`]: bind the pdfium shared library
//! 3. [`rasterize`]: render PDF page ranges to PNG files on the blocking pool
//! 4. [`encode`]: base64-wrap image bytes for the multimodal request body
//! 5. [`model`]: the [`model::StageModel`] seam and its provider-backed impl
//! 6. [`postprocess`]: deterministic cleanup of the report text
//! 7. [`machine`]: the `Analyzing → Reporting → Done` state machine

pub mod encode;
pub mod engine;
pub mod input;
pub mod machine;
pub mod model;
pub mod postprocess;
pub mod rasterize;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two model-backed stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Looks at every image and writes a textual summary.
    Analyzer,
    /// Turns the summary into the final report file.
    ReportBuilder,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyzer => "analyzer",
            Stage::ReportBuilder => "report builder",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
