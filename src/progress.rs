//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::AnalyzerConfigBuilder::progress_callback`] to receive
//! events as the run moves through discovery, rasterization and both stages.
//!
//! # Why callbacks instead of channels?
//!
//! The callback is the least-invasive integration point: the CLI drives a
//! terminal spinner from it, a service can forward events to its own channel,
//! and the library never learns how the host communicates.
//!
//! # Example
//!
//! ```rust
//! use document_analyzer::{AnalyzerConfig, PipelineProgressCallback, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct StageCounter {
//!     finished: AtomicUsize,
//! }
//!
//! impl PipelineProgressCallback for StageCounter {
//!     fn on_stage_complete(&self, stage: Stage, output_len: usize) {
//!         let done = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{stage} finished ({output_len} chars), {done}/2");
//!     }
//! }
//!
//! let counter = Arc::new(StageCounter { finished: AtomicUsize::new(0) });
//! let config = AnalyzerConfig::builder()
//!     .progress_callback(counter as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::Stage;
use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as a run progresses.
///
/// All methods default to no-ops so callers only override what they need.
/// Events arrive in order from a single task.
pub trait PipelineProgressCallback: Send + Sync {
    /// A file in the documents directory was not analysable.
    fn on_document_skipped(&self, path: &Path, reason: &str) {
        let _ = (path, reason);
    }

    /// A stage is about to call the model.
    ///
    /// `image_count` is the number of images in the stage's message; always
    /// zero for the report builder.
    fn on_stage_start(&self, stage: Stage, image_count: usize) {
        let _ = (stage, image_count);
    }

    /// A PDF input was rasterized by the analyzer.
    fn on_pdf_rasterized(&self, path: &Path, page_count: usize) {
        let _ = (path, page_count);
    }

    /// A stage's model call returned.
    ///
    /// `output_len` is the byte length of the stage's text output.
    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        let _ = (stage, output_len);
    }

    /// The report file was written.
    fn on_report_written(&self, path: &Path) {
        let _ = path;
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalyzerConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
