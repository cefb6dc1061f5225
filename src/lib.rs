//! # document-analyzer
//!
//! Analyse a folder of images and PDFs with a vision LLM and write the
//! findings as an HTML or Markdown report.
//!
//! ## Why two stages?
//!
//! Asking one model call to both read a stack of images and lay out a styled
//! report produces shallow analysis and brittle markup. The pipeline splits
//! the job: an **analyzer** looks at every image and writes a plain-text
//! summary; a **report builder** sees only that summary (never the images)
//! and renders the report file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! documents/
//!  │
//!  ├─ 1. Discover   classify files (image / PDF / skipped), load image bytes
//!  ├─ 2. Instruct   base instruction + optional --context
//!  ├─ 3. Analyzing  rasterize PDFs via pdfium, send all images to the model
//!  ├─ 4. Reporting  send task + summary (text only) to the model
//!  └─ 5. Output     clean the reply, write output/analysis_report.html
//! ```
//!
//! The PDF rasterizer is also usable on its own, either as a typed call
//! ([`rasterize`]) or as a JSON tool ([`tool::invoke`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use document_analyzer::{analyze, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = AnalyzerConfig::builder()
//!         .documents_dir("documents")
//!         .output_dir("output")
//!         .additional_context("Monthly utility bills for 2024")
//!         .build()?;
//!     let result = analyze(&config).await?;
//!     println!("report written to {}", result.report_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc-analyzer` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod credentials;
pub mod document;
pub mod error;
pub mod message;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod tool;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze, analyze_request, analyze_sync, analyze_with_model};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, ReportFormat, DEFAULT_DPI};
pub use credentials::{load_credentials, Credentials};
pub use document::{Document, DocumentInventory, DocumentKind, ImageFormat, SkippedDocument};
pub use error::{AnalyzerError, RasterError, RasterErrorKind};
pub use message::{AnalysisMessage, Segment};
pub use output::{PipelineResult, PipelineStats};
pub use pipeline::machine::{AnalysisHandoff, AnalysisRequest, PipelineState};
pub use pipeline::model::{ProviderModel, StageModel, StageReply, StageRequest};
pub use pipeline::rasterize::{rasterize, rasterize_blocking, ConversionRequest, ConversionResult};
pub use pipeline::Stage;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use tool::{tool_spec, ToolResponse, ToolUse};
