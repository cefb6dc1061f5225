//! Run entry points.
//!
//! [`analyze`] is the whole program as a library call: discover documents,
//! assemble the instruction, resolve a model, and drive the state machine to
//! a written report. [`analyze_with_model`] takes the model explicitly, which
//! is how tests and hosts with their own LLM plumbing call in.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::document::DocumentInventory;
use crate::message::AnalysisMessage;
use crate::output::PipelineResult;
use crate::pipeline::input::discover_documents;
use crate::pipeline::machine::{AnalysisRequest, Pipeline};
use crate::pipeline::model::{ProviderModel, StageModel};
use crate::prompts::build_instruction;
use std::sync::Arc;
use tracing::{info, warn};

/// Analyse every document in `config.documents_dir` and write the report.
///
/// # Errors
/// Returns `Err(AnalyzerError)` for any fatal condition: unreadable documents
/// directory, provider not configured, a PDF that cannot be rasterized, a
/// failed model call in either stage, or a report that cannot be written.
/// On error no report file is produced.
pub async fn analyze(config: &AnalyzerConfig) -> Result<PipelineResult, AnalyzerError> {
    let model = ProviderModel::from_config(config)?;
    analyze_with_model(config, Arc::new(model)).await
}

/// [`analyze`] with a caller-supplied [`StageModel`].
pub async fn analyze_with_model(
    config: &AnalyzerConfig,
    model: Arc<dyn StageModel>,
) -> Result<PipelineResult, AnalyzerError> {
    info!(
        "Starting analysis: {} → {}",
        config.documents_dir.display(),
        config.report_path().display()
    );

    // ── Step 1: Discover documents ───────────────────────────────────────
    let inventory = discover_documents(&config.documents_dir, config.pdf_support)?;
    if let Some(ref cb) = config.progress_callback {
        for skipped in &inventory.skipped {
            cb.on_document_skipped(&skipped.path, &skipped.reason);
        }
    }
    if inventory.analyzable() == 0 {
        warn!(
            "No analyzable documents in {}; continuing with the instruction only",
            config.documents_dir.display()
        );
    }
    let DocumentInventory { images, pdfs, skipped } = inventory;

    // ── Step 2: Assemble the analyzer message ────────────────────────────
    let instruction = build_instruction(
        &config.output_dir,
        config.report_format,
        config.additional_context.as_deref(),
    );
    let request = AnalysisRequest {
        message: AnalysisMessage::from_images(instruction, images),
        pdfs,
    };

    // ── Step 3: Analyzing → Reporting → Done ─────────────────────────────
    Pipeline::new(config, model)
        .with_skipped(skipped)
        .run(request)
        .await
}

/// Run a prepared request through the state machine, skipping discovery.
///
/// For hosts that build the multimodal message themselves.
pub async fn analyze_request(
    config: &AnalyzerConfig,
    model: Arc<dyn StageModel>,
    request: AnalysisRequest,
) -> Result<PipelineResult, AnalyzerError> {
    Pipeline::new(config, model).run(request).await
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(config: &AnalyzerConfig) -> Result<PipelineResult, AnalyzerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalyzerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze(config))
}
