//! The two-stage state machine: `Analyzing → Reporting → Done`.
//!
//! A run always enters in [`PipelineState::Analyzing`] and every transition
//! is unconditional once the current stage succeeds. There is no branching,
//! retry or re-entry; the first error ends the run and nothing is written.
//!
//! Each state owns exactly the payload the next stage needs:
//!
//! ```text
//! Analyzing(AnalysisRequest) ──▶ Reporting(AnalysisHandoff) ──▶ Done(PipelineResult)
//!   message + PDFs                 task + summary (no images)     report on disk
//! ```

use crate::config::AnalyzerConfig;
use crate::document::{Document, ImageFormat, SkippedDocument};
use crate::error::AnalyzerError;
use crate::message::{AnalysisMessage, Segment};
use crate::output::{PipelineResult, PipelineStats};
use crate::pipeline::model::{StageModel, StageRequest};
use crate::pipeline::postprocess::clean_report;
use crate::pipeline::rasterize::{rasterize, ConversionRequest};
use crate::pipeline::Stage;
use crate::prompts;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Entry payload: the multimodal message plus PDFs still to be rasterized.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub message: AnalysisMessage,
    pub pdfs: Vec<Document>,
}

/// What the analyzer hands the report builder. Text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisHandoff {
    /// The original instruction text, so the report builder knows the task.
    pub task: String,
    /// The analyzer's summary, forwarded whole.
    pub summary: String,
}

/// Where a run currently is.
#[derive(Debug)]
pub enum PipelineState {
    Analyzing(AnalysisRequest),
    Reporting(AnalysisHandoff),
    Done(PipelineResult),
}

/// One pipeline run over a single request.
pub struct Pipeline<'a> {
    config: &'a AnalyzerConfig,
    model: Arc<dyn StageModel>,
    skipped: Vec<SkippedDocument>,
    stats: PipelineStats,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AnalyzerConfig, model: Arc<dyn StageModel>) -> Self {
        Self {
            config,
            model,
            skipped: Vec::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Files discovery passed over; carried into the result.
    pub fn with_skipped(mut self, skipped: Vec<SkippedDocument>) -> Self {
        self.stats.skipped_documents = skipped.len();
        self.skipped = skipped;
        self
    }

    /// Drive the machine from `Analyzing` to `Done`.
    pub async fn run(mut self, request: AnalysisRequest) -> Result<PipelineResult, AnalyzerError> {
        let start = Instant::now();
        let mut state = PipelineState::Analyzing(request);
        loop {
            state = match state {
                PipelineState::Analyzing(request) => {
                    PipelineState::Reporting(self.run_analyzer(request).await?)
                }
                PipelineState::Reporting(handoff) => {
                    PipelineState::Done(self.run_report_builder(handoff).await?)
                }
                PipelineState::Done(mut result) => {
                    result.stats.total_duration_ms = start.elapsed().as_millis() as u64;
                    info!(
                        "Pipeline complete: report at {} ({} in / {} out tokens, {}ms)",
                        result.report_path.display(),
                        result.stats.total_input_tokens(),
                        result.stats.total_output_tokens(),
                        result.stats.total_duration_ms
                    );
                    return Ok(result);
                }
            };
        }
    }

    // ── Analyzing ────────────────────────────────────────────────────────────

    async fn run_analyzer(&mut self, request: AnalysisRequest) -> Result<AnalysisHandoff, AnalyzerError> {
        let stage_start = Instant::now();
        info!("Entering {} stage", Stage::Analyzer);

        let task = request.message.joined_text();
        let message = if request.pdfs.is_empty() {
            request.message
        } else {
            let raster_start = Instant::now();
            let pages = self.rasterize_pdfs(&request.pdfs).await?;
            self.stats.rasterize_duration_ms = raster_start.elapsed().as_millis() as u64;
            request.message.extended(pages)
        };

        let image_count = message.image_count();
        self.stats.images_analyzed = image_count;
        if image_count == 0 {
            warn!("No images to analyze; the analyzer receives the instruction only");
        }
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(Stage::Analyzer, image_count);
        }

        let system_prompt = self
            .config
            .analyzer_prompt
            .as_deref()
            .unwrap_or(prompts::ANALYZER_SYSTEM_PROMPT)
            .to_string();
        let reply = self
            .model
            .respond(StageRequest {
                stage: Stage::Analyzer,
                system_prompt,
                message,
            })
            .await?;

        self.stats.analyzer_input_tokens = reply.input_tokens;
        self.stats.analyzer_output_tokens = reply.output_tokens;
        self.stats.analyzer_duration_ms = stage_start.elapsed().as_millis() as u64;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_complete(Stage::Analyzer, reply.content.len());
        }
        info!(
            "{} stage produced {} chars from {} image(s)",
            Stage::Analyzer,
            reply.content.len(),
            image_count
        );

        Ok(AnalysisHandoff {
            task,
            summary: reply.content,
        })
    }

    /// Rasterize every PDF into the page directory and load the pages as
    /// PNG segments, documents in order, pages ascending.
    async fn rasterize_pdfs(&mut self, pdfs: &[Document]) -> Result<Vec<Segment>, AnalyzerError> {
        let page_dir = self.config.resolved_page_image_dir();
        let mut segments = Vec::new();

        for pdf in pdfs {
            let request = ConversionRequest::new(pdf.path.to_string_lossy())
                .output_dir(page_dir.to_string_lossy())
                .dpi(self.config.dpi);
            let result = rasterize(request)
                .await
                .map_err(|source| AnalyzerError::Rasterization {
                    path: pdf.path.clone(),
                    source,
                })?;
            debug!(
                "Rasterized {} → {} page(s) in {}",
                pdf.display_name(),
                result.len(),
                page_dir.display()
            );

            for image_path in &result.images {
                segments.push(load_page(image_path).await?);
            }

            self.stats.pdfs_rasterized += 1;
            self.stats.pdf_pages += result.len();
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_pdf_rasterized(&pdf.path, result.len());
            }
        }
        Ok(segments)
    }

    // ── Reporting ────────────────────────────────────────────────────────────

    async fn run_report_builder(&mut self, handoff: AnalysisHandoff) -> Result<PipelineResult, AnalyzerError> {
        let stage_start = Instant::now();
        info!("Entering {} stage", Stage::ReportBuilder);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(Stage::ReportBuilder, 0);
        }

        let system_prompt = self
            .config
            .report_prompt
            .clone()
            .unwrap_or_else(|| prompts::report_system_prompt(self.config.report_format).to_string());
        let message = AnalysisMessage::text(prompts::report_request(&handoff.task, &handoff.summary));
        let reply = self
            .model
            .respond(StageRequest {
                stage: Stage::ReportBuilder,
                system_prompt,
                message,
            })
            .await?;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_complete(Stage::ReportBuilder, reply.content.len());
        }

        let report = clean_report(&reply.content, self.config.report_format);
        let report_path = self.config.report_path();
        write_report(&report_path, &report).await?;
        info!("Wrote {} report to {}", self.config.report_format.display_name(), report_path.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_report_written(&report_path);
        }

        self.stats.report_input_tokens = reply.input_tokens;
        self.stats.report_output_tokens = reply.output_tokens;
        self.stats.report_duration_ms = stage_start.elapsed().as_millis() as u64;

        Ok(PipelineResult {
            report_path,
            trace: reply.content,
            analysis: handoff.summary,
            skipped: std::mem::take(&mut self.skipped),
            stats: self.stats.clone(),
        })
    }
}

async fn load_page(path: &Path) -> Result<Segment, AnalyzerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AnalyzerError::DocumentRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(Segment::Image {
        format: ImageFormat::Png,
        bytes,
    })
}

/// Write the report atomically: temp file next to the target, then rename,
/// so a reader never sees a half-written report.
pub async fn write_report(path: &Path, contents: &str) -> Result<(), AnalyzerError> {
    let write_err = |e| AnalyzerError::ReportWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = temp_path_for(path);
    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
