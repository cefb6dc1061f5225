//! Configuration types for a document-analysis run.
//!
//! All run behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. One struct holds every knob so a run can be
//! logged, cloned into the pipeline, and diffed against another run.

use crate::error::AnalyzerError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default rendering resolution for PDF pages, in dots per inch.
pub const DEFAULT_DPI: u32 = 200;

/// Configuration for one document-analysis run.
///
/// # Example
/// ```rust
/// use document_analyzer::{AnalyzerConfig, ReportFormat};
///
/// let config = AnalyzerConfig::builder()
///     .documents_dir("invoices")
///     .output_dir("reports")
///     .report_format(ReportFormat::Markdown)
///     .additional_context("Q3 expense receipts")
///     .build()
///     .unwrap();
/// assert_eq!(config.report_path().to_str(), Some("reports/analysis_report.md"));
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Directory whose files are enumerated as input documents. Default: `documents`.
    pub documents_dir: PathBuf,

    /// Directory the report is written to; created if absent. Default: `output`.
    pub output_dir: PathBuf,

    /// Report file format. Default: [`ReportFormat::Html`].
    pub report_format: ReportFormat,

    /// Report file name without extension. Default: `analysis_report`.
    pub report_file_stem: String,

    /// Whether PDF inputs are rasterized and analysed. Default: true.
    ///
    /// When false the run behaves like the image-only variant: PDFs are
    /// skipped with a warning like any other unsupported file.
    pub pdf_support: bool,

    /// Where rasterized PDF pages are written. `None` means `<output_dir>/pages`.
    ///
    /// Keeping pages out of `documents_dir` stops a second run from picking
    /// up the previous run's page images as fresh inputs.
    pub page_image_dir: Option<PathBuf>,

    /// Rasterization DPI for PDF pages. Default: 200.
    pub dpi: u32,

    /// Free-text context appended to the base instruction.
    pub additional_context: Option<String>,

    /// LLM model identifier, e.g. "gpt-4.1-mini", "claude-sonnet-4-20250514".
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for both stages. Default: 0.3.
    pub temperature: f32,

    /// Maximum tokens either stage may generate. Default: 8192.
    ///
    /// HTML reports with inline styling run long; 8 192 leaves room for a
    /// styled multi-section report without truncation.
    pub max_tokens: usize,

    /// Custom analyzer system prompt. If None, uses the built-in default.
    pub analyzer_prompt: Option<String>,

    /// Custom report-builder system prompt. If None, uses the built-in default.
    pub report_prompt: Option<String>,

    /// Progress events for stage boundaries and skipped documents.
    pub progress_callback: Option<crate::progress::ProgressCallback>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            output_dir: PathBuf::from("output"),
            report_format: ReportFormat::default(),
            report_file_stem: "analysis_report".to_string(),
            pdf_support: true,
            page_image_dir: None,
            dpi: DEFAULT_DPI,
            additional_context: None,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.3,
            max_tokens: 8192,
            analyzer_prompt: None,
            report_prompt: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("documents_dir", &self.documents_dir)
            .field("output_dir", &self.output_dir)
            .field("report_format", &self.report_format)
            .field("report_file_stem", &self.report_file_stem)
            .field("pdf_support", &self.pdf_support)
            .field("page_image_dir", &self.page_image_dir)
            .field("dpi", &self.dpi)
            .field("additional_context", &self.additional_context)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Final location of the report file.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            self.report_file_stem,
            self.report_format.extension()
        ))
    }

    /// Directory the analyzer writes rasterized PDF pages into.
    pub fn resolved_page_image_dir(&self) -> PathBuf {
        self.page_image_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("pages"))
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.documents_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn report_format(mut self, format: ReportFormat) -> Self {
        self.config.report_format = format;
        self
    }

    pub fn report_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.config.report_file_stem = stem.into();
        self
    }

    pub fn pdf_support(mut self, enabled: bool) -> Self {
        self.config.pdf_support = enabled;
        self
    }

    pub fn page_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.page_image_dir = Some(dir.into());
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    /// Empty context is treated as absent.
    pub fn additional_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.config.additional_context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn analyzer_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.analyzer_prompt = Some(prompt.into());
        self
    }

    pub fn report_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.report_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: crate::progress::ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        let c = &self.config;
        if c.dpi == 0 {
            return Err(AnalyzerError::InvalidConfig("DPI must be ≥ 1".into()));
        }
        let stem = c.report_file_stem.trim();
        if stem.is_empty() || stem.contains(['/', '\\']) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "Report file name must be a plain, non-empty name, got '{}'",
                c.report_file_stem
            )));
        }
        if c.max_tokens == 0 {
            return Err(AnalyzerError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Format of the report the second stage writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Self-contained HTML document. (default)
    #[default]
    Html,
    /// GitHub-flavoured Markdown.
    Markdown,
}

impl ReportFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Markdown => "md",
        }
    }

    /// Name used in instruction text ("an HTML report").
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportFormat::Html => "HTML",
            ReportFormat::Markdown => "Markdown",
        }
    }
}
