//! CLI binary for document-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, runs the pipeline and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use document_analyzer::tool::{self, ToolUse};
use document_analyzer::{
    analyze, load_credentials, AnalyzerConfig, PipelineProgressCallback, ProgressCallback,
    ReportFormat, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner whose message tracks the current stage,
/// with a log line printed above it at every stage boundary.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning documents…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_document_skipped(&self, path: &Path, reason: &str) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.bar
            .println(format!("  {} {}  {}", yellow("–"), name, dim(reason)));
    }

    fn on_pdf_rasterized(&self, path: &Path, page_count: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{page_count} page(s) rasterized"))
        ));
    }

    fn on_stage_start(&self, stage: Stage, image_count: usize) {
        match stage {
            Stage::Analyzer => {
                self.bar.set_prefix("Analyzing");
                self.bar.set_message(format!("{image_count} image(s)"));
            }
            Stage::ReportBuilder => {
                self.bar.set_prefix("Reporting");
                self.bar.set_message("building report");
            }
        }
    }

    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(&format!("{stage} done")),
            dim(&format!("{output_len} chars"))
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse ./documents and write ./output/analysis_report.html
  doc-analyzer

  # Give the analyzer some background
  doc-analyzer --context "Scanned grocery receipts from March"

  # Markdown report somewhere else, images only
  doc-analyzer --documents ~/scans --output ~/reports --format markdown --no-pdf

  # Use a specific model
  doc-analyzer --provider anthropic --model claude-sonnet-4-20250514

  # Rasterize a PDF directly and print the tool response
  doc-analyzer --rasterize report.pdf --first-page 2 --last-page 4 --pages-dir /tmp/pages

INPUTS:
  jpg, jpeg, png, gif, webp   sent to the analyzer as images
  pdf                         rasterized at --dpi into --pages-dir first (unless --no-pdf)
  anything else               skipped with a warning

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides --verbose / --quiet
"#;

/// Analyse images and PDFs with a vision LLM and write a report.
#[derive(Parser, Debug)]
#[command(
    name = "doc-analyzer",
    version,
    about = "Analyse images and PDFs with a vision LLM and write an HTML or Markdown report",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Additional context for image analysis.
    #[arg(long, env = "DOC_ANALYZER_CONTEXT")]
    context: Option<String>,

    /// Directory holding the documents to analyse.
    #[arg(long, env = "DOC_ANALYZER_DOCUMENTS", default_value = "documents")]
    documents: PathBuf,

    /// Directory the report is written to (created if absent).
    #[arg(short, long, env = "DOC_ANALYZER_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Report format.
    #[arg(long, env = "DOC_ANALYZER_FORMAT", value_enum, default_value = "html")]
    format: FormatArg,

    /// Report file name without extension.
    #[arg(long, env = "DOC_ANALYZER_REPORT_NAME", default_value = "analysis_report")]
    report_name: String,

    /// Skip PDFs like any other unsupported file (image-only run).
    #[arg(long, env = "DOC_ANALYZER_NO_PDF")]
    no_pdf: bool,

    /// Where rasterized PDF pages go. Default: <output>/pages.
    #[arg(long, env = "DOC_ANALYZER_PAGES_DIR")]
    pages_dir: Option<PathBuf>,

    /// PDF rendering DPI.
    #[arg(long, env = "DOC_ANALYZER_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(1..=1200))]
    dpi: u32,

    /// LLM model ID (e.g. gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DOC_ANALYZER_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max output tokens per stage.
    #[arg(long, env = "DOC_ANALYZER_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Observability credentials file ([langfuse] section).
    #[arg(long, env = "DOC_ANALYZER_CREDENTIALS", default_value = "credentials.properties")]
    credentials: PathBuf,

    /// Print the PipelineResult as JSON on stdout.
    #[arg(long, env = "DOC_ANALYZER_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "DOC_ANALYZER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOC_ANALYZER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOC_ANALYZER_QUIET")]
    quiet: bool,

    /// Rasterize this PDF with the pdf_to_png tool, print its JSON response and exit.
    #[arg(long, value_name = "PDF")]
    rasterize: Option<String>,

    /// First page for --rasterize (1-based).
    #[arg(long, requires = "rasterize")]
    first_page: Option<u32>,

    /// Last page for --rasterize (1-based, inclusive).
    #[arg(long, requires = "rasterize")]
    last_page: Option<u32>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Html,
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Markdown => ReportFormat::Markdown,
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flag-derived level.
fn init_logging(cli: &Cli, show_progress: bool) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(true)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.rasterize.is_none();
    init_logging(&cli, show_progress);

    // ── Direct tool mode ─────────────────────────────────────────────────
    if let Some(ref pdf) = cli.rasterize {
        return run_rasterize(&cli, pdf).await;
    }

    let credentials = load_credentials(&cli.credentials);
    debug!("Tracing credentials: {:?}", credentials);

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb = spinner
        .clone()
        .map(|cb| cb as Arc<dyn PipelineProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    let outcome = analyze(&config).await;
    if let Some(ref cb) = spinner {
        cb.finish();
    }
    let result = outcome.context("Document analysis failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &result.stats;
        eprintln!(
            "{}  {} image(s) analysed  {} skipped  {}ms  →  {}",
            green("✔"),
            stats.images_analyzed,
            stats.skipped_documents,
            stats.total_duration_ms,
            bold(&result.report_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens().to_string()),
            dim(&stats.total_output_tokens().to_string()),
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// `--rasterize`: run the pdf_to_png tool once and print its response.
async fn run_rasterize(cli: &Cli, pdf: &str) -> Result<ExitCode> {
    let input = json!({
        "pdf_path": pdf,
        "output_dir": cli.pages_dir.as_ref().map(|p| p.to_string_lossy().into_owned()),
        "dpi": cli.dpi,
        "first_page": cli.first_page,
        "last_page": cli.last_page,
    });
    let response = tool::invoke(&ToolUse::new(None, input)).await;
    let json = serde_json::to_string_pretty(&response).context("Failed to serialise tool response")?;
    println!("{json}");

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `AnalyzerConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .documents_dir(&cli.documents)
        .output_dir(&cli.output)
        .report_format(cli.format.into())
        .report_file_stem(cli.report_name.as_str())
        .pdf_support(!cli.no_pdf)
        .dpi(cli.dpi)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens);

    if let Some(ref context) = cli.context {
        builder = builder.additional_context(context.as_str());
    }
    if let Some(ref dir) = cli.pages_dir {
        builder = builder.page_image_dir(dir);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
