//! Prompts and instruction text for the two pipeline stages.
//!
//! Every prompt lives here so stage code never embeds wording, and tests can
//! inspect prompts without calling a model. Callers override the defaults via
//! [`crate::config::AnalyzerConfig::analyzer_prompt`] and
//! [`crate::config::AnalyzerConfig::report_prompt`].

use crate::config::ReportFormat;
use std::path::Path;

/// Default system prompt for the analyzer stage.
///
/// The analyzer only analyses; the report builder downstream owns the output
/// file, so the prompt forbids producing the report itself.
pub const ANALYZER_SYSTEM_PROMPT: &str = r#"You are an image analysis expert. Only analyze the image(s) and provide the following information:
    1. Summary of image analysis
    2. Insights on any trends or themes that you have observed

The information will be shared with a report generation agent. Present the information in a well structured format that is easy to consume and process.
Do NOT write the final report yourself."#;

/// Default system prompt for the report-builder stage, HTML flavour.
pub const HTML_REPORT_SYSTEM_PROMPT: &str = r#"You are an HTML report generation expert. Generate a report based on the provided analysis of the image(s). You will be provided the following information:
    1. Summary of analysis
    2. Insights on any trends or themes

Output ONLY a complete, self-contained HTML document (inline CSS, no external assets).
Do NOT wrap the document in ``` fences and do NOT add commentary."#;

/// Default system prompt for the report-builder stage, Markdown flavour.
pub const MARKDOWN_REPORT_SYSTEM_PROMPT: &str = r#"You are a report generation expert. Generate a Markdown report based on the provided analysis of the image(s). You will be provided the following information:
    1. Summary of analysis
    2. Insights on any trends or themes

Output ONLY the Markdown document. Do NOT wrap it in ``` fences and do NOT add commentary."#;

/// Built-in report prompt for `format`.
pub fn report_system_prompt(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::Html => HTML_REPORT_SYSTEM_PROMPT,
        ReportFormat::Markdown => MARKDOWN_REPORT_SYSTEM_PROMPT,
    }
}

/// Base instruction naming the output directory and format, with optional
/// caller context appended after a blank line.
pub fn build_instruction(output_dir: &Path, format: ReportFormat, context: Option<&str>) -> String {
    let article = match format {
        ReportFormat::Html => "an",
        ReportFormat::Markdown => "a",
    };
    let mut text = format!(
        "Analyze the provided images and create {article} {} report that provides high level insights and metrics in the directory {}.",
        format.display_name(),
        output_dir.display()
    );
    if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
        text.push_str("\n\nAdditional context for analysis: ");
        text.push_str(ctx);
    }
    text
}

/// The report builder's user turn: original task framing plus the analyzer's summary.
pub fn report_request(task: &str, summary: &str) -> String {
    format!("{task}\n\nAnalysis of the image(s):\n\n{summary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_output_dir_and_format() {
        let text = build_instruction(Path::new("/srv/out"), ReportFormat::Html, None);
        assert!(text.contains("/srv/out"));
        assert!(text.contains("HTML report"));
        assert!(!text.contains("\n\n"));
    }

    #[test]
    fn context_is_appended_after_one_blank_line() {
        let text = build_instruction(Path::new("out"), ReportFormat::Html, Some("Q3 sales"));
        let (base, rest) = text.split_once("\n\n").expect("blank line separator");
        assert!(base.ends_with("in the directory out."));
        assert_eq!(rest, "Additional context for analysis: Q3 sales");
    }

    #[test]
    fn empty_context_is_ignored() {
        let text = build_instruction(Path::new("out"), ReportFormat::Markdown, Some(""));
        assert!(!text.contains("Additional context"));
        assert!(text.contains("Markdown report"));
    }

    #[test]
    fn report_prompt_matches_format() {
        assert!(report_system_prompt(ReportFormat::Html).contains("HTML"));
        assert!(report_system_prompt(ReportFormat::Markdown).contains("Markdown"));
    }

    #[test]
    fn analyzer_prompt_forbids_writing_report() {
        assert!(ANALYZER_SYSTEM_PROMPT.contains("Do NOT write the final report"));
    }

    #[test]
    fn report_request_carries_task_and_summary() {
        let text = report_request("Analyze X", "- finding");
        assert!(text.starts_with("Analyze X\n\n"));
        assert!(text.ends_with("- finding"));
    }
}
