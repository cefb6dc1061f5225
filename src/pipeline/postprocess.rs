//! Post-processing: deterministic cleanup of the report builder's reply.
//!
//! ## Why is post-processing necessary?
//!
//! Even when told not to, models wrap documents in ` ```html ... ``` `
//! fences, prepend a chatty "Here is your report:" line before the fence,
//! emit `\r\n` line endings, or sprinkle zero-width characters through the
//! text. Written verbatim, a fenced HTML file renders as a code listing in a
//! browser. These rules fix the shape of the document without touching its
//! content, and each one is independently testable.
//!
//! ## Rule Order
//!
//! Fence extraction runs first so the remaining rules see the bare document;
//! line endings are normalised before trimming so `\r` never survives as
//! trailing whitespace; the final-newline pass runs last.

use crate::config::ReportFormat;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules for a report in `format`.
///
/// Rules (applied in order):
/// 1. Unwrap the document from outer code fences, or from the first fenced
///    block of the report's own language when only short chatter surrounds it
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Markdown only: turn placeholder image links into italic captions
/// 6. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 7. Ensure the file ends with exactly one newline
pub fn clean_report(input: &str, format: ReportFormat) -> String {
    let s = extract_document(input, format);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = match format {
        ReportFormat::Markdown => remove_placeholder_images(&s),
        ReportFormat::Html => s,
    };
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Unwrap fenced documents ─────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[ \t]*(html|HTML|markdown|md)?[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap()
});

static RE_HTML_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*(?:html|HTML)[ \t]*\r?\n(.*?)\r?\n```").unwrap());

static RE_MARKDOWN_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*(?:markdown|md)[ \t]*\r?\n(.*?)\r?\n```").unwrap());

static RE_LINE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*```").unwrap());

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]").unwrap());

static RE_HTML_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!doctype|<html|<body|<h[1-6][\s>]").unwrap());

/// Longest text allowed around an inner block for it to count as chatter.
const MAX_CHATTER_LEN: usize = 400;

fn extract_document(input: &str, format: ReportFormat) -> String {
    let trimmed = input.trim();
    if let Some(caps) = RE_OUTER_FENCES.captures(trimmed) {
        let body = caps.get(2).map_or("", |m| m.as_str());
        let inner_fences = RE_LINE_FENCE.find_iter(body).count();
        // A bare wrapper may not contain fences at all: otherwise the first
        // and last lines are just the edges of two separate code blocks.
        let wrapper = match caps.get(1) {
            Some(_) => inner_fences % 2 == 0,
            None => inner_fences == 0,
        };
        if wrapper {
            return body.to_string();
        }
    }
    let block = match format {
        ReportFormat::Html => &RE_HTML_BLOCK,
        ReportFormat::Markdown => &RE_MARKDOWN_BLOCK,
    };
    if let Some(caps) = block.captures(trimmed) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            let before = &trimmed[..whole.start()];
            let after = &trimmed[whole.end()..];
            if is_chatter(before) && is_chatter(after) {
                return inner.as_str().to_string();
            }
        }
    }
    input.to_string()
}

/// Text around a fenced block that carries no document of its own.
fn is_chatter(text: &str) -> bool {
    let text = text.trim();
    text.len() <= MAX_CHATTER_LEN
        && !RE_HEADING.is_match(text)
        && !RE_HTML_DOCUMENT.is_match(text)
        && !RE_LINE_FENCE.is_match(text)
}

// ── Rule 2: Normalise line endings ──────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ───────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ──────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Placeholder image links (Markdown) ──────────────────────────────
//
// The report builder never sees the images, so any `![alt](url)` it writes
// points at a file that does not exist next to the report. Keep absolute
// http(s) links; replace everything else with the alt text in italics.

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap());

fn is_placeholder_url(url: &str) -> bool {
    let u = url.trim();
    if !u.starts_with("http://") && !u.starts_with("https://") {
        return true;
    }
    ["example.com", "placeholder.com", "dummyimage.com", "placehold.it"]
        .iter()
        .any(|d| u.contains(d))
}

fn remove_placeholder_images(input: &str) -> String {
    RE_IMAGE
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let alt = caps[1].trim();
            if !is_placeholder_url(&caps[2]) {
                caps[0].to_string()
            } else if alt.is_empty() {
                String::new()
            } else {
                format!("*{alt}*")
            }
        })
        .to_string()
}

// ── Rule 6: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 7: Ensure file ends with single newline ────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{trimmed}\n")
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_fences() {
        let input = "```html\n<!DOCTYPE html>\n<html></html>\n```";
        assert_eq!(
            clean_report(input, ReportFormat::Html),
            "<!DOCTYPE html>\n<html></html>\n"
        );
    }

    #[test]
    fn strips_bare_fences() {
        let input = "```\n# Report\nBody\n```\n";
        assert_eq!(clean_report(input, ReportFormat::Markdown), "# Report\nBody\n");
    }

    #[test]
    fn extracts_html_block_from_chatter() {
        let input = "Here is your report:\n\n```html\n<html><body>ok</body></html>\n```\n\nLet me know!";
        assert_eq!(
            clean_report(input, ReportFormat::Html),
            "<html><body>ok</body></html>\n"
        );
    }

    #[test]
    fn embedded_example_block_keeps_whole_report() {
        let input = "# Quarterly Report\n\nRevenue grew 12%.\n\nTemplate used:\n```md\n- item\n```\n\nConclusion: strong quarter.";
        assert_eq!(clean_report(input, ReportFormat::Markdown), format!("{input}\n"));
    }

    #[test]
    fn embedded_html_snippet_keeps_whole_report() {
        let input = "<!DOCTYPE html>\n<html><body>\n<p>Markup sample:</p>\n```html\n<b>x</b>\n```\n</body></html>";
        assert_eq!(clean_report(input, ReportFormat::Html), format!("{input}\n"));
    }

    #[test]
    fn leading_and_trailing_code_blocks_are_not_a_wrapper() {
        let input = "```\nls -la\n```\nSome findings.\n```\necho hi\n```";
        assert_eq!(clean_report(input, ReportFormat::Markdown), format!("{input}\n"));
    }

    #[test]
    fn tagged_wrapper_keeps_inner_code_blocks() {
        let input = "```markdown\n# Report\n\n```sh\nls\n```\n\nDone\n```";
        assert_eq!(
            clean_report(input, ReportFormat::Markdown),
            "# Report\n\n```sh\nls\n```\n\nDone\n"
        );
    }

    #[test]
    fn unfenced_document_passes_through() {
        let input = "<html>\n<body>x</body>\n</html>";
        assert_eq!(clean_report(input, ReportFormat::Html), format!("{input}\n"));
    }

    #[test]
    fn inner_code_blocks_survive_in_markdown() {
        let input = "# Report\n\n```python\nprint(1)\n```\n\nDone";
        let out = clean_report(input, ReportFormat::Markdown);
        assert!(out.contains("```python\nprint(1)\n```"));
        assert!(out.starts_with("# Report"));
    }

    #[test]
    fn normalises_line_endings_and_trailing_space() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
        assert_eq!(trim_trailing_whitespace("  a   \nb  "), "  a\nb");
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn placeholder_images_become_captions_in_markdown() {
        let input = "![Revenue chart](chart.png)\n![Real](https://arxiv.org/fig1.png)";
        let out = clean_report(input, ReportFormat::Markdown);
        assert!(out.contains("*Revenue chart*"));
        assert!(out.contains("![Real](https://arxiv.org/fig1.png)"));
    }

    #[test]
    fn html_keeps_bracket_text() {
        let input = "<p>![not an image](x)</p>";
        assert!(clean_report(input, ReportFormat::Html).contains("![not an image](x)"));
    }

    #[test]
    fn removes_invisible_characters() {
        assert_eq!(remove_invisible_chars("a\u{200B}b\u{FEFF}c"), "abc");
    }

    #[test]
    fn exactly_one_final_newline() {
        assert_eq!(ensure_final_newline("x\n\n\n"), "x\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }
}
