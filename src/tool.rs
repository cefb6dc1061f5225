//! JSON tool adapter for the PDF rasterizer.
//!
//! Hosts that drive tools by JSON (agent frameworks, the CLI's `--rasterize`
//! mode) go through [`invoke`]: a loosely-typed request is coerced into a
//! [`ConversionRequest`], run, and every outcome, failures included, comes
//! back as a [`ToolResponse`] value. [`invoke`] never returns `Err`.
//!
//! Numeric fields accept JSON integers, floats (truncated toward zero) and
//! numeric strings; `null` is the same as leaving the field out.

use crate::error::{RasterError, RasterErrorKind};
use crate::pipeline::rasterize::{rasterize, ConversionRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Tool name advertised to hosts.
pub const TOOL_NAME: &str = "pdf_to_png";

/// Tool specification: name, description and JSON input schema.
pub fn tool_spec() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Converts a PDF file to PNG images, one image per page",
        "inputSchema": {
            "json": {
                "type": "object",
                "properties": {
                    "pdf_path": {
                        "type": "string",
                        "description": "The path to the PDF file to convert"
                    },
                    "output_dir": {
                        "type": "string",
                        "description": "The directory where PNG images will be saved. If not provided, images will be saved in the same directory as the PDF file."
                    },
                    "dpi": {
                        "type": "integer",
                        "description": "The DPI (dots per inch) for the output images. Higher values result in larger, higher quality images.",
                        "default": 200
                    },
                    "first_page": {
                        "type": "integer",
                        "description": "The first page to convert (1-based index)",
                        "default": 1
                    },
                    "last_page": {
                        "type": "integer",
                        "description": "The last page to convert (1-based index). If not provided, all pages from first_page to the end will be converted."
                    }
                },
                "required": ["pdf_path"]
            }
        }
    })
}

/// One tool invocation as a host sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    #[serde(default, alias = "toolUseId")]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub input: Value,
}

impl ToolUse {
    pub fn new(tool_use_id: Option<String>, input: Value) -> Self {
        Self { tool_use_id, input }
    }

    /// Accept either `{ "tool_use_id": …, "input": { … } }` or the bare input
    /// object (optionally carrying its own `tool_use_id`).
    pub fn from_value(value: Value) -> Self {
        let id_of = |v: &Value| {
            v.get("tool_use_id")
                .or_else(|| v.get("toolUseId"))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let tool_use_id = id_of(&value);
        match value {
            Value::Object(mut map) if map.get("input").is_some_and(Value::is_object) => {
                let input = map.remove("input").unwrap_or(Value::Null);
                Self { tool_use_id, input }
            }
            other => Self {
                tool_use_id,
                input: other,
            },
        }
    }
}

/// Tool outcome, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    Success {
        tool_use_id: Option<String>,
        images: Vec<String>,
        message: String,
    },
    Error {
        tool_use_id: Option<String>,
        kind: RasterErrorKind,
        message: String,
    },
}

impl ToolResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success { .. })
    }

    fn from_error(tool_use_id: Option<String>, err: &RasterError) -> Self {
        ToolResponse::Error {
            tool_use_id,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Success text for `count` generated images.
pub fn success_message(count: usize) -> String {
    format!("Successfully converted PDF to {count} PNG images")
}

impl ConversionRequest {
    /// Coerce a loosely-typed JSON input object into a request.
    ///
    /// A missing `pdf_path` is not an error here; the rasterizer reports it
    /// as `MissingArgument` so every caller sees the same message.
    pub fn from_json(input: &Value) -> Result<Self, RasterError> {
        if !input.is_object() && !input.is_null() {
            return Err(RasterError::InvalidArgument {
                field: "input",
                detail: "expected a JSON object".into(),
            });
        }
        let mut request = ConversionRequest {
            pdf_path: string_field(input, "pdf_path")?,
            output_dir: string_field(input, "output_dir")?,
            ..ConversionRequest::default()
        };
        if let Some(dpi) = u32_field(input, "dpi")? {
            request.dpi = dpi;
        }
        if let Some(first) = u32_field(input, "first_page")? {
            request.first_page = first;
        }
        request.last_page = u32_field(input, "last_page")?;
        Ok(request)
    }
}

fn string_field(input: &Value, field: &'static str) -> Result<Option<String>, RasterError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(RasterError::InvalidArgument {
            field,
            detail: format!("expected a string, got {other}"),
        }),
    }
}

fn u32_field(input: &Value, field: &'static str) -> Result<Option<u32>, RasterError> {
    let invalid = |detail: String| RasterError::InvalidArgument { field, detail };
    let number = match input.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(u) => return u32::try_from(u).map(Some).map_err(|_| invalid(format!("{u} is out of range"))),
            None => n.as_f64().ok_or_else(|| invalid(format!("{n} is not a number")))?,
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.parse::<u32>() {
                Ok(u) => return Ok(Some(u)),
                Err(_) => s
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("'{s}' is not a number")))?,
            }
        }
        Some(other) => return Err(invalid(format!("expected a number, got {other}"))),
    };
    let truncated = number.trunc();
    if !truncated.is_finite() || truncated < 0.0 || truncated > u32::MAX as f64 {
        return Err(invalid(format!("{number} is out of range")));
    }
    Ok(Some(truncated as u32))
}

/// Run one tool invocation. Every outcome, including a malformed request, is
/// a [`ToolResponse`].
pub async fn invoke(tool_use: &ToolUse) -> ToolResponse {
    let tool_use_id = tool_use.tool_use_id.clone();
    let request = match ConversionRequest::from_json(&tool_use.input) {
        Ok(request) => request,
        Err(e) => {
            warn!("{} rejected its input: {}", TOOL_NAME, e);
            return ToolResponse::from_error(tool_use_id, &e);
        }
    };
    debug!("{} request: {:?}", TOOL_NAME, request);

    match rasterize(request).await {
        Ok(result) => ToolResponse::Success {
            tool_use_id,
            message: success_message(result.len()),
            images: result
                .images
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        },
        Err(e) => {
            warn!("{} failed: {}", TOOL_NAME, e);
            ToolResponse::from_error(tool_use_id, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_requires_pdf_path() {
        let spec = tool_spec();
        assert_eq!(spec["name"], "pdf_to_png");
        assert_eq!(spec["inputSchema"]["json"]["required"], json!(["pdf_path"]));
        assert_eq!(spec["inputSchema"]["json"]["properties"]["dpi"]["default"], 200);
    }

    #[test]
    fn coerces_numeric_fields() {
        let req = ConversionRequest::from_json(&json!({
            "pdf_path": "a.pdf",
            "dpi": "150",
            "first_page": 2.0,
            "last_page": 3.7,
        }))
        .unwrap();
        assert_eq!(req.dpi, 150);
        assert_eq!(req.first_page, 2);
        assert_eq!(req.last_page, Some(3));
    }

    #[test]
    fn null_means_default() {
        let req = ConversionRequest::from_json(&json!({
            "pdf_path": "a.pdf",
            "dpi": null,
            "last_page": null,
        }))
        .unwrap();
        assert_eq!(req.dpi, 200);
        assert_eq!(req.first_page, 1);
        assert_eq!(req.last_page, None);
    }

    #[test]
    fn non_numeric_field_is_invalid_argument() {
        let err = ConversionRequest::from_json(&json!({ "pdf_path": "a.pdf", "dpi": "high" }))
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument { field: "dpi", .. }));

        let err = ConversionRequest::from_json(&json!({ "pdf_path": "a.pdf", "first_page": -1 }))
            .unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument { field: "first_page", .. }));
    }

    #[test]
    fn non_string_path_is_invalid_argument() {
        let err = ConversionRequest::from_json(&json!({ "pdf_path": 12 })).unwrap_err();
        assert!(matches!(err, RasterError::InvalidArgument { field: "pdf_path", .. }));
    }

    #[test]
    fn tool_use_accepts_wrapped_and_bare_input() {
        let wrapped = ToolUse::from_value(json!({
            "toolUseId": "t-1",
            "input": { "pdf_path": "a.pdf" }
        }));
        assert_eq!(wrapped.tool_use_id.as_deref(), Some("t-1"));
        assert_eq!(wrapped.input["pdf_path"], "a.pdf");

        let bare = ToolUse::from_value(json!({ "pdf_path": "b.pdf", "tool_use_id": "t-2" }));
        assert_eq!(bare.tool_use_id.as_deref(), Some("t-2"));
        assert_eq!(bare.input["pdf_path"], "b.pdf");
    }

    #[tokio::test]
    async fn missing_path_becomes_error_payload() {
        let response = invoke(&ToolUse::new(Some("t-9".into()), json!({}))).await;
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["tool_use_id"], "t-9");
        assert_eq!(value["kind"], "missing_argument");
        assert_eq!(value["message"], "PDF path is required");
    }

    #[tokio::test]
    async fn nonexistent_pdf_becomes_not_found_payload() {
        let response = invoke(&ToolUse::new(
            None,
            json!({ "pdf_path": "/no/such/dir/file.pdf" }),
        ))
        .await;
        assert!(!response.is_success());
        match response {
            ToolResponse::Error { kind, message, .. } => {
                assert_eq!(kind, RasterErrorKind::NotFound);
                assert_eq!(message, "PDF file not found at path: /no/such/dir/file.pdf");
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn success_payload_shape() {
        let response = ToolResponse::Success {
            tool_use_id: Some("t-3".into()),
            images: vec!["out/a_page_1.png".into()],
            message: success_message(1),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "Successfully converted PDF to 1 PNG images");
        assert_eq!(value["images"][0], "out/a_page_1.png");
    }
}
