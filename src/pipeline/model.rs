//! Model access: the [`StageModel`] seam and its `edgequake-llm` implementation.
//!
//! Stages never talk to an `LLMProvider` directly. They hand a
//! [`StageRequest`] to a [`StageModel`] and get text back, which lets tests
//! drive the whole pipeline with a scripted model and keeps provider wiring
//! (message layout, options, error mapping) in one place.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::message::AnalysisMessage;
use crate::pipeline::encode::encode_image;
use crate::pipeline::Stage;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Model used when a provider is named or auto-detected without a model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Everything a stage sends to the model.
#[derive(Debug, Clone)]
pub struct StageRequest {
    pub stage: Stage,
    pub system_prompt: String,
    pub message: AnalysisMessage,
}

/// The model's answer plus usage accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReply {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl StageReply {
    /// A reply with no usage information.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// One call to a language model on behalf of a stage.
#[async_trait]
pub trait StageModel: Send + Sync {
    async fn respond(&self, request: StageRequest) -> Result<StageReply, AnalyzerError>;
}

/// [`StageModel`] backed by an `edgequake-llm` provider.
pub struct ProviderModel {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderModel {
    pub fn new(provider: Arc<dyn LLMProvider>, temperature: f32, max_tokens: usize) -> Self {
        Self {
            provider,
            options: CompletionOptions {
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
                ..Default::default()
            },
        }
    }

    /// Resolve the provider for `config` and wrap it with the config's options.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config.temperature, config.max_tokens))
    }
}

/// Every image segment of `message` as base64 `ImageData`, in message order.
pub fn attachments(message: &AnalysisMessage) -> Vec<ImageData> {
    message
        .images()
        .map(|(format, bytes)| encode_image(format, bytes))
        .collect()
}

/// Lay a stage request out as chat messages.
///
/// 1. **System message**: the stage prompt
/// 2. **User message**: all text segments joined by blank lines, with every
///    image segment attached (none for the report builder)
pub fn build_messages(request: &StageRequest) -> Vec<ChatMessage> {
    let text = request.message.joined_text();
    vec![
        ChatMessage::system(request.system_prompt.as_str()),
        ChatMessage::user_with_images(&text, attachments(&request.message)),
    ]
}

#[async_trait]
impl StageModel for ProviderModel {
    async fn respond(&self, request: StageRequest) -> Result<StageReply, AnalyzerError> {
        let start = Instant::now();
        let stage = request.stage;
        let messages = build_messages(&request);

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| AnalyzerError::Stage {
                stage,
                message: format!("{e}"),
            })?;

        debug!(
            "{} stage: {} input tokens, {} output tokens, {:?}",
            stage,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(StageReply {
            content: response.content,
            input_tokens: response.prompt_tokens as u64,
            output_tokens: response.completion_tokens as u64,
        })
    }
}

// ── Provider resolution ─────────────────────────────────────────────────────

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AnalyzerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or
///    [`DEFAULT_MODEL`]; the factory reads that provider's API key from the
///    environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    honoured when both are non-empty.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set, so users with several keys
///    get a predictable default.
/// 5. **Full auto-detection** via `ProviderFactory::from_env`.
pub fn resolve_provider(config: &AnalyzerConfig) -> Result<Arc<dyn LLMProvider>, AnalyzerError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AnalyzerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
