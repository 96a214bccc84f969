//! services/api/src/adapters/gemini_llm.rs
//!
//! This module contains the adapter for the content-generating LLM. It talks to
//! Gemini through its OpenAI-compatible endpoint and implements the
//! `ContentGenerationService` port from the `core` crate.
//!
//! Keyword and competitor analyses request structured output against a JSON
//! schema; improvement and suggestion return plain text.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use seo_booster_core::{
    domain::{AnalysisResult, AnalysisType, Competitor, Keyword, Lang, Tone},
    ports::{ContentGenerationService, GenerationRequest, PortError, PortResult},
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

//=========================================================================================
// Prompts and Schemas
//=========================================================================================

/// The system instruction for one analysis mode.
pub fn system_instruction(analysis_type: AnalysisType, tone: Tone, lang: Lang) -> String {
    let language = lang.display_name();
    match analysis_type {
        AnalysisType::Improve | AnalysisType::Suggestion => format!(
            "You are an expert SEO copywriter. Rewrite the user's text to be engaging, persuasive, \
             and optimized for search engines in {language}. Keep the core message but improve the \
             language, structure and natural keyword density. The desired tone is: {}.",
            tone.as_str()
        ),
        AnalysisType::Keywords => format!(
            "You are an SEO specialist. Analyze the user's text or topic and provide the best SEO \
             keywords in {language}. The entire response, including every field of the JSON \
             schema, must be in {language}."
        ),
        AnalysisType::Competitor => format!(
            "You are a market analyst specializing in SEO. Analyze the user's topic and provide a \
             competitive analysis in {language}. The entire response, including every field of \
             the JSON schema, must be in {language}."
        ),
    }
}

/// Localized descriptions for the keyword schema: list, word, category, reason.
fn keyword_descriptions(lang: Lang) -> [&'static str; 4] {
    match lang {
        Lang::En => [
            "List of SEO keywords",
            "The keyword phrase.",
            "One of 'primary', 'secondary' or 'long-tail'.",
            "Brief reason why this is a good keyword.",
        ],
        Lang::Fr => [
            "Liste de mots-clés SEO",
            "L'expression du mot-clé.",
            "Une valeur parmi 'primary', 'secondary' ou 'long-tail'.",
            "Brève explication de la pertinence de ce mot-clé.",
        ],
    }
}

/// Localized descriptions for the competitor schema: list, name, strategy,
/// keywords, weakness.
fn competitor_descriptions(lang: Lang) -> [&'static str; 5] {
    match lang {
        Lang::En => [
            "List of competitors",
            "Name of the competitor or archetype.",
            "Their likely SEO strategy.",
            "Main keywords they might target.",
            "A weakness in their approach that can be exploited.",
        ],
        Lang::Fr => [
            "Liste des concurrents",
            "Nom du concurrent ou de l'archétype.",
            "Leur stratégie SEO probable.",
            "Principaux mots-clés qu'ils pourraient cibler.",
            "Une faiblesse de leur approche qui peut être exploitée.",
        ],
    }
}

/// The structured-output schema for a mode, or `None` for the free-text modes.
pub fn response_schema(analysis_type: AnalysisType, lang: Lang) -> Option<(&'static str, Value)> {
    match analysis_type {
        AnalysisType::Keywords => {
            let [list, word, category, reason] = keyword_descriptions(lang);
            Some((
                "keywords",
                json!({
                    "type": "object",
                    "properties": {
                        "keywords": {
                            "type": "array",
                            "description": list,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "word": { "type": "string", "description": word },
                                    "category": {
                                        "type": "string",
                                        "enum": ["primary", "secondary", "long-tail"],
                                        "description": category
                                    },
                                    "reason": { "type": "string", "description": reason }
                                },
                                "required": ["word", "category", "reason"]
                            }
                        }
                    },
                    "required": ["keywords"]
                }),
            ))
        }
        AnalysisType::Competitor => {
            let [list, name, strategy, keywords, weakness] = competitor_descriptions(lang);
            Some((
                "competitors",
                json!({
                    "type": "object",
                    "properties": {
                        "competitors": {
                            "type": "array",
                            "description": list,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string", "description": name },
                                    "strategy": { "type": "string", "description": strategy },
                                    "keywords": {
                                        "type": "array",
                                        "items": { "type": "string" },
                                        "description": keywords
                                    },
                                    "weakness": { "type": "string", "description": weakness }
                                },
                                "required": ["name", "strategy", "keywords", "weakness"]
                            }
                        }
                    },
                    "required": ["competitors"]
                }),
            ))
        }
        AnalysisType::Improve | AnalysisType::Suggestion => None,
    }
}

//=========================================================================================
// Response Parsing
//=========================================================================================

#[derive(Deserialize)]
struct KeywordsPayload {
    keywords: Vec<Keyword>,
}

#[derive(Deserialize)]
struct CompetitorsPayload {
    competitors: Vec<Competitor>,
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Turns the model's raw text into a result for `analysis_type`. Anything that
/// does not match the expected schema is an error.
pub fn parse_result(analysis_type: AnalysisType, content: &str) -> PortResult<AnalysisResult> {
    let malformed = |e: serde_json::Error| {
        PortError::Unexpected(format!("Received malformed JSON from the model: {}", e))
    };

    match analysis_type {
        AnalysisType::Improve | AnalysisType::Suggestion => {
            let text = content.trim();
            if text.is_empty() {
                return Err(PortError::Unexpected(
                    "Content generation returned empty text.".to_string(),
                ));
            }
            Ok(AnalysisResult::ImprovedText(text.to_string()))
        }
        AnalysisType::Keywords => {
            let payload: KeywordsPayload =
                serde_json::from_str(strip_code_fence(content)).map_err(malformed)?;
            Ok(AnalysisResult::Keywords(payload.keywords))
        }
        AnalysisType::Competitor => {
            let payload: CompetitorsPayload =
                serde_json::from_str(strip_code_fence(content)).map_err(malformed)?;
            Ok(AnalysisResult::Competitors(payload.competitors))
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GeminiContentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GeminiContentAdapter {
    /// Creates a new `GeminiContentAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds a client for Gemini's OpenAI-compatible endpoint.
    pub fn client_for(api_key: &str, api_base: &str) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Client::with_config(config)
    }
}

//=========================================================================================
// `ContentGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentGenerationService for GeminiContentAdapter {
    async fn generate(&self, request: &GenerationRequest) -> PortResult<AnalysisResult> {
        let instruction = system_instruction(request.analysis_type, request.tone, request.language);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instruction)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.input_text.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages).n(1);
        if let Some((name, schema)) = response_schema(request.analysis_type, request.language) {
            args.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: name.to_string(),
                    schema: Some(schema),
                    strict: None,
                },
            });
        }
        let chat_request = args
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Error calling the generation API: {}", e);
                PortError::Unexpected(e.to_string())
            })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Generation LLM response contained no text content.".to_string())
            })?;

        debug!(mode = %request.analysis_type, chars = content.len(), "Model answered");
        parse_result(request.analysis_type, &content).inspect_err(|e| {
            error!("Failed to parse model response: {}", e);
            debug!("Raw response: {}", content);
        })
    }
}
