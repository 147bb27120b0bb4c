//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the topic-analysis LLM.
//! It implements the `TopicAnalysisService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert YouTube content strategist.

You will receive a creator's script (or idea notes). Analyze it and propose three new
video topics that would help this channel grow.

Your answer must describe:
- the tone and style of the input text (e.g. humorous, serious, informational),
- the expected target audience,
- three suggested topics, each with a compelling click-worthy title, a summary of the
  video's content, and the reasoning behind the recommendation.

Every field of your answer must be written in {language}."#;

const USER_INPUT_TEMPLATE: &str = r#"Analyze the following script (or idea notes) and suggest new topics.

INPUT TEXT:
"""
{input}
"""
"#;

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
use script_studio_core::{
    domain::{AnalysisResult, Suggestion},
    ports::{PortError, PortResult, TopicAnalysisService},
};
use serde::Deserialize;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TopicAnalysisService` using an OpenAI-compatible LLM
/// with a schema-constrained JSON response.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    response_language: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, response_language: String) -> Self {
        Self {
            client,
            model,
            response_language,
        }
    }
}

/// The JSON schema the backend is constrained to. Mirrors `AnalysisPayload` below.
fn analysis_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "tone": {
                "type": "string",
                "description": "The tone and style of the input text"
            },
            "targetAudience": {
                "type": "string",
                "description": "The expected target audience"
            },
            "suggestions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "A compelling, click-worthy title for the proposed video"
                        },
                        "description": {
                            "type": "string",
                            "description": "A summary of the video's content"
                        },
                        "reasoning": {
                            "type": "string",
                            "description": "Why this topic is recommended for the channel"
                        }
                    },
                    "required": ["title", "description", "reasoning"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["tone", "targetAudience", "suggestions"],
        "additionalProperties": false
    })
}

//=========================================================================================
// "Impure" Wire Payload Structs
//=========================================================================================

#[derive(Deserialize)]
struct SuggestionPayload {
    title: String,
    description: String,
    reasoning: String,
}

impl SuggestionPayload {
    fn to_domain(self) -> Suggestion {
        Suggestion {
            title: self.title,
            description: self.description,
            reasoning: self.reasoning,
        }
    }
}

#[derive(Deserialize)]
struct AnalysisPayload {
    tone: String,
    #[serde(rename = "targetAudience")]
    target_audience: String,
    suggestions: Vec<SuggestionPayload>,
}

impl AnalysisPayload {
    fn to_domain(self) -> AnalysisResult {
        AnalysisResult {
            tone: self.tone,
            target_audience: self.target_audience,
            suggestions: self
                .suggestions
                .into_iter()
                .map(SuggestionPayload::to_domain)
                .collect(),
        }
    }
}

/// Validates the raw backend payload against the analysis schema.
///
/// A blank payload is an `EmptyResponse`; anything that does not decode as the
/// required shape is a `MalformedResponse`. Suggestions keep the backend's order.
fn decode_analysis(raw: &str) -> PortResult<AnalysisResult> {
    if raw.trim().is_empty() {
        return Err(PortError::EmptyResponse);
    }
    let payload: AnalysisPayload =
        serde_json::from_str(raw).map_err(|e| PortError::MalformedResponse(e.to_string()))?;
    Ok(payload.to_domain())
}

//=========================================================================================
// `TopicAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TopicAnalysisService for OpenAiAnalysisAdapter {
    /// Analyzes the creator's notes and proposes new topics via a
    /// schema-constrained chat completion.
    async fn analyze(&self, input_text: &str) -> PortResult<AnalysisResult> {
        let system = SYSTEM_INSTRUCTIONS.replace("{language}", &self.response_language);
        let user_input = USER_INPUT_TEMPLATE.replace("{input}", input_text);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| PortError::Backend(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_input)
                    .build()
                    .map_err(|e| PortError::Backend(e.to_string()))?
                    .into(),
            ])
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some(
                        "Tone and audience analysis with suggested video topics".to_string(),
                    ),
                    name: "topic_analysis".to_string(),
                    schema: Some(analysis_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| PortError::Backend(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Backend(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(PortError::EmptyResponse)?;

        decode_analysis(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PAYLOAD: &str = r#"{
        "tone": "정보 전달 중심",
        "targetAudience": "IT 기기에 관심 많은 2030",
        "suggestions": [
            {"title": "첫 번째 주제", "description": "요약 1", "reasoning": "이유 1"},
            {"title": "두 번째 주제", "description": "요약 2", "reasoning": "이유 2"},
            {"title": "세 번째 주제", "description": "요약 3", "reasoning": "이유 3"}
        ]
    }"#;

    #[test]
    fn decodes_a_schema_conformant_payload_preserving_order() {
        let analysis = decode_analysis(VALID_PAYLOAD).unwrap();
        assert_eq!(analysis.tone, "정보 전달 중심");
        assert_eq!(analysis.target_audience, "IT 기기에 관심 많은 2030");
        let titles: Vec<&str> = analysis
            .suggestions
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["첫 번째 주제", "두 번째 주제", "세 번째 주제"]);
    }

    #[test]
    fn blank_payload_is_an_empty_response() {
        assert!(matches!(
            decode_analysis("   \n"),
            Err(PortError::EmptyResponse)
        ));
    }

    #[test]
    fn non_json_payload_is_malformed() {
        assert!(matches!(
            decode_analysis("Sure! Here are some topics..."),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let payload = r#"{"tone": "진지함", "suggestions": []}"#;
        assert!(matches!(
            decode_analysis(payload),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[test]
    fn suggestion_missing_reasoning_is_malformed() {
        let payload = r#"{
            "tone": "진지함",
            "targetAudience": "모두",
            "suggestions": [{"title": "주제", "description": "요약"}]
        }"#;
        assert!(matches!(
            decode_analysis(payload),
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[test]
    fn no_suggestions_is_still_valid() {
        let payload = r#"{"tone": "진지함", "targetAudience": "모두", "suggestions": []}"#;
        let analysis = decode_analysis(payload).unwrap();
        assert!(analysis.suggestions.is_empty());
    }
}
