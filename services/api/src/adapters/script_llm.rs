//! services/api/src/adapters/script_llm.rs
//!
//! This module contains the adapter for the script-generation LLM.
//! It implements the `ScriptGenerationService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a professional YouTube scriptwriter. You write complete,
ready-to-film video scripts with strong hooks and clear structure.

The entire script must be written in {language}."#;

const USER_INPUT_TEMPLATE: &str = r#"Write a complete YouTube video script from the following brief.

TOPIC: {topic}
DESIRED TONE AND MANNER: {tone}
TARGET AUDIENCE: {audience}

Script structure:
1. [Hook]: a striking line or scene that grabs the viewer within the first five seconds
2. [Opening]: introduce the topic and the value the viewer will get from the video
3. [Body]: a logical, engaging development with at least three points
4. [Conclusion]: recap the key takeaways
5. [Outro]: ask for likes and subscriptions and close with a question for the audience

Format the script as easy-to-read markdown, and include filming directions
(camera changes, sound effects, and so on) in parentheses ()."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use script_studio_core::{
    domain::ScriptResult,
    ports::{PortError, PortResult, ScriptGenerationService},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ScriptGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiScriptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    response_language: String,
}

impl OpenAiScriptAdapter {
    /// Creates a new `OpenAiScriptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, response_language: String) -> Self {
        Self {
            client,
            model,
            response_language,
        }
    }
}

/// Composes the generation brief sent as the user message.
fn build_prompt(topic_title: &str, tone: &str, target_audience: &str) -> String {
    USER_INPUT_TEMPLATE
        .replace("{topic}", topic_title)
        .replace("{tone}", tone)
        .replace("{audience}", target_audience)
}

/// Pairs the backend's text with the caller's topic title.
///
/// The title is always the caller-supplied `topic_title` verbatim, never
/// whatever title the model might echo inside the text. Blank text is an
/// `EmptyResponse`.
fn compose_result(topic_title: &str, content: String) -> PortResult<ScriptResult> {
    if content.trim().is_empty() {
        return Err(PortError::EmptyResponse);
    }
    Ok(ScriptResult {
        title: topic_title.to_string(),
        content,
    })
}

//=========================================================================================
// `ScriptGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScriptGenerationService for OpenAiScriptAdapter {
    /// Generates a full long-form script as free text (not schema-constrained).
    async fn generate_script(
        &self,
        topic_title: &str,
        tone: &str,
        target_audience: &str,
    ) -> PortResult<ScriptResult> {
        let system = SYSTEM_INSTRUCTIONS.replace("{language}", &self.response_language);
        let user_input = build_prompt(topic_title, tone, target_audience);

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
            .temperature(0.8)
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

        compose_result(topic_title, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_the_full_brief() {
        let prompt = build_prompt("가성비 노트북 구매 가이드", "정보 전달 중심", "2030 직장인");
        assert!(prompt.contains("TOPIC: 가성비 노트북 구매 가이드"));
        assert!(prompt.contains("DESIRED TONE AND MANNER: 정보 전달 중심"));
        assert!(prompt.contains("TARGET AUDIENCE: 2030 직장인"));
    }

    #[test]
    fn result_title_is_the_topic_title_verbatim() {
        let result = compose_result(
            "가성비 노트북 구매 가이드",
            "# 전혀 다른 제목\n\n대본 본문...".to_string(),
        )
        .unwrap();
        assert_eq!(result.title, "가성비 노트북 구매 가이드");
        assert!(result.content.starts_with("# 전혀 다른 제목"));
    }

    #[test]
    fn blank_text_is_an_empty_response() {
        assert!(matches!(
            compose_result("주제", "  \n".to_string()),
            Err(PortError::EmptyResponse)
        ));
    }
}
