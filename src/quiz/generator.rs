use async_trait::async_trait;
use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;
use thiserror::Error;

use crate::quiz::{Question, QuestionKind};

/// Everything that can go wrong between "prompt in" and "questions out".
/// The raw completion text never travels inside these variants; on a parse
/// failure it is logged server-side only.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("quiz provider request failed: {0}")]
    Upstream(#[from] chatgpt::err::Error),

    #[error("quiz provider returned no content")]
    EmptyResponse,

    #[error("quiz provider did not return valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("quiz provider returned an unexpected shape: {0}")]
    InvalidShape(String),
}

impl GenerateError {
    /// True when the upstream rejected our credential, so the HTTP layer can
    /// answer 401 instead of a generic 500.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            GenerateError::Upstream(chatgpt::err::Error::BackendError { message, .. }) => {
                message.contains("API key")
            }
            _ => false,
        }
    }
}

/// Seam between the HTTP layer and the actual LLM call, so handlers can be
/// exercised against a canned source.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<Question>, GenerateError>;
}

/// Builds the instruction sent to the model, embedding the pasted study text.
/// The model is told to answer with JSON only; `parse_questions` holds it to
/// that.
pub fn build_prompt(content: &str) -> String {
    format!(
        r#"You are an expert quiz maker. Your job is to create a 15-question quiz using ONLY the content provided below.
- Use a mix of MCQs, Fill in the blanks, and One-word answer types.
- Return ONLY JSON in this exact format:

[
  {{
    "type": "mcq" | "fill" | "one-word",
    "question": "string",
    "options": ["A", "B", "C", "D"], // only for mcq
    "answer": "string",
    "explanation": "string"
  }}
]

Here is the content:
"""
{content}
""""#
    )
}

pub struct OpenAiGenerator {
    client: ChatGPT,
}

impl OpenAiGenerator {
    /// Builds a client pinned to a single model with temperature 0.7 and a
    /// fixed request timeout. One attempt per prompt, no retries.
    pub fn new(api_key: String) -> Result<Self, GenerateError> {
        let mut client = ChatGPT::new(api_key)?;
        client.config.engine = ChatGPTEngine::Gpt4;
        client.config.temperature = 0.7;
        client.config.timeout = std::time::Duration::from_secs(60);
        Ok(Self { client })
    }
}

#[async_trait]
impl QuestionSource for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<Vec<Question>, GenerateError> {
        let response: CompletionResponse = self.client.send_message(prompt).await?;

        let raw = response
            .message_choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .unwrap_or_default();
        if raw.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        parse_questions(&raw).inspect_err(|err| {
            log::error!("could not use completion: {err}");
            log::error!("raw content received: {raw}");
        })
    }
}

/// Parses a completion into questions and rejects structurally unusable ones.
/// The model's output is untrusted; a question with no answer text, or an mcq
/// with nothing to choose from, would wedge the session.
pub fn parse_questions(raw: &str) -> Result<Vec<Question>, GenerateError> {
    let questions: Vec<Question> =
        serde_json::from_str(raw).map_err(GenerateError::MalformedJson)?;

    for (index, question) in questions.iter().enumerate() {
        if question.question.trim().is_empty() {
            return Err(GenerateError::InvalidShape(format!(
                "question {index} has no text"
            )));
        }
        if question.answer.trim().is_empty() {
            return Err(GenerateError::InvalidShape(format!(
                "question {index} has no answer"
            )));
        }
        if question.kind == QuestionKind::Mcq && question.options.is_empty() {
            return Err(GenerateError::InvalidShape(format!(
                "mcq question {index} has no options"
            )));
        }
    }
    Ok(questions)
}
