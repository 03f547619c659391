use serde::{Deserialize, Serialize};

use super::provider::{check_status, ProviderError, TranslationProvider};
use crate::locale::Locale;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;

/// OpenAI-compatible chat-completion translator (Groq by default)
pub struct LlmTranslator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn language_name(target: &str) -> &'static str {
    target
        .parse::<Locale>()
        .map(|locale| locale.language_name())
        .unwrap_or("English")
}

fn batch_prompt(items: &[String], language: &str) -> String {
    let numbered: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect();

    format!(
        "Translate the following cooking ingredients to {}. Keep the format and measurements. \
         Return ONLY a JSON array of translated strings, nothing else.\n\n\
         Ingredients:\n{}\n\n\
         Return format: [\"translated ingredient 1\", \"translated ingredient 2\", ...]",
        language,
        numbered.join("\n")
    )
}

/// Models sometimes wrap JSON in a markdown fence
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// Accept a batch answer only if it is a JSON string array of the right length
fn parse_batch(content: &str, expected: usize) -> Option<Vec<String>> {
    let parsed: Vec<String> = serde_json::from_str(strip_code_fence(content)).ok()?;
    if parsed.len() == expected {
        Some(parsed)
    } else {
        tracing::debug!(
            "LLM batch returned {} items, expected {}",
            parsed.len(),
            expected
        );
        None
    }
}

impl LlmTranslator {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn complete(&self, system: String, user: String) -> Result<Option<String>, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::new("system", system), ChatMessage::new("user", user)],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        check_status(&response)?;

        let body: ChatResponse = response.json().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty()))
    }

    /// Translate a list of ingredient lines in one request
    ///
    /// `Ok(None)` when the model's answer is not a JSON array of the same
    /// length as `items`.
    pub async fn translate_list(
        &self,
        items: &[String],
        locale: Locale,
    ) -> Result<Option<Vec<String>>, ProviderError> {
        if items.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let system = "You are a professional translator specialized in cooking and culinary terms. \
                      Always return valid JSON arrays."
            .to_string();
        let content = self
            .complete(system, batch_prompt(items, locale.language_name()))
            .await?;

        Ok(content.and_then(|content| parse_batch(&content, items.len())))
    }
}

#[async_trait::async_trait]
impl TranslationProvider for LlmTranslator {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn translate(
        &self,
        text: &str,
        _source: &str,
        target: &str,
    ) -> Result<Option<String>, ProviderError> {
        let system = format!(
            "You are a professional translator specialized in cooking and culinary content. \
             Translate to {}. Return ONLY the translated text, nothing else.",
            language_name(target)
        );
        self.complete(system, text.to_string()).await
    }
}
