use serde_json::Value;

use super::provider::{check_status, ProviderError, TranslationProvider};

/// Google's keyless `translate_a/single` endpoint (`client=gtx`)
pub struct GoogleTranslate {
    client: reqwest::Client,
    url: String,
}

impl GoogleTranslate {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// The body is a nested array; `[0]` holds one `[translated, original, ...]`
/// entry per sentence
fn parse_response(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0)?.as_str())
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl TranslationProvider for GoogleTranslate {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;
        check_status(&response)?;

        let body: Value = response.json().await?;
        Ok(parse_response(&body))
    }
}
