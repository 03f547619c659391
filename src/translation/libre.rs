use serde::{Deserialize, Serialize};

use super::provider::{check_status, ProviderError, TranslationProvider};

/// LibreTranslate `POST /translate`
pub struct LibreTranslate {
    client: reqwest::Client,
    url: String,
}

impl LibreTranslate {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

// Some deployments answer with `translated` instead of `translatedText`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: Option<String>,
    translated: Option<String>,
}

#[async_trait::async_trait]
impl TranslationProvider for LibreTranslate {
    fn name(&self) -> &'static str {
        "libretranslate"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, ProviderError> {
        let request = LibreRequest {
            q: text,
            source,
            target,
            format: "text",
        };

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;
        check_status(&response)?;

        let body: LibreResponse = response.json().await?;
        Ok(body.translated_text.or(body.translated))
    }
}
