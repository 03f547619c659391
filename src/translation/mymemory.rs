use serde::Deserialize;

use super::provider::{check_status, ProviderError, TranslationProvider};
use crate::locale::Locale;

/// MyMemory `GET /get?q=..&langpair=src|dst` (keyless, daily quota)
pub struct MyMemory {
    client: reqwest::Client,
    url: String,
}

impl MyMemory {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<ResponseData>,
    // Quota and validation problems come back as 200 with a non-200 status here
    response_status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

fn region_code(language: &str) -> String {
    language
        .parse::<Locale>()
        .map(|locale| locale.mymemory_code().to_string())
        .unwrap_or_else(|_| language.to_string())
}

/// MyMemory has no auto-detection; recipe content is English
fn langpair(source: &str, target: &str) -> String {
    let source = if source.eq_ignore_ascii_case("auto") {
        "en".to_string()
    } else {
        region_code(source)
    };
    format!("{}|{}", source, region_code(target))
}

fn status_ok(status: &Option<serde_json::Value>) -> bool {
    match status {
        None => true,
        Some(serde_json::Value::Number(n)) => n.as_u64() == Some(200),
        Some(serde_json::Value::String(s)) => s == "200",
        Some(_) => false,
    }
}

#[async_trait::async_trait]
impl TranslationProvider for MyMemory {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, ProviderError> {
        let pair = langpair(source, target);
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", text), ("langpair", pair.as_str())])
            .send()
            .await?;
        check_status(&response)?;

        let body: MyMemoryResponse = response.json().await?;
        if !status_ok(&body.response_status) {
            return Err(ProviderError::UnexpectedResponse(format!(
                "responseStatus {:?}",
                body.response_status
            )));
        }

        Ok(body.response_data.and_then(|data| data.translated_text))
    }
}
