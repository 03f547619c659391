use thiserror::Error;

/// Errors from a single translation provider
///
/// The chain treats every variant the same way (log and try the next
/// provider); the distinction only matters for logs and tests.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A translation backend tried by the fallback chain
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short identifier used in logs and results
    fn name(&self) -> &'static str;

    /// Translate `text` from `source` (may be `auto`) into `target`
    ///
    /// `Ok(None)` means the provider answered but had nothing usable.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Reject non-2xx responses before decoding
pub(crate) fn check_status(response: &reqwest::Response) -> Result<(), ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProviderError::Status(status.as_u16()))
    }
}
