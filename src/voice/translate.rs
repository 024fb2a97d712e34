//! Text translation via Google Cloud Translation REST API (v2)

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::pipeline::TextTranslator;
use crate::{Error, Result};

/// Header carrying the API key, so it never appears in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: [&'a str; 1],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Translates plain text with Google Cloud Translation
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GoogleTranslator {
    /// Create a new translator
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Google API key required for translation".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key: SecretString::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextTranslator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let request = TranslateRequest {
            q: [text],
            source,
            target,
            format: "text",
        };

        let response = self
            .client
            .post(&self.base_url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google translate request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google translate API error");
            return Err(Error::Translation(format!(
                "Google translate error {status}: {body}"
            )));
        }

        let result: TranslateResponse = response.json().await?;
        first_translation(result)
    }

    fn name(&self) -> &'static str {
        "google-translate"
    }
}

fn first_translation(response: TranslateResponse) -> Result<String> {
    response
        .data
        .translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .ok_or_else(|| {
            Error::Translation("Google translate returned empty translations".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            GoogleTranslator::new(String::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_first_translation() {
        let response: TranslateResponse = serde_json::from_str(
            r#"{"data": {"translations": [{"translatedText": "hello"}, {"translatedText": "hi"}]}}"#,
        )
        .unwrap();
        assert_eq!(first_translation(response).unwrap(), "hello");
    }

    #[test]
    fn test_empty_translations() {
        let response: TranslateResponse =
            serde_json::from_str(r#"{"data": {"translations": []}}"#).unwrap();
        assert!(matches!(
            first_translation(response),
            Err(Error::Translation(_))
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = TranslateRequest {
            q: ["привет"],
            source: "ru",
            target: "en",
            format: "text",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"][0], "привет");
        assert_eq!(json["format"], "text");
    }

    #[tokio::test]
    async fn test_request_error_hides_api_key() {
        let translator = GoogleTranslator::new("SECRET-KEY-123".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:1/translate");

        let err = translator.translate("привет", "ru", "en").await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }
}
