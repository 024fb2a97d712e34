//! Speech-to-text via Google Cloud Speech REST API

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::pipeline::{
    RecognitionAlternative, RecognitionConfig, RecognitionSegment, SpeechRecognizer,
};
use crate::{Error, Result};

/// Header carrying the API key, so it never appears in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com/v1p1beta1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognizeConfig<'a>,
    audio: RecognizeAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    audio_channel_count: u32,
    enable_automatic_punctuation: bool,
    language_code: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    alternative_language_codes: &'a [String],
}

#[derive(Serialize)]
struct RecognizeAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeResult {
    #[serde(default)]
    alternatives: Vec<RecognizeAlternative>,
    #[serde(default)]
    language_code: Option<String>,
}

#[derive(Deserialize)]
struct RecognizeAlternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: f32,
}

/// Transcribes OGG/Opus voice messages with Google Cloud Speech
pub struct GoogleSpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GoogleSpeechToText {
    /// Create a new recognizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Google API key required for speech recognition".to_string(),
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
impl SpeechRecognizer for GoogleSpeechToText {
    async fn recognize(
        &self,
        audio: &[u8],
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognitionSegment>> {
        tracing::debug!(
            audio_bytes = audio.len(),
            sample_rate_hz = config.sample_rate_hz,
            "starting Google speech recognition"
        );

        let request = RecognizeRequest {
            config: RecognizeConfig {
                encoding: "OGG_OPUS",
                sample_rate_hertz: config.sample_rate_hz,
                audio_channel_count: 1,
                enable_automatic_punctuation: true,
                language_code: &config.language,
                alternative_language_codes: &config.alternative_languages,
            },
            audio: RecognizeAudio {
                content: STANDARD.encode(audio),
            },
        };

        let response = self
            .client
            .post(format!("{}/speech:recognize", self.base_url))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google speech request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google speech API error");
            return Err(Error::Recognition(format!(
                "Google speech API error {status}: {body}"
            )));
        }

        let result: RecognizeResponse = response.json().await?;
        Ok(into_segments(result, &config.language))
    }

    fn name(&self) -> &'static str {
        "google-speech"
    }
}

/// Map the API response; results without a language inherit the hint
fn into_segments(response: RecognizeResponse, fallback_language: &str) -> Vec<RecognitionSegment> {
    response
        .results
        .into_iter()
        .filter(|r| !r.alternatives.is_empty())
        .map(|r| RecognitionSegment {
            alternatives: r
                .alternatives
                .into_iter()
                .map(|a| RecognitionAlternative {
                    transcript: a.transcript,
                    confidence: a.confidence,
                })
                .collect(),
            language: r
                .language_code
                .unwrap_or_else(|| fallback_language.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            GoogleSpeechToText::new(String::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_into_segments() {
        let response: RecognizeResponse = serde_json::from_str(
            r#"{
                "results": [
                    {"alternatives": [{"transcript": "привет", "confidence": 0.92}], "languageCode": "ru-ru"},
                    {"alternatives": [{"transcript": "мир"}]},
                    {"alternatives": []}
                ]
            }"#,
        )
        .unwrap();

        let segments = into_segments(response, "ru");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].language, "ru-ru");
        assert_eq!(segments[0].alternatives[0].transcript, "привет");
        assert!((segments[0].alternatives[0].confidence - 0.92).abs() < f32::EPSILON);
        assert_eq!(segments[1].language, "ru");
        assert!(segments[1].alternatives[0].confidence.abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_response() {
        let response: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(into_segments(response, "en").is_empty());
    }

    #[test]
    fn test_request_shape() {
        let alternatives = vec!["en".to_string()];
        let request = RecognizeRequest {
            config: RecognizeConfig {
                encoding: "OGG_OPUS",
                sample_rate_hertz: 16_000,
                audio_channel_count: 1,
                enable_automatic_punctuation: true,
                language_code: "ru",
                alternative_language_codes: &alternatives,
            },
            audio: RecognizeAudio {
                content: STANDARD.encode(b"ogg"),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["config"]["sampleRateHertz"], 16_000);
        assert_eq!(json["config"]["alternativeLanguageCodes"][0], "en");
        assert_eq!(json["audio"]["content"], "b2dn");
    }

    #[tokio::test]
    async fn test_request_error_hides_api_key() {
        let stt = GoogleSpeechToText::new("SECRET-KEY-123".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:1");
        let config = RecognitionConfig {
            sample_rate_hz: 16_000,
            language: "ru".to_string(),
            alternative_languages: Vec::new(),
        };

        let err = stt.recognize(b"OggS", &config).await.unwrap_err();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }
}
