//! Text-to-speech via Google Cloud Text-to-Speech REST API

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::pipeline::SpeechSynthesizer;
use crate::{Error, Result};

/// Header carrying the API key, so it never appears in request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Output sample rate; matches what voice messages are played back at
const OUTPUT_SAMPLE_RATE_HZ: u32 = 48_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    ssml_gender: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    sample_rate_hertz: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Synthesizes OGG/Opus speech with Google Cloud Text-to-Speech
pub struct GoogleTextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GoogleTextToSpeech {
    /// Create a new synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Google API key required for TTS".to_string()));
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
impl SpeechSynthesizer for GoogleTextToSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language,
                ssml_gender: "NEUTRAL",
            },
            audio_config: AudioConfig {
                audio_encoding: "OGG_OPUS",
                sample_rate_hertz: OUTPUT_SAMPLE_RATE_HZ,
            },
        };

        let response = self
            .client
            .post(format!("{}/text:synthesize", self.base_url))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google TTS request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google TTS API error");
            return Err(Error::Synthesis(format!(
                "Google TTS error {status}: {body}"
            )));
        }

        let result: SynthesizeResponse = response.json().await?;
        decode_audio(&result)
    }

    fn name(&self) -> &'static str {
        "google-tts"
    }
}

fn decode_audio(response: &SynthesizeResponse) -> Result<Vec<u8>> {
    let audio = STANDARD
        .decode(&response.audio_content)
        .map_err(|e| Error::Synthesis(format!("invalid audio content: {e}")))?;

    if audio.is_empty() {
        return Err(Error::Synthesis("Google TTS returned no audio".to_string()));
    }
    Ok(audio)
}
