//! Speech recognition stage
//!
//! Encoding metadata does not always match the sample rate on the wire, so
//! recognition is attempted once per candidate rate until one yields results.

use async_trait::async_trait;

use crate::lang;
use crate::{Error, Result};

/// One recognition hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    /// Recognized text
    pub transcript: String,
    /// Provider confidence in `[0, 1]`
    pub confidence: f32,
}

/// A consecutive portion of recognized audio
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSegment {
    /// Hypotheses, in provider order
    pub alternatives: Vec<RecognitionAlternative>,
    /// Language the provider detected for this segment (may be region-qualified)
    pub language: String,
}

/// Parameters for a single recognizer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Sample rate to assume for the audio
    pub sample_rate_hz: u32,
    /// Primary language hint
    pub language: String,
    /// Additional languages the speaker may use
    pub alternative_languages: Vec<String>,
}

/// Converts audio to text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize `audio` with the given parameters
    ///
    /// An empty vector means nothing was recognized at this sample rate.
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn recognize(
        &self,
        audio: &[u8],
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognitionSegment>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Best transcript for a voice message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOutcome {
    /// Highest-confidence transcript
    pub text: String,
    /// Primary subtag of the language it was recognized in
    pub language: String,
}

/// Run recognition over `sample_rates` in order
///
/// A provider error aborts immediately; only an empty result moves on to the
/// next rate. Among all alternatives of all segments the one with the highest
/// confidence wins.
///
/// # Errors
///
/// Returns `Error::Recognition` if the provider fails and
/// `Error::RecognitionEmpty` if no rate yields a non-empty transcript
pub async fn recognize(
    recognizer: &dyn SpeechRecognizer,
    audio: &[u8],
    sample_rates: &[u32],
    language: &str,
    alternative_languages: &[String],
) -> Result<RecognitionOutcome> {
    for &sample_rate_hz in sample_rates {
        let config = RecognitionConfig {
            sample_rate_hz,
            language: language.to_string(),
            alternative_languages: alternative_languages.to_vec(),
        };

        let segments = recognizer
            .recognize(audio, &config)
            .await
            .map_err(|e| Error::Recognition(e.to_string()))?;

        if let Some(outcome) = best_alternative(&segments) {
            tracing::debug!(
                recognizer = recognizer.name(),
                sample_rate_hz,
                language = %outcome.language,
                "speech recognized"
            );
            return Ok(outcome);
        }

        tracing::debug!(
            recognizer = recognizer.name(),
            sample_rate_hz,
            "no recognition results, trying next sample rate"
        );
    }

    Err(Error::RecognitionEmpty)
}

/// Select the highest-confidence alternative across all segments
///
/// Blank transcripts are not usable and are skipped. Ties keep the earlier one.
fn best_alternative(segments: &[RecognitionSegment]) -> Option<RecognitionOutcome> {
    let mut best: Option<(&RecognitionAlternative, &str)> = None;

    for segment in segments {
        for alt in &segment.alternatives {
            if alt.transcript.trim().is_empty() {
                continue;
            }
            if best.is_none_or(|(b, _)| alt.confidence > b.confidence) {
                best = Some((alt, &segment.language));
            }
        }
    }

    best.map(|(alt, language)| RecognitionOutcome {
        text: alt.transcript.clone(),
        language: lang::normalize(language).to_string(),
    })
}
