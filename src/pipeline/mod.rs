//! Voice translation pipeline
//!
//! Recognition, translation and synthesis run strictly in sequence. Both
//! the translation and the synthesized speech are served cache-aside:
//!
//! ```text
//! audio ─▶ recognize ─▶ resolve target ─▶ translation cache ─▶ speech cache ─▶ result
//!                                          │ miss                │ miss
//!                                          ▼                     ▼
//!                                      translator           synthesizer ─▶ PendingFlush
//! ```
//!
//! The speech cache stores an external reference to delivered audio, not
//! the audio itself. On a synthesis miss the pipeline cannot store anything
//! yet, so it hands the caller a [`PendingFlush`] to complete once the audio
//! has been delivered and a reference is known.

pub mod recognition;
mod service;

use async_trait::async_trait;

pub use recognition::{
    RecognitionAlternative, RecognitionConfig, RecognitionOutcome, RecognitionSegment,
    SpeechRecognizer,
};
pub use service::{DEFAULT_SAMPLE_RATES, TranslationPipeline};

use crate::Result;
use crate::cache::SpeechCache;

/// Translates text between languages
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate `text` from `source` to `target`
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Synthesizes speech from text
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language`, returning encoded audio
    ///
    /// # Errors
    ///
    /// Returns error if the provider call fails
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// One voice message to translate
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Encoded audio (OGG/Opus for the Google adapters)
    pub audio: Vec<u8>,
    /// Duration in seconds, used for cost and adapter hints
    pub duration_secs: u64,
    /// Declared source language tag
    pub source_lang: String,
    /// Declared target language tag
    pub target_lang: String,
}

impl TranslationRequest {
    /// Create a new request
    #[must_use]
    pub fn new(
        audio: Vec<u8>,
        duration_secs: u64,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            audio,
            duration_secs,
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

/// Speech-cache entry waiting for a delivery reference
///
/// Carries the exact key the speech cache needs. Dropping it unflushed is
/// harmless; the next identical request simply synthesizes again.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "flush after delivery to make the audio reusable"]
pub struct PendingFlush {
    /// Translated text that was synthesized
    pub text: String,
    /// Language the speech was synthesized in
    pub language: String,
}

impl PendingFlush {
    /// Store `reference` for this text/language in the speech cache
    ///
    /// Consumes the pending entry so it is stored at most once.
    ///
    /// # Errors
    ///
    /// Returns error if the cache store fails
    pub async fn flush(self, cache: &dyn SpeechCache, reference: &str) -> Result<()> {
        cache.store(reference, &self.text, &self.language).await
    }
}

/// Audio produced by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutput {
    /// Freshly synthesized audio; deliver it, then flush
    Fresh {
        /// Encoded audio bytes
        audio: Vec<u8>,
        /// Cache entry to complete after delivery
        pending: PendingFlush,
    },
    /// Previously delivered audio; reuse the reference, do not re-upload
    Existing {
        /// External reference from an earlier delivery
        reference: String,
    },
}

/// Outcome of a successful translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateResult {
    /// Audio bytes or a reference to existing audio
    pub speech: SpeechOutput,
    /// Points charged by the stages that ran
    pub cost: u64,
    /// Text recognized from the input audio
    pub recognized_text: String,
    /// Translation of the recognized text
    pub translated_text: String,
    /// Language the translation was produced in
    pub target_lang: String,
}

impl TranslateResult {
    /// Whether existing audio should be reused
    #[must_use]
    pub const fn use_existing(&self) -> bool {
        matches!(self.speech, SpeechOutput::Existing { .. })
    }

    /// External reference when the speech cache was hit
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match &self.speech {
            SpeechOutput::Existing { reference } => Some(reference),
            SpeechOutput::Fresh { .. } => None,
        }
    }

    /// Raw audio when speech was synthesized
    #[must_use]
    pub fn audio(&self) -> Option<&[u8]> {
        match &self.speech {
            SpeechOutput::Fresh { audio, .. } => Some(audio),
            SpeechOutput::Existing { .. } => None,
        }
    }

    /// Pending speech-cache entry when speech was synthesized
    #[must_use]
    pub const fn pending_flush(&self) -> Option<&PendingFlush> {
        match &self.speech {
            SpeechOutput::Fresh { pending, .. } => Some(pending),
            SpeechOutput::Existing { .. } => None,
        }
    }
}
