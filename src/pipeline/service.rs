//! Pipeline orchestration

use std::sync::Arc;

use super::recognition::{self, SpeechRecognizer};
use super::{
    PendingFlush, SpeechOutput, SpeechSynthesizer, TextTranslator, TranslateResult,
    TranslationRequest,
};
use crate::cache::{SpeechCache, TranslationCache};
use crate::cost::{self, CostLedger};
use crate::lang;
use crate::{Error, Result};

/// Default candidate sample rates: a low-rate then a high-rate profile
pub const DEFAULT_SAMPLE_RATES: &[u32] = &[16_000, 48_000];

/// Performs voice message translation
///
/// Holds no per-request state, so one instance can serve many concurrent
/// callers. Adapters and caches must tolerate concurrent use.
#[derive(Clone)]
pub struct TranslationPipeline {
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn TextTranslator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    translation_cache: Arc<dyn TranslationCache>,
    speech_cache: Arc<dyn SpeechCache>,
    sample_rates: Vec<u32>,
}

impl TranslationPipeline {
    /// Create a new pipeline
    #[must_use]
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn TextTranslator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        translation_cache: Arc<dyn TranslationCache>,
        speech_cache: Arc<dyn SpeechCache>,
    ) -> Self {
        Self {
            recognizer,
            translator,
            synthesizer,
            translation_cache,
            speech_cache,
            sample_rates: DEFAULT_SAMPLE_RATES.to_vec(),
        }
    }

    /// Override the candidate sample rates tried during recognition
    #[must_use]
    pub fn with_sample_rates(mut self, sample_rates: Vec<u32>) -> Self {
        self.sample_rates = sample_rates;
        self
    }

    /// Speech cache used for flushing delivered audio
    #[must_use]
    pub fn speech_cache(&self) -> &dyn SpeechCache {
        self.speech_cache.as_ref()
    }

    /// Translate a voice message
    ///
    /// # Errors
    ///
    /// Returns a stage error (`Recognition`, `RecognitionEmpty`,
    /// `Translation`, `Synthesis`). Cache failures never abort.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslateResult> {
        let mut ledger = CostLedger::new();

        let recognized = recognition::recognize(
            self.recognizer.as_ref(),
            &request.audio,
            &self.sample_rates,
            &request.source_lang,
            std::slice::from_ref(&request.target_lang),
        )
        .await?;
        ledger.add(cost::recognition(request.duration_secs));

        let target =
            lang::resolve_target(&recognized.language, &request.source_lang, &request.target_lang)
                .to_string();
        tracing::debug!(
            recognized_lang = %recognized.language,
            target_lang = %target,
            "resolved target language"
        );

        let translated = self
            .translate_text(&recognized.text, &recognized.language, &target, &mut ledger)
            .await?;

        let speech = self
            .speak(&translated, &target, request.duration_secs, &mut ledger)
            .await?;

        let cost = ledger.total();
        tracing::info!(
            cost,
            speech_cache_hit = matches!(speech, SpeechOutput::Existing { .. }),
            target_lang = %target,
            "voice message translated"
        );

        Ok(TranslateResult {
            speech,
            cost,
            recognized_text: recognized.text,
            translated_text: translated,
            target_lang: target,
        })
    }

    /// Store a delivery reference for freshly synthesized speech
    ///
    /// # Errors
    ///
    /// Returns error if the speech cache store fails
    pub async fn flush(&self, pending: PendingFlush, reference: &str) -> Result<()> {
        pending.flush(self.speech_cache.as_ref(), reference).await
    }

    /// Translation cache-aside
    async fn translate_text(
        &self,
        text: &str,
        source: &str,
        target: &str,
        ledger: &mut CostLedger,
    ) -> Result<String> {
        match self.translation_cache.get(text, source, target).await {
            Ok(Some(cached)) => {
                tracing::debug!(target_lang = target, "translation cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to lookup text translation in cache");
            }
        }

        let translated = self
            .translator
            .translate(text, source, target)
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;
        ledger.add(cost::translation(text));

        if let Err(e) = self
            .translation_cache
            .store(text, &translated, source, target)
            .await
        {
            tracing::warn!(error = %e, "failed to store text translation in cache");
        }

        Ok(translated)
    }

    /// Speech cache-aside; the store half is deferred to the caller
    async fn speak(
        &self,
        text: &str,
        language: &str,
        duration_secs: u64,
        ledger: &mut CostLedger,
    ) -> Result<SpeechOutput> {
        match self.speech_cache.get(text, language).await {
            Ok(Some(reference)) => {
                tracing::debug!(language, "speech cache hit");
                return Ok(SpeechOutput::Existing { reference });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to lookup generated speech in cache");
            }
        }

        let audio = self
            .synthesizer
            .synthesize(text, language)
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        ledger.add(cost::synthesis(duration_secs));

        Ok(SpeechOutput::Fresh {
            audio,
            pending: PendingFlush {
                text: text.to_string(),
                language: language.to_string(),
            },
        })
    }
}
