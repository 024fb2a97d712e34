//! Shared test utilities
//!
//! Mock adapters record every call so tests can assert on what the pipeline
//! did and did not invoke.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use voxbridge::cache::{SpeechCache, TranslationCache, content_hash};
use voxbridge::pipeline::{
    RecognitionAlternative, RecognitionConfig, RecognitionSegment, SpeechRecognizer,
    SpeechSynthesizer, TextTranslator, TranslationPipeline,
};
use voxbridge::{CostCharger, DbPool, Error, Result, VoiceChannel, db};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Recognizer that returns the same result at every sample rate
pub struct MockRecognizer {
    /// `None` recognizes nothing; `Some((text, language))` recognizes `text`
    pub result: Option<(String, String)>,
    pub fail: bool,
    pub calls: Mutex<Vec<RecognitionConfig>>,
}

impl MockRecognizer {
    pub fn hearing(text: &str, language: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Some((text.to_string(), language.to_string())),
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn silent() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            result: None,
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn sample_rates(&self) -> Vec<u32> {
        self.calls.lock().await.iter().map(|c| c.sample_rate_hz).collect()
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(
        &self,
        _audio: &[u8],
        config: &RecognitionConfig,
    ) -> Result<Vec<RecognitionSegment>> {
        self.calls.lock().await.push(config.clone());
        if self.fail {
            return Err(Error::Recognition("mock recognizer down".to_string()));
        }

        Ok(self
            .result
            .iter()
            .map(|(text, language)| RecognitionSegment {
                alternatives: vec![RecognitionAlternative {
                    transcript: text.clone(),
                    confidence: 0.9,
                }],
                language: language.clone(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Translator returning a fixed translation
pub struct MockTranslator {
    /// `None` makes every call fail
    pub output: Option<String>,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    pub fn returning(output: &str) -> Arc<Self> {
        Arc::new(Self {
            output: Some(output.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            output: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl TextTranslator for MockTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.calls
            .lock()
            .await
            .push((text.to_string(), source.to_string(), target.to_string()));
        self.output
            .clone()
            .ok_or_else(|| Error::Translation("mock translator down".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Synthesizer returning fixed audio
pub struct MockSynthesizer {
    /// `None` makes every call fail
    pub output: Option<Vec<u8>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl MockSynthesizer {
    pub fn returning(audio: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            output: Some(audio.to_vec()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            output: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .await
            .push((text.to_string(), language.to_string()));
        self.output
            .clone()
            .ok_or_else(|| Error::Synthesis("mock synthesizer down".to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// In-memory translation cache with call log and failure switches
#[derive(Default)]
pub struct MemoryTranslationCache {
    pub entries: Mutex<HashMap<(String, String), String>>,
    pub gets: Mutex<usize>,
    pub stores: Mutex<Vec<(String, String, String)>>,
    pub fail_get: bool,
    pub fail_store: bool,
}

impl MemoryTranslationCache {
    pub async fn seed(&self, text: &str, target: &str, translation: &str) {
        self.entries
            .lock()
            .await
            .insert((content_hash(text), target.to_string()), translation.to_string());
    }

    pub async fn get_count(&self) -> usize {
        *self.gets.lock().await
    }

    pub async fn store_count(&self) -> usize {
        self.stores.lock().await.len()
    }
}

#[async_trait]
impl TranslationCache for MemoryTranslationCache {
    async fn get(&self, text: &str, _source: &str, target: &str) -> Result<Option<String>> {
        *self.gets.lock().await += 1;
        if self.fail_get {
            return Err(Error::Database("translation cache unavailable".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .await
            .get(&(content_hash(text), target.to_string()))
            .cloned())
    }

    async fn store(
        &self,
        text: &str,
        translation: &str,
        _source: &str,
        target: &str,
    ) -> Result<()> {
        self.stores.lock().await.push((
            text.to_string(),
            translation.to_string(),
            target.to_string(),
        ));
        if self.fail_store {
            return Err(Error::Database("translation cache unavailable".to_string()));
        }
        self.seed(text, target, translation).await;
        Ok(())
    }
}

/// In-memory speech cache with call log and failure switches
#[derive(Default)]
pub struct MemorySpeechCache {
    pub entries: Mutex<HashMap<(String, String), String>>,
    pub gets: Mutex<usize>,
    /// `(reference, text, language)` per store call
    pub stores: Mutex<Vec<(String, String, String)>>,
    pub fail_get: bool,
    pub fail_store: bool,
}

impl MemorySpeechCache {
    pub async fn seed(&self, text: &str, language: &str, reference: &str) {
        self.entries
            .lock()
            .await
            .insert((content_hash(text), language.to_string()), reference.to_string());
    }

    pub async fn get_count(&self) -> usize {
        *self.gets.lock().await
    }

    pub async fn stored(&self) -> Vec<(String, String, String)> {
        self.stores.lock().await.clone()
    }
}

#[async_trait]
impl SpeechCache for MemorySpeechCache {
    async fn get(&self, text: &str, language: &str) -> Result<Option<String>> {
        *self.gets.lock().await += 1;
        if self.fail_get {
            return Err(Error::Database("speech cache unavailable".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .await
            .get(&(content_hash(text), language.to_string()))
            .cloned())
    }

    async fn store(&self, reference: &str, text: &str, language: &str) -> Result<()> {
        self.stores.lock().await.push((
            reference.to_string(),
            text.to_string(),
            language.to_string(),
        ));
        if self.fail_store {
            return Err(Error::Database("speech cache unavailable".to_string()));
        }
        self.seed(text, language, reference).await;
        Ok(())
    }
}

/// Channel that records deliveries and hands out a fixed reference
pub struct MockVoiceChannel {
    pub reference: Option<String>,
    pub fail: bool,
    pub sent: Mutex<Vec<(String, Vec<u8>, Option<String>)>>,
    pub shared: Mutex<Vec<(String, String)>>,
}

impl MockVoiceChannel {
    pub fn with_reference(reference: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            reference: reference.map(ToString::to_string),
            fail: false,
            sent: Mutex::new(Vec::new()),
            shared: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reference: None,
            fail: true,
            sent: Mutex::new(Vec::new()),
            shared: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VoiceChannel for MockVoiceChannel {
    async fn send_voice(
        &self,
        chat_id: &str,
        audio: Vec<u8>,
        reply_to: Option<&str>,
    ) -> Result<Option<String>> {
        if self.fail {
            return Err(Error::Channel("mock channel down".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((chat_id.to_string(), audio, reply_to.map(ToString::to_string)));
        Ok(self.reference.clone())
    }

    async fn share_voice(
        &self,
        chat_id: &str,
        reference: &str,
        _reply_to: Option<&str>,
    ) -> Result<()> {
        if self.fail {
            return Err(Error::Channel("mock channel down".to_string()));
        }
        self.shared
            .lock()
            .await
            .push((chat_id.to_string(), reference.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Charger that records charges, optionally failing
#[derive(Default)]
pub struct MockCharger {
    pub fail: bool,
    pub charges: Mutex<Vec<(String, u64)>>,
}

#[async_trait]
impl CostCharger for MockCharger {
    async fn charge_cost(&self, user_id: &str, cost: u64) -> Result<()> {
        self.charges.lock().await.push((user_id.to_string(), cost));
        if self.fail {
            return Err(Error::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }
}

/// A pipeline wired to mocks, keeping handles to each mock
pub struct Harness {
    pub recognizer: Arc<MockRecognizer>,
    pub translator: Arc<MockTranslator>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub translations: Arc<MemoryTranslationCache>,
    pub speech: Arc<MemorySpeechCache>,
}

impl Harness {
    /// Recognizes "привет" in Russian, translates to "hello", synthesizes "OggS"
    pub fn standard() -> Self {
        Self {
            recognizer: MockRecognizer::hearing("привет", "ru-RU"),
            translator: MockTranslator::returning("hello"),
            synthesizer: MockSynthesizer::returning(b"OggS"),
            translations: Arc::new(MemoryTranslationCache::default()),
            speech: Arc::new(MemorySpeechCache::default()),
        }
    }

    pub fn pipeline(&self) -> TranslationPipeline {
        TranslationPipeline::new(
            self.recognizer.clone(),
            self.translator.clone(),
            self.synthesizer.clone(),
            self.translations.clone(),
            self.speech.clone(),
        )
    }
}
