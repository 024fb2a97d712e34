//! Voxbridge - Voice message translation
//!
//! This library turns a voice recording into a spoken translation:
//! - Speech recognition across candidate sample rates
//! - Text translation and speech synthesis via Google Cloud
//! - Content-addressed caching of translations and delivered speech
//! - Per-stage cost accounting charged to user balances
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Channels                          │
//! │        Telegram   │   Local voice store              │
//! └────────────────────┬────────────────────────────────┘
//!                      │ VoiceHandler (charge, deliver, flush)
//! ┌────────────────────▼────────────────────────────────┐
//! │               TranslationPipeline                    │
//! │   Recognize  │  Translate  │  Synthesize  │  Cost    │
//! └──────────┬─────────────────────────┬────────────────┘
//!            │                         │
//! ┌──────────▼───────────┐  ┌──────────▼──────────────┐
//! │  Google Cloud REST   │  │  SQLite caches + users  │
//! └──────────────────────┘  └─────────────────────────┘
//! ```

pub mod cache;
pub mod channels;
pub mod config;
pub mod cost;
pub mod db;
pub mod delivery;
pub mod error;
pub mod lang;
pub mod pipeline;
pub mod voice;

pub use cache::{CacheStats, SpeechCache, SqliteSpeechCache, SqliteTranslationCache, TranslationCache};
pub use channels::{LocalVoiceStore, TelegramVoiceChannel, VoiceChannel};
pub use config::Config;
pub use db::{DbConn, DbPool, User, UserDefaults, UserRepo};
pub use delivery::{CostCharger, DeliveryOutcome, VoiceHandler, VoiceMessage};
pub use error::{Error, Result};
pub use pipeline::{
    PendingFlush, SpeechOutput, SpeechRecognizer, SpeechSynthesizer, TextTranslator,
    TranslateResult, TranslationPipeline, TranslationRequest,
};
pub use voice::{GoogleSpeechToText, GoogleTextToSpeech, GoogleTranslator};
