//! Voice message delivery
//!
//! Runs one inbound voice message through the pipeline, charges the user,
//! delivers the result over a [`VoiceChannel`] and completes the deferred
//! speech-cache flush once the channel has assigned a reference.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::channels::VoiceChannel;
use crate::pipeline::{SpeechOutput, TranslationPipeline, TranslationRequest};

/// Deducts pipeline cost from a user's balance
#[async_trait]
pub trait CostCharger: Send + Sync {
    /// Charge `cost` points to `user_id`
    ///
    /// # Errors
    ///
    /// Returns error if the user is unknown or the ledger is unavailable
    async fn charge_cost(&self, user_id: &str, cost: u64) -> Result<()>;
}

/// An inbound voice message
#[derive(Debug, Clone)]
pub struct VoiceMessage {
    pub user_id: String,
    pub chat_id: String,
    /// Message to reply to, if the transport supports threading
    pub reply_to: Option<String>,
    pub audio: Vec<u8>,
    pub duration_secs: u64,
    pub source_lang: String,
    pub target_lang: String,
}

/// What happened while handling a voice message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// Points charged
    pub cost: u64,
    /// Previously delivered audio was reused
    pub reused: bool,
    /// Reference of the delivered audio, if known
    pub reference: Option<String>,
    /// The speech cache was updated with a new reference
    pub flushed: bool,
    pub recognized_text: String,
    pub translated_text: String,
}

/// Handles voice messages end to end
pub struct VoiceHandler {
    pipeline: Arc<TranslationPipeline>,
    channel: Arc<dyn VoiceChannel>,
    charger: Arc<dyn CostCharger>,
}

impl VoiceHandler {
    /// Create a new handler
    #[must_use]
    pub fn new(
        pipeline: Arc<TranslationPipeline>,
        channel: Arc<dyn VoiceChannel>,
        charger: Arc<dyn CostCharger>,
    ) -> Self {
        Self {
            pipeline,
            channel,
            charger,
        }
    }

    /// Translate, charge and deliver a voice message
    ///
    /// Charging and flushing failures are logged and do not fail delivery.
    ///
    /// # Errors
    ///
    /// Returns error if the pipeline or the channel fails
    pub async fn handle(&self, message: VoiceMessage) -> Result<DeliveryOutcome> {
        let VoiceMessage {
            user_id,
            chat_id,
            reply_to,
            audio,
            duration_secs,
            source_lang,
            target_lang,
        } = message;

        let request = TranslationRequest::new(audio, duration_secs, source_lang, target_lang);
        let result = self.pipeline.translate(&request).await?;

        if let Err(e) = self.charger.charge_cost(&user_id, result.cost).await {
            tracing::warn!(user_id = %user_id, cost = result.cost, error = %e, "failed to charge user");
        }

        let mut outcome = DeliveryOutcome {
            cost: result.cost,
            reused: false,
            reference: None,
            flushed: false,
            recognized_text: result.recognized_text,
            translated_text: result.translated_text,
        };

        match result.speech {
            SpeechOutput::Existing { reference } => {
                self.channel
                    .share_voice(&chat_id, &reference, reply_to.as_deref())
                    .await?;
                outcome.reused = true;
                outcome.reference = Some(reference);
            }
            SpeechOutput::Fresh { audio, pending } => {
                let reference = self
                    .channel
                    .send_voice(&chat_id, audio, reply_to.as_deref())
                    .await?;

                match &reference {
                    Some(reference) => {
                        let cache = self.pipeline.speech_cache();
                        match pending.flush(cache, reference).await {
                            Ok(()) => outcome.flushed = true,
                            Err(e) => {
                                tracing::warn!(error = %e, "failed to store generated speech in cache");
                            }
                        }
                    }
                    None => {
                        tracing::warn!(
                            channel = self.channel.name(),
                            "channel returned no voice reference; speech not cached"
                        );
                    }
                }
                outcome.reference = reference;
            }
        }

        tracing::info!(
            user_id = %user_id,
            chat_id = %chat_id,
            channel = self.channel.name(),
            cost = outcome.cost,
            reused = outcome.reused,
            "voice message delivered"
        );

        Ok(outcome)
    }
}
