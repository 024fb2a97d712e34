//! Speech and translation provider adapters
//!
//! Google Cloud REST clients implementing the pipeline's adapter traits.

mod stt;
mod translate;
mod tts;

pub use stt::GoogleSpeechToText;
pub use translate::GoogleTranslator;
pub use tts::GoogleTextToSpeech;
