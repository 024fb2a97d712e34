//! Telegram voice delivery via the Bot API
//!
//! Uploaded voice messages come back with a `file_id`, which Telegram
//! accepts in place of the audio for any later `sendVoice`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::VoiceChannel;
use crate::{Error, Result};

/// Telegram Bot API base URL
const API_BASE: &str = "https://api.telegram.org/bot";

/// Telegram file download base URL
const FILE_BASE: &str = "https://api.telegram.org/file/bot";

/// Generic Bot API response envelope
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramFile {
    file_path: Option<String>,
}

#[derive(Serialize)]
struct SendVoiceRequest<'a> {
    chat_id: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    voice: Option<SentVoice>,
}

#[derive(Debug, Deserialize)]
struct SentVoice {
    file_id: String,
}

/// Delivers voice messages through a Telegram bot
pub struct TelegramVoiceChannel {
    client: reqwest::Client,
    token: SecretString,
}

impl TelegramVoiceChannel {
    /// Create a new channel for a bot token
    ///
    /// # Errors
    ///
    /// Returns error if the token is missing
    pub fn new(token: String) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("Telegram bot token required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            token: SecretString::new(token.into()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}{}/{method}", self.token.expose_secret())
    }

    /// Download a file (e.g. an incoming voice message) by `file_id`
    ///
    /// Calls `getFile` to get the file path, then downloads it.
    ///
    /// # Errors
    ///
    /// Returns error if the API request or download fails
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.method_url("getFile"))
            .json(&GetFileRequest { file_id })
            .send()
            .await
            .map_err(|e| request_error("getFile", e))?;

        let body = response
            .text()
            .await
            .map_err(|e| request_error("getFile response read", e))?;

        let file: TelegramFile = parse_result(&body, "getFile")?;
        let file_path = file.file_path.ok_or_else(|| {
            Error::Channel("Telegram getFile returned no file_path".to_string())
        })?;

        let download_url = format!("{FILE_BASE}{}/{file_path}", self.token.expose_secret());
        let data = self
            .client
            .get(&download_url)
            .send()
            .await
            .map_err(|e| request_error("file download", e))?
            .error_for_status()
            .map_err(|e| request_error("file download", e))?
            .bytes()
            .await
            .map_err(|e| request_error("file download read", e))?;

        Ok(data.to_vec())
    }
}

#[async_trait]
impl VoiceChannel for TelegramVoiceChannel {
    async fn send_voice(
        &self,
        chat_id: &str,
        audio: Vec<u8>,
        reply_to: Option<&str>,
    ) -> Result<Option<String>> {
        let part = Part::bytes(audio)
            .file_name("voice.ogg")
            .mime_str("audio/ogg")
            .map_err(|e| Error::Channel(e.to_string()))?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("voice", part);
        if let Some(id) = parse_reply_to(reply_to)? {
            form = form.text("reply_to_message_id", id.to_string());
        }

        let response = self
            .client
            .post(self.method_url("sendVoice"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error("sendVoice", e))?;

        let body = response
            .text()
            .await
            .map_err(|e| request_error("sendVoice response read", e))?;

        let sent: SentMessage = parse_result(&body, "sendVoice")?;
        tracing::debug!(chat_id, "Telegram voice message uploaded");
        Ok(sent.voice.map(|v| v.file_id))
    }

    async fn share_voice(
        &self,
        chat_id: &str,
        reference: &str,
        reply_to: Option<&str>,
    ) -> Result<()> {
        let request = SendVoiceRequest {
            chat_id,
            voice: reference,
            reply_to_message_id: parse_reply_to(reply_to)?,
        };

        let response = self
            .client
            .post(self.method_url("sendVoice"))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("sendVoice", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Channel(format!(
                "Telegram sendVoice error: {status} - {body}"
            )));
        }

        tracing::debug!(chat_id, "Telegram voice message shared");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Map a request error without its URL, which embeds the bot token
fn request_error(context: &str, e: reqwest::Error) -> Error {
    Error::Channel(format!("Telegram {context} error: {}", e.without_url()))
}

fn parse_reply_to(reply_to: Option<&str>) -> Result<Option<i64>> {
    reply_to
        .map(str::parse::<i64>)
        .transpose()
        .map_err(|e| Error::Channel(format!("invalid Telegram message id: {e}")))
}

fn parse_result<T: serde::de::DeserializeOwned>(body: &str, method: &str) -> Result<T> {
    let parsed: TelegramResponse<T> = serde_json::from_str(body)
        .map_err(|e| Error::Channel(format!("Telegram {method} parse error: {e}")))?;

    match parsed.result {
        Some(result) if parsed.ok => Ok(result),
        _ => Err(Error::Channel(format!(
            "Telegram {method} error: {}",
            parsed.description.unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_token() {
        assert!(matches!(
            TelegramVoiceChannel::new(String::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_parse_sent_voice_file_id() {
        let body = r#"{"ok": true, "result": {"message_id": 5, "voice": {"file_id": "AwACAgIAAxkB", "duration": 2}}}"#;
        let sent: SentMessage = parse_result(body, "sendVoice").unwrap();
        assert_eq!(sent.voice.unwrap().file_id, "AwACAgIAAxkB");
    }

    #[test]
    fn test_parse_sent_without_voice() {
        let body = r#"{"ok": true, "result": {"message_id": 5}}"#;
        let sent: SentMessage = parse_result(body, "sendVoice").unwrap();
        assert!(sent.voice.is_none());
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#;
        let err = parse_result::<SentMessage>(body, "sendVoice").unwrap_err();
        assert!(err.to_string().contains("chat not found"));
    }

    #[test]
    fn test_parse_reply_to() {
        assert_eq!(parse_reply_to(None).unwrap(), None);
        assert_eq!(parse_reply_to(Some("42")).unwrap(), Some(42));
        assert!(parse_reply_to(Some("abc")).is_err());
    }

    #[tokio::test]
    async fn test_request_error_hides_token() {
        let err = reqwest::Client::new()
            .post("http://127.0.0.1:1/botSECRET-TOKEN-123/sendVoice")
            .send()
            .await
            .unwrap_err();

        let err = request_error("sendVoice", err);
        assert!(matches!(err, Error::Channel(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN-123"));
    }
}
