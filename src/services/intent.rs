//! Keyword extraction through a Lex V2 bot (`RecognizeText`).

use async_trait::async_trait;
use aws_sdk_lexruntimev2::{Client, operation::recognize_text::RecognizeTextOutput};
use thiserror::Error;
use uuid::Uuid;

/// Name of the slot the bot fills with the searched-for keywords.
pub const KEYWORDS_SLOT: &str = "Keywords";

#[derive(Debug, Error)]
pub enum IntentError {
    #[error("intent recognition failed: {0}")]
    Recognize(String),
}

/// Maps free text to the raw value of the keywords slot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    /// `Ok(None)` when the bot produced no interpretation, no keywords slot,
    /// or no interpreted value for it.
    async fn extract_keywords(&self, text: &str) -> Result<Option<String>, IntentError>;
}

/// Which session id each recognition call is sent under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Every call shares one nominal session.
    Fixed(String),
    /// A fresh UUID per call.
    PerInvocation,
}

impl SessionPolicy {
    pub fn session_id(&self) -> String {
        match self {
            SessionPolicy::Fixed(id) => id.clone(),
            SessionPolicy::PerInvocation => Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BotSettings {
    pub bot_id: String,
    pub bot_alias_id: String,
    pub locale_id: String,
    pub session: SessionPolicy,
}

#[derive(Clone)]
pub struct LexIntents {
    client: Client,
    bot: BotSettings,
}

impl LexIntents {
    pub fn new(client: Client, bot: BotSettings) -> Self {
        Self { client, bot }
    }
}

#[async_trait]
impl IntentRecognizer for LexIntents {
    async fn extract_keywords(&self, text: &str) -> Result<Option<String>, IntentError> {
        let session_id = self.bot.session.session_id();
        let output = self
            .client
            .recognize_text()
            .bot_id(&self.bot.bot_id)
            .bot_alias_id(&self.bot.bot_alias_id)
            .locale_id(&self.bot.locale_id)
            .session_id(&session_id)
            .text(text)
            .send()
            .await
            .map_err(|err| IntentError::Recognize(err.to_string()))?;

        tracing::debug!(session_id = %session_id, response = ?output, "lex response");
        Ok(keywords_from_output(&output))
    }
}

/// `interpretations[0].intent.slots.Keywords.value.interpretedValue`
fn keywords_from_output(output: &RecognizeTextOutput) -> Option<String> {
    let value = output
        .interpretations()
        .first()?
        .intent()?
        .slots()?
        .get(KEYWORDS_SLOT)?
        .value()?
        .interpreted_value();
    Some(value)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
