use crate::errors::ConfigError;

pub const WEBHOOK_URL_VAR: &str = "SLACK_WEBHOOK_URL";
pub const CHANNEL_VAR: &str = "SLACK_CHANNEL";
pub const USERNAME_VAR: &str = "SLACK_USERNAME";
pub const EMOJI_VAR: &str = "SLACK_EMOJI";
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Per-invocation settings for the dispatcher.
///
/// `webhook_url` is either a plain `https://hooks.slack.com/...` URL or a
/// base64 KMS ciphertext of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub webhook_url: String,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| lookup(key).ok_or(ConfigError::MissingVar(key));

        Ok(Self {
            webhook_url: require(WEBHOOK_URL_VAR)?,
            channel: require(CHANNEL_VAR)?,
            username: require(USERNAME_VAR)?,
            icon_emoji: require(EMOJI_VAR)?,
            environment: require(ENVIRONMENT_VAR)?,
        })
    }
}
