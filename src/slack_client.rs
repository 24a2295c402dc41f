use lambda_runtime::tracing;
use reqwest::Client;
use serde::Serialize;

use crate::errors::{DeliveryError, DispatchError, DispatchResult};

/// Body of a Slack incoming-webhook message.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// Legacy Slack attachment.
#[derive(Debug, Serialize)]
pub struct Attachment {
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    pub fn short(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short: true,
        }
    }

    pub fn long(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value: value.into(),
            short: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub url: String,
}

impl Action {
    pub fn button(text: &str, style: Option<&str>, url: impl Into<String>) -> Self {
        Self {
            action_type: "button".to_string(),
            text: text.to_string(),
            style: style.map(str::to_string),
            url: url.into(),
        }
    }
}

/// Posts payloads to a Slack incoming webhook.
#[derive(Clone, Default)]
pub struct SlackClient {
    http: Client,
}

impl SlackClient {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    /// Send `payload` to `webhook_url` as a form field named `payload`.
    ///
    /// One attempt only. Any status outside 2xx is an error.
    pub async fn post_webhook(
        &self,
        webhook_url: &str,
        payload: &SlackPayload,
    ) -> DispatchResult<()> {
        let body = serde_json::to_string(payload).map_err(DispatchError::Serialize)?;

        let response = self
            .http
            .post(webhook_url)
            .form(&[("payload", body.as_str())])
            .send()
            .await
            .map_err(DeliveryError::from)?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "Slack webhook accepted message");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            }
            .into())
        }
    }
}
