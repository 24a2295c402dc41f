use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde_json::Value;

use crate::attachments::build_payload;
use crate::config::Config;
use crate::errors::{DispatchError, DispatchResult};
use crate::secrets::{resolve_endpoint, SecretDecryptor};
use crate::slack_client::SlackClient;
use crate::struct_event::Notification;

/// Message body and source region taken from one SNS record.
#[derive(Debug)]
pub struct InboundRecord {
    pub message: Value,
    pub region: String,
}

/// Formats one notification and sends it to Slack.
pub struct Dispatcher<'a> {
    config: Config,
    decryptor: &'a dyn SecretDecryptor,
    slack: &'a SlackClient,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        config: Config,
        decryptor: &'a dyn SecretDecryptor,
        slack: &'a SlackClient,
    ) -> Self {
        Self {
            config,
            decryptor,
            slack,
        }
    }

    pub async fn dispatch(&self, message: &Value, region: &str) -> DispatchResult<()> {
        let notification = Notification::parse(message)?;
        tracing::info!(
            kind = notification.kind().label(),
            region,
            "Formatting notification"
        );

        let payload = build_payload(&notification, region, &self.config)?;
        let url = resolve_endpoint(&self.config.webhook_url, self.decryptor).await?;

        self.slack.post_webhook(&url, &payload).await
    }
}

pub(crate) async fn function_handler(
    decryptor: &dyn SecretDecryptor,
    slack: &SlackClient,
    event: LambdaEvent<SnsEvent>,
) -> Result<Value, Error> {
    match handle_invocation(decryptor, slack, &event.payload).await {
        Ok(message) => Ok(message),
        Err(e) => {
            tracing::error!("Failed to notify Slack: {}", e);
            Err(e.into())
        }
    }
}

/// Unwrap the event, read configuration, dispatch, and echo the message back.
async fn handle_invocation(
    decryptor: &dyn SecretDecryptor,
    slack: &SlackClient,
    event: &SnsEvent,
) -> DispatchResult<Value> {
    let record = unwrap_envelope(event)?;
    let config = Config::from_env()?;

    Dispatcher::new(config, decryptor, slack)
        .dispatch(&record.message, &record.region)
        .await?;

    Ok(record.message)
}

/// Take the first record of an SNS event apart.
pub fn unwrap_envelope(event: &SnsEvent) -> DispatchResult<InboundRecord> {
    let record = event.records.first().ok_or(DispatchError::EmptyEnvelope)?;
    parse_record(&record.sns.message, &record.sns.topic_arn)
}

pub fn parse_record(message: &str, topic_arn: &str) -> DispatchResult<InboundRecord> {
    let message: Value = serde_json::from_str(message).map_err(DispatchError::InvalidMessage)?;
    let region = region_from_arn(topic_arn)
        .ok_or_else(|| DispatchError::InvalidTopicArn(topic_arn.to_string()))?;

    Ok(InboundRecord {
        message,
        region: region.to_string(),
    })
}

// arn:aws:sns:<region>:<account>:<topic>
fn region_from_arn(arn: &str) -> Option<&str> {
    arn.split(':').nth(3)
}
