use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, tracing, Error};

mod attachments;
#[cfg(test)]
mod attachments_test;
mod config;
mod errors;
mod event_handler;
mod secrets;
mod slack_client;
mod struct_event;
use event_handler::function_handler;
use secrets::KmsDecryptor;
use slack_client::SlackClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // KMS region comes from AWS_REGION via the default provider chain
    let config = aws_config::defaults(BehaviorVersion::latest())
        .load()
        .await;
    let decryptor = KmsDecryptor::new(aws_sdk_kms::Client::new(&config));
    let slack = SlackClient::new();

    let decryptor = &decryptor;
    let slack = &slack;
    run(service_fn(move |event| async move {
        function_handler(decryptor, slack, event).await
    }))
    .await
}
