use thiserror::Error;

// ============================================================================
// Boxed error alias, keeps SDK error generics out of our signatures
// ============================================================================

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Custom Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("SNS event contains no records")]
    EmptyEnvelope,

    #[error("SNS message is not valid JSON: {0}")]
    InvalidMessage(#[source] serde_json::Error),

    #[error("Cannot extract region from topic ARN '{0}'")]
    InvalidTopicArn(String),

    #[error("{variant} message is missing a required field: {source}")]
    MissingField {
        variant: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown alarm state '{0}'")]
    UnknownState(String),

    #[error("Failed to serialize Slack payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to resolve webhook URL: {0}")]
    EndpointResolution(#[from] DecryptError),

    #[error("Failed to deliver Slack message: {0}")]
    Delivery(#[from] DeliveryError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    MissingVar(&'static str),
}

#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("Ciphertext is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("KMS decrypt call failed: {message}")]
    Kms {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("KMS response did not contain plaintext")]
    NoPlaintext,

    #[error("Decrypted plaintext is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

// ============================================================================
// Result Type Alias
// ============================================================================

pub type DispatchResult<T> = Result<T, DispatchError>;
