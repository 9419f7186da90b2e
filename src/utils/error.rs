use crate::domain::model::ProcessingStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Failed to fetch survey response (status: {status:?})")]
    UpstreamFetchError { status: Option<u16>, body: String },

    #[error("No email found in survey response {response_id}")]
    NoEmailFoundError { response_id: String },

    #[error("Failed to create person in CRM (status: {status:?})")]
    CrmWriteError {
        email: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Unhandled error: {message}")]
    UnhandledError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The inbound notification or the fetched response was unusable.
    Client,
    /// One of the third-party APIs failed.
    Upstream,
    /// Startup configuration problems.
    Configuration,
    Internal,
}

impl BridgeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::ValidationError { .. } | BridgeError::NoEmailFoundError { .. } => {
                ErrorCategory::Client
            }
            BridgeError::UpstreamFetchError { .. } | BridgeError::CrmWriteError { .. } => {
                ErrorCategory::Upstream
            }
            BridgeError::ConfigError { .. }
            | BridgeError::MissingConfigError { .. }
            | BridgeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BridgeError::UnhandledError { .. } | BridgeError::IoError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// HTTP status the webhook caller receives for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            BridgeError::ValidationError { .. } | BridgeError::NoEmailFoundError { .. } => 400,
            _ => 500,
        }
    }

    /// Message placed in the `error` field of the webhook response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            BridgeError::ValidationError { .. } => "Missing required data",
            BridgeError::UpstreamFetchError { .. } => "Failed to fetch response",
            BridgeError::NoEmailFoundError { .. } => "No email found",
            BridgeError::CrmWriteError { .. } => "Failed to create person in Attio",
            _ => "Processing failed",
        }
    }

    /// Stage of the webhook flow that produced the error.
    pub fn stage(&self) -> ProcessingStage {
        match self {
            BridgeError::ValidationError { .. } => ProcessingStage::Validated,
            BridgeError::UpstreamFetchError { .. } => ProcessingStage::Fetching,
            BridgeError::NoEmailFoundError { .. } => ProcessingStage::Extracted,
            BridgeError::CrmWriteError { .. } => ProcessingStage::Submitting,
            _ => ProcessingStage::Rejected,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
