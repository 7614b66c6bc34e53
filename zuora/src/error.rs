//! Error handling for the Zuora client

use crate::validation::ValidationErrors;
use std::fmt;
use thiserror::Error;
use zuorasoap::{SoapFault, fault_codes};

/// Result type of the Zuora client
pub type Result<T> = std::result::Result<T, ZuoraError>;

/// Errors raised by the client.
///
/// Business-rule rejections reported by the service are *not* errors: they
/// come back as failed [`OperationResult`](crate::OperationResult)s.
#[derive(Error, Debug)]
pub enum ZuoraError {
    /// The login exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connectivity or protocol level failure, including SOAP faults
    #[error("Remote fault: {0}")]
    Transport(RemoteFault),

    /// Local structural rules rejected the object; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A wire value could not be converted to the declared field type
    #[error("Cannot coerce value '{raw}' for field {field}")]
    Coercion { field: String, raw: String },

    /// The object has been destroyed
    #[error("{0} has been destroyed")]
    StaleObject(String),

    /// The operation requires a persisted object
    #[error("{0} has not been persisted yet")]
    NotPersisted(String),

    /// The operation is not part of the service contract
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The response was a well-formed envelope without the expected content
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request document could not be written
    #[error("Cannot serialize request: {0}")]
    Serialization(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ZuoraError {
    pub fn coercion(field: &str, raw: &str) -> Self {
        ZuoraError::Coercion {
            field: field.to_string(),
            raw: raw.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ZuoraError::MalformedResponse(message.into())
    }

    /// True when the service rejected the session key
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, ZuoraError::Transport(fault) if fault.is_invalid_session())
    }
}

impl From<RemoteFault> for ZuoraError {
    fn from(fault: RemoteFault) -> Self {
        ZuoraError::Transport(fault)
    }
}

/// Uniform transport/protocol fault. Transport-specific error types never
/// leave the transport: they are flattened into this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFault {
    /// Service fault code when the failure was a SOAP fault
    pub code: Option<String>,
    /// Original message
    pub message: String,
}

impl RemoteFault {
    /// Fault without a service code (I/O, HTTP, unparseable body)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn is_invalid_session(&self) -> bool {
        self.code.as_deref() == Some(fault_codes::INVALID_SESSION)
    }
}

impl From<SoapFault> for RemoteFault {
    fn from(fault: SoapFault) -> Self {
        RemoteFault::with_code(fault.code(), fault.message())
    }
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "({}) {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}
