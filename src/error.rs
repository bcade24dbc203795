//! Error types shared across the crate.
//!
//! Every failure in the exchange core is recoverable: a rejected call leaves the
//! session exactly as it was, and the caller decides how to surface the message.

use std::fmt;

use thiserror::Error;

use crate::cs::security::exchange_session::Party;

/// The user-supplied field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Prime,
    Generator,
    Secret(Party),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Prime => f.write_str("prime (p)"),
            Field::Generator => f.write_str("primitive root (g)"),
            Field::Secret(party) => write!(f, "{party} secret"),
        }
    }
}

/// Malformed or missing numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is missing")]
    Missing(Field),
    #[error("{field} must be an integer, got {text:?}")]
    NotAnInteger { field: Field, text: String },
}

/// An operation was invoked in a session state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no shared key")]
    NoSharedKey,
    #[error("both parties must publish a public value first")]
    NotBothPublished,
    #[error("the shared key is already established")]
    AlreadyEstablished,
    #[error("independently derived shared keys disagree")]
    SharedKeyMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// True for errors caused by malformed user input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True for errors caused by calling an operation too early or too late.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
