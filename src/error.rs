use std::time::Duration;

use crate::element::ElementType;
use crate::event::EventKind;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed error returned by an event callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to element {name}: {source}")]
    ConnectionFailure {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    #[error("element {0} is not connected")]
    UnknownElement(String),

    #[error("element {name} is a {actual:?} element, expected {expected:?}")]
    WrongElementType {
        name: String,
        expected: ElementType,
        actual: ElementType,
    },

    #[error("callback for {kind:?} on {element} failed: {source}")]
    CallbackFailure {
        element: String,
        kind: EventKind,
        #[source]
        source: CallbackError,
    },

    #[error("element {0} was disconnected")]
    Disconnected(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("transport error ({context}): {source}")]
    Transport {
        context: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected response, expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    pub(crate) fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            after,
        }
    }

    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
