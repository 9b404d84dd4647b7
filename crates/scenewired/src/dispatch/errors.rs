//! Error taxonomy for command handling.
//!
//! Every failure a handler can produce becomes one [`CommandError`]. The
//! connection loop turns it into a `success:false` response carrying the
//! request id; nothing here ever ends a connection.

use thiserror::Error;

use crate::model::StoreError;

/// Errors surfaced while validating or executing a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A required request parameter is absent or blank.
    #[error("missing required parameter '{name}'")]
    MissingParameter { name: String },

    /// A request parameter is present but unusable.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The command name is not registered.
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },

    /// A path, type, component, or property is absent.
    #[error("{what} not found: {name}")]
    NotFound { what: String, name: String },

    /// The property refuses writes.
    #[error("property '{path}' is read-only")]
    ReadOnly { path: String },

    /// A name search matched more than one stored item.
    #[error(
        "ambiguous reference '{reference}': {count} matches found; use a fully qualified asset path"
    )]
    AmbiguousReference { reference: String, count: usize },

    /// The value's shape does not fit the property's declared kind.
    #[error("bad value for {kind} property '{path}': {message}")]
    TypeMismatch {
        path: String,
        kind: String,
        message: String,
    },

    /// The declared kind has no write rule.
    #[error("property '{path}' of type {kind} is not supported for modification")]
    UnsupportedKind { path: String, kind: String },

    /// The model store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(StoreError),

    /// The request line itself was unusable.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The designated context went away before the work ran.
    #[error("server is shutting down; the request was not executed")]
    Shutdown,

    /// Unexpected failure inside the server.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CommandError {
    /// Stable category name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } | Self::InvalidParameter { .. } => "validation",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::NotFound { .. } => "not_found",
            Self::ReadOnly { .. } => "read_only",
            Self::AmbiguousReference { .. } => "ambiguous_reference",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::UnsupportedKind { .. } => "unsupported_kind",
            Self::Store(_) => "store",
            Self::Protocol { .. } => "protocol",
            Self::Shutdown => "shutdown",
            Self::Internal { .. } => "internal",
        }
    }

    /// Creates a missing-parameter error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates an invalid-parameter error.
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    /// Creates a type-mismatch error.
    pub fn mismatch(
        path: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { what, name } => Self::not_found(what, name),
            other => Self::Store(other),
        }
    }
}
