use std::fmt::Debug;

use thiserror::Error;

/// What went wrong, independent of where the failure was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("session expired")]
    SessionExpired,
    #[error("permission denied")]
    PermissionDenied,
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("validation failed")]
    ValidationFailed,
    #[error("network error")]
    NetworkError,
    #[error("timeout")]
    Timeout,
    #[error("unknown server error")]
    UnknownServerError,
    #[error("invalid transition")]
    InvalidTransition,
    #[error("action in progress")]
    ActionInProgress,
}

/// How the user can get out of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    Reauthenticate,
    Refresh,
    Retry,
    None,
}

impl ErrorKind {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::PermissionDenied => "You do not have permission to perform this action.",
            Self::NotFound => "This bid is no longer available.",
            Self::Conflict => "This bid has already been processed.",
            Self::ValidationFailed => "The request could not be validated.",
            Self::NetworkError => "Network error. Check your connection and try again.",
            Self::Timeout => "The request timed out. Please try again.",
            Self::UnknownServerError => "The server could not complete the request.",
            Self::InvalidTransition => "This action is not available for the bid's current status.",
            Self::ActionInProgress => "This bid is already being updated.",
        }
    }

    pub fn recovery(self) -> Recovery {
        match self {
            Self::SessionExpired => Recovery::Reauthenticate,
            Self::NotFound | Self::Conflict => Recovery::Refresh,
            Self::NetworkError | Self::Timeout | Self::UnknownServerError => Recovery::Retry,
            Self::PermissionDenied
            | Self::ValidationFailed
            | Self::InvalidTransition
            | Self::ActionInProgress => Recovery::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}{}", detail(.message))]
pub struct Error {
    pub kind: ErrorKind,
    /// Server-supplied or locally-built detail, when there is one.
    pub message: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: Option<String>) -> Self {
        Self { kind, message }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }

    pub fn recovery(&self) -> Recovery {
        self.kind.recovery()
    }

    pub fn requires_refresh(&self) -> bool {
        self.recovery() == Recovery::Refresh
    }
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {}", message),
        None => String::new(),
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        validation_error(format!("malformed response: {}", err))
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        timeout_error()
    }
}

/// Maps an HTTP status outside the 2xx range onto the taxonomy.
pub fn status_error(code: u16, message: Option<String>) -> Error {
    let kind = match code {
        401 => ErrorKind::SessionExpired,
        403 => ErrorKind::PermissionDenied,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        400 | 422 => ErrorKind::ValidationFailed,
        408 | 504 => ErrorKind::Timeout,
        _ => ErrorKind::UnknownServerError,
    };

    Error::new(kind, message)
}

pub fn session_expired_error() -> Error {
    Error::new(ErrorKind::SessionExpired, None)
}

pub fn permission_denied_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::PermissionDenied, Some(message.into()))
}

pub fn not_found_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::NotFound, Some(message.into()))
}

pub fn conflict_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Conflict, Some(message.into()))
}

pub fn validation_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ValidationFailed, Some(message.into()))
}

pub fn network_error<T: Debug>(err: T) -> Error {
    Error::new(ErrorKind::NetworkError, Some(format!("{:?}", err)))
}

pub fn timeout_error() -> Error {
    Error::new(ErrorKind::Timeout, None)
}

pub fn unknown_server_error(message: Option<String>) -> Error {
    Error::new(ErrorKind::UnknownServerError, message)
}

pub fn invalid_transition_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidTransition, Some(message.into()))
}

pub fn action_in_progress_error() -> Error {
    Error::new(ErrorKind::ActionInProgress, None)
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return timeout_error();
    }

    if err.is_decode() {
        return validation_error(format!("malformed response: {}", err));
    }

    if let Some(status) = err.status() {
        return status_error(status.as_u16(), None);
    }

    network_error(err)
}
