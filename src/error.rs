//! Error types.
//!
//! Two families live here:
//!
//! - [`Error`] surfaces infrastructure failures: binding to a port or
//!   accepting a connection.
//! - [`ControllerError`] is what a controller returns when it fails. It is a
//!   two-tier taxonomy: an [`ApplicationError`] is an expected, business-level
//!   failure that carries its own HTTP status and a stable error code;
//!   everything else is [`ControllerError::Internal`] and always reaches the
//!   client as a `500 INTERNAL_SERVER_ERROR`.

use std::borrow::Cow;

use crate::status::Status;

/// The error type returned by satchel's fallible server operations.
#[derive(Debug, thiserror::Error)]
#[error("io: {0}")]
pub struct Error(#[from] std::io::Error);

// ── Application errors ────────────────────────────────────────────────────────

/// An expected failure with an explicit HTTP status and a stable error code.
///
/// ```rust
/// use satchel::{ApplicationError, Status};
///
/// let err = ApplicationError::new(Status::NotFound, "NOT_FOUND", "user missing");
/// assert_eq!(err.status(), 404);
/// assert_eq!(err.code(), "NOT_FOUND");
/// assert_eq!(err.to_string(), "user missing");
/// ```
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApplicationError {
    status: u16,
    code: Cow<'static, str>,
    message: String,
}

impl ApplicationError {
    /// `status` accepts a [`Status`] or a raw `u16` for codes the enum does
    /// not name.
    pub fn new(
        status: impl Into<u16>,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self { status: status.into(), code: code.into(), message: message.into() }
    }

    /// `400 BAD_REQUEST`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_status(Status::BadRequest, message)
    }

    /// `404 NOT_FOUND`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_status(Status::NotFound, message)
    }

    /// `409 CONFLICT`.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::from_status(Status::Conflict, message)
    }

    fn from_status(status: Status, message: impl Into<String>) -> Self {
        Self::new(status, status.name(), message)
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn code(&self) -> &str { &self.code }
    pub fn message(&self) -> &str { &self.message }
}

// ── ControllerError ───────────────────────────────────────────────────────────

/// Failure of a controller invocation.
///
/// Controllers return `Result<T, ControllerError>`. `?` converts both
/// [`ApplicationError`] and [`anyhow::Error`]; wrap any other error with
/// [`ControllerError::internal`] or `anyhow::Context`.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ControllerError {
    /// Classifies `err` as an unexpected failure.
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(err))
    }

    /// Unexpected failure described only by a message.
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn application_error_accepts_raw_status() {
        let err = ApplicationError::new(451_u16, "LEGAL", "blocked");
        assert_eq!(err.status(), 451);
        assert_eq!(err.code(), "LEGAL");
        assert_eq!(err.message(), "blocked");
    }

    #[test]
    fn shortcut_constructors_use_status_name_as_code() {
        let err = ApplicationError::conflict("already exists");
        assert_eq!((err.status(), err.code()), (409, "CONFLICT"));
    }

    #[test]
    fn internal_display_is_outermost_context() {
        let io = std::io::Error::other("disk on fire");
        let err: ControllerError = Err::<(), _>(io).context("saving user").unwrap_err().into();
        assert!(matches!(err, ControllerError::Internal(_)));
        assert_eq!(err.to_string(), "saving user");
    }

    #[test]
    fn application_display_is_message() {
        let err: ControllerError = ApplicationError::not_found("user missing").into();
        assert_eq!(err.to_string(), "user missing");
    }
}
