//! Uniform JSON envelope around every controller result and failure.
//!
//! On success the controller's value is wrapped as
//! `{"timestamp":…,"status":"OK","data":…}` and handed back to the dispatcher,
//! which sends it as a `200`.
//!
//! On failure the error is classified, logged, and the error envelope
//! `{"timestamp":…,"status":"ERROR","message":…,"error":…}` is written
//! straight into the raw response. The stage then returns
//! [`Outcome::Handled`] so nothing above it writes again. Failures never
//! propagate past this stage; the client always gets a JSON envelope.
//!
//! | Failure                          | HTTP status        | `error`                   | Log level |
//! |----------------------------------|--------------------|---------------------------|-----------|
//! | [`ControllerError::Application`] | the error's status | the error's code          | `WARN`    |
//! | [`ControllerError::Internal`]    | `500`              | `"INTERNAL_SERVER_ERROR"` | `ERROR`   |
//!
//! An application error whose status is not a valid HTTP status code is
//! reported as an internal error, so the status line and the `error` code
//! always agree.
//!
//! Anything an inner stage wrote to the raw response before failing is
//! discarded; the error envelope is the whole response. An inner stage that
//! returns [`Outcome::Handled`] itself is passed through untouched.

use std::any::type_name;
use std::io::{self, Write};

use tracing::{Dispatch, error, warn};

use crate::context::ResponseContext;
use crate::envelope::{PendingEnvelope, ResponseEnvelope};
use crate::error::{ApplicationError, ControllerError};
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::request::Request;
use crate::response::ContentType;
use crate::status::Status;

/// The envelope middleware.
///
/// Logs through the [`Dispatch`] it was built with, independent of whatever
/// subscriber is current on the request's task.
///
/// ```rust
/// use satchel::Router;
/// use satchel::middleware::envelope::Envelope;
///
/// // Logs through the subscriber that is the default right now.
/// let app = Router::new().wrap(Envelope::default());
///
/// // Logs through an explicit dispatcher.
/// let app = Router::new().wrap(Envelope::new(tracing::Dispatch::none()));
/// ```
#[derive(Clone)]
pub struct Envelope {
    log: Dispatch,
}

impl Envelope {
    pub fn new(log: Dispatch) -> Self {
        Self { log }
    }

    /// Classifies `err`, logs it, and writes the error envelope to `raw`.
    fn reject(
        &self,
        err: ControllerError,
        envelope: PendingEnvelope,
        raw: &ResponseContext,
    ) -> io::Result<()> {
        let message = err.to_string();
        let (status, code) = match &err {
            ControllerError::Application(app) if http::StatusCode::from_u16(app.status()).is_err() => {
                tracing::dispatcher::with_default(&self.log, || {
                    error!(
                        status = app.status(),
                        code = app.code(),
                        "application error carries an invalid http status: {message}"
                    );
                });
                internal_server_error()
            }
            ControllerError::Application(app) => {
                tracing::dispatcher::with_default(&self.log, || {
                    warn!(
                        kind = type_name::<ApplicationError>(),
                        status = app.status(),
                        code = app.code(),
                        "{message}"
                    );
                });
                (app.status(), app.code().to_owned())
            }
            ControllerError::Internal(cause) => {
                tracing::dispatcher::with_default(&self.log, || {
                    error!(error = ?cause, "controller failed: {message}");
                });
                internal_server_error()
            }
        };
        write_error(raw, &envelope.fail(message, code), status)
    }
}

fn internal_server_error() -> (u16, String) {
    let status = Status::InternalServerError;
    (status.as_u16(), status.name().to_owned())
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(tracing::dispatcher::get_default(Dispatch::clone))
    }
}

impl Middleware for Envelope {
    fn call<'a>(&'a self, req: Request, next: Next)
        -> BoxFuture<'a, Result<Outcome, ControllerError>>
    {
        Box::pin(async move {
            let raw = req.response().clone();
            let envelope = ResponseEnvelope::begin();

            match next.run(req).await {
                Ok(Outcome::Value(data)) => {
                    let body = serde_json::to_value(envelope.succeed(data))
                        .map_err(ControllerError::internal)?;
                    Ok(Outcome::Value(body))
                }
                Ok(Outcome::Handled) => Ok(Outcome::Handled),
                Err(err) => {
                    self.reject(err, envelope, &raw).map_err(ControllerError::internal)?;
                    Ok(Outcome::Handled)
                }
            }
        })
    }
}

/// Writes `envelope` as the complete response: status, content type, body.
/// Earlier output is discarded first.
///
/// The writer is closed on every path, including a serialization failure
/// half-way through the body.
fn write_error(raw: &ResponseContext, envelope: &ResponseEnvelope, status: u16) -> io::Result<()> {
    raw.reset();
    raw.set_status(status);
    raw.set_header("content-type", ContentType::JsonUtf8.as_str());

    let mut writer = raw.writer()?;
    serde_json::to_writer(&mut writer, envelope)?;
    writer.flush()?;
    writer.close()
}
