//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, [`ApplicationError::new`](crate::ApplicationError::new),
//! or as a bare handler return value.
//!
//! ```rust
//! use satchel::{ApplicationError, Response, Status};
//!
//! Response::status(Status::NoContent);
//!
//! let err = ApplicationError::new(Status::NotFound, "NOT_FOUND", "user missing");
//! assert_eq!(err.status(), 404);
//! assert_eq!(Status::InternalServerError.name(), "INTERNAL_SERVER_ERROR");
//! ```

/// The status codes a JSON API realistically answers with.
#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    Accepted,             // 202
    NoContent,            // 204

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    MovedPermanently,     // 301
    Found,                // 302
    SeeOther,             // 303
    NotModified,          // 304

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    Unauthorized,         // 401
    Forbidden,            // 403
    NotFound,             // 404
    MethodNotAllowed,     // 405
    Conflict,             // 409
    Gone,                 // 410
    UnprocessableContent, // 422
    TooManyRequests,      // 429

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    NotImplemented,       // 501
    BadGateway,           // 502
    ServiceUnavailable,   // 503
    GatewayTimeout,       // 504
}

impl Status {
    /// Numeric code, e.g. `404`.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::Accepted             => 202,
            Self::NoContent            => 204,
            Self::MovedPermanently     => 301,
            Self::Found                => 302,
            Self::SeeOther             => 303,
            Self::NotModified          => 304,
            Self::BadRequest           => 400,
            Self::Unauthorized         => 401,
            Self::Forbidden            => 403,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::Conflict             => 409,
            Self::Gone                 => 410,
            Self::UnprocessableContent => 422,
            Self::TooManyRequests      => 429,
            Self::InternalServerError  => 500,
            Self::NotImplemented       => 501,
            Self::BadGateway           => 502,
            Self::ServiceUnavailable   => 503,
            Self::GatewayTimeout       => 504,
        }
    }

    /// Upper-snake constant name, the form used as an envelope error code
    /// (e.g. `"INTERNAL_SERVER_ERROR"`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Ok                   => "OK",
            Self::Created              => "CREATED",
            Self::Accepted             => "ACCEPTED",
            Self::NoContent            => "NO_CONTENT",
            Self::MovedPermanently     => "MOVED_PERMANENTLY",
            Self::Found                => "FOUND",
            Self::SeeOther             => "SEE_OTHER",
            Self::NotModified          => "NOT_MODIFIED",
            Self::BadRequest           => "BAD_REQUEST",
            Self::Unauthorized         => "UNAUTHORIZED",
            Self::Forbidden            => "FORBIDDEN",
            Self::NotFound             => "NOT_FOUND",
            Self::MethodNotAllowed     => "METHOD_NOT_ALLOWED",
            Self::Conflict             => "CONFLICT",
            Self::Gone                 => "GONE",
            Self::UnprocessableContent => "UNPROCESSABLE_CONTENT",
            Self::TooManyRequests      => "TOO_MANY_REQUESTS",
            Self::InternalServerError  => "INTERNAL_SERVER_ERROR",
            Self::NotImplemented       => "NOT_IMPLEMENTED",
            Self::BadGateway           => "BAD_GATEWAY",
            Self::ServiceUnavailable   => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout       => "GATEWAY_TIMEOUT",
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.as_u16()
    }
}
