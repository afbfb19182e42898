//! Kubernetes health-check handlers.
//!
//! Probes are plain handlers: register them with [`Router::on`](crate::Router::on)
//! so they answer bare `text/plain` and never pass through the controller
//! middleware chain.
//!
//! ```rust,no_run
//! use satchel::{Method, Router, health};
//!
//! let app = Router::new()
//!     .on(Method::Get, "/healthz", health::liveness)
//!     .on(Method::Get, "/readyz", health::readiness);
//! ```

use crate::{Request, Response};

/// Liveness probe: `200 ok` whenever the process can answer HTTP.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe: `200 ready`. Replace with a custom handler to gate on
/// dependency health.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
