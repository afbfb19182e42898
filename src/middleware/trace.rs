//! Per-invocation tracing span.
//!
//! Opens a `controller` span with the request method and path, and emits one
//! `INFO` event when the invocation completes, carrying the response status
//! and the elapsed time. Wrap it outside [`Envelope`](super::envelope::Envelope)
//! so the status it reports is the one the client receives.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::error::ControllerError;
use crate::middleware::{BoxFuture, Middleware, Next, Outcome};
use crate::request::Request;

#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call<'a>(&'a self, req: Request, next: Next)
        -> BoxFuture<'a, Result<Outcome, ControllerError>>
    {
        let span = info_span!("controller", method = %req.method(), path = %req.path());
        let raw = req.response().clone();

        Box::pin(
            async move {
                let started = Instant::now();
                let result = next.run(req).await;
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                match &result {
                    Ok(Outcome::Value(_)) => info!(status = 200, latency_ms, "completed"),
                    Ok(Outcome::Handled) => info!(status = raw.status(), latency_ms, "completed"),
                    Err(e) => info!(error = %e, latency_ms, "failed"),
                }
                result
            }
            .instrument(span),
        )
    }
}
