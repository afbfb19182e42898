//! Middleware layer.
//!
//! Middleware wraps every controller invocation and is the place for
//! cross-cutting concerns. Each stage receives the [`Request`] and a [`Next`]
//! handle for the rest of the chain; it may inspect or replace the request,
//! call `next.run(req)` (or not), and inspect or replace what comes back.
//!
//! ```text
//! dispatch ─▶ Trace ─▶ Envelope ─▶ controller
//!          ◀─ Outcome ◀─ Outcome ◀─ Result<Value, ControllerError>
//! ```
//!
//! A stage returns one of two [`Outcome`]s: a value for the dispatcher to
//! serialize as a `200` JSON body, or [`Outcome::Handled`] when the response
//! has already been written through [`Request::response`] and must be sent as
//! it stands.
//!
//! Built-in middleware:
//! - [`envelope::Envelope`] — uniform JSON envelope around results and errors
//! - [`trace::Trace`] — per-invocation span with method, path, status, latency

pub mod envelope;
pub mod trace;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::controller::BoxedController;
use crate::error::ControllerError;
use crate::request::Request;

/// A heap-allocated, type-erased future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a middleware stage hands back to the stage above it.
#[derive(Debug)]
pub enum Outcome {
    /// A value the dispatcher serializes as the `200` JSON body.
    Value(Value),
    /// The response was written directly; nothing further may be written.
    Handled,
}

/// One stage of the controller chain.
///
/// ```rust
/// use satchel::{BoxFuture, ControllerError, Request};
/// use satchel::middleware::{Middleware, Next, Outcome};
///
/// struct RequireJson;
///
/// impl Middleware for RequireJson {
///     fn call<'a>(
///         &'a self,
///         req: Request,
///         next: Next,
///     ) -> BoxFuture<'a, Result<Outcome, ControllerError>> {
///         Box::pin(async move {
///             if req.body().is_empty() || req.header("content-type") == Some("application/json") {
///                 next.run(req).await
///             } else {
///                 Err(satchel::ApplicationError::new(415_u16, "UNSUPPORTED_MEDIA_TYPE", "expected json").into())
///             }
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, req: Request, next: Next)
        -> BoxFuture<'a, Result<Outcome, ControllerError>>;
}

pub(crate) type Chain = Arc<[Arc<dyn Middleware>]>;

/// The remainder of the chain below the current stage.
pub struct Next {
    chain: Chain,
    index: usize,
    controller: BoxedController,
}

impl Next {
    pub(crate) fn new(chain: Chain, controller: BoxedController) -> Self {
        Self { chain, index: 0, controller }
    }

    /// Runs the remaining stages and finally the controller.
    pub fn run(self, req: Request) -> BoxFuture<'static, Result<Outcome, ControllerError>> {
        Box::pin(async move {
            match self.chain.get(self.index) {
                Some(stage) => {
                    let next = Self {
                        chain: Arc::clone(&self.chain),
                        index: self.index + 1,
                        controller: Arc::clone(&self.controller),
                    };
                    stage.call(req, next).await
                }
                None => self.controller.call(req).await.map(Outcome::Value),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::controller::Controller;
    use crate::method::Method;

    struct Record(&'static str, Arc<Mutex<Vec<&'static str>>>);

    impl Middleware for Record {
        fn call<'a>(&'a self, req: Request, next: Next)
            -> BoxFuture<'a, Result<Outcome, ControllerError>>
        {
            Box::pin(async move {
                self.1.lock().unwrap().push(self.0);
                next.run(req).await
            })
        }
    }

    struct ShortCircuit;

    impl Middleware for ShortCircuit {
        fn call<'a>(&'a self, _req: Request, _next: Next)
            -> BoxFuture<'a, Result<Outcome, ControllerError>>
        {
            Box::pin(async { Ok(Outcome::Value(json!("cached"))) })
        }
    }

    fn request() -> Request {
        Request::new(Method::Get, "/".to_owned(), Vec::new(), Vec::new(), HashMap::new())
    }

    async fn answer(_req: Request) -> Result<u32, ControllerError> {
        Ok(42)
    }

    #[tokio::test]
    async fn stages_run_in_chain_order_then_controller() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: Chain = Arc::from(vec![
            Arc::new(Record("outer", Arc::clone(&log))) as Arc<dyn Middleware>,
            Arc::new(Record("inner", Arc::clone(&log))),
        ]);
        let out = Next::new(chain, answer.into_boxed_controller()).run(request()).await.unwrap();
        assert!(matches!(out, Outcome::Value(v) if v == json!(42)));
        assert_eq!(*log.lock().unwrap(), ["outer", "inner"]);
    }

    #[tokio::test]
    async fn a_stage_may_skip_the_rest_of_the_chain() {
        let chain: Chain = Arc::from(vec![Arc::new(ShortCircuit) as Arc<dyn Middleware>]);
        let out = Next::new(chain, answer.into_boxed_controller()).run(request()).await.unwrap();
        assert!(matches!(out, Outcome::Value(v) if v == json!("cached")));
    }

    #[tokio::test]
    async fn empty_chain_calls_controller() {
        let out = Next::new(Arc::from(Vec::new()), answer.into_boxed_controller())
            .run(request())
            .await
            .unwrap();
        assert!(matches!(out, Outcome::Value(v) if v == json!(42)));
    }
}
