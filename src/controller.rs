//! Controllers: the operations the envelope layer wraps.
//!
//! A controller is any async function from [`Request`] to
//! `Result<T, ControllerError>` where `T: Serialize`:
//!
//! ```rust
//! use satchel::{ApplicationError, ControllerError, Request};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64 }
//!
//! async fn get_user(req: Request) -> Result<User, ControllerError> {
//!     match req.param("id").and_then(|id| id.parse::<u64>().ok()) {
//!         Some(id) => Ok(User { id }),
//!         None => Err(ApplicationError::not_found("user missing").into()),
//!     }
//! }
//!
//! async fn delete_user(_req: Request) -> Result<(), ControllerError> {
//!     Ok(())
//! }
//! ```
//!
//! The value is converted to a [`serde_json::Value`] as soon as the controller
//! returns, so the middleware chain works on one concrete type. A value that
//! cannot be represented as JSON (a map with non-string keys, say) surfaces as
//! an internal error.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::ControllerError;
use crate::middleware::BoxFuture;
use crate::request::Request;

#[doc(hidden)]
pub trait ErasedController {
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Value, ControllerError>>;
}

#[doc(hidden)]
pub type BoxedController = Arc<dyn ErasedController + Send + Sync + 'static>;

/// Implemented for every valid controller operation. Sealed.
pub trait Controller: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_controller(self) -> BoxedController;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, T> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ControllerError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
}

impl<F, Fut, T> Controller for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ControllerError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    fn into_boxed_controller(self) -> BoxedController {
        Arc::new(FnController(self))
    }
}

struct FnController<F>(F);

impl<F, Fut, T> ErasedController for FnController<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ControllerError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Result<Value, ControllerError>> {
        let fut = (self.0)(req);
        Box::pin(async move {
            let value = fut.await?;
            serde_json::to_value(value).map_err(ControllerError::internal)
        })
    }
}
