//! # satchel
//!
//! A minimal HTTP framework whose controllers always answer in one shape.
//!
//! Every controller result leaves the process inside the same JSON envelope:
//!
//! ```text
//! 200  {"timestamp":1760000000000,"status":"OK","data":{"id":1}}
//! 404  {"timestamp":1760000000000,"status":"ERROR","message":"user missing","error":"NOT_FOUND"}
//! 500  {"timestamp":1760000000000,"status":"ERROR","message":"npe","error":"INTERNAL_SERVER_ERROR"}
//! ```
//!
//! What satchel does:
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - Controllers: plain `async fn`s returning `Result<T: Serialize, ControllerError>`
//! - An explicit middleware chain around controllers ([`middleware`])
//! - The [`Envelope`](middleware::envelope::Envelope) middleware, which wraps
//!   values, classifies failures and writes error envelopes to the raw response
//! - Async I/O on hyper + tokio, graceful shutdown on SIGTERM / Ctrl-C
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use satchel::{ApplicationError, ControllerError, Method, Request, Router, Server};
//! use satchel::middleware::{envelope::Envelope, trace::Trace};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64, name: String }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .controller(Method::Get, "/users/{id}", get_user)
//!         .wrap(Envelope::default())
//!         .wrap(Trace);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Result<User, ControllerError> {
//!     match req.param("id") {
//!         Some("1") => Ok(User { id: 1, name: "alice".into() }),
//!         _ => Err(ApplicationError::not_found("user missing").into()),
//!     }
//! }
//! ```

mod context;
mod controller;
mod envelope;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod health;
pub mod middleware;

pub use context::{BodyWriter, ResponseContext};
pub use controller::Controller;
pub use envelope::{EnvelopeStatus, PendingEnvelope, ResponseEnvelope};
pub use error::{ApplicationError, ControllerError, Error};
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use middleware::BoxFuture;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
