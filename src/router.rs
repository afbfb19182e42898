//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A route is either a plain
//! [`Handler`] or a [`Controller`]. Controllers are the enveloped namespace:
//! every call to one runs through the middleware chain built with
//! [`Router::wrap`]. Plain handlers never see that chain.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::error;

use crate::controller::{BoxedController, Controller};
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Chain, Middleware, Next, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

#[derive(Clone)]
enum Route {
    Handler(BoxedHandler),
    Controller(BoxedController),
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
///
/// ```rust
/// # use satchel::{ControllerError, Method, Request, Response, Router};
/// # use satchel::middleware::{envelope::Envelope, trace::Trace};
/// # async fn get_user(_: Request) -> Result<(), ControllerError> { Ok(()) }
/// # async fn liveness(_: Request) -> Response { Response::text("ok") }
/// Router::new()
///     .controller(Method::Get, "/users/{id}", get_user)
///     .on(Method::Get, "/healthz", liveness)
///     .wrap(Envelope::default())
///     .wrap(Trace);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
    chain: Chain,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), chain: Arc::from(Vec::new()) }
    }

    /// Register a plain handler. Its response goes to the client untouched.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, Route::Handler(handler.into_boxed_handler()))
    }

    /// Register a controller operation. Every call runs through the
    /// middleware chain.
    pub fn controller(self, method: Method, path: &str, controller: impl Controller) -> Self {
        self.add(method, path, Route::Controller(controller.into_boxed_controller()))
    }

    /// Wrap every controller in `middleware`. The last one wrapped runs
    /// first.
    pub fn wrap(mut self, middleware: impl Middleware) -> Self {
        let mut chain: Vec<Arc<dyn Middleware>> = Vec::with_capacity(self.chain.len() + 1);
        chain.push(Arc::new(middleware));
        chain.extend(self.chain.iter().cloned());
        self.chain = chain.into();
        self
    }

    fn add(mut self, method: Method, path: &str, route: Route) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(Route, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((matched.value.clone(), params))
    }

    /// Routes one request and produces one response.
    ///
    /// This is what the [`Server`](crate::Server) calls for every request;
    /// tests can call it directly with an in-memory body.
    pub async fn dispatch<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        self.respond(req).await.into_inner()
    }

    async fn respond<B>(&self, req: http::Request<B>) -> Response
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = req.into_parts();

        let Ok(method) = Method::try_from(&parts.method) else {
            return Response::status(Status::MethodNotAllowed);
        };
        let path = parts.uri.path().to_owned();
        let Some((route, params)) = self.lookup(method, &path) else {
            return Response::status(Status::NotFound);
        };

        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes().to_vec(),
            Err(e) => {
                error!(%method, %path, "failed to read request body: {e}");
                return Response::status(Status::BadRequest);
            }
        };
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();
        let req = Request::new(method, path, headers, body, params);

        match route {
            Route::Handler(handler) => handler.call(req).await,
            Route::Controller(controller) => self.invoke(controller, req).await,
        }
    }

    async fn invoke(&self, controller: BoxedController, req: Request) -> Response {
        let raw = req.response().clone();
        let (method, path) = (req.method(), req.path().to_owned());

        match Next::new(Arc::clone(&self.chain), controller).run(req).await {
            Ok(Outcome::Value(value)) => match serde_json::to_vec(&value) {
                Ok(body) => Response::json(body),
                Err(e) => {
                    error!(%method, %path, "failed to serialize controller value: {e}");
                    Response::status(Status::InternalServerError)
                }
            },
            Ok(Outcome::Handled) => raw.to_response(),
            Err(e) => {
                error!(%method, %path, error = ?e, "unhandled controller error");
                Response::status(Status::InternalServerError)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::error::{ApplicationError, ControllerError};

    fn get(path: &str) -> http::Request<Full<Bytes>> {
        http::Request::get(path).body(Full::default()).unwrap()
    }

    async fn body(res: http::Response<Full<Bytes>>) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn echo_id(req: Request) -> Result<Value, ControllerError> {
        Ok(json!({ "id": req.param("id") }))
    }

    async fn gone(_req: Request) -> Result<(), ControllerError> {
        Err(ApplicationError::new(Status::Gone, "GONE", "deleted").into())
    }

    async fn plain(_req: Request) -> Response {
        Response::text("plain")
    }

    #[tokio::test]
    async fn unknown_path_is_404_and_unknown_method_is_405() {
        let app = Router::new().on(Method::Get, "/", plain);
        assert_eq!(app.dispatch(get("/nope")).await.status(), 404);

        let purge = http::Request::builder()
            .method(http::Method::from_bytes(b"PURGE").unwrap())
            .uri("/")
            .body(Full::<Bytes>::default())
            .unwrap();
        assert_eq!(app.dispatch(purge).await.status(), 405);
    }

    #[tokio::test]
    async fn controller_without_middleware_returns_bare_value() {
        let app = Router::new().controller(Method::Get, "/users/{id}", echo_id);
        let res = app.dispatch(get("/users/7")).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(body(res).await, json!({"id": "7"}));
    }

    #[tokio::test]
    async fn error_escaping_the_chain_is_bare_500() {
        let app = Router::new().controller(Method::Get, "/", gone);
        let res = app.dispatch(get("/")).await;
        assert_eq!(res.status(), 500);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn wrap_puts_latest_middleware_outermost() {
        struct Tag(&'static str);

        impl Middleware for Tag {
            fn call<'a>(&'a self, req: Request, next: Next)
                -> crate::BoxFuture<'a, Result<Outcome, ControllerError>>
            {
                Box::pin(async move {
                    match next.run(req).await? {
                        Outcome::Value(v) => Ok(Outcome::Value(json!([self.0, v]))),
                        handled => Ok(handled),
                    }
                })
            }
        }

        let app = Router::new()
            .controller(Method::Get, "/users/{id}", echo_id)
            .wrap(Tag("inner"))
            .wrap(Tag("outer"));
        let res = app.dispatch(get("/users/1")).await;
        assert_eq!(body(res).await, json!(["outer", ["inner", {"id": "1"}]]));
    }
}
