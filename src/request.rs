//! Incoming HTTP request type.

use std::collections::HashMap;

use crate::context::ResponseContext;
use crate::method::Method;

/// An incoming HTTP request with its body fully read.
///
/// Every request also carries the [`ResponseContext`] of the response being
/// produced for it, so a middleware can write to the raw response directly.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    params: HashMap<String, String>,
    response: ResponseContext,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        params: HashMap<String, String>,
    ) -> Self {
        Self { method, path, headers, body, params, response: ResponseContext::new() }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The raw response being produced for this request.
    pub fn response(&self) -> &ResponseContext {
        &self.response
    }
}
