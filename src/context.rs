//! Request-scoped access to the raw outgoing response.
//!
//! Normally a controller's value travels back up the middleware chain and the
//! dispatcher turns it into the HTTP response. Some stages cannot hand a value
//! back, for instance when they need to report a failure after the value
//! pipeline has already been abandoned. Those stages write straight into the
//! [`ResponseContext`] instead and return
//! [`Outcome::Handled`](crate::middleware::Outcome::Handled).
//!
//! The body is reached through a [`BodyWriter`]: bytes are buffered by
//! `write`, committed by `flush`, and the stream is ended by `close`. A writer
//! that goes out of scope without `close` flushes and closes itself, so the
//! stream is released on every exit path.
//!
//! Nothing reaches the client before the dispatcher takes the final snapshot,
//! so a stage may [`reset`](ResponseContext::reset) whatever was written
//! before it and start over. Writers opened before a reset are stale: their
//! writes and flushes fail with [`io::ErrorKind::BrokenPipe`].

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::response::Response;

#[derive(Debug)]
struct Raw {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    closed: bool,
    generation: u64,
}

impl Raw {
    fn accepts(&self, generation: u64) -> bool {
        !self.closed && self.generation == generation
    }
}

impl Default for Raw {
    fn default() -> Self {
        Self { status: 200, headers: Vec::new(), body: Vec::new(), closed: false, generation: 0 }
    }
}

/// Shared handle to one request's raw response.
///
/// Cloning is cheap and every clone refers to the same response.
#[derive(Clone, Debug, Default)]
pub struct ResponseContext {
    inner: Arc<Mutex<Raw>>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Raw> {
        // A panic mid-write leaves the buffer in a usable state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the status code. Ignored once the stream is closed.
    pub fn set_status(&self, status: u16) {
        let mut raw = self.lock();
        if !raw.closed {
            raw.status = status;
        }
    }

    /// Sets a header, replacing any existing value (names compare
    /// case-insensitively). Ignored once the stream is closed.
    pub fn set_header(&self, name: &str, value: &str) {
        let mut raw = self.lock();
        if raw.closed {
            return;
        }
        raw.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        raw.headers.push((name.to_owned(), value.to_owned()));
    }

    pub fn status(&self) -> u16 {
        self.lock().status
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.lock()
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    /// Committed body bytes.
    pub fn body(&self) -> Vec<u8> {
        self.lock().body.clone()
    }

    /// `true` once a [`BodyWriter`] has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Opens the body stream.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::BrokenPipe`] if the stream was already closed.
    pub fn writer(&self) -> io::Result<BodyWriter> {
        let raw = self.lock();
        if raw.closed {
            return Err(closed());
        }
        Ok(BodyWriter {
            ctx: self.clone(),
            buf: Vec::new(),
            generation: raw.generation,
            closed: false,
        })
    }

    /// Discards status, headers and body, and reopens the stream.
    /// Writers opened before the reset can no longer write.
    pub fn reset(&self) {
        let mut raw = self.lock();
        let generation = raw.generation + 1;
        *raw = Raw { generation, ..Raw::default() };
    }

    /// Snapshot of the response as written so far.
    pub(crate) fn to_response(&self) -> Response {
        let raw = self.lock();
        Response {
            body: raw.body.clone(),
            headers: raw.headers.clone(),
            status: raw.status,
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "response stream closed")
}

// ── BodyWriter ────────────────────────────────────────────────────────────────

/// Write half of a [`ResponseContext`] body.
#[derive(Debug)]
pub struct BodyWriter {
    ctx: ResponseContext,
    buf: Vec<u8>,
    generation: u64,
    closed: bool,
}

impl BodyWriter {
    /// Flushes pending bytes and ends the stream.
    pub fn close(mut self) -> io::Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        let mut raw = self.ctx.lock();
        if raw.generation == self.generation {
            raw.closed = true;
        }
        Ok(())
    }
}

impl Write for BodyWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if self.closed || !self.ctx.lock().accepts(self.generation) {
            return Err(closed());
        }
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let mut raw = self.ctx.lock();
        if !raw.accepts(self.generation) {
            self.buf.clear();
            return Err(closed());
        }
        raw.body.append(&mut self.buf);
        Ok(())
    }
}

impl Drop for BodyWriter {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::debug!("response stream release failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_committed_on_flush_not_on_write() {
        let ctx = ResponseContext::new();
        let mut w = ctx.writer().unwrap();
        w.write_all(b"{}").unwrap();
        assert!(ctx.body().is_empty());
        w.flush().unwrap();
        assert_eq!(ctx.body(), b"{}");
        assert!(!ctx.is_closed());
        w.close().unwrap();
        assert!(ctx.is_closed());
    }

    #[test]
    fn dropped_writer_flushes_and_closes() {
        let ctx = ResponseContext::new();
        {
            let mut w = ctx.writer().unwrap();
            w.write_all(b"partial").unwrap();
        }
        assert_eq!(ctx.body(), b"partial");
        assert!(ctx.is_closed());
    }

    #[test]
    fn closed_stream_rejects_new_writers_and_header_changes() {
        let ctx = ResponseContext::new();
        ctx.set_status(404);
        ctx.writer().unwrap().close().unwrap();

        let err = ctx.writer().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        ctx.set_status(200);
        ctx.set_header("x-late", "1");
        assert_eq!(ctx.status(), 404);
        assert_eq!(ctx.header("x-late"), None);
    }

    #[test]
    fn second_writer_cannot_write_after_first_closes() {
        let ctx = ResponseContext::new();
        let mut late = ctx.writer().unwrap();
        ctx.writer().unwrap().close().unwrap();

        let err = late.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        drop(late);
        assert!(ctx.body().is_empty());
    }

    #[test]
    fn reset_discards_output_and_reopens_stream() {
        let ctx = ResponseContext::new();
        ctx.set_status(201);
        ctx.set_header("x-stage", "inner");
        let mut stale = ctx.writer().unwrap();
        stale.write_all(b"partial").unwrap();
        stale.flush().unwrap();

        ctx.reset();
        assert_eq!((ctx.status(), ctx.header("x-stage"), ctx.body()), (200, None, Vec::new()));

        let mut fresh = ctx.writer().unwrap();
        assert_eq!(stale.write(b"more").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        drop(stale);
        assert!(!ctx.is_closed());

        fresh.write_all(b"{}").unwrap();
        fresh.close().unwrap();
        assert_eq!(ctx.body(), b"{}");
        assert!(ctx.is_closed());
    }

    #[test]
    fn reset_reopens_a_closed_stream() {
        let ctx = ResponseContext::new();
        ctx.writer().unwrap().close().unwrap();
        ctx.reset();
        assert!(!ctx.is_closed());
        assert!(ctx.writer().is_ok());
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let ctx = ResponseContext::new();
        ctx.set_header("Content-Type", "text/plain");
        ctx.set_header("content-type", "application/json");
        assert_eq!(ctx.header("CONTENT-TYPE").as_deref(), Some("application/json"));
        assert_eq!(ctx.to_response().headers.len(), 1);
    }
}
