//! Per-request context and the middleware chain cursor.
//!
//! A [`Context`] is created for every inbound request and dropped once its
//! response has been handed back to the transport. It carries the request,
//! the parameters captured by the router, the response sink, and the ordered
//! chain of handlers that applies to this request:
//!
//! ```text
//! [ group middleware … , route handler | 404 handler ]
//!   ^
//!   index starts before the first link (-1)
//! ```
//!
//! # Chain states
//!
//! | index              | state        |
//! |--------------------|--------------|
//! | `-1`               | not started  |
//! | `0 ..len`          | running      |
//! | `>= len`           | finished     |
//!
//! [`Context::next`] is the only thing that moves the chain forward. It runs
//! exactly one more link; that link decides whether the one after it runs by
//! calling `next` itself. Code a middleware writes after its `next()` call
//! runs once everything later in the chain has returned:
//!
//! ```rust
//! use arbor::Context;
//! use std::time::Instant;
//!
//! fn timing(c: &mut Context) {
//!     let start = Instant::now();      // on the way in
//!     c.next();
//!     let _spent = start.elapsed();    // on the way out
//! }
//! ```
//!
//! A link that does not call `next` stops the chain there. [`Context::fail`]
//! additionally jumps the cursor to the end, so a stray `next` afterwards is a
//! no-op. Handlers are invoked bare: a panic unwinds straight through the
//! chain to whatever recovery middleware sits above it.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Per-request state handed to every handler and middleware.
pub struct Context {
    request: Request,
    pub(crate) params: HashMap<String, String>,
    pub(crate) handlers: Vec<BoxedHandler>,
    index: isize,
    response: Response,
}

impl Context {
    pub(crate) fn new(request: Request, handlers: Vec<BoxedHandler>) -> Self {
        Self {
            request,
            params: HashMap::new(),
            handlers,
            index: -1,
            response: Response::default(),
        }
    }

    // ── Request side ──────────────────────────────────────────────────────────

    pub fn method(&self) -> &str { self.request.method() }
    pub fn path(&self) -> &str { self.request.path() }
    pub fn request(&self) -> &Request { &self.request }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// A named path parameter, or `""` if the route bound no such name.
    ///
    /// For a route `/p/:lang/doc`, `c.param("lang")` on `/p/go/doc` is `"go"`.
    /// For `/assets/*filepath`, `c.param("filepath")` on `/assets/css/a.css`
    /// is `"css/a.css"`.
    pub fn param(&self, key: &str) -> &str {
        self.params.get(key).map_or("", String::as_str)
    }

    /// First value of a query-string parameter, or `""`.
    pub fn query(&self, key: &str) -> String {
        self.request
            .query()
            .and_then(|q| first_value(q.as_bytes(), key))
            .unwrap_or_default()
    }

    /// A form field from an urlencoded body, falling back to the query string.
    pub fn post_form(&self, key: &str) -> String {
        let is_form = self
            .request
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        is_form
            .then(|| first_value(self.request.body(), key))
            .flatten()
            .unwrap_or_else(|| self.query(key))
    }

    // ── Chain ─────────────────────────────────────────────────────────────────

    /// Runs the next link of the chain, if there is one.
    ///
    /// Calling this on a finished chain does nothing. Once the last link
    /// returns, the cursor moves past it and the chain is finished.
    pub fn next(&mut self) {
        self.index += 1;
        let Ok(idx) = usize::try_from(self.index) else { return };
        let len = self.handlers.len();
        if let Some(handler) = self.handlers.get(idx).map(Arc::clone) {
            handler.call(self);
            if idx + 1 == len {
                self.index = self.index.max(len as isize);
            }
        }
    }

    /// Finishes the chain immediately and writes `{"message": message}`.
    ///
    /// Links already on the stack still unwind normally; no link that has
    /// not started yet will run.
    pub fn fail(&mut self, code: StatusCode, message: &str) {
        self.index = self.handlers.len() as isize;
        self.json(code, &json!({ "message": message }));
    }

    /// `true` once the cursor has moved past the last link.
    pub fn is_finished(&self) -> bool {
        self.index >= self.handlers.len() as isize
    }

    // ── Response side ─────────────────────────────────────────────────────────

    /// Writes the status line. Only the first call per request takes effect.
    pub fn status(&mut self, code: StatusCode) {
        self.response.write_status(code);
    }

    /// The status that will be sent (`200 OK` if none was written yet).
    pub fn status_code(&self) -> StatusCode {
        self.response.status()
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.response.set_header(name, value);
    }

    /// Appends raw bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.response.write(bytes);
    }

    /// `text/plain` body.
    pub fn string(&mut self, code: StatusCode, body: impl AsRef<str>) {
        self.bytes(code, ContentType::Text, body.as_ref().as_bytes());
    }

    /// `text/html` body.
    pub fn html(&mut self, code: StatusCode, body: impl AsRef<str>) {
        self.bytes(code, ContentType::Html, body.as_ref().as_bytes());
    }

    /// `application/json` body. A value that fails to serialise produces a
    /// 500 carrying the serde error instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, code: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.bytes(code, ContentType::Json, &body),
            Err(e) => self.string(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }

    /// Body with no content type.
    pub fn data(&mut self, code: StatusCode, body: &[u8]) {
        self.status(code);
        self.write(body);
    }

    /// Body with an explicit content type.
    pub fn bytes(&mut self, code: StatusCode, content_type: ContentType, body: &[u8]) {
        self.set_header("content-type", content_type.as_str());
        self.status(code);
        self.write(body);
    }

    pub fn response(&self) -> &Response { &self.response }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

fn first_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
