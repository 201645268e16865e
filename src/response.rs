//! Per-request response sink.
//!
//! Handlers never build a [`Response`] themselves. They write into the one
//! owned by their [`Context`](crate::Context) through its helpers, and the
//! engine hands the finished sink back to the transport.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use tracing::{error, warn};

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for [`Context::bytes`](crate::Context::bytes)
/// and static file serving.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Css,          // text/css
    Csv,          // text/csv
    Gif,          // image/gif
    Html,         // text/html; charset=utf-8
    Javascript,   // text/javascript
    Jpeg,         // image/jpeg
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Pdf,          // application/pdf
    Png,          // image/png
    Svg,          // image/svg+xml
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css         => "text/css",
            Self::Csv         => "text/csv",
            Self::Gif         => "image/gif",
            Self::Html        => "text/html; charset=utf-8",
            Self::Javascript  => "text/javascript",
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Png         => "image/png",
            Self::Svg         => "image/svg+xml",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }

    /// Best guess from a file extension. Unknown extensions are binary.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "css"          => Self::Css,
            "csv"          => Self::Csv,
            "gif"          => Self::Gif,
            "htm" | "html" => Self::Html,
            "js" | "mjs"   => Self::Javascript,
            "jpg" | "jpeg" => Self::Jpeg,
            "json"         => Self::Json,
            "pdf"          => Self::Pdf,
            "png"          => Self::Png,
            "svg"          => Self::Svg,
            "txt"          => Self::Text,
            "xml"          => Self::Xml,
            _              => Self::OctetStream,
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// The response being assembled for one request.
///
/// The status line can be written once. A second write is ignored and logged,
/// the same way a superfluous `WriteHeader` is treated by most HTTP stacks.
/// Writing body bytes before any status implies `200 OK`.
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// The status sent to the client: whatever was written, else `200 OK`.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// `true` once a status has been written.
    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Body as UTF-8, lossily. Handy in tests and logs.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn write_status(&mut self, code: StatusCode) {
        match self.status {
            Some(current) => warn!(
                current = current.as_u16(),
                ignored = code.as_u16(),
                "superfluous status write",
            ),
            None => self.status = Some(code),
        }
    }

    /// Replaces any existing header with the same (case-insensitive) name.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    pub(crate) fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut builder = http::Response::builder().status(self.status());
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                error!("invalid response head: {e}");
                let mut res = http::Response::new(Full::new(Bytes::new()));
                *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                res
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_status_write_wins() {
        let mut res = Response::default();
        assert!(!res.is_written());
        res.write_status(StatusCode::NOT_FOUND);
        res.write_status(StatusCode::OK);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_write_implies_ok() {
        let mut res = Response::default();
        res.write(b"hi");
        res.write(b" there");
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text(), "hi there");
    }

    #[test]
    fn set_header_replaces_by_name() {
        let mut res = Response::default();
        res.set_header("Content-Type", "text/plain");
        res.set_header("content-type", "application/json");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn into_http_carries_status_headers_and_body() {
        let mut res = Response::default();
        res.write_status(StatusCode::CREATED);
        res.set_header("location", "/users/1");
        res.write(b"{}");
        let http = res.into_http();
        assert_eq!(http.status(), StatusCode::CREATED);
        assert_eq!(http.headers()["location"], "/users/1");
    }

    #[test]
    fn invalid_header_becomes_500() {
        let mut res = Response::default();
        res.set_header("bad header", "x");
        assert_eq!(res.into_http().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(ContentType::from_extension("CSS"), ContentType::Css);
        assert_eq!(ContentType::from_extension("html"), ContentType::Html);
        assert_eq!(ContentType::from_extension("bin"), ContentType::OctetStream);
    }
}
