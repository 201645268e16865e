//! Incoming HTTP request snapshot.

/// An incoming HTTP request, detached from the connection it arrived on.
///
/// The transport layer builds one of these per request and hands it to
/// [`Engine::handle`](crate::Engine::handle). Tests build them directly:
///
/// ```rust
/// use arbor::Request;
///
/// let req = Request::new("POST", "/login?next=%2Fhome")
///     .with_header("content-type", "application/x-www-form-urlencoded")
///     .with_body("username=kunder");
/// assert_eq!(req.path(), "/login");
/// assert_eq!(req.query(), Some("next=%2Fhome"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Request {
    /// `target` is the request-target: a path, optionally followed by `?query`.
    ///
    /// The path is percent-decoded (a path that does not decode to UTF-8 is
    /// kept as sent); the query is stored raw and decoded per key on lookup.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method: method.into(),
            path: decode_path(path),
            query,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn decode_path(path: &str) -> String {
    urlencoding::decode(path).map_or_else(|_| path.to_owned(), |p| p.into_owned())
}
