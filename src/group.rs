//! Route groups: prefix-scoped middleware.
//!
//! Groups form a tree of scopes. Each one records the absolute prefix it was
//! created with (its parent's prefix followed by its own suffix), the
//! middleware attached to it directly, and the id of its parent. The records
//! live in an arena owned by the [`Engine`]; a [`Group`] is a short-lived
//! handle that borrows the engine to register into it.
//!
//! ```rust
//! use arbor::{Context, Engine, StatusCode};
//!
//! fn only_v2(c: &mut Context) {
//!     c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
//! }
//!
//! fn hello(c: &mut Context) {
//!     let body = format!("hello {}", c.param("name"));
//!     c.string(StatusCode::OK, body);
//! }
//!
//! let mut app = Engine::new();
//! let mut v2 = app.group("/v2");
//! v2.use_middleware(only_v2);
//! v2.get("/hello/:name", hello);
//! ```
//!
//! Prefixes are joined by plain string concatenation. `"/v2"` followed by
//! `"/admin"` is `"/v2/admin"`; `"/v2/"` followed by `"/admin"` is
//! `"/v2//admin"`. Matching which groups apply to a request is also plain
//! string-prefix matching, so a group `"/v2"` applies to `"/v2x"` too.

use std::path::PathBuf;

use http::Method;
use tracing::info;

use crate::engine::Engine;
use crate::handler::{BoxedHandler, Handler};
use crate::static_files;

/// Stable handle to a group record inside one [`Engine`].
///
/// Ids carry the identity of the engine that issued them, so an id from one
/// engine is never mistaken for a group of another.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GroupId {
    pub(crate) engine: u64,
    pub(crate) index: usize,
}

impl GroupId {
    pub(crate) fn root(engine: u64) -> Self {
        Self { engine, index: 0 }
    }
}

pub(crate) struct GroupRecord {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<BoxedHandler>,
    pub(crate) parent: Option<GroupId>,
}

impl GroupRecord {
    pub(crate) fn root() -> Self {
        Self { prefix: String::new(), middlewares: Vec::new(), parent: None }
    }
}

/// A registration handle for one route group.
///
/// Obtained from [`Engine::group`], [`Group::group`] or [`Engine::scope`].
pub struct Group<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl<'e> Group<'e> {
    pub(crate) fn new(engine: &'e mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    pub fn id(&self) -> GroupId { self.id }

    /// Absolute prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.record().prefix
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.record().parent
    }

    /// Absolute prefix of the parent group; `None` for the root.
    pub fn parent_prefix(&self) -> Option<&str> {
        let parent = self.record().parent?;
        Some(self.engine.groups[parent.index].prefix.as_str())
    }

    /// Derives a child scope whose prefix is this group's prefix + `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let id = self.engine.create_group(self.id, prefix);
        Group::new(&mut *self.engine, id)
    }

    /// Appends a middleware to this group only. Ancestors and siblings are
    /// unaffected.
    pub fn use_middleware(&mut self, middleware: impl Handler) -> &mut Self {
        let handler = middleware.into_boxed_handler();
        self.engine.groups[self.id.index].middlewares.push(handler);
        self
    }

    /// Registers `handler` for `method` at this group's prefix + `pattern`.
    ///
    /// `:name` binds one segment; `*name` binds the rest of the path and must
    /// be the last segment.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        let pattern = format!("{}{pattern}", self.prefix());
        info!("Route {:>4} - {}", method.as_str(), pattern);
        self.engine
            .router
            .add_route(method.as_str(), &pattern, handler.into_boxed_handler());
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Serves files under `root` at `<prefix><relative_path>/*filepath`.
    pub fn static_dir(&mut self, relative_path: &str, root: impl Into<PathBuf>) -> &mut Self {
        let pattern = format!("{}/*filepath", relative_path.trim_end_matches('/'));
        self.get(&pattern, static_files::serve_dir(root.into()))
    }

    fn record(&self) -> &GroupRecord {
        &self.engine.groups[self.id.index]
    }
}
