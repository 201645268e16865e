//! The top-level coordinator.
//!
//! [`Engine`] owns the router and the arena of route groups, and is itself
//! the root group: everything registered on it directly applies to every
//! path. Per request it
//!
//! 1. collects the middleware of every group whose prefix starts the path,
//!    in group-creation order,
//! 2. builds a [`Context`] with that chain,
//! 3. lets the router append the terminal link (route or 404) and start it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use http::Method;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::group::{Group, GroupId, GroupRecord};
use crate::handler::Handler;
use crate::middleware::{logger, recovery};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::server::Server;

/// The application: routes, groups and their middleware.
///
/// Register everything before serving. Registration takes `&mut self`,
/// serving takes `&self`; once handed to the [`Server`] the engine is shared
/// read-only across requests.
pub struct Engine {
    pub(crate) router: Router,
    pub(crate) groups: Vec<GroupRecord>,
    tag: u64,
}

static NEXT_TAG: AtomicU64 = AtomicU64::new(0);

impl Engine {
    /// An engine with no middleware.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupRecord::root()],
            tag: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// An engine with [`logger`] and [`recovery`] on the root group.
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(logger()).use_middleware(recovery());
        engine
    }

    /// Derives a group under the root.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let id = self.create_group(self.root_id(), prefix);
        Group::new(self, id)
    }

    /// Reopens a previously created group, if `id` belongs to this engine.
    ///
    /// Ids handed out by another engine yield `None`.
    pub fn scope(&mut self, id: GroupId) -> Option<Group<'_>> {
        if self.owns(id) {
            Some(Group::new(self, id))
        } else {
            None
        }
    }

    /// Id of the root group.
    pub fn root_id(&self) -> GroupId {
        GroupId::root(self.tag)
    }

    /// Number of ancestors above `id` (the root is depth 0). Ids from another
    /// engine report 0.
    pub fn depth(&self, id: GroupId) -> usize {
        if !self.owns(id) {
            return 0;
        }
        let mut depth = 0;
        let mut current = self.groups[id.index].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.groups[parent.index].parent;
        }
        depth
    }

    pub fn use_middleware(&mut self, middleware: impl Handler) -> &mut Self {
        self.root().use_middleware(middleware);
        self
    }

    pub fn add_route(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        self.root().add_route(method, pattern, handler);
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.root().get(pattern, handler);
        self
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.root().post(pattern, handler);
        self
    }

    pub fn static_dir(&mut self, relative_path: &str, root: impl Into<std::path::PathBuf>) -> &mut Self {
        self.root().static_dir(relative_path, root);
        self
    }

    /// Dispatches one request through its chain and returns the response.
    ///
    /// Runs synchronously on the calling thread. A panic in a handler that no
    /// recovery middleware catches unwinds out of this call.
    pub fn handle(&self, request: Request) -> Response {
        let middlewares = self
            .groups
            .iter()
            .filter(|g| request.path().starts_with(&g.prefix))
            .flat_map(|g| g.middlewares.iter().map(Arc::clone))
            .collect::<Vec<_>>();

        debug!(
            method = request.method(),
            path = request.path(),
            middlewares = middlewares.len(),
            "dispatch",
        );

        let mut ctx = Context::new(request, middlewares);
        self.router.handle(&mut ctx);
        ctx.into_response()
    }

    /// Binds `addr` and serves until SIGTERM / Ctrl-C.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        Server::bind(addr)?.serve(self).await
    }

    pub(crate) fn create_group(&mut self, parent: GroupId, prefix: &str) -> GroupId {
        let id = GroupId { engine: self.tag, index: self.groups.len() };
        let prefix = format!("{}{prefix}", self.groups[parent.index].prefix);
        self.groups.push(GroupRecord {
            prefix,
            middlewares: Vec::new(),
            parent: Some(parent),
        });
        debug!(prefix = %self.groups[id.index].prefix, depth = self.depth(id), "group created");
        id
    }

    fn owns(&self, id: GroupId) -> bool {
        id.engine == self.tag && id.index < self.groups.len()
    }

    fn root(&mut self) -> Group<'_> {
        let id = self.root_id();
        Group::new(self, id)
    }
}

impl Default for Engine {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::StatusCode;

    use super::*;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn mark(log: &Log, name: &'static str) -> impl Fn(&mut Context) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |c: &mut Context| {
            log.lock().unwrap().push(name);
            c.next();
        }
    }

    fn hello(c: &mut Context) {
        let body = format!("hello {}, you're at {}", c.param("name"), c.path());
        c.string(StatusCode::OK, body);
    }

    #[test]
    fn group_middleware_only_applies_under_its_prefix() {
        let log = Log::default();
        let mut app = Engine::new();
        app.get("/hello", hello);
        app.group("/v2")
            .use_middleware(mark(&log, "v2"))
            .get("/hello/:name", hello);

        let res = app.handle(Request::new("GET", "/v2/hello/kunder"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.text(), "hello kunder, you're at /v2/hello/kunder");
        assert_eq!(*log.lock().unwrap(), ["v2"]);

        let res = app.handle(Request::new("GET", "/hello"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), ["v2"]);
    }

    #[test]
    fn middleware_runs_in_group_creation_order() {
        let log = Log::default();
        let mut app = Engine::new();
        app.use_middleware(mark(&log, "root"));
        {
            let mut api = app.group("/api");
            api.use_middleware(mark(&log, "api"));
            api.group("/v1").use_middleware(mark(&log, "v1")).get("/ping", hello);
        }
        app.group("/b").use_middleware(mark(&log, "unrelated"));
        app.use_middleware(mark(&log, "root-late"));

        app.handle(Request::new("GET", "/api/v1/ping"));
        assert_eq!(*log.lock().unwrap(), ["root", "root-late", "api", "v1"]);
    }

    #[test]
    fn nested_prefixes_concatenate() {
        let mut app = Engine::new();
        let mut v1 = app.group("/v1");
        assert_eq!(v1.prefix(), "/v1");
        let v1_id = v1.id();
        let admin = v1.group("/admin");
        assert_eq!(admin.prefix(), "/v1/admin");
        assert_eq!(admin.parent(), Some(v1_id));
        assert_eq!(admin.parent_prefix(), Some("/v1"));
        let admin_id = admin.id();

        assert_eq!(app.depth(app.root_id()), 0);
        assert_eq!(app.depth(v1_id), 1);
        assert_eq!(app.depth(admin_id), 2);
    }

    #[test]
    fn scope_reopens_a_group() {
        let mut app = Engine::new();
        let id = app.group("/docs").id();
        app.scope(id).unwrap().get("/:page", hello);
        assert!(app.scope(GroupId { engine: id.engine, index: 99 }).is_none());

        let res = app.handle(Request::new("GET", "/docs/intro"));
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn scope_rejects_ids_from_another_engine() {
        let mut first = Engine::new();
        let mut second = Engine::new();
        let foreign = first.group("/docs").id();
        second.group("/other");

        assert!(second.scope(foreign).is_none());
        assert!(second.scope(first.root_id()).is_none());
        assert_eq!(second.depth(foreign), 0);
        assert!(first.scope(foreign).is_some());
    }

    #[test]
    fn parent_prefix_follows_the_parent_record() {
        let mut app = Engine::new();
        assert_eq!(app.scope(app.root_id()).unwrap().parent_prefix(), None);

        let mut api = app.group("/api");
        assert_eq!(api.parent_prefix(), Some(""));
        let v1 = api.group("/v1");
        assert_eq!(v1.parent_prefix(), Some("/api"));
    }

    #[test]
    fn group_prefix_matching_is_plain_string_prefix() {
        let log = Log::default();
        let mut app = Engine::new();
        app.group("/v2").use_middleware(mark(&log, "v2"));
        app.get("/v2x", hello);

        app.handle(Request::new("GET", "/v2x"));
        assert_eq!(*log.lock().unwrap(), ["v2"]);
    }

    #[test]
    fn unmatched_request_runs_middleware_then_404() {
        let log = Log::default();
        let mut app = Engine::new();
        app.use_middleware(mark(&log, "root"));
        app.get("/hello", hello);

        let res = app.handle(Request::new("GET", "/missing"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.text(), "404 NOT FOUND: /missing\n");
        assert_eq!(*log.lock().unwrap(), ["root"]);

        let res = app.handle(Request::new("POST", "/hello"));
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn failing_middleware_blocks_the_route() {
        let reached = Arc::new(Mutex::new(false));
        let mut app = Engine::new();
        let flag = Arc::clone(&reached);
        app.group("/v2")
            .use_middleware(|c: &mut Context| c.fail(StatusCode::INTERNAL_SERVER_ERROR, "err"))
            .get("/hello/:name", move |c: &mut Context| {
                *flag.lock().unwrap() = true;
                c.string(StatusCode::OK, "unreachable");
            });

        let res = app.handle(Request::new("GET", "/v2/hello/kunder"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.text().contains("err"));
        assert!(!*reached.lock().unwrap());
    }

    #[test]
    fn wildcard_and_param_routes_through_the_engine() {
        let mut app = Engine::new();
        app.get("/assets/*filepath", |c: &mut Context| {
            let body = serde_json::json!({ "filepath": c.param("filepath") });
            c.json(StatusCode::OK, &body);
        });
        app.post("/login", |c: &mut Context| {
            let body = serde_json::json!({ "username": c.post_form("username") });
            c.json(StatusCode::OK, &body);
        });

        let res = app.handle(Request::new("GET", "/assets/css/a.css"));
        assert_eq!(res.text(), r#"{"filepath":"css/a.css"}"#);

        let req = Request::new("POST", "/login")
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body("username=kunder&password=114514");
        let res = app.handle(req);
        assert_eq!(res.text(), r#"{"username":"kunder"}"#);
    }

    #[test]
    fn params_see_the_decoded_path() {
        let mut app = Engine::new();
        app.get("/hello/:name", hello);
        let res = app.handle(Request::new("GET", "/hello/ku%20nder"));
        assert_eq!(res.text(), "hello ku nder, you're at /hello/ku nder");

        let res = app.handle(Request::new("GET", "/missing%21"));
        assert_eq!(res.text(), "404 NOT FOUND: /missing!\n");
    }

    #[test]
    fn root_route() {
        let mut app = Engine::new();
        app.get("/", |c: &mut Context| c.html(StatusCode::OK, "<h1>Hello There</h1>"));
        let res = app.handle(Request::new("GET", "/"));
        assert_eq!(res.text(), "<h1>Hello There</h1>");
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn with_defaults_recovers_from_panics() {
        let mut app = Engine::with_defaults();
        app.get("/panic", |c: &mut Context| {
            if c.path() == "/panic" {
                panic!("index out of range");
            }
        });
        let res = app.handle(Request::new("GET", "/panic"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.text(), r#"{"message":"Internal Server Error"}"#);
    }
}
