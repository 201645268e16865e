//! # arbor
//!
//! A minimal HTTP framework built around three pieces:
//!
//! - **Trie routing** — one segment tree per method. `:name` binds one
//!   segment, `*name` binds the rest of the path. Siblings are tried in
//!   registration order, so register literals before parameters that could
//!   shadow them.
//! - **Route groups** — prefix scopes. Middleware attached to a group runs
//!   for every request whose path starts with the group's prefix.
//! - **An onion middleware chain** — every handler receives a [`Context`];
//!   middleware calls [`Context::next`] to run the rest of the chain and gets
//!   control back afterwards. [`Context::fail`] ends the chain early.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use arbor::{Context, Engine, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arbor::Error> {
//!     arbor::logging::init("info");
//!
//!     let mut app = Engine::with_defaults();
//!     app.get("/", |c: &mut Context| c.html(StatusCode::OK, "<h1>Hello</h1>"));
//!     app.get("/hello/:name", hello);
//!     app.get("/assets/*filepath", |c: &mut Context| {
//!         let body = serde_json::json!({ "filepath": c.param("filepath") });
//!         c.json(StatusCode::OK, &body);
//!     });
//!
//!     let mut v2 = app.group("/v2");
//!     v2.use_middleware(auth);
//!     v2.get("/hello/:name", hello);
//!
//!     app.run("0.0.0.0:9999").await
//! }
//!
//! fn hello(c: &mut Context) {
//!     let body = format!("hello {}, you're at {}\n", c.param("name"), c.path());
//!     c.string(StatusCode::OK, body);
//! }
//!
//! fn auth(c: &mut Context) {
//!     if c.request().header("authorization").is_none() {
//!         c.fail(StatusCode::UNAUTHORIZED, "missing credentials");
//!         return;
//!     }
//!     c.next();
//! }
//! ```
//!
//! Requests that match no route still run the middleware of every group
//! whose prefix they start with, then answer `404 NOT FOUND: <path>`.

mod context;
mod engine;
mod error;
mod group;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod static_files;
mod trie;

pub mod config;
pub mod logging;
pub mod middleware;

pub use config::ServerConfig;
pub use context::Context;
pub use engine::Engine;
pub use error::Error;
pub use group::{Group, GroupId};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, Response};
pub use server::Server;
