//! Trie-backed request router.
//!
//! One [`Node`] tree per HTTP method, plus a flat table from
//! `"<METHOD>-<pattern>"` to handler. Lookup walks the tree to find the
//! *registered pattern* that matches a path, then fetches the handler keyed by
//! that pattern, so `/p/go/doc` lands on the handler registered for
//! `/p/:lang/doc`.
//!
//! Build it once at startup. Nothing here is synchronised for registration
//! while requests are being served.

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;

use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};
use crate::trie::{Node, parse_pattern};

#[derive(Default)]
pub(crate) struct Router {
    roots: HashMap<String, Node>,
    handlers: HashMap<String, BoxedHandler>,
}

fn route_key(method: &str, pattern: &str) -> String {
    format!("{method}-{pattern}")
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_route(&mut self, method: &str, pattern: &str, handler: BoxedHandler) {
        let parts = parse_pattern(pattern);
        self.roots
            .entry(method.to_owned())
            .or_default()
            .insert(pattern, &parts, 0);
        self.handlers.insert(route_key(method, pattern), handler);
    }

    /// Resolves `path` to the terminal node for `method` and the parameters
    /// bound along the way.
    pub(crate) fn get_route(
        &self,
        method: &str,
        path: &str,
    ) -> Option<(&Node, HashMap<String, String>)> {
        let search_parts = parse_pattern(path);
        let root = self.roots.get(method)?;
        let node = root.search(&search_parts, 0)?;

        let mut params = HashMap::new();
        for (index, part) in parse_pattern(&node.pattern).into_iter().enumerate() {
            if let Some(name) = part.strip_prefix(':') {
                if let Some(value) = search_parts.get(index) {
                    params.insert(name.to_owned(), (*value).to_owned());
                }
            }
            if let Some(name) = part.strip_prefix('*').filter(|n| !n.is_empty()) {
                let rest = search_parts.get(index..).unwrap_or_default();
                params.insert(name.to_owned(), rest.join("/"));
                break;
            }
        }
        Some((node, params))
    }

    /// Appends the terminal link for this request to the context's chain
    /// (the matched handler, or the 404 writer) and starts the chain.
    pub(crate) fn handle(&self, ctx: &mut Context) {
        let terminal = match self.get_route(ctx.method(), ctx.path()) {
            Some((node, params)) => {
                ctx.params = params;
                self.handlers.get(&route_key(ctx.method(), &node.pattern)).map(Arc::clone)
            }
            None => None,
        };
        ctx.handlers
            .push(terminal.unwrap_or_else(|| not_found.into_boxed_handler()));
        ctx.next();
    }
}

fn not_found(c: &mut Context) {
    let body = format!("404 NOT FOUND: {}\n", c.path());
    c.string(StatusCode::NOT_FOUND, body);
}
