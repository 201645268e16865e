//! Segment trie used by the [`Router`](crate::router::Router).
//!
//! One tree per HTTP method. Each node holds one `/`-delimited segment of a
//! registered pattern. Only the node that terminates a route carries a
//! non-empty `pattern`; every other node is a pass-through, so an empty
//! `pattern` at the end of a search means "no route here".
//!
//! ```text
//! GET root
//!  ├── p
//!  │    └── :lang            (pattern = "")
//!  │          ├── doc        (pattern = "/p/:lang/doc")
//!  │          └── intro      (pattern = "/p/:lang/intro")
//!  └── assets
//!       └── *filepath        (pattern = "/assets/*filepath")
//! ```
//!
//! Children are kept in insertion order and tried in that order during a
//! search. There is no specificity ranking: whichever matching sibling was
//! registered first is explored first, and its subtree is exhausted before
//! the next sibling is tried.
//!
//! Registering a second pattern that splits into the same segments (say
//! `/a/b/` after `/a//b`) replaces the terminal's `pattern` without any
//! error. It is only traced at `debug`.

use std::fmt;

use tracing::debug;

#[derive(Debug, Default)]
pub(crate) struct Node {
    /// Full registration pattern. Set only on route-terminating nodes.
    pub(crate) pattern: String,
    /// The segment this node stands for, e.g. `users`, `:id`, `*rest`.
    pub(crate) part: String,
    pub(crate) children: Vec<Node>,
    /// `part` starts with `:` or `*`.
    pub(crate) is_wild: bool,
}

impl Node {
    /// Walks `parts` from `height`, creating missing nodes, and marks the node
    /// at `parts.len()` as the terminal for `pattern`.
    pub(crate) fn insert(&mut self, pattern: &str, parts: &[&str], height: usize) {
        if parts.len() == height {
            if !self.pattern.is_empty() && self.pattern != pattern {
                debug!(
                    previous = %self.pattern,
                    pattern,
                    "route pattern overwrites an existing route with the same segments",
                );
            }
            self.pattern = pattern.to_owned();
            return;
        }

        let part = parts[height];
        let idx = match self.children.iter().position(|c| c.part == part) {
            Some(idx) => idx,
            None => {
                self.children.push(Node {
                    part: part.to_owned(),
                    is_wild: part.starts_with(':') || part.starts_with('*'),
                    ..Node::default()
                });
                self.children.len() - 1
            }
        };
        self.children[idx].insert(pattern, parts, height + 1);
    }

    /// Finds the terminal node matching `parts`, backtracking through
    /// siblings in insertion order.
    pub(crate) fn search(&self, parts: &[&str], height: usize) -> Option<&Node> {
        if parts.len() == height || self.part.starts_with('*') {
            return (!self.pattern.is_empty()).then_some(self);
        }

        let part = parts[height];
        self.match_children(part)
            .find_map(|child| child.search(parts, height + 1))
    }

    /// Children that accept `part`: literal equality or any wild child.
    fn match_children<'a>(&'a self, part: &str) -> impl Iterator<Item = &'a Node> {
        self.children
            .iter()
            .filter(move |c| c.part == part || c.is_wild)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node{{pattern={}, part={}, is_wild={}}}",
            self.pattern, self.part, self.is_wild
        )
    }
}

/// Splits a pattern or request path into its non-empty segments.
///
/// Collection stops after the first segment starting with `*`: whatever
/// follows a wildcard is swallowed by it.
pub(crate) fn parse_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for item in pattern.split('/').filter(|s| !s.is_empty()) {
        parts.push(item);
        if item.starts_with('*') {
            break;
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(patterns: &[&str]) -> Node {
        let mut root = Node::default();
        for p in patterns {
            root.insert(p, &parse_pattern(p), 0);
        }
        root
    }

    fn find<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.search(&parse_pattern(path), 0).map(|n| n.pattern.as_str())
    }

    #[test]
    fn parse_pattern_drops_empty_segments() {
        assert_eq!(parse_pattern("/"), Vec::<&str>::new());
        assert_eq!(parse_pattern("//a///b/"), vec!["a", "b"]);
        assert_eq!(parse_pattern("/p/:lang/doc"), vec!["p", ":lang", "doc"]);
    }

    #[test]
    fn parse_pattern_stops_at_wildcard() {
        assert_eq!(parse_pattern("/assets/*filepath/ignored"), vec!["assets", "*filepath"]);
        assert_eq!(parse_pattern("/*"), vec!["*"]);
    }

    #[test]
    fn intermediate_nodes_are_not_routes() {
        let root = tree(&["/p/:lang/doc"]);
        assert_eq!(find(&root, "/p/go/doc"), Some("/p/:lang/doc"));
        assert_eq!(find(&root, "/p/go"), None);
        assert_eq!(find(&root, "/p"), None);
    }

    #[test]
    fn root_pattern_lives_on_the_root_node() {
        let root = tree(&["/"]);
        assert_eq!(find(&root, "/"), Some("/"));
        assert_eq!(find(&root, ""), Some("/"));
        assert_eq!(find(&root, "/x"), None);
    }

    #[test]
    fn wildcard_ends_the_search() {
        let root = tree(&["/assets/*filepath"]);
        assert_eq!(find(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets/a"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets"), None);
    }

    #[test]
    fn insertion_order_decides_between_literal_and_param() {
        let root = tree(&["/a/b", "/a/:x"]);
        assert_eq!(find(&root, "/a/b"), Some("/a/b"));
        assert_eq!(find(&root, "/a/c"), Some("/a/:x"));

        let root = tree(&["/a/:x", "/a/b"]);
        assert_eq!(find(&root, "/a/b"), Some("/a/:x"));
    }

    #[test]
    fn search_backtracks_into_later_siblings() {
        let root = tree(&["/a/:x/edit", "/a/b/view"]);
        assert_eq!(find(&root, "/a/b/view"), Some("/a/b/view"));
        assert_eq!(find(&root, "/a/b/edit"), Some("/a/:x/edit"));
        assert_eq!(find(&root, "/a/b/other"), None);
    }

    #[test]
    fn reinserting_a_pattern_reuses_the_node() {
        let root = tree(&["/a/b", "/a/b"]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn colliding_patterns_overwrite_silently() {
        let root = tree(&["/a/b/", "/a//b"]);
        assert_eq!(find(&root, "/a/b"), Some("/a//b"));
    }

    #[test]
    fn wild_flag_follows_the_first_character() {
        let root = tree(&["/:id", "/*rest", "/plain"]);
        let flags: Vec<_> = root.children.iter().map(|c| (c.part.as_str(), c.is_wild)).collect();
        assert_eq!(flags, vec![(":id", true), ("*rest", true), ("plain", false)]);
    }

    #[test]
    fn display_shows_node_fields() {
        let node = Node { pattern: "/a".into(), part: "a".into(), ..Node::default() };
        assert_eq!(node.to_string(), "node{pattern=/a, part=a, is_wild=false}");
    }
}
