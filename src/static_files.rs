//! Directory serving for `static_dir` routes.
//!
//! The route is registered as `<mount>/*filepath`; the handler resolves the
//! captured `filepath` beneath a root directory. Only plain path components
//! are accepted, so `..`, absolute paths and drive prefixes never escape the
//! root. Anything that cannot be served answers a bare 404.

use std::fs;
use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use tracing::debug;

use crate::context::Context;
use crate::response::ContentType;

pub(crate) fn serve_dir(root: PathBuf) -> impl Fn(&mut Context) + Send + Sync + 'static {
    move |c: &mut Context| {
        let Some(path) = map_path(&root, c.param("filepath")) else {
            c.status(StatusCode::NOT_FOUND);
            return;
        };
        if !path.is_file() {
            c.status(StatusCode::NOT_FOUND);
            return;
        }
        match fs::read(&path) {
            Ok(bytes) => {
                let content_type = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(ContentType::OctetStream, ContentType::from_extension);
                c.bytes(StatusCode::OK, content_type, &bytes);
            }
            Err(e) => {
                debug!(path = %path.display(), "static file unreadable: {e}");
                c.status(StatusCode::NOT_FOUND);
            }
        }
    }
}

fn map_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(path)
}
