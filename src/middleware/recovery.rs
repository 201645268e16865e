use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use http::StatusCode;
use tracing::error;

use crate::context::Context;

/// Catches a panic anywhere later in the chain and answers
/// `500 {"message":"Internal Server Error"}` instead.
///
/// Place it before anything that may panic. Links above it still see the
/// panic unwind through them.
pub fn recovery() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| c.next())) {
            error!(
                method = c.method(),
                path = c.path(),
                panic = %panic_message(payload.as_ref()),
                "recovered from panic",
            );
            c.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
