use std::time::Instant;

use tracing::info;

use crate::context::Context;

/// Logs method, path, final status and latency once the rest of the chain
/// has returned.
pub fn logger() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |c: &mut Context| {
        let start = Instant::now();
        c.next();
        info!(
            method = c.method(),
            path = c.path(),
            status = c.status_code().as_u16(),
            latency = ?start.elapsed(),
            "request",
        );
    }
}
