//! Built-in middleware.
//!
//! Middleware is an ordinary handler that calls [`Context::next`] somewhere in
//! its body. Attach it with `use_middleware` on the engine or on a group.
//!
//! - [`logger`] — one `tracing` event per request with status and latency
//! - [`recovery`] — turns a panic further down the chain into a 500
//!
//! [`Engine::with_defaults`](crate::Engine::with_defaults) installs both, in
//! that order, so the logger also sees the status written by recovery.
//!
//! [`Context::next`]: crate::Context::next

mod logger;
mod recovery;

pub use logger::logger;
pub use recovery::recovery;
