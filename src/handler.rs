//! Handler trait and type erasure.
//!
//! Routes and middleware share one shape: a function that receives the
//! per-request [`Context`] and drives it. A route handler writes a response;
//! a middleware does some work, calls [`Context::next`], and optionally does
//! more work once the rest of the chain has returned.
//!
//! The router and every request chain need to hold handlers of *different*
//! concrete types side by side, so they are stored behind a trait object:
//!
//! ```text
//! fn hello(c: &mut Context) { … }            ← user writes this
//!        ↓ engine.get("/", hello)
//! hello.into_boxed_handler()                 ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                 ← stored as BoxedHandler
//!        ↓
//! handler.call(&mut ctx)  at request time    ← one vtable dispatch
//! ```
//!
//! Chains clone the `Arc`, not the handler, so building a chain per request
//! costs one atomic increment per link.

use std::sync::Arc;

use crate::context::Context;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: &mut Context);
}

/// A type-erased handler shared between the route table and request chains.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler and middleware.
///
/// Satisfied automatically by any function or closure with the signature:
///
/// ```text
/// fn name(c: &mut Context)
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F> private::Sealed for F where F: Fn(&mut Context) + Send + Sync + 'static {}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F> ErasedHandler for FnHandler<F>
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn call(&self, ctx: &mut Context) {
        (self.0)(ctx)
    }
}
