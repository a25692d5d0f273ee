//! Handlers and their type-erased form.
//!
//! A pipeline is a stack of handlers of *different* concrete types: the base
//! handler written by the user, wrapped by a CORS handler, wrapped by a
//! logging handler, and so on. A layer only needs to know that the layer
//! below it turns a [`Request`] into a [`Response`], so it holds the next one
//! as a trait object.
//!
//! ```text
//! async fn app(req: Request) -> Response { … }     user code
//!        │ Router::new(app)
//!        ▼
//! Arc<FnHandler<app>>          as BoxedHandler      erased once
//!        │ Chain::build
//!        ▼
//! Arc<CorsHandler { next }>    as BoxedHandler      one per stage
//!        │ Pipeline::handle
//!        ▼
//! next.call(req)                                    one virtual call per stage
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The future every erased handler returns.
///
/// Pinned on the heap so the runtime can poll it in place; `Send + 'static`
/// so tokio may move it between worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe dispatch shared by every layer of a pipeline.
///
/// Implement this directly for a struct middleware that holds its `next`
/// handler. Plain async functions go through [`Handler`] instead.
pub trait ErasedHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared by every concurrent request.
pub type BoxedHandler = Arc<dyn ErasedHandler>;

/// Erases any [`Handler`]. Closure middlewares use this to hand back a
/// wrapper around the handler they were given.
pub fn boxed(handler: impl Handler) -> BoxedHandler {
    handler.into_boxed_handler()
}

/// Any `async fn(Request) -> impl IntoResponse`, or a closure of that shape.
///
/// Sealed: the blanket impl below is the only one.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod sealed {
    pub trait Sealed {}
}

impl<F, Fut, R> sealed::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler { f: self })
    }
}

struct FnHandler<F> {
    f: F,
}

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.f)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
