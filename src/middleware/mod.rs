//! Middleware layer.
//!
//! A middleware is a handler transformer: it receives the handler below it
//! and returns a handler that wraps it. Each wrapper may short-circuit with
//! its own response, annotate the response on the way back, or simply
//! forward.
//!
//! A [`Chain`] applies an ordered list of middlewares around a base handler
//! so that the first one registered is the outermost layer:
//!
//! ```text
//! chain [m1, m2, m3]   →   m1(m2(m3(base)))
//!
//! request  ──► m1 ──► m2 ──► m3 ──► base
//! response ◄── m1 ◄── m2 ◄── m3 ◄──┘
//! ```
//!
//! Built-in middleware:
//! - [`cors`]: CORS negotiation
//! - [`logging`]: one structured access-log event per request
//! - [`telemetry`]: per-request span, request counter and latency histogram

use crate::error::ConfigError;
use crate::handler::BoxedHandler;

pub mod cors;
pub mod logging;
pub mod skip;
pub mod telemetry;

pub use skip::{ExcludedPrefixes, should_skip};

/// A handler-transforming function.
///
/// Any closure `Fn(BoxedHandler) -> BoxedHandler` is a middleware. Structs
/// implement it to carry configuration into the handler they produce.
pub trait Middleware: Send + Sync + 'static {
    /// Wraps `next`, returning the handler that sees requests first.
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;

    /// A stable name for middlewares that may appear at most once per chain.
    ///
    /// Anonymous middlewares (`None`) are never considered duplicates.
    fn name(&self) -> Option<&'static str> {
        None
    }
}

impl<F> Middleware for F
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        self(next)
    }
}

/// An ordered sequence of middlewares.
///
/// Composition is associative but not commutative: `[a, b]` and `[b, a]`
/// differ in which layer sees the request first and the response last.
#[derive(Default)]
pub struct Chain {
    layers: Vec<Box<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware` as the innermost layer registered so far.
    pub fn push(&mut self, middleware: impl Middleware) -> Result<(), ConfigError> {
        if let Some(name) = middleware.name()
            && self.layers.iter().any(|layer| layer.name() == Some(name))
        {
            return Err(ConfigError::DuplicateMiddleware(name));
        }
        self.layers.push(Box::new(middleware));
        Ok(())
    }

    /// Chainable form of [`push`](Chain::push).
    pub fn with(mut self, middleware: impl Middleware) -> Result<Self, ConfigError> {
        self.push(middleware)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wraps `base` in every layer, last registered innermost.
    ///
    /// Runs once; the returned handler is reused for every request.
    pub fn build(&self, base: BoxedHandler) -> BoxedHandler {
        self.layers
            .iter()
            .rev()
            .fold(base, |next, layer| layer.wrap(next))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
