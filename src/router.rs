//! Pipeline composition.
//!
//! [`Router`] collects the features a service turns on and assembles them
//! around one base handler. Only enabled features contribute a stage; there
//! is no placeholder for a disabled one.
//!
//! By default the stages run CORS first, then logging, then telemetry, so a
//! rejected cross-origin request is never logged or counted. Hosts that want
//! a different arrangement pass an explicit [`Router::order`].

use std::fmt;

use serde::Deserialize;

use crate::cors::CorsPolicy;
use crate::error::ConfigError;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Chain;
use crate::middleware::cors::Cors;
use crate::middleware::logging::Logging;
use crate::middleware::telemetry::Telemetry;
use crate::request::Request;
use crate::response::Response;

/// One of the built-in pipeline stages.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Cors,
    Logging,
    Telemetry,
}

impl StageKind {
    pub const DEFAULT_ORDER: [StageKind; 3] = [Self::Cors, Self::Logging, Self::Telemetry];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cors      => "cors",
            Self::Logging   => "logging",
            Self::Telemetry => "telemetry",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipeline composer.
///
/// ```rust
/// use sluice::{CorsPolicy, Request, Response, Router};
/// use sluice::middleware::logging::Logging;
///
/// async fn app(_req: Request) -> Response { Response::text("hello") }
///
/// let pipeline = Router::new(app)
///     .cors(CorsPolicy::builder().allowed_origins(["https://a.com"]).build()?)
///     .logging(Logging::new().exclude(["/healthz"]))
///     .build()?;
/// # Ok::<(), sluice::Error>(())
/// ```
pub struct Router {
    base: BoxedHandler,
    cors: Option<Cors>,
    logging: Option<Logging>,
    telemetry: Option<Telemetry>,
    order: Option<Vec<StageKind>>,
}

impl Router {
    pub fn new(base: impl Handler) -> Self {
        Self::from_boxed(base.into_boxed_handler())
    }

    pub fn from_boxed(base: BoxedHandler) -> Self {
        Self { base, cors: None, logging: None, telemetry: None, order: None }
    }

    pub fn cors(mut self, policy: CorsPolicy) -> Self {
        self.cors = Some(Cors::new(policy));
        self
    }

    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Overrides the default stage order, outermost first.
    ///
    /// Must name every enabled stage exactly once and no disabled one;
    /// [`build`](Self::build) rejects anything else.
    pub fn order(mut self, order: impl IntoIterator<Item = StageKind>) -> Self {
        self.order = Some(order.into_iter().collect());
        self
    }

    /// Stages that will be applied, outermost first.
    pub fn stages(&self) -> Result<Vec<StageKind>, ConfigError> {
        let enabled = |kind: StageKind| match kind {
            StageKind::Cors      => self.cors.is_some(),
            StageKind::Logging   => self.logging.is_some(),
            StageKind::Telemetry => self.telemetry.is_some(),
        };

        let Some(order) = &self.order else {
            return Ok(StageKind::DEFAULT_ORDER.into_iter().filter(|k| enabled(*k)).collect());
        };

        for (i, kind) in order.iter().enumerate() {
            if order[..i].contains(kind) {
                return Err(ConfigError::DuplicateMiddleware(kind.as_str()));
            }
            if !enabled(*kind) {
                return Err(ConfigError::StageNotEnabled(kind.as_str()));
            }
        }
        if let Some(missing) = StageKind::DEFAULT_ORDER
            .into_iter()
            .find(|k| enabled(*k) && !order.contains(k))
        {
            return Err(ConfigError::MissingStage(missing.as_str()));
        }
        Ok(order.clone())
    }

    /// Composes the enabled stages around the base handler.
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        let stages = self.stages()?;
        let Self { base, mut cors, mut logging, mut telemetry, .. } = self;

        let mut chain = Chain::new();
        for kind in stages {
            match kind {
                StageKind::Cors => {
                    if let Some(cors) = cors.take() {
                        chain.push(cors)?;
                    }
                }
                StageKind::Logging => {
                    if let Some(logging) = logging.take() {
                        chain.push(logging)?;
                    }
                }
                StageKind::Telemetry => {
                    if let Some(telemetry) = telemetry.take() {
                        chain.push(telemetry)?;
                    }
                }
            }
        }

        tracing::debug!(stages = chain.len(), "pipeline composed");
        Ok(Pipeline { handler: chain.build(base) })
    }
}

/// The composed handler: every enabled stage wrapped around the base.
///
/// Cheap to clone; clones share the same handler stack.
#[derive(Clone)]
pub struct Pipeline {
    handler: BoxedHandler,
}

impl Pipeline {
    pub async fn handle(&self, req: Request) -> Response {
        self.handler.call(req).await
    }

    pub fn into_handler(self) -> BoxedHandler {
        self.handler
    }
}

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;
