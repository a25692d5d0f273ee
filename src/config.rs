//! Declarative pipeline configuration.
//!
//! These types only derive [`Deserialize`]; the host picks the format. Every
//! field has a default, so an empty document yields a pipeline with no
//! stages.
//!
//! ```toml
//! order = ["logging", "cors"]
//!
//! [cors]
//! allowed_methods = ["GET", "POST"]
//! allowed_origins = ["https://a.com"]
//! max_age = 600
//!
//! [logging]
//! excluded_prefixes = ["/healthz"]
//! ```

use serde::Deserialize;

use crate::cors::CorsPolicy;
use crate::error::ConfigError;
use crate::handler::Handler;
use crate::middleware::logging::Logging;
use crate::middleware::telemetry::{Metrics, Telemetry};
use crate::router::{Router, StageKind};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub cors: Option<CorsConfig>,
    pub logging: Option<PrefixConfig>,
    pub telemetry: Option<PrefixConfig>,
    /// Explicit stage order, outermost first. Omitted means the default.
    pub order: Option<Vec<StageKind>>,
}

impl PipelineConfig {
    /// Builds a [`Router`] around `base` with every configured stage enabled.
    ///
    /// `metrics` is used only when telemetry is configured.
    pub fn into_router(self, base: impl Handler, metrics: Metrics) -> Result<Router, ConfigError> {
        let mut router = Router::new(base);

        if let Some(cors) = self.cors {
            router = router.cors(cors.into_policy()?);
        }
        if let Some(logging) = self.logging {
            router = router.logging(Logging::new().exclude(logging.excluded_prefixes));
        }
        if let Some(telemetry) = self.telemetry {
            router = router.telemetry(Telemetry::new(metrics).exclude(telemetry.excluded_prefixes));
        }
        if let Some(order) = self.order {
            router = router.order(order);
        }
        Ok(router)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_methods: Vec<String>,
    /// Exact-match list. Omitted accepts every origin; empty rejects all.
    pub allowed_origins: Option<Vec<String>>,
    pub allowed_headers: Vec<String>,
    pub exposed_headers: Vec<String>,
    pub allow_credentials: bool,
    /// Seconds. Negative values fail [`into_policy`](Self::into_policy).
    pub max_age: i64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_methods: vec!["GET".to_owned()],
            allowed_origins: None,
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: false,
            max_age: 0,
        }
    }
}

impl CorsConfig {
    pub fn into_policy(self) -> Result<CorsPolicy, ConfigError> {
        let mut builder = CorsPolicy::builder();
        if let Some(origins) = self.allowed_origins {
            builder = builder.allowed_origins(origins);
        }
        builder
            .allowed_methods(self.allowed_methods)
            .allowed_headers(self.allowed_headers)
            .exposed_headers(self.exposed_headers)
            .allow_credentials(self.allow_credentials)
            .max_age(self.max_age)
            .build()
    }
}

/// Settings shared by the logging and telemetry stages.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PrefixConfig {
    pub excluded_prefixes: Vec<String>,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
