//! Request telemetry: one span per request plus two metrics.
//!
//! | Metric | Kind | Labels |
//! |---|---|---|
//! | `http_requests_total` | counter | `method`, `status` |
//! | `http_request_duration_ms` | histogram | `method`, `status` |
//!
//! The span is `http.request` with `http.method`, `http.url`,
//! `http.user_agent` and, once the response is known, `http.status_code`.
//! Requests under an excluded prefix get neither.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use http::header::USER_AGENT;
use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit};
use tracing::Instrument;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::middleware::{ExcludedPrefixes, Middleware};
use crate::request::Request;

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_MS: &str = "http_request_duration_ms";

const REQUESTS_TOTAL_HELP: &str = "Total number of HTTP requests.";
const REQUEST_DURATION_MS_HELP: &str = "HTTP request duration in milliseconds.";

/// Where request metrics are recorded.
///
/// Built once at startup and handed to [`Telemetry`]. Recording is
/// fire-and-forget: `metrics` recorders cannot report failure back to the
/// caller, so an unreachable backend never affects a request.
#[derive(Clone)]
pub struct Metrics {
    sink: Sink,
}

#[derive(Clone)]
enum Sink {
    /// Whatever recorder the host installed with `metrics::set_global_recorder`.
    Global,
    Local(Arc<dyn Recorder + Send + Sync>),
}

impl Metrics {
    /// Records into the process-wide recorder, if the host installed one.
    ///
    /// Descriptions go to whichever recorder is current when this is called,
    /// so build it after the host installs its recorder.
    pub fn global() -> Self {
        metrics::describe_counter!(REQUESTS_TOTAL, Unit::Count, REQUESTS_TOTAL_HELP);
        metrics::describe_histogram!(REQUEST_DURATION_MS, Unit::Milliseconds, REQUEST_DURATION_MS_HELP);
        Self { sink: Sink::Global }
    }

    /// Records into `recorder` only.
    pub fn new(recorder: impl Recorder + Send + Sync + 'static) -> Self {
        let recorder: Arc<dyn Recorder + Send + Sync> = Arc::new(recorder);
        describe(recorder.as_ref());
        Self { sink: Sink::Local(recorder) }
    }

    /// Discards everything.
    pub fn noop() -> Self {
        Self::new(metrics::NoopRecorder)
    }

    fn record(&self, method: &str, status: StatusCode, elapsed: Duration) {
        let labels = vec![
            Label::new("method", method.to_owned()),
            Label::new("status", status.as_u16().to_string()),
        ];
        let millis = elapsed.as_secs_f64() * 1_000.0;

        match &self.sink {
            Sink::Global => {
                metrics::counter!(REQUESTS_TOTAL, labels.clone()).increment(1);
                metrics::histogram!(REQUEST_DURATION_MS, labels).record(millis);
            }
            Sink::Local(recorder) => {
                let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
                recorder
                    .register_counter(&Key::from_parts(REQUESTS_TOTAL, labels.clone()), &metadata)
                    .increment(1);
                recorder
                    .register_histogram(&Key::from_parts(REQUEST_DURATION_MS, labels), &metadata)
                    .record(millis);
            }
        }
    }
}

fn describe(recorder: &dyn Recorder) {
    recorder.describe_counter(
        KeyName::from(REQUESTS_TOTAL),
        Some(Unit::Count),
        SharedString::from(REQUESTS_TOTAL_HELP),
    );
    recorder.describe_histogram(
        KeyName::from(REQUEST_DURATION_MS),
        Some(Unit::Milliseconds),
        SharedString::from(REQUEST_DURATION_MS_HELP),
    );
}

impl Default for Metrics {
    fn default() -> Self {
        Self::global()
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sink = match self.sink {
            Sink::Global => "global",
            Sink::Local(_) => "local",
        };
        f.debug_struct("Metrics").field("sink", &sink).finish()
    }
}

/// The telemetry layer.
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    excluded: ExcludedPrefixes,
    metrics: Metrics,
}

impl Telemetry {
    pub fn new(metrics: Metrics) -> Self {
        Self { excluded: ExcludedPrefixes::default(), metrics }
    }

    /// Paths starting with any of `prefixes` are forwarded untraced and
    /// uncounted.
    pub fn exclude<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = ExcludedPrefixes::new(prefixes);
        self
    }

    pub fn excluded(&self) -> &ExcludedPrefixes {
        &self.excluded
    }
}

impl Middleware for Telemetry {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(TelemetryHandler { config: self.clone(), next })
    }

    fn name(&self) -> Option<&'static str> {
        Some("telemetry")
    }
}

struct TelemetryHandler {
    config: Telemetry,
    next: BoxedHandler,
}

impl ErasedHandler for TelemetryHandler {
    fn call(&self, req: Request) -> BoxFuture {
        if self.config.excluded.matches(req.path()) {
            return self.next.call(req);
        }

        let span = tracing::info_span!(
            "http.request",
            http.method = %req.method(),
            http.url = %req.uri(),
            http.user_agent = req.header(USER_AGENT).unwrap_or_default(),
            http.status_code = tracing::field::Empty
        );
        let method = req.method().clone();
        let metrics = self.config.metrics.clone();

        // Inner stages log while building their future; keep that in the span.
        let start = Instant::now();
        let fut = span.in_scope(|| self.next.call(req));
        Box::pin(async move {
            let res = fut.instrument(span.clone()).await;
            let elapsed = start.elapsed();

            span.record("http.status_code", res.status_code().as_u16());
            metrics.record(method.as_str(), res.status_code(), elapsed);
            res
        })
    }
}

#[cfg(test)]
#[path = "telemetry_test.rs"]
mod telemetry_test;
