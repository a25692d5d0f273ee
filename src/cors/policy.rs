use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use http::{HeaderName, HeaderValue, Method};
use indexmap::IndexSet;

use crate::error::ConfigError;

/// A single-string predicate used to accept origins or requested headers.
///
/// Validators must be pure: they are called concurrently from every request
/// without synchronisation.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync + 'static>;

/// The validator used when a policy does not supply one.
pub fn allow_any(_: &str) -> bool {
    true
}

/// Exact, case-sensitive match against a fixed list of origins.
///
/// An empty list rejects every origin.
pub fn origins_from_list<I, S>(origins: I) -> impl Fn(&str) -> bool + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: HashSet<String> = origins.into_iter().map(Into::into).collect();
    move |origin| allowed.contains(origin)
}

/// An immutable CORS policy.
///
/// Built once at startup with [`CorsPolicy::builder`], then shared read-only
/// by every request. Header values emitted on preflight are rendered at build
/// time, so negotiation only clones them.
pub struct CorsPolicy {
    pub(super) allowed_methods: IndexSet<String>,
    pub(super) allowed_headers: IndexSet<String>,
    pub(super) exposed_headers: IndexSet<String>,
    pub(super) allow_credentials: bool,
    pub(super) max_age: u64,
    pub(super) validate_origin: Validator,
    pub(super) validate_header: Validator,

    pub(super) allow_methods_value: HeaderValue,
    pub(super) allow_headers_value: HeaderValue,
    pub(super) expose_headers_value: Option<HeaderValue>,
    pub(super) max_age_value: Option<HeaderValue>,
}

impl CorsPolicy {
    pub fn builder() -> CorsPolicyBuilder {
        CorsPolicyBuilder::default()
    }

    pub fn allowed_methods(&self) -> impl Iterator<Item = &str> {
        self.allowed_methods.iter().map(String::as_str)
    }

    pub fn allowed_headers(&self) -> impl Iterator<Item = &str> {
        self.allowed_headers.iter().map(String::as_str)
    }

    pub fn exposed_headers(&self) -> impl Iterator<Item = &str> {
        self.exposed_headers.iter().map(String::as_str)
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    /// Preflight cache lifetime in seconds; `0` means the header is omitted.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        (self.validate_origin)(origin)
    }

    /// Checks every comma-separated, trimmed token of an
    /// `Access-Control-Request-Headers` value.
    ///
    /// An empty value is one empty token, so it is still passed to the
    /// validator once.
    pub fn are_headers_allowed(&self, requested: &str) -> bool {
        requested
            .split(',')
            .map(str::trim)
            .all(|name| (self.validate_header)(name))
    }
}

impl fmt::Debug for CorsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorsPolicy")
            .field("allowed_methods", &self.allowed_methods)
            .field("allowed_headers", &self.allowed_headers)
            .field("exposed_headers", &self.exposed_headers)
            .field("allow_credentials", &self.allow_credentials)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`CorsPolicy`].
///
/// Defaults: methods `GET`, no allowed or exposed headers, no credentials,
/// max-age `0`, every origin and header accepted.
pub struct CorsPolicyBuilder {
    methods: Vec<String>,
    allowed_headers: Vec<String>,
    exposed_headers: Vec<String>,
    allow_credentials: bool,
    max_age: i64,
    validate_origin: Validator,
    validate_header: Validator,
}

impl Default for CorsPolicyBuilder {
    fn default() -> Self {
        Self {
            methods: vec![Method::GET.to_string()],
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: false,
            max_age: 0,
            validate_origin: Arc::new(allow_any),
            validate_header: Arc::new(allow_any),
        }
    }
}

impl CorsPolicyBuilder {
    /// Replaces the allowed methods. Matching is exact and case-sensitive.
    pub fn allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn exposed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_credentials(mut self, enabled: bool) -> Self {
        self.allow_credentials = enabled;
        self
    }

    /// Seconds a preflight may be cached. Negative values fail in
    /// [`build`](Self::build).
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn validate_origin(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validate_origin = Arc::new(f);
        self
    }

    /// Shorthand for `validate_origin(origins_from_list(origins))`.
    pub fn allowed_origins<I, S>(self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validate_origin(origins_from_list(origins))
    }

    pub fn validate_header(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.validate_header = Arc::new(f);
        self
    }

    pub fn build(self) -> Result<CorsPolicy, ConfigError> {
        let max_age = u64::try_from(self.max_age)
            .map_err(|_| ConfigError::NegativeMaxAge(self.max_age))?;

        let allowed_methods = collect_methods(self.methods)?;
        let allowed_headers = collect_header_names(self.allowed_headers)?;
        let exposed_headers = collect_header_names(self.exposed_headers)?;

        let allow_methods_value = join(&allowed_methods, ConfigError::InvalidMethod)?;
        let allow_headers_value = join(&allowed_headers, ConfigError::InvalidHeaderName)?;
        let expose_headers_value = if exposed_headers.is_empty() {
            None
        } else {
            Some(join(&exposed_headers, ConfigError::InvalidHeaderName)?)
        };
        let max_age_value = (max_age > 0).then(|| HeaderValue::from(max_age));

        Ok(CorsPolicy {
            allowed_methods,
            allowed_headers,
            exposed_headers,
            allow_credentials: self.allow_credentials,
            max_age,
            validate_origin: self.validate_origin,
            validate_header: self.validate_header,
            allow_methods_value,
            allow_headers_value,
            expose_headers_value,
            max_age_value,
        })
    }
}

fn collect_methods(methods: Vec<String>) -> Result<IndexSet<String>, ConfigError> {
    methods
        .into_iter()
        .map(|m| match Method::from_bytes(m.as_bytes()) {
            Ok(_) => Ok(m),
            Err(_) => Err(ConfigError::InvalidMethod(m)),
        })
        .collect()
}

fn collect_header_names(names: Vec<String>) -> Result<IndexSet<String>, ConfigError> {
    names
        .into_iter()
        .map(|h| match HeaderName::from_bytes(h.as_bytes()) {
            Ok(_) => Ok(h),
            Err(_) => Err(ConfigError::InvalidHeaderName(h)),
        })
        .collect()
}

/// Comma-joins in insertion order, no whitespace.
fn join(
    values: &IndexSet<String>,
    on_error: fn(String) -> ConfigError,
) -> Result<HeaderValue, ConfigError> {
    let joined = values.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    HeaderValue::from_str(&joined).map_err(|_| on_error(joined))
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
