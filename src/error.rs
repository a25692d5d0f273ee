//! Unified error type.

use thiserror::Error;

/// The error type returned by sluice's fallible operations.
///
/// Policy rejections (403, 405) are never errors: they are expressed as
/// [`Response`](crate::Response) values. This type covers the two things that
/// can actually fail: building a pipeline from bad configuration, and the
/// host adapter's socket I/O.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a policy or pipeline cannot be constructed.
///
/// All of these are detected at startup, before any request is served.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max-age must be non-negative, got {0}")]
    NegativeMaxAge(i64),

    #[error("`{0}` is not a valid HTTP method token")]
    InvalidMethod(String),

    #[error("`{0}` is not a valid HTTP header name")]
    InvalidHeaderName(String),

    #[error("middleware `{0}` is registered more than once")]
    DuplicateMiddleware(&'static str),

    #[error("stage `{0}` is enabled but missing from the explicit order")]
    MissingStage(&'static str),

    #[error("stage `{0}` appears in the explicit order but is not enabled")]
    StageNotEnabled(&'static str),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),
}
