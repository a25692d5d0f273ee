//! Path-prefix exclusion shared by the logging and telemetry layers.

/// Returns `true` iff `path` starts with at least one of `excluded`.
///
/// This is a literal, case-sensitive string-prefix test, not a path-segment
/// match: the prefix `"pat"` matches `"path/to/file"`.
pub fn should_skip<S: AsRef<str>>(path: &str, excluded: &[S]) -> bool {
    excluded.iter().any(|prefix| path.starts_with(prefix.as_ref()))
}

/// The ordered, immutable set of prefixes one middleware instance ignores.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExcludedPrefixes(Vec<String>);

impl ExcludedPrefixes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(prefixes.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, path: &str) -> bool {
        should_skip(path, &self.0)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
#[path = "skip_test.rs"]
mod skip_test;
