//! Named include paths for eager loading

use serde::Serialize;

/// Relations to expand alongside the primary entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Includes(Vec<String>);

impl Includes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list, dropping empty segments
    pub fn parse(paths: &str) -> Self {
        Self(
            paths
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn with(mut self, path: &str) -> Self {
        self.0.push(path.to_string());
        self
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Includes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
