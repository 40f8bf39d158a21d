//! Ticket references.

use serde::Serialize;
use std::fmt;
use url::Url;

/// An external issue or ticket the change fixes.
///
/// Usually an issue URL such as `https://github.com/o/r/issues/42`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TicketReference(String);

impl TicketReference {
    /// Wraps a raw reference, trimming surrounding whitespace.
    ///
    /// Returns `None` for blank input.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Builds a reference from a repository URL and an issue number.
    pub fn from_issue(repository: &str, issue: u64) -> Self {
        Self(format!(
            "{}/issues/{issue}",
            repository.trim().trim_end_matches('/')
        ))
    }

    /// Returns the reference as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier after the last `/` (e.g. `42`).
    ///
    /// URLs are parsed so that query strings and fragments are ignored.
    pub fn identifier(&self) -> String {
        if let Ok(url) = Url::parse(&self.0) {
            if let Some(segment) = url
                .path_segments()
                .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            {
                return segment.to_string();
            }
        }

        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.0)
            .to_string()
    }

    /// Returns the marker used to prefix titles (e.g. `#42`).
    pub fn marker(&self) -> String {
        let id = self.identifier();
        if id.starts_with('#') {
            id
        } else {
            format!("#{id}")
        }
    }
}

impl fmt::Display for TicketReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
