//! Repository entries of the configuration file.

use crate::change_set::{RepositoryKey, RepositoryTarget};
use serde::Deserialize;

/// One `[[repositories]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryConfig {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Branch holding the change.
    #[serde(default)]
    pub head: Option<String>,

    /// Branch to merge into.
    #[serde(default)]
    pub base: Option<String>,

    /// Base used when neither the entry nor the command line gives one.
    #[serde(default, alias = "defaultBase")]
    pub default_base: Option<String>,
}

impl RepositoryConfig {
    /// Returns the repository key.
    #[must_use]
    pub fn key(&self) -> RepositoryKey {
        RepositoryKey::new(self.owner.trim(), self.name.trim())
    }

    /// Resolves the target, with `head` and `base` filling in missing branches.
    ///
    /// Branches set on the entry win over the fallbacks. The base falls back
    /// to `base`, then to `default-base`.
    #[must_use]
    pub fn to_target(&self, head: Option<&str>, base: Option<&str>) -> RepositoryTarget {
        let non_blank = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());

        RepositoryTarget::with_default_base(
            self.key(),
            non_blank(&self.head).or_else(|| head.map(str::to_string)),
            non_blank(&self.base).or_else(|| base.map(str::to_string)),
            non_blank(&self.default_base),
        )
    }
}
