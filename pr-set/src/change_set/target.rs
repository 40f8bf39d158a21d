//! Target repository types.

use super::ValidationError;
use bstr::ByteSlice;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Identifies a remote repository by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RepositoryKey {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepositoryKey {
    /// Creates a key from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.trim().is_empty()
                    && !name.trim().is_empty()
                    && !name.contains('/') =>
            {
                Ok(Self::new(owner.trim(), name.trim()))
            }
            _ => Err(ValidationError::InvalidSelector {
                selector: s.to_string(),
            }),
        }
    }
}

/// One repository taking part in the pull request set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryTarget {
    /// Owner and name of the repository.
    pub key: RepositoryKey,

    /// Branch the pull request merges into.
    pub base: String,

    /// Branch holding the change.
    pub head: String,
}

impl RepositoryTarget {
    /// Creates a target from explicit branches.
    pub fn new(key: RepositoryKey, head: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            key,
            head: head.into(),
            base: base.into(),
        }
    }

    /// Creates a target, taking `base` from `default_base` when it is missing or blank.
    pub fn with_default_base(
        key: RepositoryKey,
        head: Option<String>,
        base: Option<String>,
        default_base: Option<String>,
    ) -> Self {
        let base = base
            .filter(|b| !b.trim().is_empty())
            .or(default_base)
            .unwrap_or_default();
        Self::new(key, head.unwrap_or_default(), base)
    }

    /// Checks that both branches are present and are valid reference names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the offending repository.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let repository = self.key.to_string();

        if self.head.trim().is_empty() {
            return Err(ValidationError::MissingHead { repository });
        }
        if self.base.trim().is_empty() {
            return Err(ValidationError::MissingBase { repository });
        }

        for branch in [&self.head, &self.base] {
            if let Err(e) = gix_validate::reference::name_partial(branch.as_bytes().as_bstr()) {
                return Err(ValidationError::InvalidBranch {
                    repository,
                    branch: branch.clone(),
                    message: e.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RepositoryKey {
        RepositoryKey::new("o", "svc-a")
    }

    #[test]
    fn parses_repository_selector() {
        let parsed: RepositoryKey = "o/svc-a".parse().unwrap();
        assert_eq!(parsed, key());
        assert_eq!(parsed.to_string(), "o/svc-a");
    }

    #[test]
    fn rejects_malformed_selectors() {
        for selector in ["svc-a", "/svc-a", "o/", "o/a/b"] {
            assert!(matches!(
                selector.parse::<RepositoryKey>(),
                Err(ValidationError::InvalidSelector { .. })
            ));
        }
    }

    #[test]
    fn base_falls_back_to_default() {
        let target = RepositoryTarget::with_default_base(
            key(),
            Some("feat".to_string()),
            None,
            Some("develop".to_string()),
        );
        assert_eq!(target.base, "develop");

        let target = RepositoryTarget::with_default_base(
            key(),
            Some("feat".to_string()),
            Some(" ".to_string()),
            Some("develop".to_string()),
        );
        assert_eq!(target.base, "develop");
    }

    #[test]
    fn explicit_base_wins_over_default() {
        let target = RepositoryTarget::with_default_base(
            key(),
            Some("feat".to_string()),
            Some("main".to_string()),
            Some("develop".to_string()),
        );
        assert_eq!(target.base, "main");
    }

    #[test]
    fn validate_requires_head() {
        let target = RepositoryTarget::new(key(), "", "main");
        assert!(matches!(
            target.validate(),
            Err(ValidationError::MissingHead { .. })
        ));
    }

    #[test]
    fn validate_requires_base() {
        let target = RepositoryTarget::with_default_base(key(), Some("feat".into()), None, None);
        assert!(matches!(
            target.validate(),
            Err(ValidationError::MissingBase { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_ref_names() {
        let target = RepositoryTarget::new(key(), "feat..x", "main");
        assert!(matches!(
            target.validate(),
            Err(ValidationError::InvalidBranch { .. })
        ));
    }

    #[test]
    fn validate_accepts_nested_branch() {
        let target = RepositoryTarget::new(key(), "feature/retry", "main");
        assert!(target.validate().is_ok());
    }
}
