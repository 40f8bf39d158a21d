//! The logical change shared by every repository in a pull request set.
//!
//! A [`ChangeSet`] is built once before any pull request is opened and is
//! read-only from then on. The [`RepositoryTarget`]s describe where that
//! change lands.

mod error;
mod target;
mod ticket;

pub use error::ValidationError;
pub use target::{RepositoryKey, RepositoryTarget};
pub use ticket::TicketReference;

use crate::templates::BodyTemplate;
use std::collections::HashSet;

/// Title, ticket, reviewers and body template applied to every pull request.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// Human-readable summary of the change.
    pub title: String,

    /// Ticket the change fixes, if any.
    pub ticket: Option<TicketReference>,

    /// Reviewer logins requested on every pull request.
    pub reviewers: Vec<String>,

    /// Description template for every pull request.
    pub body_template: BodyTemplate,

    /// Whether pull requests are opened as drafts.
    pub draft: bool,
}

impl ChangeSet {
    /// Creates a change set with no ticket and no reviewers, opened as drafts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTitle`] if `title` is blank.
    pub fn new(title: impl Into<String>, body_template: BodyTemplate) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        Ok(Self {
            title,
            ticket: None,
            reviewers: Vec::new(),
            body_template,
            draft: true,
        })
    }

    /// Sets the ticket reference.
    #[must_use]
    pub fn with_ticket(mut self, ticket: Option<TicketReference>) -> Self {
        self.ticket = ticket;
        self
    }

    /// Sets the reviewers, dropping blanks and duplicates while keeping order.
    #[must_use]
    pub fn with_reviewers<I, S>(mut self, reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        self.reviewers = reviewers
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty() && seen.insert(r.clone()))
            .collect();
        self
    }

    /// Sets whether pull requests are opened as drafts.
    #[must_use]
    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }
}

/// Keeps only the selected repositories, in configuration order.
///
/// An empty selection keeps every repository.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownRepository`] if a selected repository is
/// not configured.
pub fn select_targets(
    targets: Vec<RepositoryTarget>,
    selection: &[RepositoryKey],
) -> Result<Vec<RepositoryTarget>, ValidationError> {
    if selection.is_empty() {
        return Ok(targets);
    }

    if let Some(unknown) = selection
        .iter()
        .find(|key| !targets.iter().any(|t| &t.key == *key))
    {
        return Err(ValidationError::UnknownRepository {
            repository: unknown.to_string(),
        });
    }

    Ok(targets
        .into_iter()
        .filter(|t| selection.contains(&t.key))
        .collect())
}

/// Checks that targets are non-empty, unique, and each fully specified.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_targets(targets: &[RepositoryTarget]) -> Result<(), ValidationError> {
    if targets.is_empty() {
        return Err(ValidationError::NoRepositories);
    }

    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(&target.key) {
            return Err(ValidationError::DuplicateRepository {
                repository: target.key.to_string(),
            });
        }
        target.validate()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> BodyTemplate {
        BodyTemplate::parse("$TITLE\n$FIXES\n$MERGE_WITH").unwrap()
    }

    fn target(name: &str) -> RepositoryTarget {
        RepositoryTarget::new(RepositoryKey::new("o", name), "feat", "main")
    }

    #[test]
    fn rejects_blank_title() {
        assert!(matches!(
            ChangeSet::new("   ", template()),
            Err(ValidationError::EmptyTitle)
        ));
    }

    #[test]
    fn trims_title_and_defaults_to_draft() {
        let change_set = ChangeSet::new("  Add retry ", template()).unwrap();
        assert_eq!(change_set.title, "Add retry");
        assert!(change_set.draft);
        assert!(change_set.ticket.is_none());
    }

    #[test]
    fn deduplicates_reviewers_in_order() {
        let change_set = ChangeSet::new("Add retry", template())
            .unwrap()
            .with_reviewers(["bob", " alice", "", "bob"]);
        assert_eq!(change_set.reviewers, vec!["bob", "alice"]);
    }

    #[test]
    fn empty_selection_keeps_all() {
        let targets = vec![target("a"), target("b")];
        let selected = select_targets(targets.clone(), &[]).unwrap();
        assert_eq!(selected, targets);
    }

    #[test]
    fn selection_keeps_configuration_order() {
        let targets = vec![target("a"), target("b"), target("c")];
        let selection = [RepositoryKey::new("o", "c"), RepositoryKey::new("o", "a")];
        let selected = select_targets(targets, &selection).unwrap();
        let names: Vec<_> = selected.iter().map(|t| t.key.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn selection_rejects_unknown_repository() {
        let result = select_targets(vec![target("a")], &[RepositoryKey::new("o", "z")]);
        assert!(matches!(
            result,
            Err(ValidationError::UnknownRepository { .. })
        ));
    }

    #[test]
    fn validate_targets_rejects_duplicates_and_empty() {
        assert!(matches!(
            validate_targets(&[]),
            Err(ValidationError::NoRepositories)
        ));
        assert!(matches!(
            validate_targets(&[target("a"), target("a")]),
            Err(ValidationError::DuplicateRepository { .. })
        ));
        assert!(validate_targets(&[target("a"), target("b")]).is_ok());
    }
}
