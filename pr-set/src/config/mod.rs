//! Configuration file loading.
//!
//! The configuration describes the repositories taking part in a pull
//! request set and the defaults for the change. It is read from TOML, or
//! from JSON when the file has a `.json` extension:
//!
//! ```toml
//! title = "Add retry"
//! ticket = "https://github.com/o/tracker/issues/42"
//! reviewers = ["alice"]
//! template = "content.md"
//!
//! [[repositories]]
//! owner = "o"
//! name = "svc-a"
//! head = "feat"
//! default-base = "main"
//! ```

mod error;
mod repository;

pub use error::ConfigError;
pub use repository::RepositoryConfig;

use crate::change_set::TicketReference;
use crate::templates::SectionFormats;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ticket in the structured `fixes = { repository, issue }` form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixesConfig {
    /// URL of the repository holding the issue.
    pub repository: String,

    /// Issue number.
    pub issue: u64,
}

/// Parsed configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrSetConfig {
    /// Repositories taking part, in the order their links are listed.
    pub repositories: Vec<RepositoryConfig>,

    /// Default pull request title.
    #[serde(default)]
    pub title: Option<String>,

    /// Ticket reference, usually an issue URL.
    #[serde(default)]
    pub ticket: Option<String>,

    /// Ticket given as repository and issue number.
    #[serde(default)]
    pub fixes: Option<FixesConfig>,

    /// Reviewers requested on every pull request.
    #[serde(default)]
    pub reviewers: Vec<String>,

    /// Whether pull requests are opened as drafts (defaults to true).
    #[serde(default)]
    pub draft: Option<bool>,

    /// GitHub token.
    #[serde(default, alias = "pat")]
    pub token: Option<String>,

    /// Body template path, relative to the configuration file.
    #[serde(default)]
    pub template: Option<PathBuf>,

    /// Handlebars formats for titles and generated sections.
    #[serde(flatten)]
    pub formats: SectionFormats,
}

impl PrSetConfig {
    /// Returns the ticket from `ticket` or `fixes`.
    #[must_use]
    pub fn ticket_reference(&self) -> Option<TicketReference> {
        match (&self.ticket, &self.fixes) {
            (Some(ticket), _) => TicketReference::new(ticket),
            (None, Some(fixes)) => Some(TicketReference::from_issue(
                &fixes.repository,
                fixes.issue,
            )),
            (None, None) => None,
        }
    }

    /// Validates the parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.display().to_string(),
            message,
        };

        if self.repositories.is_empty() {
            return Err(invalid("at least one repository is required".to_string()));
        }

        let mut seen = HashSet::new();
        for (i, repository) in self.repositories.iter().enumerate() {
            if repository.owner.trim().is_empty() || repository.name.trim().is_empty() {
                return Err(invalid(format!(
                    "repository #{} must have an owner and a name",
                    i + 1
                )));
            }
            if !seen.insert(repository.key()) {
                return Err(invalid(format!(
                    "repository '{}' is listed more than once",
                    repository.key()
                )));
            }
        }

        if self.ticket.is_some() && self.fixes.is_some() {
            return Err(invalid(
                "'ticket' and 'fixes' are mutually exclusive".to_string(),
            ));
        }

        if let Some(fixes) = &self.fixes {
            if fixes.repository.trim().is_empty() {
                return Err(invalid("fixes.repository must not be empty".to_string()));
            }
        }

        Ok(())
    }

    /// Resolves the body template path against the configuration directory.
    #[must_use]
    pub fn template_path(&self, config_path: &Path) -> Option<PathBuf> {
        let template = self.template.as_ref()?;
        Some(match config_path.parent() {
            Some(dir) if template.is_relative() => dir.join(template),
            _ => template.clone(),
        })
    }
}

/// Loads and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, malformed, or invalid.
pub fn load_config(path: &Path) -> Result<PrSetConfig, ConfigError> {
    info!(path = %path.display(), "Loading configuration");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = parse_config(path, &content)?;
    config.validate(path)?;

    debug!(
        repositories = config.repositories.len(),
        reviewers = config.reviewers.len(),
        "Configuration parsed"
    );
    Ok(config)
}

/// Parses configuration text, choosing the format from the path extension.
///
/// # Errors
///
/// Returns [`ConfigError::TomlError`] or [`ConfigError::JsonError`].
pub fn parse_config(path: &Path, content: &str) -> Result<PrSetConfig, ConfigError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(content).map_err(|e| ConfigError::JsonError {
            path: path.display().to_string(),
            source: e,
        })
    } else {
        toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Reads a body template file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable, or empty.
pub fn load_template(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let template = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    if template.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            message: "body template is empty".to_string(),
        });
    }

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::DEFAULT_TITLE_FORMAT;
    use std::fs;
    use tempfile::TempDir;

    const TOML_CONFIG: &str = r#"
title = "Add retry"
ticket = "http://x/issues/42"
reviewers = ["alice", "bob"]
template = "content.md"

[[repositories]]
owner = "o"
name = "svc-a"
head = "feat"
base = "main"

[[repositories]]
owner = "o"
name = "svc-b"
default-base = "develop"
"#;

    #[test]
    fn parses_toml_config() {
        let config = parse_config(Path::new("pr-set.toml"), TOML_CONFIG).unwrap();

        assert_eq!(config.repositories.len(), 2);
        assert_eq!(config.repositories[0].head.as_deref(), Some("feat"));
        assert_eq!(
            config.repositories[1].default_base.as_deref(),
            Some("develop")
        );
        assert_eq!(config.reviewers, vec!["alice", "bob"]);
        assert_eq!(config.ticket_reference().unwrap().marker(), "#42");
        assert_eq!(config.formats.title_format, DEFAULT_TITLE_FORMAT);
        assert!(config.draft.is_none());
    }

    #[test]
    fn parses_json_config_with_aliased_keys() {
        let json = r#"{
            "pat": "secret",
            "title": "Add retry",
            "fixes": { "repository": "https://github.com/o/tracker", "issue": 7 },
            "repositories": [
                { "owner": "o", "name": "svc-a", "head": "feat", "base": "main" },
                { "owner": "o", "name": "svc-b", "defaultBase": "main" }
            ]
        }"#;
        let config = parse_config(Path::new("config.json"), json).unwrap();

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(
            config.ticket_reference().unwrap().as_str(),
            "https://github.com/o/tracker/issues/7"
        );
        assert_eq!(
            config.repositories[1].default_base.as_deref(),
            Some("main")
        );
    }

    #[test]
    fn parses_custom_formats() {
        let toml = r#"
title-format = "[{{marker}}] {{title}}"

[[repositories]]
owner = "o"
name = "svc-a"
"#;
        let config = parse_config(Path::new("pr-set.toml"), toml).unwrap();
        assert_eq!(config.formats.title_format, "[{{marker}}] {{title}}");
        assert_eq!(
            config.formats.fixes_format,
            crate::templates::DEFAULT_FIXES_FORMAT
        );
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = parse_config(Path::new("pr-set.toml"), "repositories = 3");
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = parse_config(Path::new("pr-set.json"), "{");
        assert!(matches!(result, Err(ConfigError::JsonError { .. })));
    }

    #[test]
    fn validation_rejects_duplicates_and_empty() {
        let path = Path::new("pr-set.toml");

        let empty = parse_config(path, "repositories = []").unwrap();
        assert!(matches!(
            empty.validate(path),
            Err(ConfigError::ValidationError { .. })
        ));

        let duplicate = parse_config(
            path,
            r#"
[[repositories]]
owner = "o"
name = "a"

[[repositories]]
owner = "o"
name = "a"
"#,
        )
        .unwrap();
        assert!(matches!(
            duplicate.validate(path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn validation_rejects_ticket_and_fixes() {
        let path = Path::new("pr-set.toml");
        let config = parse_config(
            path,
            r#"
ticket = "http://x/issues/1"
fixes = { repository = "http://x", issue = 2 }

[[repositories]]
owner = "o"
name = "a"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn load_config_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pr-set.toml");
        fs::write(&path, TOML_CONFIG).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.title.as_deref(), Some("Add retry"));
        assert_eq!(
            config.template_path(&path).unwrap(),
            temp.path().join("content.md")
        );
    }

    #[test]
    fn load_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn load_template_rejects_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("content.md");
        fs::write(&path, "  \n").unwrap();

        assert!(matches!(
            load_template(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
