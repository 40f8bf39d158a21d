//! Body templates with literal `$NAME` placeholders.

use super::TemplateError;
use std::fmt;

/// A placeholder recognized in body templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `$TITLE`: the rendered title as a heading.
    Title,
    /// `$FIXES`: the "Fixes" section, empty without a ticket.
    Fixes,
    /// `$MERGE_WITH`: links to sibling pull requests, empty without siblings.
    MergeWith,
}

impl Placeholder {
    /// Every recognized placeholder.
    pub const ALL: [Placeholder; 3] = [Self::Title, Self::Fixes, Self::MergeWith];

    /// The literal token as written in a template.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Title => "$TITLE",
            Self::Fixes => "$FIXES",
            Self::MergeWith => "$MERGE_WITH",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A body template known to contain every [`Placeholder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyTemplate {
    source: String,
}

impl BodyTemplate {
    /// Validates and wraps template text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingPlaceholder`] for the first placeholder
    /// that does not appear in `source`.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        if let Some(missing) = Placeholder::ALL
            .into_iter()
            .find(|p| !source.contains(p.token()))
        {
            return Err(TemplateError::MissingPlaceholder {
                placeholder: missing.token(),
            });
        }
        Ok(Self { source })
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Replaces every placeholder occurrence in a single pass.
    ///
    /// Substituted text is never scanned again, so a title containing
    /// `$FIXES` stays literal.
    pub fn substitute<'a>(&self, value: impl Fn(Placeholder) -> &'a str) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            match Placeholder::ALL
                .into_iter()
                .find(|p| tail.starts_with(p.token()))
            {
                Some(placeholder) => {
                    out.push_str(value(placeholder));
                    rest = &tail[placeholder.token().len()..];
                }
                None => {
                    out.push('$');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}
