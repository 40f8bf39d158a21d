//! Template renderer.

use super::{Placeholder, TemplateError};
use crate::change_set::ChangeSet;
use handlebars::{no_escape, Handlebars};
use serde::Deserialize;
use serde_json::{json, Value};

const TITLE: &str = "title";
const FIXES: &str = "fixes";
const MERGE_WITH: &str = "merge_with";

/// Default format of a pull request title.
pub const DEFAULT_TITLE_FORMAT: &str = "{{#if marker}}({{marker}}) {{/if}}{{title}}";

/// Default format of the `$FIXES` section.
pub const DEFAULT_FIXES_FORMAT: &str = "## Fixes\nfixes {{ticket}}";

/// Default format of the `$MERGE_WITH` section.
pub const DEFAULT_MERGE_WITH_FORMAT: &str =
    "## Merge with\n{{#each links}}{{#unless @first}}\n{{/unless}}- {{this}}{{/each}}";

/// Handlebars formats for the generated parts of a pull request.
///
/// Variables available to every format: `title`, `ticket`, `marker`.
/// The merge-with format additionally gets `links`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SectionFormats {
    /// Pull request title.
    pub title_format: String,

    /// `$FIXES` section, rendered only when a ticket is set.
    pub fixes_format: String,

    /// `$MERGE_WITH` section, rendered only when there are siblings.
    pub merge_with_format: String,
}

impl Default for SectionFormats {
    fn default() -> Self {
        Self {
            title_format: DEFAULT_TITLE_FORMAT.to_string(),
            fixes_format: DEFAULT_FIXES_FORMAT.to_string(),
            merge_with_format: DEFAULT_MERGE_WITH_FORMAT.to_string(),
        }
    }
}

/// Creates a Handlebars registry holding the section formats.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches misspelled variables)
///
/// # Errors
///
/// Returns [`TemplateError::RegistrationError`] if a format does not parse.
pub(crate) fn create_handlebars_registry(
    formats: &SectionFormats,
) -> Result<Handlebars<'static>, TemplateError> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);

    hbs.register_template_string(TITLE, &formats.title_format)?;
    hbs.register_template_string(FIXES, &formats.fixes_format)?;
    hbs.register_template_string(MERGE_WITH, &formats.merge_with_format)?;

    Ok(hbs)
}

/// Renders titles and descriptions for every pull request in a set.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Creates a renderer using [`SectionFormats::default`].
    ///
    /// # Errors
    ///
    /// Never fails for the built-in formats; the `Result` mirrors
    /// [`TemplateRenderer::with_formats`].
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_formats(&SectionFormats::default())
    }

    /// Creates a renderer with custom section formats.
    ///
    /// # Errors
    ///
    /// Returns an error if any format fails to parse.
    pub fn with_formats(formats: &SectionFormats) -> Result<Self, TemplateError> {
        Ok(Self {
            handlebars: create_handlebars_registry(formats)?,
        })
    }

    /// Renders the pull request title.
    ///
    /// With a ticket the title is prefixed by its marker, e.g. `(#42) Add retry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the title format references unknown variables.
    pub fn render_title(&self, change_set: &ChangeSet) -> Result<String, TemplateError> {
        Ok(self.handlebars.render(TITLE, &base_data(change_set))?)
    }

    /// Renders a pull request description.
    ///
    /// `linkage` holds the URLs of sibling pull requests, in the order they
    /// should be listed. Pass an empty slice before siblings are known.
    ///
    /// # Errors
    ///
    /// Returns an error if a section format fails to render.
    pub fn render_body(
        &self,
        change_set: &ChangeSet,
        linkage: &[&str],
    ) -> Result<String, TemplateError> {
        let data = base_data(change_set);

        let title = format!("# {}", self.handlebars.render(TITLE, &data)?);

        let fixes = match &change_set.ticket {
            Some(_) => self.handlebars.render(FIXES, &data)?,
            None => String::new(),
        };

        let merge_with = if linkage.is_empty() {
            String::new()
        } else {
            let mut data = data;
            data["links"] = json!(linkage);
            self.handlebars.render(MERGE_WITH, &data)?
        };

        Ok(change_set.body_template.substitute(|p| match p {
            Placeholder::Title => title.as_str(),
            Placeholder::Fixes => fixes.as_str(),
            Placeholder::MergeWith => merge_with.as_str(),
        }))
    }
}

fn base_data(change_set: &ChangeSet) -> Value {
    let (ticket, marker) = change_set
        .ticket
        .as_ref()
        .map(|t| (t.as_str().to_string(), t.marker()))
        .unwrap_or_default();

    json!({
        "title": change_set.title,
        "ticket": ticket,
        "marker": marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_set::TicketReference;
    use crate::templates::BodyTemplate;

    const TEMPLATE: &str = "$TITLE\n\n$FIXES\n\n$MERGE_WITH\n";

    fn change_set(ticket: Option<&str>) -> ChangeSet {
        ChangeSet::new("Add retry", BodyTemplate::parse(TEMPLATE).unwrap())
            .unwrap()
            .with_ticket(ticket.and_then(TicketReference::new))
    }

    #[test]
    fn title_without_ticket_is_verbatim() {
        let renderer = TemplateRenderer::new().unwrap();
        let title = renderer.render_title(&change_set(None)).unwrap();
        assert_eq!(title, "Add retry");
    }

    #[test]
    fn title_with_ticket_is_prefixed() {
        let renderer = TemplateRenderer::new().unwrap();
        let title = renderer
            .render_title(&change_set(Some("http://x/issues/42")))
            .unwrap();
        assert_eq!(title, "(#42) Add retry");
    }

    #[test]
    fn body_without_ticket_or_siblings() {
        let renderer = TemplateRenderer::new().unwrap();
        let body = renderer.render_body(&change_set(None), &[]).unwrap();
        assert_eq!(body, "# Add retry\n\n\n\n\n");
        assert!(!body.contains("## Fixes"));
        assert!(!body.contains("## Merge with"));
    }

    #[test]
    fn body_with_ticket_has_one_fixes_section() {
        let renderer = TemplateRenderer::new().unwrap();
        let body = renderer
            .render_body(&change_set(Some("http://x/issues/42")), &[])
            .unwrap();
        assert_eq!(body.matches("## Fixes").count(), 1);
        assert!(body.contains("fixes http://x/issues/42"));
        assert!(body.starts_with("# (#42) Add retry"));
    }

    #[test]
    fn body_lists_siblings_one_per_line() {
        let renderer = TemplateRenderer::new().unwrap();
        let body = renderer
            .render_body(
                &change_set(None),
                &["https://github.com/o/b/pull/1", "https://github.com/o/c/pull/2"],
            )
            .unwrap();
        assert!(body.contains(
            "## Merge with\n- https://github.com/o/b/pull/1\n- https://github.com/o/c/pull/2\n"
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = TemplateRenderer::new().unwrap();
        let change_set = change_set(Some("http://x/issues/42"));
        let links = ["https://github.com/o/b/pull/1"];
        let first = renderer.render_body(&change_set, &links).unwrap();
        let second = renderer.render_body(&change_set, &links).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn no_html_escaping() {
        let renderer = TemplateRenderer::new().unwrap();
        let change_set = ChangeSet::new("Use <T> & friends", BodyTemplate::parse(TEMPLATE).unwrap())
            .unwrap();
        let title = renderer.render_title(&change_set).unwrap();
        assert_eq!(title, "Use <T> & friends");
    }

    #[test]
    fn custom_formats_are_used() {
        let formats = SectionFormats {
            title_format: "[{{marker}}] {{title}}".to_string(),
            fixes_format: "Closes {{ticket}}".to_string(),
            merge_with_format: "Siblings: {{#each links}}{{this}} {{/each}}".to_string(),
        };
        let renderer = TemplateRenderer::with_formats(&formats).unwrap();
        let change_set = change_set(Some("http://x/issues/42"));

        assert_eq!(renderer.render_title(&change_set).unwrap(), "[#42] Add retry");
        let body = renderer.render_body(&change_set, &["u1", "u2"]).unwrap();
        assert_eq!(body, "# [#42] Add retry\n\nCloses http://x/issues/42\n\nSiblings: u1 u2 \n");
    }

    #[test]
    fn unknown_variable_fails_in_strict_mode() {
        let formats = SectionFormats {
            title_format: "{{nope}}".to_string(),
            ..SectionFormats::default()
        };
        let renderer = TemplateRenderer::with_formats(&formats).unwrap();
        assert!(matches!(
            renderer.render_title(&change_set(None)),
            Err(TemplateError::RenderError(_))
        ));
    }

    #[test]
    fn malformed_format_fails_registration() {
        let formats = SectionFormats {
            fixes_format: "{{#if ticket}}unterminated".to_string(),
            ..SectionFormats::default()
        };
        assert!(matches!(
            TemplateRenderer::with_formats(&formats),
            Err(TemplateError::RegistrationError(_))
        ));
    }
}
