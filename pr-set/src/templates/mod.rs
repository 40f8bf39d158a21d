//! Pull request titles and descriptions.
//!
//! Body templates are plain Markdown containing the literal placeholders
//! `$TITLE`, `$FIXES` and `$MERGE_WITH`. The text substituted for each
//! placeholder is rendered from a Handlebars format (see [`SectionFormats`]).

mod body;
mod error;
mod renderer;

pub use body::{BodyTemplate, Placeholder};
pub use error::TemplateError;
pub use renderer::{
    SectionFormats, TemplateRenderer, DEFAULT_FIXES_FORMAT, DEFAULT_MERGE_WITH_FORMAT,
    DEFAULT_TITLE_FORMAT,
};

/// Body template used when none is configured.
pub const DEFAULT_BODY_TEMPLATE: &str = "$TITLE\n\n$FIXES\n\n$MERGE_WITH\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_body_template_is_valid() {
        let template = BodyTemplate::parse(DEFAULT_BODY_TEMPLATE).unwrap();
        assert_eq!(template.as_str(), DEFAULT_BODY_TEMPLATE);
    }
}
