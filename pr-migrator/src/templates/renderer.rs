//! Template renderer.

use super::{TemplateError, COMMENT_BODY, PLACEHOLDER, PULL_BODY};
use crate::config::TemplateOverrides;
use crate::platform::ItemKind;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::json;

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (bodies are markdown)
/// - Strict mode (catches unknown variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_helper("eq", Box::new(eq_helper));
    hbs
}

/// Equality comparison of two strings.
///
/// Usage: `{{#if (eq kind "issue")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = matches!((param1, param2), (Some(a), Some(b)) if a == b);
    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// The original an attributed body points back to.
#[derive(Debug, Clone, Copy)]
pub struct Attribution<'a> {
    /// Number on the source instance.
    pub number: u64,
    /// Link to the original.
    pub html_url: &'a str,
    /// Suffixed login of the original author.
    pub author: &'a str,
    /// Original body, empty when there was none.
    pub body: &'a str,
}

/// Renders pull request, issue, comment and placeholder bodies.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl TemplateRenderer {
    /// Creates a renderer with the built-in templates.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in templates; the signature matches
    /// [`TemplateRenderer::with_overrides`].
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_overrides(&TemplateOverrides::default())
    }

    /// Creates a renderer, replacing built-in templates with the given overrides.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Registration`] if a template does not compile.
    pub fn with_overrides(overrides: &TemplateOverrides) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        let templates = [
            (PULL_BODY, overrides.pull_body.as_deref(), DEFAULT_PULL_BODY),
            (
                COMMENT_BODY,
                overrides.comment_body.as_deref(),
                DEFAULT_COMMENT_BODY,
            ),
            (
                PLACEHOLDER,
                overrides.placeholder.as_deref(),
                DEFAULT_PLACEHOLDER,
            ),
        ];

        for (name, custom, default) in templates {
            handlebars
                .register_template_string(name, custom.unwrap_or(default))
                .map_err(|source| TemplateError::Registration { name, source })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders the body of a replayed pull request or issue.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_item_body(
        &self,
        kind: ItemKind,
        original: &Attribution<'_>,
    ) -> Result<String, TemplateError> {
        let kind = match kind {
            ItemKind::PullRequest => "pull request",
            ItemKind::Issue => "issue",
        };
        let data = json!({
            "kind": kind,
            "number": original.number,
            "html_url": original.html_url,
            "author": original.author,
            "body": original.body,
        });
        Ok(self.handlebars.render(PULL_BODY, &data)?)
    }

    /// Renders the body of a replayed comment.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_comment_body(&self, original: &Attribution<'_>) -> Result<String, TemplateError> {
        let data = json!({
            "html_url": original.html_url,
            "author": original.author,
            "body": original.body,
        });
        Ok(self.handlebars.render(COMMENT_BODY, &data)?)
    }

    /// Renders the contents of the placeholder file committed to a
    /// synthetic branch.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_placeholder(
        &self,
        number: u64,
        html_url: &str,
        branch: &str,
    ) -> Result<String, TemplateError> {
        let data = json!({
            "number": number,
            "html_url": html_url,
            "branch": branch,
        });
        Ok(self.handlebars.render(PLACEHOLDER, &data)?)
    }
}

const DEFAULT_PULL_BODY: &str = r#"## :point_right: Substitute {{#if (eq kind "issue")}}issue{{else}}PR{{/if}} for [#{{number}}]({{html_url}}) from @{{author}} :point_left:

*Please see the [original {{kind}} #{{number}}]({{html_url}}) for a full history.*

### Original {{kind}} body :point_down:
{{body}}"#;

const DEFAULT_COMMENT_BODY: &str = r"### :point_right: Substitute comment for [original]({{html_url}}) from @{{author}} :point_left:

This comment was migrated by pr-migrator.

### Original comment :point_down:
{{body}}";

const DEFAULT_PLACEHOLDER: &str = r"This is a _placeholder commit_ on `{{branch}}` constructed by pr-migrator.

*Please see the [original pull request #{{number}}]({{html_url}}) for a full history.*";
