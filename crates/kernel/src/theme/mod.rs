//! Theme engine and template rendering.
//!
//! Fragments (one card per listed item, form bodies) are Tera templates
//! compiled into the binary; full pages are the fragment stream wrapped in
//! the site layout.

use anyhow::{Context, Result};
use tera::Tera;

/// Embedded templates, registered under stable names.
const TEMPLATES: [(&str, &str); 8] = [
    ("layout.html", include_str!("../../templates/layout.html")),
    (
        "elements/post_card.html",
        include_str!("../../templates/elements/post_card.html"),
    ),
    (
        "elements/comment.html",
        include_str!("../../templates/elements/comment.html"),
    ),
    (
        "elements/news_card.html",
        include_str!("../../templates/elements/news_card.html"),
    ),
    (
        "elements/merch_card.html",
        include_str!("../../templates/elements/merch_card.html"),
    ),
    (
        "elements/player_card.html",
        include_str!("../../templates/elements/player_card.html"),
    ),
    (
        "elements/player_form.html",
        include_str!("../../templates/elements/player_form.html"),
    ),
    (
        "elements/match_card.html",
        include_str!("../../templates/elements/match_card.html"),
    ),
];

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine with the embedded templates.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .context("failed to register embedded templates")?;
        Self::register_filters(&mut tera);

        Ok(Self { tera })
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Filter for formatting Unix timestamps as human-readable dates
        tera.register_filter(
            "format_date",
            |value: &tera::Value, _args: &std::collections::HashMap<String, tera::Value>| {
                let timestamp = match value {
                    tera::Value::Number(n) => n.as_i64().unwrap_or(0),
                    _ => return Ok(tera::Value::String(String::new())),
                };

                let formatted = chrono::DateTime::from_timestamp(timestamp, 0)
                    .map(|dt| dt.format("%B %-d, %Y").to_string())
                    .unwrap_or_else(|| "Unknown date".to_string());

                Ok(tera::Value::String(formatted))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render a named template.
    pub fn render(&self, template: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("failed to render template {template}"))
    }

    /// Wrap rendered content in the site layout.
    pub fn render_page(&self, title: &str, content: &str) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("title", title);
        context.insert("content", content);
        context.insert("year", &chrono::Utc::now().format("%Y").to_string());
        self.render("layout.html", &context)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn all_embedded_templates_compile() {
        let theme = ThemeEngine::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(theme.tera().get_template(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn render_page_wraps_content_in_layout() {
        let theme = ThemeEngine::new().unwrap();
        let html = theme.render_page("Forum", "<p>hello</p>").unwrap();
        assert!(html.contains("<p>hello</p>"));
        assert!(html.contains("Forum"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn layout_escapes_title() {
        let theme = ThemeEngine::new().unwrap();
        let html = theme.render_page("<script>", "").unwrap();
        assert!(!html.contains("<script>"));
    }
}
