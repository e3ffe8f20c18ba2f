// Page handlers for HTML rendering with Askama

use askama::Template;
use axum::response::Html;
use pulldown_cmark::{html, Parser};

use crate::api_server::AppError;

const SIDEBAR_MARKDOWN: &str = "\
This is my final project on bird banding dataset, I hope you can find the birds you are \
interested in and know about where to see them. Here are my data sources.

* [North American Bird Banding Program](https://www.sciencebase.gov/catalog/)
";

/// Render the sidebar markdown to HTML
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(markdown));
    out
}

// ============================================================================
// Dashboard Page
// ============================================================================

#[derive(Template)]
#[template(path = "pages/dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub heading: String,
    pub subheading: String,
    pub sidebar_html: String,
}

pub async fn dashboard_page() -> Result<Html<String>, AppError> {
    let template = DashboardTemplate {
        title: "Bird Banding Dashboard".to_string(),
        heading: "See where the birds were and where they are going!".to_string(),
        subheading: "This is a final project of University of Virginia Data Engineering Course.".to_string(),
        sidebar_html: render_markdown(SIDEBAR_MARKDOWN),
    };

    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Template error: {}", e)))
}
