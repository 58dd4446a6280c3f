use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

pub const PREVIEW_CHARS: usize = 1000;

// Create static selectors to avoid recompiling them each time
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title").expect("Failed to parse title selector")
});

static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Failed to parse body selector")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub title: String,
    /// Size of the fetched HTML in bytes.
    pub length: usize,
    pub preview: String,
    /// Text of every element matching each schema tag.
    pub schema_data: BTreeMap<String, Vec<String>>,
}

pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchError(format!(
            "{} returned HTTP {}",
            url,
            status.as_u16()
        )));
    }
    let html = response.text().await?;
    debug!(url, bytes = html.len(), "Fetched page");
    Ok(html)
}

pub fn inspect_html(html: &str, schema: Option<&[String]>) -> PageSummary {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    let text = match document.select(&BODY_SELECTOR).next() {
        Some(body) => body.text().collect::<String>(),
        None => document.root_element().text().collect::<String>(),
    };
    let preview = format_text(&text).chars().take(PREVIEW_CHARS).collect();

    let mut schema_data = BTreeMap::new();
    for tag in schema.unwrap_or_default() {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let selector = match Selector::parse(tag) {
            Ok(selector) => selector,
            Err(err) => {
                warn!(tag, "Skipping schema tag that is not a valid selector: {}", err);
                continue;
            }
        };
        let texts = document.select(&selector).map(stripped_text).collect();
        schema_data.insert(tag.to_string(), texts);
    }

    PageSummary {
        title,
        length: html.len(),
        preview,
        schema_data,
    }
}

/// Concatenates an element's text nodes with surrounding whitespace removed.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Trims every line and drops the blank ones.
pub fn format_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last_was_whitespace = true;

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if !last_was_whitespace {
                result.push('\n');
            }
            result.push_str(trimmed);
            last_was_whitespace = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
        <head><title> Projects </title></head>
        <body>
            <h1>Portfolio</h1>
            <div class="card"><h2>Crawler</h2><p>Fast  </p></div>
            <div class="card"><h2>Parser</h2></div>
            <img src="a.png">
        </body>
    </html>"#;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_title_and_preview() {
        let summary = inspect_html(PAGE, None);
        assert_eq!(summary.title, "Projects");
        assert_eq!(summary.length, PAGE.len());
        assert!(summary.preview.starts_with("Portfolio"));
        assert!(summary.schema_data.is_empty());
    }

    #[test]
    fn missing_title_uses_fallback() {
        let summary = inspect_html("<html><body><p>hi</p></body></html>", None);
        assert_eq!(summary.title, "No title");
        assert_eq!(summary.preview, "hi");
    }

    #[test]
    fn preview_is_capped() {
        let html = format!("<html><body><p>{}</p></body></html>", "x".repeat(5000));
        let summary = inspect_html(&html, None);
        assert_eq!(summary.preview.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn schema_tags_collect_matching_text() {
        let schema = tags(&["h1", " div ", "", "img", "table"]);
        let summary = inspect_html(PAGE, Some(&schema));

        assert_eq!(summary.schema_data["h1"], vec!["Portfolio".to_string()]);
        assert_eq!(
            summary.schema_data["div"],
            vec!["CrawlerFast".to_string(), "Parser".to_string()]
        );
        assert_eq!(summary.schema_data["img"], vec![String::new()]);
        assert!(summary.schema_data["table"].is_empty());
        assert_eq!(summary.schema_data.len(), 4);
    }

    #[test]
    fn invalid_selectors_are_skipped() {
        let schema = tags(&["h1", "<<"]);
        let summary = inspect_html(PAGE, Some(&schema));
        assert_eq!(summary.schema_data.len(), 1);
    }

    #[test]
    fn format_text_drops_blank_lines() {
        assert_eq!(format_text("\n  a  \n\n   \n b\n"), "a\nb");
    }
}
