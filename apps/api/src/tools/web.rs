//! Web access tools: page scraping and Serper search.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use scraper::{Html, Node, Selector};
use serde::Deserialize;
use serde_json::json;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Tailor/0.1)";
const SERPER_URL: &str = "https://google.serper.dev/search";
const TOOL_TIMEOUT_SECS: u64 = 30;
const MAX_SEARCH_RESULTS: usize = 5;

/// Elements whose text never reaches the reader.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

/// Fetches `url` and returns its visible text.
pub async fn scrape(http: &reqwest::Client, url: &str) -> Result<String> {
    let response = http
        .get(url)
        .header("user-agent", USER_AGENT)
        .timeout(Duration::from_secs(TOOL_TIMEOUT_SECS))
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{url} returned status {status}");
    }

    let html = response
        .text()
        .await
        .with_context(|| format!("failed to read body of {url}"))?;
    Ok(html_to_text(&html))
}

/// Reduces an HTML document to its visible text, one block of text per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").ok();
    let root = body_selector
        .as_ref()
        .and_then(|sel| document.select(sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines: Vec<String> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }

    lines.join("\n")
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, Deserialize)]
struct SerperResult {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Queries Serper and formats the top organic results.
pub async fn search(http: &reqwest::Client, api_key: &str, query: &str) -> Result<String> {
    let response = http
        .post(SERPER_URL)
        .header("X-API-KEY", api_key)
        .timeout(Duration::from_secs(TOOL_TIMEOUT_SECS))
        .json(&json!({ "q": query }))
        .send()
        .await
        .context("search request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("search provider returned status {status}");
    }

    let body: SerperResponse = response
        .json()
        .await
        .context("search provider returned malformed JSON")?;
    Ok(format_search_results(query, &body.organic))
}

fn format_search_results(query: &str, results: &[SerperResult]) -> String {
    if results.is_empty() {
        return format!("No results found for: {query}");
    }
    results
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|r| format!("- {}\n  {}\n  URL: {}", r.title, r.snippet, r.link))
        .collect::<Vec<_>>()
        .join("\n")
}
