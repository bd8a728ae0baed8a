//! Tavily-backed product search.
//!
//! Builds a web-search query from the conversation engine's extracted
//! intent, runs it through the Tavily search API, fills in snippet-less
//! hits via the Firecrawl scrape API, and renders the result as the HTML
//! payload the client displays.

use super::ProductSearchEngine;
use crate::config::SearchConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s?\d+(?:,\d{3})*(?:\.\d{2})?").expect("price pattern compiles"));

/// Snippets longer than this are cut when rendering.
const SNIPPET_MAX_LEN: usize = 300;

pub struct TavilySearchEngine {
    client: Client,
    api_key: String,
    firecrawl_api_key: String,
    config: SearchConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    data: ScrapeData,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: String,
}

impl TavilySearchEngine {
    pub fn new(
        api_key: impl Into<String>,
        firecrawl_api_key: impl Into<String>,
        config: SearchConfig,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            firecrawl_api_key: firecrawl_api_key.into(),
            config,
        }
    }

    /// Best-effort page scrape for hits whose search snippet came back empty.
    async fn scrape(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/scrape", self.config.firecrawl_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.firecrawl_api_key),
            )
            .json(&json!({"url": url, "formats": ["markdown"]}))
            .send()
            .await
            .context("scrape request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("scrape API error {}", status);
        }

        let scraped: ScrapeResponse = response
            .json()
            .await
            .context("scrape response decode failed")?;
        Ok(scraped.data.markdown)
    }
}

#[async_trait]
impl ProductSearchEngine for TavilySearchEngine {
    async fn search(&self, intent: &Value) -> Result<String> {
        let query = build_query(intent);
        tracing::info!("[Search] Running product search: {}", query);

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.config.max_results,
        });

        let response = self
            .client
            .post(format!("{}/search", self.config.tavily_url))
            .json(&body)
            .send()
            .await
            .context("search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("search API error {}: {}", status, error_text);
        }

        let mut search: SearchResponse = response
            .json()
            .await
            .context("search response decode failed")?;

        for hit in search
            .results
            .iter_mut()
            .filter(|hit| hit.content.trim().is_empty())
        {
            match self.scrape(&hit.url).await {
                Ok(markdown) => hit.content = markdown,
                Err(e) => tracing::debug!("[Search] Scrape of {} failed: {}", hit.url, e),
            }
        }

        Ok(render_html(&query, &search.results))
    }
}

/// Assemble a search query from the extracted intent. The `item` field
/// leads; every other scalar field is appended as a readable constraint.
fn build_query(intent: &Value) -> String {
    let mut parts = Vec::new();

    if let Some(item) = intent.get("item").and_then(Value::as_str) {
        parts.push(format!("buy {}", item));
    }

    if let Some(fields) = intent.as_object() {
        for (key, value) in fields {
            if key == "item" {
                continue;
            }
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            parts.push(format!("{} {}", key.replace('_', " "), rendered));
        }
    }

    if parts.is_empty() {
        intent.to_string()
    } else {
        parts.join(" ")
    }
}

fn render_html(query: &str, hits: &[SearchHit]) -> String {
    let mut html = String::from("<div class=\"product-results\">\n");
    html.push_str(&format!(
        "  <p class=\"query\">Results for: {}</p>\n",
        escape(query)
    ));

    if hits.is_empty() {
        html.push_str("  <p class=\"empty\">No products found.</p>\n");
    }

    for hit in hits {
        let snippet: String = hit.content.chars().take(SNIPPET_MAX_LEN).collect();
        let price = PRICE_RE
            .find(&hit.content)
            .map(|m| format!("<span class=\"price\">{}</span>", escape(m.as_str())))
            .unwrap_or_default();

        html.push_str(&format!(
            "  <div class=\"product\">\n    <a href=\"{}\">{}</a>\n    {}\n    <p>{}</p>\n  </div>\n",
            escape(&hit.url),
            escape(&hit.title),
            price,
            escape(&snippet)
        ));
    }

    html.push_str("</div>");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
