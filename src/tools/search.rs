//! Web search and summarisation over the Brave Search API.
//!
//! Failures never surface as `Err`: a missing key, a transport error or an
//! unexpected payload is reported in the output's `error` field so callers
//! can keep going with partial results.

use log::{debug, warn};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SearchSettings;

const SUBSCRIPTION_HEADER: &str = "x-subscription-token";
const API_VERSION_HEADER: &str = "api-version";
const API_VERSION: &str = "2024-04-23";
const MISSING_KEY: &str = "Brave Search API key is not configured.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchInput {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSearchOutput {
    pub results: Vec<SearchResult>,
    /// Key for the summariser when the search produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarizer_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebSearchOutput {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeInput {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeOutput {
    pub title: String,
    pub summary: String,
    pub context_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummarizeOutput {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

// --- Brave payloads ---

#[derive(Deserialize, Default)]
struct BraveSearchResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
    #[serde(default)]
    summarizer: Option<BraveSummarizerRef>,
}

#[derive(Deserialize, Default)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Deserialize)]
struct BraveWebResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct BraveSummarizerRef {
    key: String,
}

#[derive(Deserialize)]
struct BraveSummaryResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<Value>,
    #[serde(default)]
    context: Option<Vec<BraveContextSource>>,
}

#[derive(Deserialize)]
struct BraveContextSource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Brave Search client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BraveSearch {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    summarizer_endpoint: String,
}

impl BraveSearch {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.resolved_api_key(),
            endpoint: settings.endpoint.clone(),
            summarizer_endpoint: settings.summarizer_endpoint.clone(),
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        let token = HeaderValue::from_str(api_key)
            .map_err(|err| format!("invalid Brave Search API key: {err}"))?;
        headers.insert(SUBSCRIPTION_HEADER, token);
        Ok(headers)
    }

    pub async fn web_search(&self, input: WebSearchInput) -> WebSearchOutput {
        let Some(api_key) = self.api_key.as_deref() else {
            return WebSearchOutput::failed(MISSING_KEY);
        };
        let headers = match self.headers(api_key) {
            Ok(headers) => headers,
            Err(message) => return WebSearchOutput::failed(message),
        };
        let mut query = vec![
            ("q", input.query.clone()),
            ("summary", String::from("1")),
        ];
        if let Some(count) = input.count {
            query.push(("count", count.to_string()));
        }

        debug!("web search: {}", input.query);
        let response = match self
            .client
            .get(&self.endpoint)
            .headers(headers)
            .query(&query)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("web search request failed: {err}");
                return WebSearchOutput::failed(format!("Web search request failed: {err}"));
            }
        };
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return WebSearchOutput::failed(format!("Web search returned {status}: {body}"));
        }
        match response.json::<BraveSearchResponse>().await {
            Ok(payload) => parse_search(payload),
            Err(err) => WebSearchOutput::failed(format!("Unexpected web search payload: {err}")),
        }
    }

    pub async fn summarize(&self, input: SummarizeInput) -> SummarizeOutput {
        let Some(api_key) = self.api_key.as_deref() else {
            return SummarizeOutput::failed(MISSING_KEY);
        };
        let headers = match self.headers(api_key) {
            Ok(headers) => headers,
            Err(message) => return SummarizeOutput::failed(message),
        };
        let response = match self
            .client
            .get(&self.summarizer_endpoint)
            .headers(headers)
            .query(&[("key", input.key.as_str()), ("entity_info", "1")])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("summarizer request failed: {err}");
                return SummarizeOutput::failed(format!("Summarizer request failed: {err}"));
            }
        };
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return SummarizeOutput::failed(format!("Summarizer returned {status}: {body}"));
        }
        match response.json::<BraveSummaryResponse>().await {
            Ok(payload) => parse_summary(payload),
            Err(err) => SummarizeOutput::failed(format!("Unexpected summarizer payload: {err}")),
        }
    }
}

fn parse_search(payload: BraveSearchResponse) -> WebSearchOutput {
    let results = payload
        .web
        .unwrap_or_default()
        .results
        .into_iter()
        .map(|item| SearchResult {
            title: item.title,
            link: item.url,
            snippet: item.description,
        })
        .collect();
    WebSearchOutput {
        results,
        summarizer_key: payload.summarizer.map(|summary| summary.key),
        error: None,
    }
}

fn parse_summary(payload: BraveSummaryResponse) -> SummarizeOutput {
    if payload.status != "complete" {
        return SummarizeOutput::failed(format!(
            "Summary is not ready (status: {})",
            if payload.status.is_empty() { "unknown" } else { payload.status.as_str() }
        ));
    }
    let summary = match payload.summary {
        Some(Value::String(text)) => text,
        // The API returns a list of message parts: [{ "type": "token", "data": "..." }].
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text.as_str()),
                other => other.get("data").and_then(Value::as_str),
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };
    let context_sources = payload
        .context
        .unwrap_or_default()
        .into_iter()
        .filter_map(|source| source.url.or(source.title))
        .collect();
    SummarizeOutput {
        title: payload.title.unwrap_or_default(),
        summary,
        context_sources,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyless() -> BraveSearch {
        let settings = SearchSettings {
            api_key: None,
            api_key_env: None,
            ..SearchSettings::default()
        };
        BraveSearch::new(&settings)
    }

    #[tokio::test]
    async fn missing_key_is_reported_in_output() {
        let search = keyless();
        assert!(!search.has_key());
        let output = search
            .web_search(WebSearchInput {
                query: "ckd staging".into(),
                count: None,
            })
            .await;
        assert!(output.results.is_empty());
        assert_eq!(output.error.as_deref(), Some(MISSING_KEY));

        let summary = search.summarize(SummarizeInput { key: "k".into() }).await;
        assert_eq!(summary.error.as_deref(), Some(MISSING_KEY));
    }

    #[test]
    fn search_payload_maps_results_and_summarizer_key() {
        let payload: BraveSearchResponse = serde_json::from_str(
            r#"{
                "web": {"results": [
                    {"title": "KDIGO", "url": "https://kdigo.org", "description": "Guidelines"},
                    {"url": "https://example.org"}
                ]},
                "summarizer": {"key": "abc"}
            }"#,
        )
        .unwrap();
        let output = parse_search(payload);
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.results[0].link, "https://kdigo.org");
        assert_eq!(output.results[1].snippet, None);
        assert_eq!(output.summarizer_key.as_deref(), Some("abc"));
    }

    #[test]
    fn incomplete_summary_is_an_error() {
        let payload: BraveSummaryResponse =
            serde_json::from_str(r#"{"status": "failed"}"#).unwrap();
        let output = parse_summary(payload);
        assert!(output.error.unwrap().contains("failed"));
    }

    #[test]
    fn summary_parts_are_joined() {
        let payload: BraveSummaryResponse = serde_json::from_str(
            r#"{
                "status": "complete",
                "title": "GFR",
                "summary": [{"type": "token", "data": "Kidney "}, {"type": "token", "data": "function"}],
                "context": [{"title": "A", "url": "https://a.example"}, {"title": "B"}]
            }"#,
        )
        .unwrap();
        let output = parse_summary(payload);
        assert_eq!(output.summary, "Kidney function");
        assert_eq!(output.context_sources, vec!["https://a.example", "B"]);
        assert!(output.error.is_none());
    }
}
