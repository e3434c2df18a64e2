use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::prompts::{sub_query_prompt, synthesis_prompt};
use super::{CompletionClient, complete_json};
use crate::tools::ToolRegistry;
use crate::tools::search::{SearchResult, SummarizeInput, SummarizeOutput, WebSearchInput, WebSearchOutput};

/// Web access used by the research flow.
#[async_trait]
pub trait ResearchTools: Send + Sync {
    async fn web_search(&self, query: &str) -> WebSearchOutput;
    async fn summarize(&self, key: &str) -> SummarizeOutput;
}

/// Research tools backed by the registry's Brave client.
pub struct RegistryResearchTools {
    registry: Arc<ToolRegistry>,
}

impl RegistryResearchTools {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ResearchTools for RegistryResearchTools {
    async fn web_search(&self, query: &str) -> WebSearchOutput {
        self.registry
            .search()
            .web_search(WebSearchInput {
                query: query.to_string(),
                count: None,
            })
            .await
    }

    async fn summarize(&self, key: &str) -> SummarizeOutput {
        self.registry
            .search()
            .summarize(SummarizeInput {
                key: key.to_string(),
            })
            .await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchReport {
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl ResearchReport {
    fn failed(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Plain-text rendering for the chat history.
    pub fn render(&self) -> String {
        let mut text = self.summary.trim().to_string();
        if !self.key_points.is_empty() {
            text.push_str("\n\nKey points:");
            for point in &self.key_points {
                text.push_str("\n• ");
                text.push_str(point);
            }
        }
        if !self.sources.is_empty() {
            text.push_str("\n\nSources:");
            for source in &self.sources {
                text.push_str("\n- ");
                text.push_str(&source.title);
                if let Some(url) = &source.url {
                    text.push_str(&format!(" ({url})"));
                }
            }
        }
        text
    }
}

/// Findings for one sub-query, as handed to the synthesis step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQueryFindings {
    pub sub_query: String,
    pub search_results: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummarizeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubQueryPlan {
    #[serde(default)]
    sub_queries: Vec<String>,
}

/// Plan sub-queries, search each, then synthesise a report.
pub struct DeepResearch {
    client: Arc<dyn CompletionClient>,
    tools: Arc<dyn ResearchTools>,
    max_sub_queries: usize,
}

impl DeepResearch {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        tools: Arc<dyn ResearchTools>,
        max_sub_queries: usize,
    ) -> Self {
        Self {
            client,
            tools,
            max_sub_queries: max_sub_queries.max(1),
        }
    }

    /// Never fails: problems end up in the report summary or in the
    /// per-sub-query errors passed to the synthesis step.
    pub async fn run(&self, query: &str) -> ResearchReport {
        let sub_queries = match self.plan(query).await {
            Ok(sub_queries) if !sub_queries.is_empty() => sub_queries,
            Ok(_) => {
                return ResearchReport::failed(
                    "Failed to generate sub-queries: the model returned none.",
                );
            }
            Err(err) => {
                warn!("sub-query planning failed: {err}");
                return ResearchReport::failed(format!("Failed to generate sub-queries: {err}"));
            }
        };
        info!("researching {} sub-queries", sub_queries.len());

        let mut findings = Vec::with_capacity(sub_queries.len());
        for sub_query in sub_queries {
            findings.push(self.investigate(sub_query).await);
        }

        let findings_json = match serde_json::to_string_pretty(&findings) {
            Ok(json) => json,
            Err(err) => return ResearchReport::failed(format!("Failed to encode findings: {err}")),
        };
        let (system, user) = synthesis_prompt(query, &findings_json);
        match complete_json::<ResearchReport>(self.client.as_ref(), &system, &user).await {
            Ok(report) => report,
            Err(err) => {
                warn!("research synthesis failed: {err}");
                ResearchReport::failed(format!("Failed to synthesise the research report: {err}"))
            }
        }
    }

    async fn plan(&self, query: &str) -> Result<Vec<String>, super::GenerateError> {
        let (system, user) = sub_query_prompt(query, self.max_sub_queries);
        let plan: SubQueryPlan = complete_json(self.client.as_ref(), &system, &user).await?;
        Ok(plan
            .sub_queries
            .into_iter()
            .map(|query| query.trim().to_string())
            .filter(|query| !query.is_empty())
            .take(self.max_sub_queries)
            .collect())
    }

    async fn investigate(&self, sub_query: String) -> SubQueryFindings {
        let mut errors = Vec::new();
        let search = self.tools.web_search(&sub_query).await;
        if let Some(err) = search.error {
            errors.push(format!("search: {err}"));
        }
        let summary = match search.summarizer_key {
            Some(key) => {
                let summary = self.tools.summarize(&key).await;
                if let Some(err) = &summary.error {
                    errors.push(format!("summarize: {err}"));
                }
                Some(summary)
            }
            None => None,
        };
        SubQueryFindings {
            sub_query,
            search_results: search.results,
            summary,
            errors,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::backend::GenerateError;
    use crate::backend::generator::tests::ScriptedClient;

    /// Returns one result per query; queries containing "fail" report an error,
    /// queries containing "sum" also yield a summarizer key.
    #[derive(Default)]
    pub struct FakeResearchTools {
        pub searched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ResearchTools for FakeResearchTools {
        async fn web_search(&self, query: &str) -> WebSearchOutput {
            self.searched.lock().unwrap().push(query.to_string());
            if query.contains("fail") {
                return WebSearchOutput {
                    error: Some("rate limited".into()),
                    ..WebSearchOutput::default()
                };
            }
            WebSearchOutput {
                results: vec![SearchResult {
                    title: format!("About {query}"),
                    link: format!("https://example.org/{query}"),
                    snippet: None,
                }],
                summarizer_key: query.contains("sum").then(|| "key-1".to_string()),
                error: None,
            }
        }

        async fn summarize(&self, key: &str) -> SummarizeOutput {
            SummarizeOutput {
                title: key.to_string(),
                summary: "summarised".into(),
                context_sources: Vec::new(),
                error: None,
            }
        }
    }

    fn research(
        replies: Vec<Result<String, GenerateError>>,
        max: usize,
    ) -> (DeepResearch, Arc<ScriptedClient>, Arc<FakeResearchTools>) {
        let client = Arc::new(ScriptedClient::new(replies));
        let tools = Arc::new(FakeResearchTools::default());
        let research = DeepResearch::new(client.clone(), tools.clone(), max);
        (research, client, tools)
    }

    #[tokio::test]
    async fn collects_errors_and_synthesises() {
        let (research, client, tools) = research(
            vec![
                Ok(r#"{"subQueries": ["egfr sum", "fail here", "  "]}"#.into()),
                Ok(r#"{"summary": "Done", "keyPoints": ["k"], "sources": [{"title": "T", "url": "https://t"}]}"#.into()),
            ],
            10,
        );
        let report = research.run("kidney staging").await;
        assert_eq!(report.summary, "Done");
        assert_eq!(report.render(), "Done\n\nKey points:\n• k\n\nSources:\n- T (https://t)");
        assert_eq!(*tools.searched.lock().unwrap(), vec!["egfr sum", "fail here"]);

        let prompts = client.prompts.lock().unwrap();
        let (_, synthesis_input) = &prompts[1];
        assert!(synthesis_input.contains("search: rate limited"));
        assert!(synthesis_input.contains("summarised"));
    }

    #[tokio::test]
    async fn caps_sub_queries() {
        let (research, _, tools) = research(
            vec![
                Ok(r#"{"subQueries": ["a", "b", "c", "d"]}"#.into()),
                Ok(r#"{"summary": "ok"}"#.into()),
            ],
            2,
        );
        research.run("q").await;
        assert_eq!(tools.searched.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn planning_failure_is_reported_in_summary() {
        let (research, _, tools) = research(vec![Ok("no json here".into())], 10);
        let report = research.run("q").await;
        assert!(report.summary.starts_with("Failed to generate sub-queries"));
        assert!(tools.searched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn synthesis_failure_is_reported_in_summary() {
        let (research, _, _) = research(vec![Ok(r#"{"subQueries": ["a"]}"#.into())], 10);
        let report = research.run("q").await;
        assert!(report.summary.starts_with("Failed to synthesise"));
    }
}
