//! Typed lookup tools and the registry that dispatches to them by name.

/// Drug label lookups.
pub mod fda;
/// Provider registry search.
pub mod npi;
/// Literature search pipelines.
pub mod eutils;
/// Brave web search and summariser.
pub mod search;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use self::fda::LabelSection;
use self::search::BraveSearch;

/// Suffix of every answer from a lookup that has no live data source yet.
pub const PENDING: &str = "Implementation pending.";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("invalid input for `{tool}`: {source}")]
    InvalidInput {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode output of `{tool}`: {source}")]
    Output {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A registry entry as listed in the Tools panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
}

impl ToolSpec {
    fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    search: BraveSearch,
}

impl ToolRegistry {
    pub fn new(search: BraveSearch) -> Self {
        let mut specs = vec![
            ToolSpec::new("searchDrugLabel", "Searches drug labels by drug name, optionally limited to sections."),
            ToolSpec::new("searchAdverseEffects", "Lists reported adverse effects for a drug."),
            ToolSpec::new("getSpecialPopulations", "Pregnancy, pediatric and geriatric information for a drug."),
            ToolSpec::new("getBoxedWarning", "Retrieves the boxed warning of a drug label."),
            ToolSpec::new("getDrugInteractions", "Retrieves known drug interactions."),
        ];
        specs.extend(
            LabelSection::ALL
                .iter()
                .map(|section| ToolSpec::new(section.tool_name(), section.description())),
        );
        specs.extend([
            ToolSpec::new("searchNPIRegistry", "Searches the national provider registry."),
            ToolSpec::new("e_utilities_applications", "Runs a literature search pipeline."),
            ToolSpec::new("braveWebSearch", "Searches the web."),
            ToolSpec::new("braveSummarize", "Summarises web results from a summarizer key."),
        ]);
        Self { specs, search }
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn search(&self) -> &BraveSearch {
        &self.search
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|spec| spec.name == name)
    }

    /// Runs a tool and always answers with JSON; failures become `{"error": ...}`.
    pub async fn invoke(&self, name: &str, input: Value) -> Value {
        match self.dispatch(name, input).await {
            Ok(output) => output,
            Err(err) => {
                warn!("tool invocation failed: {err}");
                json!({ "error": err.to_string() })
            }
        }
    }

    pub async fn dispatch(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        debug!("invoking tool {name}");
        match name {
            "searchDrugLabel" => encode(name, fda::search_drug_label(decode(name, input)?).await),
            "searchAdverseEffects" => {
                encode(name, fda::search_adverse_effects(decode(name, input)?).await)
            }
            "getSpecialPopulations" => {
                encode(name, fda::get_special_populations(decode(name, input)?).await)
            }
            "getBoxedWarning" => encode(name, fda::get_boxed_warning(decode(name, input)?).await),
            "getDrugInteractions" => {
                encode(name, fda::get_drug_interactions(decode(name, input)?).await)
            }
            "searchNPIRegistry" => encode(name, npi::search_npi_registry(decode(name, input)?).await),
            "e_utilities_applications" => {
                encode(name, eutils::e_utilities_applications(decode(name, input)?).await)
            }
            "braveWebSearch" => encode(name, self.search.web_search(decode(name, input)?).await),
            "braveSummarize" => encode(name, self.search.summarize(decode(name, input)?).await),
            other => match LabelSection::from_tool_name(other) {
                Some(section) => {
                    encode(name, fda::get_label_section(section, decode(name, input)?).await)
                }
                None => Err(ToolError::UnknownTool(other.to_string())),
            },
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|source| ToolError::InvalidInput {
        tool: tool.to_string(),
        source,
    })
}

fn encode<T: Serialize>(tool: &str, output: T) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(|source| ToolError::Output {
        tool: tool.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSettings;

    fn registry() -> ToolRegistry {
        let settings = SearchSettings {
            api_key: None,
            api_key_env: None,
            ..SearchSettings::default()
        };
        ToolRegistry::new(BraveSearch::new(&settings))
    }

    #[test]
    fn lists_every_tool_once() {
        let registry = registry();
        assert_eq!(registry.specs().len(), 5 + LabelSection::ALL.len() + 4);
        assert!(registry.contains("getAbuseTable"));
        assert!(registry.contains("searchNPIRegistry"));
        assert!(!registry.contains("getEverything"));
    }

    #[tokio::test]
    async fn dispatches_typed_placeholder() {
        let output = registry()
            .invoke("getBoxedWarning", json!({ "drugName": "isotretinoin" }))
            .await;
        let text = output["boxedWarning"].as_str().unwrap();
        assert!(text.contains("isotretinoin"));
        assert!(text.ends_with(PENDING));
    }

    #[tokio::test]
    async fn malformed_input_becomes_error_value() {
        let registry = registry();
        let output = registry.invoke("searchDrugLabel", json!({ "name": 3 })).await;
        assert!(output["error"].as_str().unwrap().contains("searchDrugLabel"));

        let err = registry.dispatch("searchDrugLabel", json!([])).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let output = registry().invoke("launchRocket", json!({})).await;
        assert_eq!(output["error"], "unknown tool `launchRocket`");
    }

    #[tokio::test]
    async fn web_search_without_key_answers_with_error_field() {
        let output = registry()
            .invoke("braveWebSearch", json!({ "query": "egfr formula" }))
            .await;
        assert_eq!(output["results"], json!([]));
        assert!(output["error"].as_str().unwrap().contains("not configured"));
    }
}
