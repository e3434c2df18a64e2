use serde::{Deserialize, Serialize};

use super::PENDING;

/// The literature-search pipelines the E-utilities front end understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    #[serde(rename = "ESearch-ESummary")]
    SearchSummary,
    #[serde(rename = "EPost-ESummary")]
    PostSummary,
    #[serde(rename = "ELink-ESummary")]
    LinkSummary,
    #[serde(rename = "ESearch-ELink-ESummary")]
    SearchLinkSummary,
    #[serde(rename = "EPost-ELink-ESummary")]
    PostLinkSummary,
    #[serde(rename = "Application 1")]
    Application1,
    #[serde(rename = "Application 2")]
    Application2,
    #[serde(rename = "Application 3")]
    Application3,
    #[serde(rename = "Application 4")]
    Application4,
}

impl ApplicationType {
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationType::SearchSummary => "ESearch-ESummary",
            ApplicationType::PostSummary => "EPost-ESummary",
            ApplicationType::LinkSummary => "ELink-ESummary",
            ApplicationType::SearchLinkSummary => "ESearch-ELink-ESummary",
            ApplicationType::PostLinkSummary => "EPost-ELink-ESummary",
            ApplicationType::Application1 => "Application 1",
            ApplicationType::Application2 => "Application 2",
            ApplicationType::Application3 => "Application 3",
            ApplicationType::Application4 => "Application 4",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EUtilsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gi_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EUtilsInput {
    pub application_type: ApplicationType,
    #[serde(default)]
    pub input_data: EUtilsData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EUtilsOutput {
    pub result: String,
}

pub async fn e_utilities_applications(input: EUtilsInput) -> EUtilsOutput {
    let data = &input.input_data;
    let mut parts = Vec::new();
    if let Some(query) = &data.query {
        parts.push(format!("query \"{query}\""));
    }
    for (label, list) in [("ids", &data.id_list), ("GIs", &data.gi_list), ("accessions", &data.acc_list)] {
        if let Some(list) = list {
            parts.push(format!("{} {label}", list.len()));
        }
    }
    let scope = if parts.is_empty() {
        String::new()
    } else {
        format!(" with {}", parts.join(", "))
    };
    EUtilsOutput {
        result: format!("{}{scope}. {PENDING}", input.application_type.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_type_uses_pipeline_names() {
        let input: EUtilsInput = serde_json::from_str(
            r#"{"application_type": "ESearch-ELink-ESummary", "input_data": {"query": "ckd"}}"#,
        )
        .unwrap();
        assert_eq!(input.application_type, ApplicationType::SearchLinkSummary);
        assert!(serde_json::from_str::<ApplicationType>("\"Application 5\"").is_err());
    }

    #[tokio::test]
    async fn placeholder_summarises_inputs() {
        let output = e_utilities_applications(EUtilsInput {
            application_type: ApplicationType::PostSummary,
            input_data: EUtilsData {
                id_list: Some(vec!["1".into(), "2".into()]),
                ..EUtilsData::default()
            },
        })
        .await;
        assert_eq!(output.result, "EPost-ESummary with 2 ids. Implementation pending.");
    }
}
