use serde::{Deserialize, Serialize};

use super::PENDING;

const DEFAULT_LIMIT: u32 = 10;

/// Search criteria for the provider registry. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpiSearchInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_description: Option<String>,
    #[serde(rename = "_limit", default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpiResult {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpiSearchOutput {
    pub results: Vec<NpiResult>,
}

impl NpiSearchInput {
    /// `field=value` pairs of the criteria that were supplied.
    fn criteria(&self) -> Vec<String> {
        [
            ("number", &self.number),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("city", &self.city),
            ("state", &self.state),
            ("taxonomy_description", &self.taxonomy_description),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| format!("{key}={value}")))
        .collect()
    }
}

pub async fn search_npi_registry(input: NpiSearchInput) -> NpiSearchOutput {
    let criteria = input.criteria();
    let described = if criteria.is_empty() {
        String::from("no criteria")
    } else {
        criteria.join(", ")
    };
    NpiSearchOutput {
        results: vec![NpiResult {
            message: format!(
                "NPI registry search ({described}, limit {}). {PENDING}",
                input.limit
            ),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_to_ten() {
        let input: NpiSearchInput = serde_json::from_str(r#"{"last_name": "Smith"}"#).unwrap();
        assert_eq!(input.limit, 10);
        let input: NpiSearchInput = serde_json::from_str(r#"{"_limit": 3}"#).unwrap();
        assert_eq!(input.limit, 3);
    }

    #[tokio::test]
    async fn placeholder_lists_supplied_criteria() {
        let output = search_npi_registry(NpiSearchInput {
            city: Some("Denver".into()),
            state: Some("CO".into()),
            limit: 5,
            ..NpiSearchInput::default()
        })
        .await;
        let message = &output.results[0].message;
        assert!(message.contains("city=Denver, state=CO"));
        assert!(message.contains("limit 5"));
        assert!(message.ends_with(PENDING));
    }
}
