use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::{CompletionClient, GenerateError};
use crate::config::{BackendSettings, Provider};

mod models;

/// `CompletionClient` over a provider's HTTP API.
pub struct HttpCompletion {
    provider: Provider,
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpCompletion {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let api_key = settings.resolved_api_key();
        if api_key.is_none() && settings.provider.requires_api_key() {
            return Err(anyhow!(
                "{} needs an API key (backend.api_key or backend.api_key_env)",
                settings.provider.display_name()
            ));
        }
        let model = settings
            .model
            .clone()
            .or_else(|| settings.provider.default_model().map(String::from))
            .ok_or_else(|| anyhow!("no model configured for {}", settings.provider.display_name()))?;
        let base_url = match &settings.base_url {
            Some(url) => url.clone(),
            None => default_base_url(settings.provider, &model)?,
        };
        Ok(Self {
            provider: settings.provider,
            base_url,
            model,
            api_key,
            client: Client::new(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, GenerateError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match (&self.api_key, self.provider) {
            // Gemini takes the key as a query parameter.
            (Some(_), Provider::Gemini) | (None, _) => {}
            (Some(key), _) => {
                let value = HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|err| GenerateError::NotConfigured(format!("invalid api key: {err}")))?;
                headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, GenerateError> {
        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, GenerateError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status {
                provider: self.provider.display_name().to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| {
            GenerateError::Malformed(format!(
                "unexpected {} payload: {err}",
                self.provider.display_name()
            ))
        })
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String, GenerateError> {
        use models::{OpenAiChatPayload, OpenAiChatResponse, OpenAiMessage};

        let payload = OpenAiChatPayload {
            model: &self.model,
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: system,
                },
                OpenAiMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: Some(serde_json::json!({ "type": "json_object" })),
        };
        let data: OpenAiChatResponse = self.post_json(&self.base_url, &payload).await?;
        data.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| GenerateError::Malformed("OpenAI reply has no content".into()))
    }

    async fn complete_gemini(&self, system: &str, user: &str) -> Result<String, GenerateError> {
        use models::{GeminiContent, GeminiGenerationConfig, GeminiPart, GeminiPayload, GeminiResponse};

        let payload = GeminiPayload {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: user }],
            }],
            system_instruction: Some(GeminiContent {
                role: "system",
                parts: vec![GeminiPart { text: system }],
            }),
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
            },
        };
        let mut url = self.base_url.clone();
        if let Some(key) = &self.api_key {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str("key=");
            url.push_str(key);
        }
        let data: GeminiResponse = self.post_json(&url, &payload).await?;
        data.candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .find_map(|part| part.text)
            .ok_or_else(|| GenerateError::Malformed("Gemini reply has no text".into()))
    }

    async fn complete_ollama(&self, system: &str, user: &str) -> Result<String, GenerateError> {
        use models::{OllamaPayload, OllamaResponse};

        let payload = OllamaPayload {
            model: &self.model,
            prompt: user,
            system,
            format: "json",
            stream: false,
        };
        let data: OllamaResponse = self.post_json(&self.base_url, &payload).await?;
        if data.response.trim().is_empty() {
            return Err(GenerateError::Malformed("Ollama reply is empty".into()));
        }
        Ok(data.response)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletion {
    fn name(&self) -> &str {
        self.provider.display_name()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerateError> {
        debug!("{} completion via {}", self.provider.display_name(), self.model);
        match self.provider {
            Provider::OpenAi => self.complete_openai(system, user).await,
            Provider::Gemini => self.complete_gemini(system, user).await,
            Provider::Ollama => self.complete_ollama(system, user).await,
            Provider::Offline | Provider::Custom => Err(GenerateError::NotConfigured(format!(
                "{} has no completion API",
                self.provider.display_name()
            ))),
        }
    }
}

fn default_base_url(provider: Provider, model: &str) -> Result<String> {
    Ok(match provider {
        Provider::OpenAi => "https://api.openai.com/v1/chat/completions".into(),
        Provider::Gemini => format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
        ),
        Provider::Ollama => "http://localhost:11434/api/generate".into(),
        Provider::Offline | Provider::Custom => {
            return Err(anyhow!(
                "{} needs backend.base_url",
                provider.display_name()
            ));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: Provider) -> BackendSettings {
        BackendSettings {
            provider,
            api_key: Some("secret".into()),
            ..BackendSettings::default()
        }
    }

    #[test]
    fn defaults_follow_provider() {
        let gemini = HttpCompletion::new(&settings(Provider::Gemini)).unwrap();
        assert_eq!(
            gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(gemini.name(), "Gemini");

        let ollama = HttpCompletion::new(&BackendSettings {
            provider: Provider::Ollama,
            ..BackendSettings::default()
        })
        .unwrap();
        assert_eq!(ollama.base_url, "http://localhost:11434/api/generate");
        assert_eq!(ollama.model, "llama3.1");
    }

    #[test]
    fn bearer_header_only_for_non_gemini() {
        let openai = HttpCompletion::new(&settings(Provider::OpenAi)).unwrap();
        let headers = openai.headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");

        let gemini = HttpCompletion::new(&settings(Provider::Gemini)).unwrap();
        assert!(gemini.headers().unwrap().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn explicit_base_url_wins() {
        let mut config = settings(Provider::OpenAi);
        config.base_url = Some("http://localhost:8000/v1/chat/completions".into());
        config.model = Some("local".into());
        let client = HttpCompletion::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000/v1/chat/completions");
        assert_eq!(client.model, "local");
    }
}
