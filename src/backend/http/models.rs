//! Request and response bodies of the supported model providers.

// --- OpenAI-compatible chat completions ---
#[derive(serde::Serialize)]
pub struct OpenAiMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(serde::Serialize)]
pub struct OpenAiChatPayload<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
}

#[derive(serde::Deserialize)]
pub struct OpenAiChatResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChatChoice>,
}

#[derive(serde::Deserialize)]
pub struct OpenAiChatChoice {
    pub message: OpenAiChatMessage,
}

#[derive(serde::Deserialize)]
pub struct OpenAiChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// --- Gemini generateContent ---
#[derive(serde::Serialize)]
pub struct GeminiPart<'a> {
    pub text: &'a str,
}

#[derive(serde::Serialize)]
pub struct GeminiContent<'a> {
    pub role: &'a str,
    pub parts: Vec<GeminiPart<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig<'a> {
    pub response_mime_type: &'a str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPayload<'a> {
    pub contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent<'a>>,
    pub generation_config: GeminiGenerationConfig<'a>,
}

#[derive(serde::Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(serde::Deserialize)]
pub struct GeminiCandidate {
    pub content: GeminiCandidateContent,
}

#[derive(serde::Deserialize)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiCandidatePart>,
}

#[derive(serde::Deserialize)]
pub struct GeminiCandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

// --- Ollama generate ---
#[derive(serde::Serialize)]
pub struct OllamaPayload<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub system: &'a str,
    pub format: &'a str,
    pub stream: bool,
}

#[derive(serde::Deserialize)]
pub struct OllamaResponse {
    #[serde(default)]
    pub response: String,
}
