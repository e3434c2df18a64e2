use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::workspace::layout::DEFAULT_PANEL_WIDTH_PERCENT;

/// Location of the settings file, relative to the workspace root.
pub const CONFIG_RELATIVE_PATH: &str = "config/mission.toml";

/// Top-level settings, usually read from `config/mission.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub research: ResearchSettings,
    pub search: SearchSettings,
    pub demo: DemoSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

/// Result of the startup detection, with a line for the status bar.
#[derive(Debug, Clone)]
pub struct SettingsBootstrap {
    pub settings: Settings,
    pub message: String,
}

impl Settings {
    pub fn config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(CONFIG_RELATIVE_PATH)
    }

    /// Reads the settings file, or falls back to defaults when it does not exist.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let config_path = Self::config_path(workspace_root);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read settings: {}", config_path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings: {}", config_path.display()))
    }

    /// Picks the settings to start with.
    ///
    /// 1. `config/mission.toml` when it exists.
    /// 2. A provider inferred from API key environment variables.
    /// 3. The offline generator.
    pub fn bootstrap(workspace_root: &Path) -> Result<SettingsBootstrap> {
        let config_path = Self::config_path(workspace_root);
        if config_path.exists() {
            let settings = Self::load(workspace_root)?;
            return Ok(SettingsBootstrap {
                message: format!(
                    "Loaded {} ({})",
                    CONFIG_RELATIVE_PATH,
                    settings.backend.provider.display_name()
                ),
                settings,
            });
        }

        let lookup = |name: &str| env::var(name).ok();
        if let Some((backend, message)) = BackendSettings::detect_env_provider(lookup) {
            return Ok(SettingsBootstrap {
                settings: Settings {
                    backend,
                    ..Settings::default()
                },
                message,
            });
        }

        Ok(SettingsBootstrap {
            settings: Settings::default(),
            message: String::from(
                "No backend configured; replies are offline. Set OPENAI_API_KEY or GEMINI_API_KEY, or add config/mission.toml.",
            ),
        })
    }

    pub fn save_to_file(&self, workspace_root: &Path) -> Result<()> {
        let config_path = Self::config_path(workspace_root);
        if let Some(config_dir) = config_path.parent()
            && !config_dir.exists()
        {
            fs::create_dir_all(config_dir)
                .with_context(|| format!("failed to create {}", config_dir.display()))?;
        }
        let serialized = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(&config_path, serialized)
            .with_context(|| format!("failed to write settings: {}", config_path.display()))?;
        Ok(())
    }
}

/// Which model provider answers chat prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Offline,
    OpenAi,
    Gemini,
    Ollama,
    /// An endpoint that takes the prompt request JSON and answers with reply JSON.
    Custom,
}

impl Provider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Offline => "Offline",
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Ollama => "Ollama",
            Provider::Custom => "Custom HTTP",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Provider::OpenAi | Provider::Gemini)
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("gpt-4o-mini"),
            Provider::Gemini => Some("gemini-1.5-flash"),
            Provider::Ollama => Some("llama3.1"),
            Provider::Offline | Provider::Custom => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub provider: Provider,
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Inline key. `api_key_env` is preferred so keys stay out of the file.
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Offline,
            base_url: None,
            model: None,
            api_key: None,
            api_key_env: None,
            system_prompt: None,
            timeout_secs: 60,
        }
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| env::var(name).ok())
    }

    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        resolve_key(self.api_key.as_deref(), self.api_key_env.as_deref(), lookup)
    }

    /// First provider whose key or host variable is set and non-empty.
    pub fn detect_env_provider(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<(BackendSettings, String)> {
        let candidates = [
            ("OPENAI_API_KEY", Provider::OpenAi),
            ("GEMINI_API_KEY", Provider::Gemini),
            ("GOOGLE_API_KEY", Provider::Gemini),
        ];
        for (var, provider) in candidates {
            let Some(value) = lookup(var) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            let settings = BackendSettings {
                provider,
                model: provider.default_model().map(String::from),
                api_key_env: Some(var.to_string()),
                ..BackendSettings::default()
            };
            let message = format!(
                "Detected {var}; using the {} backend",
                provider.display_name()
            );
            return Some((settings, message));
        }

        if let Some(host) = lookup("OLLAMA_HOST").filter(|host| !host.trim().is_empty()) {
            let host = host.trim().trim_end_matches('/');
            let host = if host.starts_with("http://") || host.starts_with("https://") {
                host.to_string()
            } else {
                format!("http://{host}")
            };
            let settings = BackendSettings {
                provider: Provider::Ollama,
                base_url: Some(format!("{host}/api/generate")),
                model: Provider::Ollama.default_model().map(String::from),
                ..BackendSettings::default()
            };
            return Some((settings, format!("Detected OLLAMA_HOST; using Ollama at {host}")));
        }

        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchSettings {
    pub max_sub_queries: usize,
    pub timeout_secs: u64,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_sub_queries: 10,
            timeout_secs: 300,
        }
    }
}

impl ResearchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub api_key: Option<String>,
    pub api_key_env: Option<String>,
    pub endpoint: String,
    pub summarizer_endpoint: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: Some(String::from("BRAVE_SEARCH_API_KEY")),
            endpoint: String::from("https://api.search.brave.com/res/v1/web/search"),
            summarizer_endpoint: String::from(
                "https://api.search.brave.com/res/v1/summarizer/search",
            ),
        }
    }
}

impl SearchSettings {
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(
            self.api_key.as_deref(),
            self.api_key_env.as_deref(),
            |name| env::var(name).ok(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub enabled: bool,
    pub latency_ms: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            latency_ms: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub reveal_interval_ms: u64,
    pub default_panel_width: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            reveal_interval_ms: 15,
            default_panel_width: DEFAULT_PANEL_WIDTH_PERCENT,
        }
    }
}

impl UiSettings {
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file, relative to the workspace root.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file: String::from("logs/mission-control.log"),
        }
    }
}

fn resolve_key(
    inline: Option<&str>,
    env_name: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    if let Some(key) = inline.filter(|key| !key.trim().is_empty()) {
        return Some(key.to_string());
    }
    env_name
        .and_then(lookup)
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.ui.reveal_interval_ms, 15);
        assert_eq!(settings.research.max_sub_queries, 10);
        assert!(settings.demo.enabled);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.backend.provider = Provider::Gemini;
        settings.backend.model = Some("gemini-1.5-pro".into());
        settings.demo.latency_ms = 0;
        settings.ui.default_panel_width = 60.0;
        settings.save_to_file(dir.path()).unwrap();

        assert!(dir.path().join("config/mission.toml").is_file());
        let loaded = Settings::load(dir.path()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join("config/mission.toml"),
            "[backend]\nprovider = \"openai\"\ntimeout_secs = 5\n\n[demo]\nenabled = false\n",
        )
        .unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.backend.provider, Provider::OpenAi);
        assert_eq!(settings.backend.timeout(), Duration::from_secs(5));
        assert!(!settings.demo.enabled);
        assert_eq!(settings.demo.latency_ms, 600);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(dir.path().join("config/mission.toml"), "[backend\n").unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse settings"));
    }

    #[test]
    fn env_detection_prefers_openai_then_gemini_then_ollama() {
        let (settings, _) = BackendSettings::detect_env_provider(env_from(&[
            ("GEMINI_API_KEY", "g"),
            ("OPENAI_API_KEY", "o"),
        ]))
        .unwrap();
        assert_eq!(settings.provider, Provider::OpenAi);
        assert_eq!(settings.api_key_env.as_deref(), Some("OPENAI_API_KEY"));

        let (settings, _) =
            BackendSettings::detect_env_provider(env_from(&[("OPENAI_API_KEY", "  "), ("GOOGLE_API_KEY", "k")]))
                .unwrap();
        assert_eq!(settings.provider, Provider::Gemini);

        let (settings, _) =
            BackendSettings::detect_env_provider(env_from(&[("OLLAMA_HOST", "127.0.0.1:11434")]))
                .unwrap();
        assert_eq!(settings.provider, Provider::Ollama);
        assert_eq!(
            settings.base_url.as_deref(),
            Some("http://127.0.0.1:11434/api/generate")
        );

        assert!(BackendSettings::detect_env_provider(env_from(&[])).is_none());
    }

    #[test]
    fn inline_key_wins_over_environment() {
        let settings = BackendSettings {
            api_key: Some("inline".into()),
            api_key_env: Some("OPENAI_API_KEY".into()),
            ..BackendSettings::default()
        };
        let key = settings.resolve_api_key_with(env_from(&[("OPENAI_API_KEY", "env")]));
        assert_eq!(key.as_deref(), Some("inline"));

        let settings = BackendSettings {
            api_key_env: Some("OPENAI_API_KEY".into()),
            ..BackendSettings::default()
        };
        let key = settings.resolve_api_key_with(env_from(&[("OPENAI_API_KEY", "env")]));
        assert_eq!(key.as_deref(), Some("env"));
    }
}
