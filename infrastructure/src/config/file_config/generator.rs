//! Generator configuration from TOML (`[generator]` section)

use ragloop_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Chat completions flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorProvider {
    #[default]
    OpenAi,
    Azure,
}

impl std::str::FromStr for GeneratorProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "open-ai" => Ok(GeneratorProvider::OpenAi),
            "azure" | "azure-openai" | "azure_openai" => Ok(GeneratorProvider::Azure),
            other => Err(format!("unknown generator provider: {}", other)),
        }
    }
}

/// Raw generator configuration from TOML
///
/// # Example
///
/// ```toml
/// [generator]
/// provider = "azure"          # "openai" or "azure"
/// model = "gpt-4o"
/// temperature = 0.7
///
/// [generator.azure]
/// endpoint = "https://my-resource.openai.azure.com"
/// deployment = "gpt-4o"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeneratorConfig {
    /// "openai" or "azure"
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: u64,
    pub openai: FileOpenAiConfig,
    pub azure: FileAzureConfig,
}

impl Default for FileGeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout_seconds: 60,
            openai: FileOpenAiConfig::default(),
            azure: FileAzureConfig::default(),
        }
    }
}

/// OpenAI API settings (`[generator.openai]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable name for the API key
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead)
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
        }
    }
}

/// Azure OpenAI settings (`[generator.azure]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAzureConfig {
    /// Resource endpoint; falls back to `endpoint_env`
    pub endpoint: Option<String>,
    pub endpoint_env: String,
    pub deployment: String,
    pub api_version: String,
    pub api_key_env: String,
    pub api_key: Option<String>,
}

impl Default for FileAzureConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            endpoint_env: "AZURE_OPENAI_ENDPOINT".to_string(),
            deployment: "gpt-4o".to_string(),
            api_version: "2025-01-01-preview".to_string(),
            api_key_env: "AZURE_OPENAI_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl FileAzureConfig {
    pub fn resolve_endpoint(&self) -> Option<String> {
        self.endpoint
            .clone()
            .or_else(|| std::env::var(&self.endpoint_env).ok())
            .filter(|e| !e.trim().is_empty())
    }
}

fn resolve_key(env_name: &str, inline: Option<&String>) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| inline.cloned())
}

impl FileGeneratorConfig {
    /// Parse the provider string, falling back to OpenAI with a warning.
    pub fn parse_provider(&self) -> (GeneratorProvider, Vec<ConfigIssue>) {
        match self.provider.parse::<GeneratorProvider>() {
            Ok(provider) => (provider, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "generator.provider".to_string(),
                        value: self.provider.clone(),
                        valid_values: vec!["openai".to_string(), "azure".to_string()],
                    },
                    message: format!(
                        "generator.provider: unknown value '{}', falling back to 'openai'",
                        self.provider
                    ),
                };
                (GeneratorProvider::default(), vec![issue])
            }
        }
    }

    /// Name of the environment variable the selected provider reads its key from
    pub fn api_key_env(&self) -> &str {
        match self.parse_provider().0 {
            GeneratorProvider::OpenAi => &self.openai.api_key_env,
            GeneratorProvider::Azure => &self.azure.api_key_env,
        }
    }

    /// Resolve the API key of the selected provider, preferring the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        match self.parse_provider().0 {
            GeneratorProvider::OpenAi => {
                resolve_key(&self.openai.api_key_env, self.openai.api_key.as_ref())
            }
            GeneratorProvider::Azure => {
                resolve_key(&self.azure.api_key_env, self.azure.api_key.as_ref())
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (provider, mut issues) = self.parse_provider();
        if provider == GeneratorProvider::Azure && self.azure.resolve_endpoint().is_none() {
            issues.push(ConfigIssue::missing(
                "generator.azure.endpoint",
                format!(
                    "generator.azure.endpoint is not set and ${} is empty",
                    self.azure.endpoint_env
                ),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::InvalidEnumValue {
                    field: "generator.temperature".to_string(),
                    value: self.temperature.to_string(),
                    valid_values: vec!["0.0..=2.0".to_string()],
                },
                message: format!(
                    "generator.temperature: {} is outside 0.0..=2.0 and may be rejected",
                    self.temperature
                ),
            });
        }
        issues
    }
}
