//! Server Configuration
//!
//! Read from environment variables (after `.env` is loaded by `dotenvy`).

use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LLM_PROVIDER must be 'openai' or 'ollama', got '{0}'")]
    UnknownProvider(String),

    #[error("{var} must be a number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Which model backend serves the agent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
}

impl ProviderKind {
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Ollama => "llama3.2",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub provider: ProviderKind,

    /// Provider credential; `None` blocks runs with a visible error
    pub openai_api_key: Option<String>,

    pub openai_base_url: String,

    pub model: String,

    pub ollama_host: String,

    pub ollama_port: u16,

    pub bind_addr: String,

    /// Sessions idle longer than this are dropped
    pub session_idle_minutes: i64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(p) => p.parse()?,
            None => ProviderKind::OpenAi,
        };

        let ollama_port = match get("OLLAMA_PORT") {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                value: p,
            })?,
            None => 11434,
        };

        let session_idle_minutes = match get("SESSION_IDLE_MINUTES") {
            Some(m) => m.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "SESSION_IDLE_MINUTES",
                value: m,
            })?,
            None => 60,
        };

        Ok(Self {
            provider,
            openai_api_key: get(agent_runtime::openai::API_KEY_VAR),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
            model: get("RENO_MODEL").unwrap_or_else(|| provider.default_model().into()),
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into()),
            ollama_port,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            session_idle_minutes,
        })
    }

    /// Whether the selected provider has what it needs to run
    pub const fn credential_configured(&self) -> bool {
        match self.provider {
            ProviderKind::OpenAi => self.openai_api_key.is_some(),
            ProviderKind::Ollama => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.ollama_port, 11434);
        assert_eq!(config.session_idle_minutes, 60);
        assert!(!config.credential_configured());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = config(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.openai_api_key, None);
        assert!(!config.credential_configured());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = config(&[("LLM_PROVIDER", "Ollama"), ("OLLAMA_PORT", "9999")]).unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.ollama_port, 9999);
        assert!(config.credential_configured());
    }

    #[test]
    fn test_model_override() {
        let config = config(&[("OPENAI_API_KEY", "sk-test"), ("RENO_MODEL", "gpt-4o-mini")]).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(config.credential_configured());
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            config(&[("LLM_PROVIDER", "claude")]).unwrap_err(),
            ConfigError::UnknownProvider("claude".into())
        );
        assert!(matches!(
            config(&[("OLLAMA_PORT", "eleven")]).unwrap_err(),
            ConfigError::InvalidNumber { var: "OLLAMA_PORT", .. }
        ));
    }
}
