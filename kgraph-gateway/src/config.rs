// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use kgraph_core::ProviderName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gateway Configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayConfig {
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub claude: ProviderSettings,
    pub deepseek: ProviderSettings,
}

/// Request shape and transport settings for one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSettings {
    /// API root without version segment (e.g., "https://api.openai.com")
    pub base_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature (omitted from the request when unset)
    pub temperature: Option<f32>,

    /// Nucleus sampling (Gemini only)
    pub top_p: Option<f32>,

    /// Top-k sampling (Gemini only)
    pub top_k: Option<u32>,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after a failed connection attempt
    pub max_retries: u32,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl ProviderSettings {
    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.3),
            top_p: None,
            top_k: None,
            max_tokens: 1000,
            timeout_secs: default_timeout(),
            max_retries: 0,
            pool_max_idle_per_host: default_pool_size(),
        }
    }

    pub fn gemini() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.3),
            top_p: Some(0.8),
            top_k: Some(40),
            max_tokens: 1000,
            timeout_secs: default_timeout(),
            max_retries: 0,
            pool_max_idle_per_host: default_pool_size(),
        }
    }

    pub fn claude() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-haiku-20241022".to_string(),
            temperature: None,
            top_p: None,
            top_k: None,
            max_tokens: 1000,
            timeout_secs: default_timeout(),
            max_retries: 0,
            pool_max_idle_per_host: default_pool_size(),
        }
    }

    pub fn deepseek() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: Some(0.3),
            top_p: None,
            top_k: None,
            max_tokens: 1000,
            timeout_secs: default_timeout(),
            max_retries: 3,
            pool_max_idle_per_host: default_pool_size(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint URL under the configured base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = Some(temperature);
        }
        if let Some(top_p) = overrides.top_p {
            self.top_p = Some(top_p);
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = Some(top_k);
        }
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(max_retries) = overrides.max_retries {
            self.max_retries = max_retries;
        }
        if let Some(pool) = overrides.pool_max_idle_per_host {
            self.pool_max_idle_per_host = pool;
        }
    }
}

/// A TOML section; unset fields keep the provider's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsOverrides {
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    pool_max_idle_per_host: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    /// Applied to every provider before its own section
    request_timeout_secs: Option<u64>,
    openai: Option<SettingsOverrides>,
    gemini: Option<SettingsOverrides>,
    claude: Option<SettingsOverrides>,
    deepseek: Option<SettingsOverrides>,
}

// Default values
fn default_timeout() -> u64 {
    60
}

fn default_pool_size() -> usize {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::openai(),
            gemini: ProviderSettings::gemini(),
            claude: ProviderSettings::claude(),
            deepseek: ProviderSettings::deepseek(),
        }
    }
}

impl GatewayConfig {
    pub fn settings(&self, provider: ProviderName) -> &ProviderSettings {
        match provider {
            ProviderName::OpenAi => &self.openai,
            ProviderName::Gemini => &self.gemini,
            ProviderName::Claude => &self.claude,
            ProviderName::DeepSeek => &self.deepseek,
        }
    }

    pub fn settings_mut(&mut self, provider: ProviderName) -> &mut ProviderSettings {
        match provider {
            ProviderName::OpenAi => &mut self.openai,
            ProviderName::Gemini => &mut self.gemini,
            ProviderName::Claude => &mut self.claude,
            ProviderName::DeepSeek => &mut self.deepseek,
        }
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(timeout) = file.request_timeout_secs {
            for provider in ProviderName::ALL {
                config.settings_mut(provider).timeout_secs = timeout;
            }
        }

        let sections = [
            (ProviderName::OpenAi, file.openai),
            (ProviderName::Gemini, file.gemini),
            (ProviderName::Claude, file.claude),
            (ProviderName::DeepSeek, file.deepseek),
        ];
        for (provider, overrides) in sections {
            if let Some(overrides) = overrides {
                config.settings_mut(provider).apply(overrides);
            }
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides
    ///
    /// Supported environment variables:
    /// - KGRAPH_REQUEST_TIMEOUT: request timeout in seconds for every provider
    /// - KGRAPH_<PROVIDER>_BASE_URL: API root (e.g., KGRAPH_DEEPSEEK_BASE_URL)
    /// - KGRAPH_<PROVIDER>_MODEL: model identifier (e.g., KGRAPH_OPENAI_MODEL)
    pub fn apply_env(&mut self) {
        self.apply_lookup(|name| std::env::var(name).ok());
    }

    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = lookup("KGRAPH_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => {
                    for provider in ProviderName::ALL {
                        self.settings_mut(provider).timeout_secs = secs;
                    }
                }
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid KGRAPH_REQUEST_TIMEOUT"),
            }
        }

        for provider in ProviderName::ALL {
            let prefix = format!("KGRAPH_{}", provider.as_str().to_ascii_uppercase());
            let settings = self.settings_mut(provider);
            if let Some(base_url) = lookup(&format!("{}_BASE_URL", prefix)) {
                settings.base_url = base_url;
            }
            if let Some(model) = lookup(&format!("{}_MODEL", prefix)) {
                settings.model = model;
            }
        }
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.temperature, Some(0.3));
        assert_eq!(config.gemini.top_p, Some(0.8));
        assert_eq!(config.gemini.top_k, Some(40));
        assert_eq!(config.claude.temperature, None);
        assert_eq!(config.deepseek.max_retries, 3);
        for provider in ProviderName::ALL {
            assert_eq!(config.settings(provider).timeout_secs, 60);
            assert_eq!(config.settings(provider).max_tokens, 1000);
        }
    }

    #[test]
    fn test_partial_sections_keep_provider_defaults() {
        let config = GatewayConfig::from_toml_str(
            r#"
            request_timeout_secs = 30

            [gemini]
            model = "gemini-1.5-pro"

            [deepseek]
            base_url = "http://localhost:9000"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.top_k, Some(40));
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.deepseek.base_url, "http://localhost:9000");
        assert_eq!(config.deepseek.timeout_secs, 5);
        assert_eq!(config.deepseek.model, "deepseek-chat");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(GatewayConfig::from_toml_str("[openai]\nmodle = \"typo\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        config.apply_lookup(|name| match name {
            "KGRAPH_REQUEST_TIMEOUT" => Some("15".to_string()),
            "KGRAPH_CLAUDE_MODEL" => Some("claude-3-5-sonnet-20241022".to_string()),
            "KGRAPH_OPENAI_BASE_URL" => Some("http://127.0.0.1:8080".to_string()),
            _ => None,
        });

        assert_eq!(config.claude.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.openai.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.deepseek.timeout_secs, 15);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = GatewayConfig::load(Some(PathBuf::from("/nonexistent/kgraph.toml"))).unwrap();
        assert_eq!(config.openai.model, GatewayConfig::default().openai.model);
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let mut settings = ProviderSettings::openai();
        settings.base_url = "http://localhost:1234/".to_string();
        assert_eq!(
            settings.endpoint("/v1/chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
    }
}
