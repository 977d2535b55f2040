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

//! Provider credentials
//!
//! A [`CredentialSet`] maps each provider to nothing, one secret, or a pool of
//! interchangeable secrets. Only Gemini consumes a pool; the other providers
//! use the first non-blank entry.
//!
//! Sources:
//! - environment: `OPENAI_API_KEY`, `GEMINI_API_KEY_1..N` (falls back to
//!   `GEMINI_API_KEY`), `ANTHROPIC_API_KEY` / `CLAUDE_API_KEY`, `DEEPSEEK_API_KEY`
//! - TOML secrets file: `openai = "..."`, `gemini = ["k1", "k2"]`

use crate::error::{GatewayError, GatewayResult};
use crate::provider::ProviderName;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Secret material for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    #[default]
    Empty,
    Single(String),
    Pool(Vec<String>),
}

static EMPTY: Credential = Credential::Empty;

impl Credential {
    /// Non-blank secrets in order.
    pub fn secrets(&self) -> Vec<&str> {
        match self {
            Credential::Empty => Vec::new(),
            Credential::Single(key) => [key.as_str()]
                .into_iter()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .collect(),
            Credential::Pool(keys) => keys
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_available(&self) -> bool {
        !self.secrets().is_empty()
    }

    /// First usable secret.
    pub fn primary(&self) -> Option<&str> {
        self.secrets().into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.secrets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Empty => f.write_str("Empty"),
            Credential::Single(_) => f.write_str("Single(***)"),
            Credential::Pool(keys) => write!(f, "Pool({} keys)", keys.len()),
        }
    }
}

/// Credentials for every provider, keyed by [`ProviderName`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    entries: BTreeMap<ProviderName, Credential>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: ProviderName, credential: Credential) {
        self.entries.insert(provider, credential);
    }

    pub fn with_single(mut self, provider: ProviderName, key: impl Into<String>) -> Self {
        self.insert(provider, Credential::Single(key.into()));
        self
    }

    pub fn with_pool<I, S>(mut self, provider: ProviderName, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(provider, Credential::Pool(keys.into_iter().map(Into::into).collect()));
        self
    }

    pub fn get(&self, provider: ProviderName) -> &Credential {
        self.entries.get(&provider).unwrap_or(&EMPTY)
    }

    pub fn is_available(&self, provider: ProviderName) -> bool {
        self.get(provider).is_available()
    }

    /// Providers with at least one usable secret, in display order.
    pub fn available_providers(&self) -> Vec<ProviderName> {
        ProviderName::ALL
            .into_iter()
            .filter(|p| self.is_available(*p))
            .collect()
    }

    /// The single key used by non-pooled providers.
    pub fn single_key(&self, provider: ProviderName) -> Option<&str> {
        self.get(provider).primary()
    }

    /// Owned copy of the provider's keys. Callers mutate the copy, never the set.
    pub fn key_pool(&self, provider: ProviderName) -> Vec<String> {
        self.get(provider)
            .secrets()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Entries from `other` that carry a usable secret replace ours.
    pub fn merge(mut self, other: CredentialSet) -> Self {
        for (provider, credential) in other.entries {
            if credential.is_available() {
                self.entries.insert(provider, credential);
            }
        }
        self
    }

    /// Load credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut set = Self::new();

        if let Some(key) = lookup("OPENAI_API_KEY") {
            set.insert(ProviderName::OpenAi, Credential::Single(key));
        }

        // Numbered keys stop at the first gap
        let mut pool = Vec::new();
        for index in 1.. {
            match lookup(&format!("GEMINI_API_KEY_{}", index)) {
                Some(key) => pool.push(key),
                None => break,
            }
        }
        if pool.is_empty() {
            if let Some(key) = lookup("GEMINI_API_KEY") {
                pool.push(key);
            }
        }
        if !pool.is_empty() {
            debug!(keys = pool.len(), "Loaded Gemini key pool from environment");
            set.insert(ProviderName::Gemini, Credential::Pool(pool));
        }

        if let Some(key) = lookup("ANTHROPIC_API_KEY").or_else(|| lookup("CLAUDE_API_KEY")) {
            set.insert(ProviderName::Claude, Credential::Single(key));
        }

        if let Some(key) = lookup("DEEPSEEK_API_KEY") {
            set.insert(ProviderName::DeepSeek, Credential::Single(key));
        }

        set
    }

    /// Parse a TOML secrets document.
    ///
    /// Keys are provider names, optionally suffixed with `_api_key` or
    /// `_api_keys` in any case. Unrelated keys are ignored.
    pub fn from_toml_str(content: &str) -> GatewayResult<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SecretValue {
            One(String),
            Many(Vec<String>),
        }

        let table: BTreeMap<String, toml::Value> = toml::from_str(content)?;
        let mut set = Self::new();

        for (key, value) in table {
            let lowered = key.to_ascii_lowercase();
            let name = lowered
                .trim_end_matches("_api_keys")
                .trim_end_matches("_api_key");
            let provider = match ProviderName::from_str(name) {
                Ok(provider) => provider,
                Err(_) => {
                    debug!(key = %key, "Ignoring non-provider secret");
                    continue;
                }
            };

            let secret: SecretValue = value
                .try_into()
                .map_err(|e: toml::de::Error| GatewayError::Config(format!("{}: {}", key, e)))?;
            let credential = match secret {
                SecretValue::One(key) => Credential::Single(key),
                SecretValue::Many(keys) => Credential::Pool(keys),
            };
            set.insert(provider, credential);
        }

        Ok(set)
    }

    /// Load a TOML secrets file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
