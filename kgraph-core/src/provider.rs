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

//! Supported LLM providers

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One external large-language-model service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Gemini,
    #[serde(alias = "anthropic")]
    Claude,
    DeepSeek,
}

impl ProviderName {
    /// All providers in display order.
    pub const ALL: [ProviderName; 4] = [
        ProviderName::OpenAi,
        ProviderName::Gemini,
        ProviderName::Claude,
        ProviderName::DeepSeek,
    ];

    /// Wire name, also used in export file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "openai",
            ProviderName::Gemini => "gemini",
            ProviderName::Claude => "claude",
            ProviderName::DeepSeek => "deepseek",
        }
    }

    /// Panel heading, e.g. "Openai".
    pub fn title(&self) -> &'static str {
        match self {
            ProviderName::OpenAi => "Openai",
            ProviderName::Gemini => "Gemini",
            ProviderName::Claude => "Claude",
            ProviderName::DeepSeek => "Deepseek",
        }
    }

    /// Whether the provider takes a pool of interchangeable keys.
    pub fn supports_key_pool(&self) -> bool {
        matches!(self, ProviderName::Gemini)
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderName::OpenAi),
            "gemini" => Ok(ProviderName::Gemini),
            "claude" | "anthropic" => Ok(ProviderName::Claude),
            "deepseek" => Ok(ProviderName::DeepSeek),
            _ => Err(GatewayError::UnknownProvider(s.to_string())),
        }
    }
}
