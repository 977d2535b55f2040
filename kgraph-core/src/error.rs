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

//! Gateway error types

use crate::provider::ProviderName;
use thiserror::Error;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while turning text into a knowledge graph.
///
/// Provider-side variants never leave the gateway: they are converted into a
/// diagnostic graph. Only [`GatewayError::UnknownProvider`],
/// [`GatewayError::EmptyInput`] and [`GatewayError::Config`] reach callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Provider selected without a usable secret
    #[error("No API key configured for {0}")]
    CredentialMissing(ProviderName),

    /// Network-level failure talking to a provider
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: ProviderName,
        message: String,
    },

    /// Provider answered with a non-success status
    #[error("{provider} API call failed: HTTP {status}")]
    Status {
        provider: ProviderName,
        status: u16,
        body: String,
    },

    /// Provider did not answer within the request timeout
    #[error("{provider} request timed out after {seconds}s")]
    Timeout { provider: ProviderName, seconds: u64 },

    /// Reply could not be read as a graph, even after bracket extraction
    #[error("{provider} returned an unusable response: {message}")]
    ResponseFormat {
        provider: ProviderName,
        message: String,
    },

    /// Every key in the Gemini pool failed
    #[error("All {attempts} Gemini API keys failed: {last_error}")]
    KeyExhausted { attempts: usize, last_error: String },

    /// Caller passed a provider name outside the supported set
    #[error("Unsupported provider: {0}")]
    UnknownProvider(String),

    /// Caller passed blank source text
    #[error("Source text is empty")]
    EmptyInput,

    /// Credentials or settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Errors that are caller mistakes rather than provider failures.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::UnknownProvider(_) | GatewayError::EmptyInput | GatewayError::Config(_)
        )
    }

    /// Provider the failure belongs to, when known.
    pub fn provider(&self) -> Option<ProviderName> {
        match self {
            GatewayError::CredentialMissing(provider) => Some(*provider),
            GatewayError::Transport { provider, .. }
            | GatewayError::Status { provider, .. }
            | GatewayError::Timeout { provider, .. }
            | GatewayError::ResponseFormat { provider, .. } => Some(*provider),
            GatewayError::KeyExhausted { .. } => Some(ProviderName::Gemini),
            GatewayError::UnknownProvider(_) | GatewayError::EmptyInput | GatewayError::Config(_) => {
                None
            }
        }
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(e: toml::de::Error) -> Self {
        GatewayError::Config(e.to_string())
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Config(e.to_string())
    }
}
