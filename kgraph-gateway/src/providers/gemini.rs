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

//! Gemini adapter with API key rotation
//!
//! Free-tier Gemini keys hit quota quickly, so several keys can be supplied.
//! Each request draws keys at random without replacement until one produces
//! a graph. The pool is a per-request copy; the caller's set is never touched.

use super::GraphProvider;
use crate::config::ProviderSettings;
use crate::reply::{graph_from_reply, log_usage, require_text, PathStep, ReplyMode};
use crate::transport::{build_client, read_json, send_with_retry, RetryPolicy};
use async_trait::async_trait;
use kgraph_core::{
    CredentialSet, GatewayError, GatewayResult, GraphRequest, KnowledgeGraph, ProviderName,
};
use rand::Rng;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// Keys not yet tried for the current request.
#[derive(Debug, Clone)]
pub struct KeyPool {
    remaining: Vec<String>,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self { remaining: keys }
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Remove and return a uniformly chosen key.
    pub fn draw(&mut self) -> Option<String> {
        self.draw_with(&mut rand::thread_rng())
    }

    pub fn draw_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.remaining.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.remaining.len());
        Some(self.remaining.swap_remove(index))
    }
}

pub struct GeminiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings) -> GatewayResult<Self> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }

    fn request_body(&self, prompt: String) -> Value {
        let mut generation_config = json!({
            "maxOutputTokens": self.settings.max_tokens,
        });
        if let Some(temperature) = self.settings.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(top_p) = self.settings.top_p {
            generation_config["topP"] = json!(top_p);
        }
        if let Some(top_k) = self.settings.top_k {
            generation_config["topK"] = json!(top_k);
        }

        json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": generation_config,
        })
    }

    async fn generate_with_key(&self, api_key: &str, body: &Value) -> GatewayResult<KnowledgeGraph> {
        let url = self
            .settings
            .endpoint(&format!("/v1beta/models/{}:generateContent", self.settings.model));
        let http = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body);

        let response = send_with_retry(
            ProviderName::Gemini,
            http,
            &RetryPolicy::connect_retries(self.settings.max_retries),
            self.settings.timeout_secs,
        )
        .await?;
        let value = read_json(ProviderName::Gemini, response, self.settings.timeout_secs).await?;
        log_usage(ProviderName::Gemini, &value);

        let text = require_text(
            ProviderName::Gemini,
            &value,
            &[
                PathStep::Key("candidates"),
                PathStep::Index(0),
                PathStep::Key("content"),
                PathStep::Key("parts"),
                PathStep::Index(0),
                PathStep::Key("text"),
            ],
            "candidates[0].content.parts[0].text",
        )?;

        graph_from_reply(ProviderName::Gemini, text, ReplyMode::Repair)
    }
}

#[async_trait]
impl GraphProvider for GeminiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    async fn generate(
        &self,
        request: &GraphRequest,
        credentials: &CredentialSet,
    ) -> GatewayResult<KnowledgeGraph> {
        let mut pool = KeyPool::new(credentials.key_pool(ProviderName::Gemini));
        if pool.is_empty() {
            return Err(GatewayError::CredentialMissing(ProviderName::Gemini));
        }

        let body = self.request_body(request.prompt());
        let mut attempts = 0;
        let mut last_error = String::new();

        while let Some(key) = pool.draw() {
            attempts += 1;
            debug!(attempt = attempts, remaining = pool.len(), "Trying Gemini key");
            match self.generate_with_key(&key, &body).await {
                Ok(graph) => {
                    info!(attempts, "Gemini request succeeded");
                    return Ok(graph);
                }
                Err(e) => {
                    warn!(attempt = attempts, remaining = pool.len(), "Gemini key failed: {}", e);
                    last_error = e.to_string();
                }
            }
        }

        Err(GatewayError::KeyExhausted {
            attempts,
            last_error,
        })
    }
}
