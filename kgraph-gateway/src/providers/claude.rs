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

use super::GraphProvider;
use crate::config::ProviderSettings;
use crate::reply::{graph_from_reply, log_usage, ReplyMode};
use crate::transport::{build_client, read_json, send_with_retry, RetryPolicy};
use async_trait::async_trait;
use kgraph_core::{
    CredentialSet, GatewayError, GatewayResult, GraphRequest, KnowledgeGraph, ProviderName,
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct ClaudeProvider {
    client: Client,
    settings: ProviderSettings,
}

impl ClaudeProvider {
    pub fn new(settings: ProviderSettings) -> GatewayResult<Self> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }
}

/// Text of every `text` content block, in order.
fn text_blocks(value: &Value) -> Vec<&str> {
    value
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|b| b.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl GraphProvider for ClaudeProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Claude
    }

    async fn generate(
        &self,
        request: &GraphRequest,
        credentials: &CredentialSet,
    ) -> GatewayResult<KnowledgeGraph> {
        let api_key = credentials
            .single_key(ProviderName::Claude)
            .ok_or(GatewayError::CredentialMissing(ProviderName::Claude))?;

        let mut body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": [{"role": "user", "content": request.prompt()}],
        });
        if let Some(temperature) = self.settings.temperature {
            body["temperature"] = json!(temperature);
        }

        debug!(model = %self.settings.model, "Sending Claude request");
        let http = self
            .client
            .post(self.settings.endpoint("/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let response = send_with_retry(
            ProviderName::Claude,
            http,
            &RetryPolicy::connect_retries(self.settings.max_retries),
            self.settings.timeout_secs,
        )
        .await?;
        let value = read_json(ProviderName::Claude, response, self.settings.timeout_secs).await?;
        log_usage(ProviderName::Claude, &value);

        let blocks = text_blocks(&value);
        let first = blocks.first().ok_or_else(|| GatewayError::ResponseFormat {
            provider: ProviderName::Claude,
            message: "response has no text content".to_string(),
        })?;

        // The first block is normally the whole answer; otherwise search all of them.
        match graph_from_reply(ProviderName::Claude, first, ReplyMode::Strict) {
            Ok(graph) => Ok(graph),
            Err(_) => {
                debug!("First Claude text block is not a graph, searching all blocks");
                graph_from_reply(ProviderName::Claude, &blocks.join("\n"), ReplyMode::Repair)
            }
        }
    }
}
