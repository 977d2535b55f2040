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
use crate::reply::{graph_from_reply, log_usage, require_text, PathStep, ReplyMode};
use crate::transport::{build_client, read_json, send_with_retry, RetryPolicy};
use async_trait::async_trait;
use kgraph_core::{
    CredentialSet, GatewayError, GatewayResult, GraphRequest, KnowledgeGraph, ProviderName,
};
use reqwest::Client;
use serde_json::json;
use tracing::debug;

/// OpenAI chat completions. The reply must be the JSON object and nothing else.
pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    pub fn new(settings: ProviderSettings) -> GatewayResult<Self> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl GraphProvider for OpenAiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::OpenAi
    }

    async fn generate(
        &self,
        request: &GraphRequest,
        credentials: &CredentialSet,
    ) -> GatewayResult<KnowledgeGraph> {
        let api_key = credentials
            .single_key(ProviderName::OpenAi)
            .ok_or(GatewayError::CredentialMissing(ProviderName::OpenAi))?;

        let mut body = json!({
            "model": self.settings.model,
            "messages": [{"role": "user", "content": request.prompt()}],
            "max_tokens": self.settings.max_tokens,
        });
        if let Some(temperature) = self.settings.temperature {
            body["temperature"] = json!(temperature);
        }

        debug!(model = %self.settings.model, "Sending OpenAI request");
        let http = self
            .client
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&body);

        let response = send_with_retry(
            ProviderName::OpenAi,
            http,
            &RetryPolicy::connect_retries(self.settings.max_retries),
            self.settings.timeout_secs,
        )
        .await?;
        let value = read_json(ProviderName::OpenAi, response, self.settings.timeout_secs).await?;
        log_usage(ProviderName::OpenAi, &value);

        let content = require_text(
            ProviderName::OpenAi,
            &value,
            &[
                PathStep::Key("choices"),
                PathStep::Index(0),
                PathStep::Key("message"),
                PathStep::Key("content"),
            ],
            "choices[0].message.content",
        )?;

        graph_from_reply(ProviderName::OpenAi, content, ReplyMode::Strict)
    }
}
