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

//! Provider dispatch and concurrent fan-out.

use crate::config::GatewayConfig;
use crate::providers::{
    ClaudeProvider, DeepSeekProvider, GeminiProvider, GraphProvider, OpenAiProvider,
};
use kgraph_core::{
    CredentialSet, GatewayError, GatewayResult, GraphRequest, KnowledgeGraph, ProviderName,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One provider's finished result from [`ProviderGateway::generate_all`].
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: ProviderName,
    pub graph: KnowledgeGraph,
    pub elapsed: Duration,
}

/// Routes graph requests to the registered adapters.
///
/// Provider failures come back as diagnostic graphs, so callers only see an
/// `Err` for input mistakes (blank text, unknown provider name).
#[derive(Clone)]
pub struct ProviderGateway {
    adapters: Arc<HashMap<ProviderName, Arc<dyn GraphProvider>>>,
}

impl ProviderGateway {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let mut adapters: HashMap<ProviderName, Arc<dyn GraphProvider>> = HashMap::new();
        adapters.insert(
            ProviderName::OpenAi,
            Arc::new(OpenAiProvider::new(config.openai.clone())?),
        );
        adapters.insert(
            ProviderName::Gemini,
            Arc::new(GeminiProvider::new(config.gemini.clone())?),
        );
        adapters.insert(
            ProviderName::Claude,
            Arc::new(ClaudeProvider::new(config.claude.clone())?),
        );
        adapters.insert(
            ProviderName::DeepSeek,
            Arc::new(DeepSeekProvider::new(config.deepseek.clone())?),
        );

        info!("Initialized {} graph providers", adapters.len());
        Ok(Self {
            adapters: Arc::new(adapters),
        })
    }

    /// A gateway with no adapters; register them with [`Self::with_adapter`].
    pub fn empty() -> Self {
        Self {
            adapters: Arc::new(HashMap::new()),
        }
    }

    /// Register or replace the adapter for `adapter.name()`.
    pub fn with_adapter(mut self, adapter: Arc<dyn GraphProvider>) -> Self {
        Arc::make_mut(&mut self.adapters).insert(adapter.name(), adapter);
        self
    }

    /// Registered providers in display order.
    pub fn providers(&self) -> Vec<ProviderName> {
        ProviderName::ALL
            .into_iter()
            .filter(|p| self.adapters.contains_key(p))
            .collect()
    }

    pub async fn generate_graph(
        &self,
        provider: ProviderName,
        credentials: &CredentialSet,
        text: &str,
    ) -> GatewayResult<KnowledgeGraph> {
        let request = GraphRequest::new(provider, text)?;
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| GatewayError::UnknownProvider(provider.to_string()))?;

        let start = Instant::now();
        match adapter.generate(&request, credentials).await {
            Ok(graph) => {
                info!(
                    provider = %provider,
                    nodes = graph.nodes.len(),
                    edges = graph.edges.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Graph generated"
                );
                Ok(graph)
            }
            Err(e) if e.is_hard_failure() => Err(e),
            Err(e) => {
                warn!(
                    provider = %provider,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Graph generation failed: {}",
                    e
                );
                Ok(e.to_diagnostic_graph())
            }
        }
    }

    /// Same as [`Self::generate_graph`] with the provider given by name.
    pub async fn generate_graph_by_name(
        &self,
        provider: &str,
        credentials: &CredentialSet,
        text: &str,
    ) -> GatewayResult<KnowledgeGraph> {
        let provider: ProviderName = provider.parse()?;
        self.generate_graph(provider, credentials, text).await
    }

    /// Query every selected provider concurrently.
    ///
    /// Outcomes arrive on the returned channel in completion order. The
    /// channel closes after the last provider reports.
    pub fn generate_all(
        &self,
        providers: &[ProviderName],
        credentials: &CredentialSet,
        text: &str,
    ) -> GatewayResult<mpsc::Receiver<ProviderOutcome>> {
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyInput);
        }
        if let Some(missing) = providers.iter().find(|p| !self.adapters.contains_key(*p)) {
            return Err(GatewayError::UnknownProvider(missing.to_string()));
        }

        let (tx, rx) = mpsc::channel(providers.len().max(1));
        for &provider in providers {
            let gateway = self.clone();
            let credentials = credentials.clone();
            let text = text.to_string();
            let tx = tx.clone();

            tokio::spawn(async move {
                let start = Instant::now();
                let graph = match gateway.generate_graph(provider, &credentials, &text).await {
                    Ok(graph) => graph,
                    Err(e) => e.to_diagnostic_graph(),
                };
                let outcome = ProviderOutcome {
                    provider,
                    graph,
                    elapsed: start.elapsed(),
                };
                if tx.send(outcome).await.is_err() {
                    warn!(provider = %provider, "Outcome receiver dropped");
                }
            });
        }

        Ok(rx)
    }

    /// Query every selected provider concurrently and wait for all of them.
    ///
    /// Outcomes are returned in the order the providers were given.
    pub async fn collect_all(
        &self,
        providers: &[ProviderName],
        credentials: &CredentialSet,
        text: &str,
    ) -> GatewayResult<Vec<ProviderOutcome>> {
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyInput);
        }

        let calls = providers.iter().map(|&provider| async move {
            let start = Instant::now();
            let graph = self.generate_graph(provider, credentials, text).await?;
            Ok::<_, GatewayError>(ProviderOutcome {
                provider,
                graph,
                elapsed: start.elapsed(),
            })
        });

        join_all(calls).await.into_iter().collect()
    }
}
