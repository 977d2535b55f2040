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

//! Session state for one user working with the generator.
//!
//! Holds the credentials, which providers are switched on, and the latest
//! rendered result per provider. Everything is passed explicitly; there is no
//! global state.

use kgraph_core::{CredentialSet, GatewayError, KnowledgeGraph, ProviderName};
use kgraph_gateway::ProviderGateway;
use kgraph_render::{DiagramArtifact, ExportFormat, GraphRenderer, RenderError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Enter some text to analyze")]
    EmptyText,

    #[error("No provider has an API key configured")]
    NoAvailableProviders,

    #[error("Select at least one provider")]
    NoneSelected,

    #[error("{0} has no API key configured")]
    ProviderUnavailable(ProviderName),

    #[error("No graph has been generated for {0}")]
    NoResult(ProviderName),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A provider's graph and its rendered diagram.
#[derive(Debug)]
pub struct RenderedResult {
    pub graph: KnowledgeGraph,
    pub artifact: DiagramArtifact,
    pub elapsed: Duration,
}

/// Bytes ready to hand to a download or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct Session {
    credentials: CredentialSet,
    enabled: BTreeSet<ProviderName>,
    results: BTreeMap<ProviderName, RenderedResult>,
}

impl Session {
    /// Every provider with a key starts enabled.
    pub fn new(credentials: CredentialSet) -> Self {
        let enabled = credentials.available_providers().into_iter().collect();
        Self {
            credentials,
            enabled,
            results: BTreeMap::new(),
        }
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn available_providers(&self) -> Vec<ProviderName> {
        self.credentials.available_providers()
    }

    pub fn enabled_providers(&self) -> Vec<ProviderName> {
        self.enabled.iter().copied().collect()
    }

    /// Replace the selection. Every provider must have a key.
    pub fn select(&mut self, providers: &[ProviderName]) -> Result<(), SessionError> {
        if let Some(missing) = providers
            .iter()
            .find(|p| !self.credentials.is_available(**p))
        {
            return Err(SessionError::ProviderUnavailable(*missing));
        }
        self.enabled = providers.iter().copied().collect();
        Ok(())
    }

    /// Check a run could start; returns the providers it would query.
    pub fn validate(&self, text: &str) -> Result<Vec<ProviderName>, SessionError> {
        if self.available_providers().is_empty() {
            return Err(SessionError::NoAvailableProviders);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }
        if self.enabled.is_empty() {
            return Err(SessionError::NoneSelected);
        }
        Ok(self.enabled_providers())
    }

    /// Query the enabled providers concurrently and render each result.
    ///
    /// Results from earlier runs are discarded. Returns providers in the order
    /// their results arrived.
    pub async fn run(
        &mut self,
        gateway: &ProviderGateway,
        renderer: &GraphRenderer,
        text: &str,
    ) -> Result<Vec<ProviderName>, SessionError> {
        let providers = self.validate(text)?;
        info!(providers = ?providers, chars = text.chars().count(), "Generating knowledge graphs");

        let mut outcomes = gateway.generate_all(&providers, &self.credentials, text)?;
        self.results.clear();
        let mut order = Vec::with_capacity(providers.len());
        while let Some(outcome) = outcomes.recv().await {
            if outcome.graph.is_diagnostic() {
                warn!(provider = %outcome.provider, "Showing diagnostic graph");
            }
            let artifact = renderer.render(&outcome.graph);
            info!(
                provider = %outcome.provider,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Rendered result"
            );
            order.push(outcome.provider);
            self.results.insert(
                outcome.provider,
                RenderedResult {
                    graph: outcome.graph,
                    artifact,
                    elapsed: outcome.elapsed,
                },
            );
        }
        Ok(order)
    }

    /// Store a result produced outside [`Session::run`].
    pub fn insert_result(&mut self, provider: ProviderName, result: RenderedResult) {
        self.results.insert(provider, result);
    }

    pub fn result(&self, provider: ProviderName) -> Option<&RenderedResult> {
        self.results.get(&provider)
    }

    pub fn results(&self) -> impl Iterator<Item = (ProviderName, &RenderedResult)> {
        self.results.iter().map(|(p, r)| (*p, r))
    }

    pub fn export(
        &self,
        provider: ProviderName,
        format: ExportFormat,
    ) -> Result<ExportPayload, SessionError> {
        let result = self
            .results
            .get(&provider)
            .ok_or(SessionError::NoResult(provider))?;
        Ok(ExportPayload {
            file_name: format.file_name(provider),
            mime_type: format.mime_type(),
            bytes: result.artifact.export(format)?,
        })
    }

    /// Write every stored result in each format; returns the written paths.
    pub fn export_to_dir(
        &self,
        dir: &Path,
        formats: &[ExportFormat],
    ) -> Result<Vec<PathBuf>, SessionError> {
        std::fs::create_dir_all(dir).map_err(|source| SessionError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for provider in self.results.keys() {
            for format in formats {
                let payload = self.export(*provider, *format)?;
                let path = dir.join(&payload.file_name);
                std::fs::write(&path, &payload.bytes).map_err(|source| SessionError::Write {
                    path: path.clone(),
                    source,
                })?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_keys() -> CredentialSet {
        CredentialSet::new()
            .with_single(ProviderName::OpenAi, "sk-1")
            .with_pool(ProviderName::Gemini, ["g-1", "g-2"])
    }

    #[test]
    fn test_available_providers_start_enabled() {
        let session = Session::new(two_keys());
        assert_eq!(
            session.enabled_providers(),
            vec![ProviderName::OpenAi, ProviderName::Gemini]
        );
    }

    #[test]
    fn test_validation_order() {
        let empty = Session::new(CredentialSet::new());
        assert!(matches!(
            empty.validate("text"),
            Err(SessionError::NoAvailableProviders)
        ));

        let mut session = Session::new(two_keys());
        assert!(matches!(session.validate("  "), Err(SessionError::EmptyText)));

        session.select(&[]).unwrap();
        assert!(matches!(session.validate("text"), Err(SessionError::NoneSelected)));

        session.select(&[ProviderName::Gemini]).unwrap();
        assert_eq!(session.validate("text").unwrap(), vec![ProviderName::Gemini]);
    }

    #[test]
    fn test_cannot_select_provider_without_key() {
        let mut session = Session::new(two_keys());
        assert!(matches!(
            session.select(&[ProviderName::Claude]),
            Err(SessionError::ProviderUnavailable(ProviderName::Claude))
        ));
        assert_eq!(session.enabled_providers().len(), 2);
    }

    #[test]
    fn test_export_without_result() {
        let session = Session::new(two_keys());
        assert!(matches!(
            session.export(ProviderName::OpenAi, ExportFormat::Png),
            Err(SessionError::NoResult(ProviderName::OpenAi))
        ));
    }

    #[test]
    fn test_export_payload_naming() {
        let mut session = Session::new(two_keys());
        let graph = KnowledgeGraph::new().with_node("a", "A");
        session.insert_result(
            ProviderName::Gemini,
            RenderedResult {
                artifact: GraphRenderer::new().render(&graph),
                graph,
                elapsed: Duration::from_millis(5),
            },
        );

        let svg = session.export(ProviderName::Gemini, ExportFormat::Svg).unwrap();
        assert_eq!(svg.file_name, "knowledge_graph_gemini.svg");
        assert_eq!(svg.mime_type, "image/svg+xml");
        assert!(String::from_utf8(svg.bytes).unwrap().contains("<svg"));
    }
}
