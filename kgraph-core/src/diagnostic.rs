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

//! Diagnostic graphs
//!
//! A failed provider call still produces a graph so the viewer sees what went
//! wrong in the provider's own panel. Timeouts get a `timeout` → `suggestion`
//! pair; everything else gets `error` → `details` with the message cut to
//! [`DETAIL_MAX_CHARS`] characters.

use crate::error::GatewayError;
use crate::graph::KnowledgeGraph;
use serde::{Deserialize, Serialize};

/// Longest detail label shown in a diagnostic graph.
pub const DETAIL_MAX_CHARS: usize = 50;

/// Failure family a diagnostic graph reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    Timeout,
    Transport,
    ResponseFormat,
    KeyExhausted,
    CredentialMissing,
}

impl DiagnosticKind {
    fn headline(&self) -> &'static str {
        match self {
            DiagnosticKind::Timeout => "API timeout",
            DiagnosticKind::Transport => "API error",
            DiagnosticKind::ResponseFormat => "Response parsing error",
            DiagnosticKind::KeyExhausted => "All API keys failed",
            DiagnosticKind::CredentialMissing => "Missing API key",
        }
    }
}

/// Cut a message to [`DETAIL_MAX_CHARS`] characters.
pub fn truncate_detail(message: &str) -> String {
    message.chars().take(DETAIL_MAX_CHARS).collect()
}

impl KnowledgeGraph {
    /// `timeout` → `suggestion` graph.
    pub fn timeout_diagnostic() -> Self {
        let mut graph = KnowledgeGraph::new()
            .with_node("timeout", DiagnosticKind::Timeout.headline())
            .with_node("suggestion", "Try another model")
            .with_edge("timeout", "suggestion", "resolution");
        graph.diagnostic = Some(DiagnosticKind::Timeout);
        graph
    }

    /// `error` → `details` graph for any non-timeout failure.
    pub fn error_diagnostic(kind: DiagnosticKind, detail: &str) -> Self {
        let mut graph = KnowledgeGraph::new()
            .with_node("error", kind.headline())
            .with_node("details", truncate_detail(detail))
            .with_edge("error", "details", "cause");
        graph.diagnostic = Some(kind);
        graph
    }
}

impl GatewayError {
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            GatewayError::Timeout { .. } => DiagnosticKind::Timeout,
            GatewayError::Transport { .. } | GatewayError::Status { .. } => {
                DiagnosticKind::Transport
            }
            GatewayError::ResponseFormat { .. } => DiagnosticKind::ResponseFormat,
            GatewayError::KeyExhausted { .. } => DiagnosticKind::KeyExhausted,
            GatewayError::CredentialMissing(_) => DiagnosticKind::CredentialMissing,
            GatewayError::UnknownProvider(_) | GatewayError::EmptyInput | GatewayError::Config(_) => {
                DiagnosticKind::Transport
            }
        }
    }

    /// Graph shown in place of a real result.
    pub fn to_diagnostic_graph(&self) -> KnowledgeGraph {
        match self {
            GatewayError::Timeout { .. } => KnowledgeGraph::timeout_diagnostic(),
            GatewayError::KeyExhausted { last_error, .. } => {
                KnowledgeGraph::error_diagnostic(DiagnosticKind::KeyExhausted, last_error)
            }
            other => KnowledgeGraph::error_diagnostic(other.diagnostic_kind(), &other.to_string()),
        }
    }
}
