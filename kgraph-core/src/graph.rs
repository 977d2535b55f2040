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

//! Normalized knowledge graph
//!
//! Every provider reply ends up as a [`KnowledgeGraph`]: an ordered list of
//! nodes with unique ids and an ordered list of labeled edges. Decoding from
//! JSON is lenient per entry. A node or edge that is not an object or lacks a
//! required key is skipped and counted, the rest of the graph survives.

use crate::diagnostic::DiagnosticKind;
use crate::error::{GatewayError, GatewayResult};
use crate::prompt::build_graph_prompt;
use crate::provider::ProviderName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// A concept in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

/// A labeled relation between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
}

/// Provider-agnostic graph handed from the gateway to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Set when the graph was synthesized to explain a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticKind>,
}

/// Outcome of lenient decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphDecode {
    pub graph: KnowledgeGraph,
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected a JSON object with nodes and edges, got {0}")]
    NotAnObject(&'static str),

    #[error("graph has no usable nodes or edges")]
    Empty,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.nodes.push(GraphNode {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    pub fn with_edge(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.edges.push(GraphEdge {
            from: from.into(),
            to: to.into(),
            label: label.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn is_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edge endpoints that do not name a declared node, in first-seen order.
    pub fn dangling_references(&self) -> Vec<&str> {
        let declared: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut dangling = Vec::new();
        for edge in &self.edges {
            for id in [edge.from.as_str(), edge.to.as_str()] {
                if !declared.contains(id) && seen.insert(id) {
                    dangling.push(id);
                }
            }
        }
        dangling
    }

    /// Decode a JSON value, skipping malformed entries.
    pub fn decode(value: &Value) -> Result<GraphDecode, DecodeError> {
        let object = value
            .as_object()
            .ok_or_else(|| DecodeError::NotAnObject(json_type_name(value)))?;

        let mut graph = KnowledgeGraph::new();
        let mut skipped_nodes = 0;
        let mut skipped_edges = 0;
        let mut ids = HashSet::new();

        for entry in entries(object.get("nodes")) {
            let node = entry.as_object().and_then(|fields| {
                Some(GraphNode {
                    id: scalar_text(fields.get("id")?)?,
                    label: scalar_text(fields.get("label")?)?,
                })
            });
            match node {
                Some(node) if ids.insert(node.id.clone()) => graph.nodes.push(node),
                _ => skipped_nodes += 1,
            }
        }

        for entry in entries(object.get("edges")) {
            let edge = entry.as_object().and_then(|fields| {
                Some(GraphEdge {
                    from: scalar_text(fields.get("from")?)?,
                    to: scalar_text(fields.get("to")?)?,
                    label: scalar_text(fields.get("label")?)?,
                })
            });
            match edge {
                Some(edge) => graph.edges.push(edge),
                None => skipped_edges += 1,
            }
        }

        if skipped_nodes + skipped_edges > 0 {
            debug!(skipped_nodes, skipped_edges, "Skipped malformed graph entries");
        }

        if graph.is_empty() {
            return Err(DecodeError::Empty);
        }

        Ok(GraphDecode {
            graph,
            skipped_nodes,
            skipped_edges,
        })
    }
}

fn entries(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Strings pass through, numbers and booleans are stringified.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One user action against one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRequest {
    provider: ProviderName,
    source_text: String,
}

impl GraphRequest {
    pub fn new(provider: ProviderName, source_text: impl Into<String>) -> GatewayResult<Self> {
        let source_text = source_text.into();
        if source_text.trim().is_empty() {
            return Err(GatewayError::EmptyInput);
        }
        Ok(Self {
            provider,
            source_text,
        })
    }

    pub fn provider(&self) -> ProviderName {
        self.provider
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn prompt(&self) -> String {
        build_graph_prompt(&self.source_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_valid_graph() {
        let value = json!({
            "nodes": [
                {"id": "water", "label": "Water"},
                {"id": "boiling", "label": "Boiling point"}
            ],
            "edges": [{"from": "water", "to": "boiling", "label": "has"}]
        });

        let decoded = KnowledgeGraph::decode(&value).unwrap();
        assert_eq!(decoded.graph.nodes.len(), 2);
        assert_eq!(decoded.graph.edges[0].label, "has");
        assert_eq!(decoded.skipped_nodes, 0);
        assert!(!decoded.graph.is_diagnostic());
    }

    #[test]
    fn test_decode_skips_malformed_entries() {
        let value = json!({
            "nodes": [
                {"id": "a", "label": "A"},
                {"id": "b"},
                "not a node",
                {"id": 3, "label": true},
                {"id": "a", "label": "duplicate"}
            ],
            "edges": [
                {"from": "a", "to": "3", "label": "links"},
                {"from": "a", "to": "b"},
                {"from": null, "to": "a", "label": "x"}
            ]
        });

        let decoded = KnowledgeGraph::decode(&value).unwrap();
        let ids: Vec<_> = decoded.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "3"]);
        assert_eq!(decoded.graph.node("3").unwrap().label, "true");
        assert_eq!(decoded.skipped_nodes, 3);
        assert_eq!(decoded.graph.edges.len(), 1);
        assert_eq!(decoded.skipped_edges, 2);
    }

    #[test]
    fn test_decode_rejects_non_objects_and_empty_graphs() {
        assert_eq!(
            KnowledgeGraph::decode(&json!([1, 2])).unwrap_err(),
            DecodeError::NotAnObject("an array")
        );
        assert_eq!(
            KnowledgeGraph::decode(&json!({"nodes": [], "edges": []})).unwrap_err(),
            DecodeError::Empty
        );
        assert_eq!(
            KnowledgeGraph::decode(&json!({"answer": "no graph"})).unwrap_err(),
            DecodeError::Empty
        );
    }

    #[test]
    fn test_dangling_references() {
        let graph = KnowledgeGraph::new()
            .with_node("a", "A")
            .with_edge("a", "ghost", "to")
            .with_edge("ghost", "phantom", "to");
        assert_eq!(graph.dangling_references(), vec!["ghost", "phantom"]);
    }

    #[test]
    fn test_request_rejects_blank_text() {
        assert!(matches!(
            GraphRequest::new(ProviderName::OpenAi, "   \n"),
            Err(GatewayError::EmptyInput)
        ));

        let request = GraphRequest::new(ProviderName::Gemini, "Rust is a language").unwrap();
        assert!(request.prompt().contains("Rust is a language"));
        assert_eq!(request.provider(), ProviderName::Gemini);
    }

    #[test]
    fn test_diagnostic_marker_is_not_serialized_when_absent() {
        let graph = KnowledgeGraph::new().with_node("a", "A");
        let json = serde_json::to_value(&graph).unwrap();
        assert!(json.get("diagnostic").is_none());
    }
}
