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

use crate::artifact::DiagramArtifact;
use crate::layout::{self, Layout};
use crate::style::RankDir;
use kgraph_core::KnowledgeGraph;
use serde_json::Value;
use tracing::{debug, error};

/// Turns knowledge graphs into diagrams.
///
/// Rendering never fails: anything that cannot be laid out is replaced by a
/// one-node diagram describing the problem.
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    direction: RankDir,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self {
            direction: RankDir::TopBottom,
        }
    }
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, graph: &KnowledgeGraph) -> DiagramArtifact {
        match layout::compute(graph, self.direction) {
            Ok(layout) => {
                debug!(
                    nodes = layout.nodes.len(),
                    edges = layout.edges.len(),
                    ranks = layout.rank_count(),
                    "Laid out graph"
                );
                DiagramArtifact::new(graph.clone(), layout)
            }
            Err(e) => Self::error_artifact(&e.to_string()),
        }
    }

    /// Render a raw JSON graph, skipping malformed entries.
    pub fn render_value(&self, value: &Value) -> DiagramArtifact {
        match KnowledgeGraph::decode(value) {
            Ok(decoded) => {
                if decoded.skipped_nodes + decoded.skipped_edges > 0 {
                    debug!(
                        skipped_nodes = decoded.skipped_nodes,
                        skipped_edges = decoded.skipped_edges,
                        "Rendering with malformed entries dropped"
                    );
                }
                self.render(&decoded.graph)
            }
            Err(e) => Self::error_artifact(&e.to_string()),
        }
    }

    /// Left-to-right diagram with a single `error` node.
    pub fn error_artifact(message: &str) -> DiagramArtifact {
        error!("Graph rendering error: {}", message);
        let graph =
            KnowledgeGraph::new().with_node("error", format!("Graph rendering error: {}", message));

        match layout::compute(&graph, RankDir::LeftRight) {
            Ok(layout) => DiagramArtifact::new(graph, layout),
            // Unreachable for a single declared node.
            Err(_) => DiagramArtifact::new(
                graph,
                Layout {
                    direction: RankDir::LeftRight,
                    nodes: Vec::new(),
                    edges: Vec::new(),
                    width: 1.0,
                    height: 1.0,
                },
            ),
        }
    }
}
