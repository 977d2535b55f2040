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

//! Renderer integration tests

use kgraph_core::{GatewayError, KnowledgeGraph, ProviderName};
use kgraph_render::{ExportFormat, GraphRenderer};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

fn sample_graph() -> KnowledgeGraph {
    KnowledgeGraph::new()
        .with_node("rust", "Rust")
        .with_node("ownership", "Ownership")
        .with_node("borrowing", "Borrowing")
        .with_node("safety", "Memory safety")
        .with_edge("rust", "ownership", "uses")
        .with_edge("ownership", "borrowing", "allows")
        .with_edge("ownership", "safety", "ensures")
}

#[test]
fn test_render_preserves_nodes_and_edges() {
    let graph = sample_graph();
    let artifact = GraphRenderer::new().render(&graph);
    let layout = artifact.layout();

    let drawn: Vec<_> = layout
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();
    let expected: Vec<_> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.label.as_str()))
        .collect();
    assert_eq!(drawn, expected);

    let triples: Vec<_> = layout
        .edges
        .iter()
        .map(|e| (e.from.as_str(), e.to.as_str(), e.label.as_str()))
        .collect();
    assert_eq!(
        triples,
        vec![
            ("rust", "ownership", "uses"),
            ("ownership", "borrowing", "allows"),
            ("ownership", "safety", "ensures"),
        ]
    );

    let svg = artifact.svg();
    for label in ["Rust", "Ownership", "Borrowing", "Memory safety", "uses", "allows", "ensures"] {
        assert!(svg.contains(label), "svg is missing {}", label);
    }
}

#[test]
fn test_malformed_node_is_skipped() {
    let value = json!({
        "nodes": [
            {"id": "a", "label": "Alpha"},
            {"id": "b", "label": "Beta"},
            {"label": "no id"},
            {"id": "c", "label": "Gamma"}
        ],
        "edges": [
            {"from": "a", "to": "b", "label": "x"},
            {"from": "b", "to": "c", "label": "y"}
        ]
    });
    let artifact = GraphRenderer::new().render_value(&value);
    assert_eq!(artifact.layout().nodes.len(), 3);
    assert_eq!(artifact.layout().edges.len(), 2);
}

#[test]
fn test_png_export_is_stable() {
    let artifact = GraphRenderer::new().render(&sample_graph());
    let first = artifact.png().unwrap().to_vec();
    let second = artifact.png().unwrap().to_vec();
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(&first[1..4], b"PNG");

    assert_eq!(artifact.export(ExportFormat::Png).unwrap(), first);
}

#[test]
fn test_png_size_follows_layout() {
    let artifact = GraphRenderer::new().render(&sample_graph());
    let png = artifact.png().unwrap();
    let image = image::load_from_memory(png).unwrap();
    let layout = artifact.layout();
    let expected_width = layout.width * 96.0 / 72.0;
    let expected_height = layout.height * 96.0 / 72.0;
    assert!((image.width() as f64 - expected_width).abs() <= 1.0);
    assert!((image.height() as f64 - expected_height).abs() <= 1.0);
}

#[test]
fn test_diagnostic_graph_renders() {
    let graph = GatewayError::Timeout {
        provider: ProviderName::DeepSeek,
        seconds: 60,
    }
    .to_diagnostic_graph();
    let artifact = GraphRenderer::new().render(&graph);
    assert!(artifact.is_diagnostic());
    assert!(artifact.svg().contains("API timeout"));
    assert!(artifact.png().is_ok());
}

#[test]
fn test_exports_write_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = GraphRenderer::new().render(&sample_graph());

    for format in ExportFormat::ALL {
        let path = dir.path().join(format.file_name(ProviderName::Claude));
        std::fs::write(&path, artifact.export(format).unwrap()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
    assert!(dir.path().join("knowledge_graph_claude.svg").exists());
    let dot = std::fs::read_to_string(dir.path().join("knowledge_graph_claude.dot")).unwrap();
    assert!(dot.contains("\"ownership\" -> \"safety\" [label=\"ensures\"];"));
}

#[test]
fn test_korean_labels_survive() {
    let graph = KnowledgeGraph::new()
        .with_node("water", "물")
        .with_node("boil", "끓는점 100도")
        .with_edge("water", "boil", "도달");
    let artifact = GraphRenderer::new().render(&graph);
    assert!(artifact.svg().contains("끓는점 100도"));
    assert!(artifact.png().is_ok());
}

#[test]
fn test_control_characters_in_labels_still_rasterize() {
    let value = json!({
        "nodes": [{"id": "a", "label": "x\u{1}y"}, {"id": "b", "label": "back\u{8}space"}],
        "edges": [{"from": "a", "to": "b", "label": "bell\u{7}"}]
    });
    let artifact = GraphRenderer::new().render_value(&value);
    assert_eq!(artifact.layout().nodes.len(), 2);
    assert!(artifact.svg().contains(">xy</text>"));
    assert!(artifact.png().is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_layout_keeps_every_node_inside_canvas(
        edges in proptest::collection::vec((0usize..6, 0usize..6), 0..12)
    ) {
        let mut graph = KnowledgeGraph::new();
        for i in 0..6 {
            graph = graph.with_node(format!("n{}", i), format!("Node {}", i));
        }
        for (from, to) in &edges {
            graph = graph.with_edge(format!("n{}", from), format!("n{}", to), "rel");
        }

        let artifact = GraphRenderer::new().render(&graph);
        let layout = artifact.layout();
        prop_assert_eq!(layout.nodes.len(), 6);
        prop_assert_eq!(layout.edges.len(), edges.len());

        let ids: HashSet<_> = layout.nodes.iter().map(|n| n.id.clone()).collect();
        prop_assert_eq!(ids.len(), 6);
        for node in &layout.nodes {
            prop_assert!(node.left() >= 0.0);
            prop_assert!(node.top() >= 0.0);
            prop_assert!(node.x + node.width / 2.0 <= layout.width);
            prop_assert!(node.y + node.height / 2.0 <= layout.height);
        }
    }
}
