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

//! Graphviz DOT source for users who want Graphviz's own layout.

use crate::style::{self, RankDir};
use kgraph_core::KnowledgeGraph;
use std::fmt::Write;

/// Quote a DOT identifier or label.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn to_dot(graph: &KnowledgeGraph, direction: RankDir) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "digraph knowledge_graph {{");
    let _ = writeln!(
        out,
        "    graph [rankdir={}, bgcolor={}, splines=ortho, nodesep={}, ranksep={}, concentrate=true];",
        direction.as_dot(),
        style::BACKGROUND,
        style::NODESEP_IN,
        style::RANKSEP_IN,
    );
    let _ = writeln!(
        out,
        "    node [shape={}, style={}, fillcolor={}, width={}, height={}, fontsize={}, fontname={}];",
        style::NODE_SHAPE,
        quote(style::NODE_STYLE),
        quote(style::NODE_FILL),
        style::NODE_MIN_WIDTH_IN,
        style::NODE_MIN_HEIGHT_IN,
        style::NODE_FONT_SIZE,
        quote(&dot_font_list()),
    );
    let _ = writeln!(
        out,
        "    edge [fontsize={}, len={}];",
        style::EDGE_FONT_SIZE,
        style::EDGE_LEN,
    );

    for node in &graph.nodes {
        let _ = writeln!(out, "    {} [label={}];", quote(&node.id), quote(&node.label));
    }
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "    {} -> {} [label={}];",
            quote(&edge.from),
            quote(&edge.to),
            quote(&edge.label)
        );
    }

    out.push_str("}\n");
    out
}

/// Graphviz takes a comma-separated list without CSS quoting.
fn dot_font_list() -> String {
    style::FONT_FAMILY
        .split(',')
        .map(|f| f.trim().trim_matches('\''))
        .collect::<Vec<_>>()
        .join(",")
}
