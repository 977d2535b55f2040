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

use crate::dot::to_dot;
use crate::error::{RenderError, RenderResult};
use crate::layout::Layout;
use crate::raster::svg_to_png;
use crate::svg::to_svg;
use kgraph_core::{KnowledgeGraph, ProviderName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Export format offered for a rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Dot,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Svg, ExportFormat::Dot];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Dot => "dot",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Dot => "text/vnd.graphviz",
        }
    }

    /// `knowledge_graph_<provider>.<ext>`
    pub fn file_name(&self, provider: ProviderName) -> String {
        self.file_name_for(&format!("knowledge_graph_{}", provider.as_str()))
    }

    pub fn file_name_for(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "svg" => Ok(ExportFormat::Svg),
            "dot" | "gv" => Ok(ExportFormat::Dot),
            other => Err(format!("unknown export format '{}' (expected png, svg or dot)", other)),
        }
    }
}

/// One rendered diagram.
///
/// Immutable once built. SVG text and PNG bytes are produced on first use
/// and cached, so repeated exports return identical output.
#[derive(Debug)]
pub struct DiagramArtifact {
    graph: KnowledgeGraph,
    layout: Layout,
    svg: OnceLock<String>,
    png: OnceLock<RenderResult<Vec<u8>>>,
}

impl DiagramArtifact {
    pub(crate) fn new(graph: KnowledgeGraph, layout: Layout) -> Self {
        Self {
            graph,
            layout,
            svg: OnceLock::new(),
            png: OnceLock::new(),
        }
    }

    /// The graph this diagram was drawn from.
    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_diagnostic(&self) -> bool {
        self.graph.is_diagnostic()
    }

    pub fn svg(&self) -> &str {
        self.svg.get_or_init(|| to_svg(&self.layout))
    }

    pub fn png(&self) -> RenderResult<&[u8]> {
        self.png
            .get_or_init(|| svg_to_png(self.svg()))
            .as_ref()
            .map(Vec::as_slice)
            .map_err(Clone::clone)
    }

    pub fn dot(&self) -> String {
        to_dot(&self.graph, self.layout.direction)
    }

    /// Bytes for `format`.
    pub fn export(&self, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
        match format {
            ExportFormat::Png => self.png().map(<[u8]>::to_vec),
            ExportFormat::Svg => Ok(self.svg().as_bytes().to_vec()),
            ExportFormat::Dot => Ok(self.dot().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_and_mime_types() {
        assert_eq!(
            ExportFormat::Png.file_name(ProviderName::Gemini),
            "knowledge_graph_gemini.png"
        );
        assert_eq!(
            ExportFormat::Svg.file_name(ProviderName::DeepSeek),
            "knowledge_graph_deepseek.svg"
        );
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(ExportFormat::Dot.mime_type(), "text/vnd.graphviz");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("gv".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert!("jpeg".parse::<ExportFormat>().is_err());
    }
}
