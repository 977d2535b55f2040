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

//! Knowledge graph diagrams
//!
//! Lays out a [`KnowledgeGraph`](kgraph_core::KnowledgeGraph) as top-to-bottom
//! rounded boxes with orthogonal edges and exports it as SVG, PNG or
//! Graphviz DOT. No Graphviz installation is needed.
//!
//! ```
//! use kgraph_core::KnowledgeGraph;
//! use kgraph_render::GraphRenderer;
//!
//! let graph = KnowledgeGraph::new()
//!     .with_node("water", "Water")
//!     .with_node("boil", "100°C")
//!     .with_edge("water", "boil", "boils at");
//! let artifact = GraphRenderer::new().render(&graph);
//! assert!(artifact.svg().contains("boils at"));
//! ```

pub mod artifact;
pub mod dot;
pub mod error;
pub mod layout;
pub mod raster;
pub mod renderer;
pub mod style;
pub mod svg;

pub use artifact::{DiagramArtifact, ExportFormat};
pub use error::{RenderError, RenderResult};
pub use layout::{EdgeRoute, Layout, LayoutError, NodeBox, RouteKind};
pub use renderer::GraphRenderer;
pub use style::RankDir;
