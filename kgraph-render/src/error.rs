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

use crate::layout::LayoutError;
use thiserror::Error;

/// Result type for rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors from producing a diagram export.
///
/// Rendering itself never fails; these only come out of [`crate::DiagramArtifact::png`]
/// and from the layout step the renderer recovers from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Invalid SVG: {0}")]
    Svg(String),

    #[error("Rasterizing failed: {0}")]
    Raster(String),
}
