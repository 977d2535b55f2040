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

//! Fixed diagram styling
//!
//! Sizes are stored in inches where Graphviz uses inches and converted to
//! points (72 per inch) for layout.

use unicode_width::UnicodeWidthStr;

pub const POINTS_PER_INCH: f64 = 72.0;

/// Direction ranks advance in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDir {
    TopBottom,
    LeftRight,
}

impl RankDir {
    pub fn as_dot(&self) -> &'static str {
        match self {
            RankDir::TopBottom => "TB",
            RankDir::LeftRight => "LR",
        }
    }
}

pub const BACKGROUND: &str = "white";
pub const NODE_FILL: &str = "#E8F5E9";
pub const STROKE: &str = "black";
pub const NODE_SHAPE: &str = "box";
pub const NODE_STYLE: &str = "rounded,filled";

pub const NODESEP_IN: f64 = 0.5;
pub const RANKSEP_IN: f64 = 0.5;
pub const NODE_MIN_WIDTH_IN: f64 = 1.5;
pub const NODE_MIN_HEIGHT_IN: f64 = 0.8;
pub const EDGE_LEN: f64 = 1.5;

pub const NODE_FONT_SIZE: f64 = 10.0;
pub const EDGE_FONT_SIZE: f64 = 8.0;

/// Latin first, then the CJK faces common on Linux, Windows and macOS.
pub const FONT_FAMILY: &str =
    "'Noto Sans', 'Noto Sans CJK KR', 'Malgun Gothic', 'Apple SD Gothic Neo', Arial, sans-serif";

/// Canvas padding around the drawing, in points.
pub const MARGIN: f64 = 12.0;

/// Corner radius of node boxes, in points.
pub const CORNER_RADIUS: f64 = 6.0;

// Horizontal label padding inside a node box, in points.
const LABEL_PADDING: f64 = 16.0;

pub fn points(inches: f64) -> f64 {
    inches * POINTS_PER_INCH
}

/// Approximate rendered width of `text` in points.
///
/// Uses terminal column width so wide CJK glyphs count double.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    UnicodeWidthStr::width(text) as f64 * font_size * 0.6
}

/// Box width for a node label, never below the minimum.
pub fn node_width(label: &str) -> f64 {
    let longest = label
        .lines()
        .map(|line| text_width(line, NODE_FONT_SIZE))
        .fold(0.0, f64::max);
    (longest + LABEL_PADDING).max(points(NODE_MIN_WIDTH_IN))
}

/// Box height for a node label, never below the minimum.
pub fn node_height(label: &str) -> f64 {
    let lines = label.lines().count().max(1) as f64;
    (lines * NODE_FONT_SIZE * 1.4 + LABEL_PADDING).max(points(NODE_MIN_HEIGHT_IN))
}
