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

//! SVG serialization of a computed [`Layout`].
//!
//! Sizes are emitted in `pt` so the document has Graphviz's physical size;
//! rasterizers treat 1pt as 4/3 px, which gives 96 dpi output.

use crate::layout::Layout;
use crate::style::{self, EDGE_FONT_SIZE, NODE_FONT_SIZE};
use std::fmt::Write;

/// Escape text for XML content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Not representable in XML 1.0
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            '\u{FFFE}' | '\u{FFFF}' => {}
            _ => out.push(c),
        }
    }
    out
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

pub fn to_svg(layout: &Layout) -> String {
    let mut out = String::new();
    let w = fmt_num(layout.width);
    let h = fmt_num(layout.height);

    // Writing to a String cannot fail.
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}pt" height="{h}pt" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        out,
        r#"<defs><marker id="arrowhead" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="7" markerHeight="7" orient="auto"><path d="M0,0 L10,5 L0,10 z" fill="{}"/></marker></defs>"#,
        style::STROKE
    );
    let _ = writeln!(
        out,
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
        style::BACKGROUND
    );
    let font = escape_xml(style::FONT_FAMILY);

    let _ = writeln!(out, r#"<g class="edges">"#);
    for edge in &layout.edges {
        let points = edge
            .points
            .iter()
            .map(|&(x, y)| format!("{},{}", fmt_num(x), fmt_num(y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            r#"<polyline class="edge" data-from="{}" data-to="{}" points="{}" fill="none" stroke="{}" stroke-width="1" marker-end="url(#arrowhead)"/>"#,
            escape_xml(&edge.from),
            escape_xml(&edge.to),
            points,
            style::STROKE
        );
        if !edge.label.is_empty() {
            let (x, y) = edge.label_at;
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{}">{}</text>"#,
                fmt_num(x),
                fmt_num(y),
                font,
                fmt_num(EDGE_FONT_SIZE),
                escape_xml(&edge.label)
            );
        }
    }
    let _ = writeln!(out, "</g>");

    let _ = writeln!(out, r#"<g class="nodes">"#);
    for node in &layout.nodes {
        let _ = writeln!(
            out,
            r#"<g class="node" id="node-{}">"#,
            escape_xml(&node.id)
        );
        let _ = writeln!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}" stroke="{}" stroke-width="1"/>"#,
            fmt_num(node.left()),
            fmt_num(node.top()),
            fmt_num(node.width),
            fmt_num(node.height),
            style::NODE_FILL,
            style::STROKE,
            r = fmt_num(style::CORNER_RADIUS),
        );

        let lines: Vec<&str> = node.label.lines().collect();
        let line_height = NODE_FONT_SIZE * 1.4;
        let first = node.y - line_height * (lines.len().max(1) as f64 - 1.0) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="central" font-family="{}" font-size="{}">{}</text>"#,
                fmt_num(node.x),
                fmt_num(first + line_height * i as f64),
                font,
                fmt_num(NODE_FONT_SIZE),
                escape_xml(line)
            );
        }
        let _ = writeln!(out, "</g>");
    }
    let _ = writeln!(out, "</g>");

    out.push_str("</svg>\n");
    out
}
