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

//! SVG to PNG conversion.

use crate::error::RenderError;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Largest raster edge accepted, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// System fonts, loaded once per process.
static FONTDB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "Loaded system fonts for rasterizing");
    Arc::new(db)
});

/// Rasterize an SVG document onto a white background.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>, RenderError> {
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    let options = resvg::usvg::Options {
        fontdb: FONTDB.clone(),
        ..Default::default()
    };
    let tree = resvg::usvg::Tree::from_str(svg, &options)
        .map_err(|e| RenderError::Svg(e.to_string()))?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(RenderError::Raster(format!(
            "image size {}x{} out of range",
            width, height
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Raster("could not allocate pixmap".to_string()))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixmap.data(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Raster(e.to_string()))?;

    debug!(width, height, bytes = png.len(), "Rasterized diagram");
    Ok(png)
}
