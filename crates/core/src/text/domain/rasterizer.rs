use std::path::Path;

/// Renders a markup document back into a raster image.
pub trait Rasterizer: Send {
    /// Reads `markup` and writes an image to `output`; the image format
    /// follows the extension.
    fn rasterize(&self, markup: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
