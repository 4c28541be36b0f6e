use std::path::Path;

/// Renders a still image as a character grid in a markup document.
pub trait TextRenderer: Send {
    /// Reads `image` and writes the rendered document to `output`.
    ///
    /// Nothing is written to `output` when rendering fails.
    fn render(&self, image: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
