use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::shared::constants::IMG2TXT_PROGRAM;
use crate::shared::external_tool::run_tool;
use crate::text::domain::text_geometry::TextGeometry;
use crate::text::domain::text_renderer::TextRenderer;

/// Renders images with libcaca's `img2txt`, capturing its standard output.
pub struct Img2TxtRenderer {
    program: OsString,
    geometry: TextGeometry,
}

impl Img2TxtRenderer {
    pub fn new(program: impl Into<OsString>, geometry: TextGeometry) -> Self {
        Self {
            program: program.into(),
            geometry,
        }
    }

    /// `img2txt -W <cols> -H <rows> -x <xs> -y <ys> <image> -f <format>`
    fn command(&self, image: &Path) -> Command {
        let g = &self.geometry;
        let mut command = Command::new(&self.program);
        command
            .arg("-W")
            .arg(g.width.to_string())
            .arg("-H")
            .arg(g.height.to_string())
            .arg("-x")
            .arg(g.x_scale.to_string())
            .arg("-y")
            .arg(g.y_scale.to_string())
            .arg(image)
            .arg("-f")
            .arg(&g.format);
        command
    }
}

impl Default for Img2TxtRenderer {
    fn default() -> Self {
        Self::new(IMG2TXT_PROGRAM, TextGeometry::default())
    }
}

impl TextRenderer for Img2TxtRenderer {
    fn render(&self, image: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let result = run_tool(&mut self.command(image))?;
        fs::write(output, &result.stdout)
            .map_err(|e| format!("Failed to write {}: {e}", output.display()))?;
        Ok(())
    }
}
