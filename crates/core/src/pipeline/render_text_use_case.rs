use crate::shared::staging::{Stage, StagingArea};
use crate::text::domain::text_renderer::TextRenderer;

use super::frame_stage::map_artifacts;
use super::pipeline_logger::PipelineLogger;

/// Step 2: render every extracted image as a character-grid document.
pub struct RenderTextUseCase {
    renderer: Box<dyn TextRenderer>,
}

impl RenderTextUseCase {
    pub const STEP: usize = 2;
    pub const NAME: &'static str = "JPG to TXT (HTML)";

    pub fn new(renderer: Box<dyn TextRenderer>) -> Self {
        Self { renderer }
    }

    /// Writes `HTML/<stem>.html` for each `JPG/<stem>.jpg`.
    pub fn execute(
        &mut self,
        staging: &StagingArea,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        logger.step(Self::STEP, Self::NAME);
        let renderer = &self.renderer;
        let rendered = map_artifacts(
            staging,
            Stage::Images,
            Stage::Text,
            "render",
            logger,
            |image, output| renderer.render(image, output),
        )?;
        logger.info(&format!("Rendered {rendered} text frames"));
        Ok(rendered)
    }
}
