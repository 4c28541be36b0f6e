use crate::shared::staging::{Stage, StagingArea};
use crate::text::domain::rasterizer::Rasterizer;

use super::frame_stage::map_artifacts;
use super::pipeline_logger::PipelineLogger;

/// Step 3: render every text document back into an image.
pub struct RasterizeUseCase {
    rasterizer: Box<dyn Rasterizer>,
}

impl RasterizeUseCase {
    pub const STEP: usize = 3;
    pub const NAME: &'static str = "TXT (HTML) to PNG";

    pub fn new(rasterizer: Box<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Writes `PNG/<stem>.png` for each `HTML/<stem>.html`.
    pub fn execute(
        &mut self,
        staging: &StagingArea,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        logger.step(Self::STEP, Self::NAME);
        let rasterizer = &self.rasterizer;
        let rasterized = map_artifacts(
            staging,
            Stage::Text,
            Stage::Raster,
            "rasterize",
            logger,
            |markup, output| rasterizer.rasterize(markup, output),
        )?;
        logger.info(&format!("Rasterized {rasterized} text frames"));
        Ok(rasterized)
    }
}
