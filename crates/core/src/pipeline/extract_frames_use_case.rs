use std::path::Path;
use std::time::Instant;

use crate::shared::frame_index::FrameIndex;
use crate::shared::staging::{Stage, StagingArea};
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::frame_stage::FrameError;
use super::pipeline_logger::PipelineLogger;

/// Step 1: decode every frame of the source video into a still image.
pub struct ExtractFramesUseCase {
    reader: Box<dyn VideoReader>,
    image_writer: Box<dyn ImageWriter>,
}

impl ExtractFramesUseCase {
    pub const STEP: usize = 1;
    pub const NAME: &'static str = "Video to JPG";

    pub fn new(reader: Box<dyn VideoReader>, image_writer: Box<dyn ImageWriter>) -> Self {
        Self {
            reader,
            image_writer,
        }
    }

    /// Writes `JPG/<stem>.jpg` for each decoded frame and returns how many
    /// were written.
    pub fn execute(
        &mut self,
        input: &Path,
        staging: &StagingArea,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        logger.step(Self::STEP, Self::NAME);

        let metadata = self.reader.open(input)?;
        log::info!(
            "Decoding {}: {}x{} {} at {:.2} fps",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.codec,
            metadata.fps
        );
        staging.ensure(Stage::Images)?;

        let mut written = 0;
        for result in self.reader.frames() {
            let frame = result?;
            let path = staging.artifact_path(Stage::Images, FrameIndex(frame.index()));

            let started = Instant::now();
            self.image_writer
                .write(&path, &frame)
                .map_err(|source| FrameError {
                    stage: "extract",
                    artifact: path.clone(),
                    source,
                })?;
            logger.timing("extract", started.elapsed().as_secs_f64() * 1000.0);

            written += 1;
            logger.progress(written, metadata.total_frames);
        }
        self.reader.close();

        logger.info(&format!("Extracted {written} frames"));
        Ok(written)
    }
}
