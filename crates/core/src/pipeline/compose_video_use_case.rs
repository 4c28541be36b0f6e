use std::path::Path;
use std::time::Instant;

use crate::shared::constants::OUTPUT_FPS;
use crate::shared::staging::{Stage, StagingArea};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::PipelineLogger;

/// Step 4: encode the rasterized images as the output video, carrying the
/// source's audio over.
pub struct ComposeVideoUseCase {
    sequence: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
}

impl ComposeVideoUseCase {
    pub const STEP: usize = 4;
    pub const NAME: &'static str = "PNG to Video";

    pub fn new(sequence: Box<dyn VideoReader>, writer: Box<dyn VideoWriter>) -> Self {
        Self { sequence, writer }
    }

    /// Encodes every `PNG/<stem>.png` in Frame Index order at the fixed
    /// output rate and returns the number of frames encoded. The audio track
    /// of `audio_source`, when given, is copied into the output.
    pub fn execute(
        &mut self,
        audio_source: Option<&Path>,
        staging: &StagingArea,
        output: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        logger.step(Self::STEP, Self::NAME);

        let sequence = self.sequence.open(&staging.dir(Stage::Raster))?;
        let metadata = VideoMetadata {
            width: sequence.width,
            height: sequence.height,
            fps: f64::from(OUTPUT_FPS),
            total_frames: sequence.total_frames,
            codec: String::new(),
            source_path: audio_source.map(Path::to_path_buf),
        };
        log::info!(
            "Encoding {} frames at {}x{}, {} fps to {}",
            metadata.total_frames,
            metadata.width,
            metadata.height,
            OUTPUT_FPS,
            output.display()
        );

        self.writer.open(output, &metadata)?;

        let mut encoded = 0;
        for result in self.sequence.frames() {
            let frame = result?;
            let started = Instant::now();
            self.writer.write(&frame)?;
            logger.timing("encode", started.elapsed().as_secs_f64() * 1000.0);
            encoded += 1;
            logger.progress(encoded, metadata.total_frames);
        }

        self.writer.close()?;
        self.sequence.close();

        logger.info(&format!("Wrote {}", output.display()));
        Ok(encoded)
    }
}
