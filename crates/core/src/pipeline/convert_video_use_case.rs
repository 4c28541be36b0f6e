use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::shared::constants::OUTPUT_STEM_SUFFIX;
use crate::shared::staging::StagingArea;
use crate::video::domain::media_probe::MediaProbe;

use super::compose_video_use_case::ComposeVideoUseCase;
use super::extract_frames_use_case::ExtractFramesUseCase;
use super::pipeline_logger::PipelineLogger;
use super::rasterize_use_case::RasterizeUseCase;
use super::render_text_use_case::RenderTextUseCase;

/// Result of a conversion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The input has no video track; nothing was created.
    NoVideoTrack,
    Converted { output: PathBuf, frames: usize },
}

/// Output file for `input`: `<stem>-ascii<.suffix>` inside `work_dir`.
pub fn output_path_for(input: &Path, work_dir: &Path) -> Option<PathBuf> {
    let mut name = input.file_stem()?.to_os_string();
    name.push(OUTPUT_STEM_SUFFIX);
    if let Some(extension) = input.extension() {
        name.push(".");
        name.push(extension);
    }
    Some(work_dir.join(name))
}

/// Orchestrates the four conversion steps over one input file.
///
/// Steps run strictly in sequence, each consuming the previous step's
/// staged artifacts. Artifacts left by an earlier run are purged before
/// step 1, and every step must produce one artifact per extracted frame.
/// On success the staged artifacts are purged unless `keep_intermediates`
/// is set; on failure they are left for inspection.
pub struct ConvertVideoUseCase {
    probe: Box<dyn MediaProbe>,
    extract: ExtractFramesUseCase,
    render: RenderTextUseCase,
    rasterize: RasterizeUseCase,
    compose: ComposeVideoUseCase,
    logger: Box<dyn PipelineLogger>,
    keep_intermediates: bool,
}

impl ConvertVideoUseCase {
    pub fn new(
        probe: Box<dyn MediaProbe>,
        extract: ExtractFramesUseCase,
        render: RenderTextUseCase,
        rasterize: RasterizeUseCase,
        compose: ComposeVideoUseCase,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            probe,
            extract,
            render,
            rasterize,
            compose,
            logger,
            keep_intermediates: false,
        }
    }

    pub fn keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn execute(
        &mut self,
        input: &Path,
        work_dir: &Path,
    ) -> Result<Outcome, Box<dyn std::error::Error>> {
        let info = self.probe.probe(input)?;
        if !info.has_video() {
            self.logger.info(&format!(
                "{} has no video track, nothing to convert",
                input.display()
            ));
            return Ok(Outcome::NoVideoTrack);
        }

        let output = output_path_for(input, work_dir)
            .ok_or_else(|| format!("Input path has no file name: {}", input.display()))?;
        let staging = StagingArea::new(work_dir);
        let logger = self.logger.as_mut();

        let stale = staging.purge()?;
        if stale > 0 {
            logger.info(&format!(
                "Removed {stale} intermediate files left by an earlier run"
            ));
        }

        let started = Instant::now();
        let extracted = self.extract.execute(input, &staging, logger)?;
        if extracted == 0 {
            return Err(format!("No frames decoded from {}", input.display()).into());
        }
        logger.timing("step_extract", elapsed_ms(started));

        let started = Instant::now();
        let rendered = self.render.execute(&staging, logger)?;
        check_count(RenderTextUseCase::NAME, rendered, extracted)?;
        logger.timing("step_render", elapsed_ms(started));

        let started = Instant::now();
        let rasterized = self.rasterize.execute(&staging, logger)?;
        check_count(RasterizeUseCase::NAME, rasterized, extracted)?;
        logger.timing("step_rasterize", elapsed_ms(started));

        if !info.has_audio {
            logger.info("Source has no audio track, output will be silent");
        }
        let audio_source = info.has_audio.then_some(input);

        let started = Instant::now();
        let frames = self.compose.execute(audio_source, &staging, &output, logger)?;
        check_count(ComposeVideoUseCase::NAME, frames, extracted)?;
        logger.timing("step_compose", elapsed_ms(started));

        if self.keep_intermediates {
            logger.info(&format!(
                "Keeping intermediate files under {}",
                work_dir.display()
            ));
        } else {
            let removed = staging.purge()?;
            logger.info(&format!("Removed {removed} intermediate files"));
        }

        logger.summary();
        Ok(Outcome::Converted { output, frames })
    }
}

/// Every step maps each extracted frame to exactly one artifact.
fn check_count(step: &str, produced: usize, extracted: usize) -> Result<(), String> {
    if produced != extracted {
        return Err(format!(
            "{step} produced {produced} artifacts for {extracted} extracted frames"
        ));
    }
    Ok(())
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
