use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::shared::staging::{Stage, StagingArea};

use super::pipeline_logger::PipelineLogger;

/// A per-frame failure, tagged with the artifact being processed.
#[derive(Error, Debug)]
#[error("{stage} failed on {}: {source}", artifact.display())]
pub struct FrameError {
    pub stage: &'static str,
    pub artifact: PathBuf,
    #[source]
    pub source: Box<dyn std::error::Error>,
}

/// Applies `step` to every artifact of `from`, writing the artifact of the
/// same stem in `to`.
///
/// Inputs are processed in Frame Index order.
/// The first failure stops the stage. Returns the number of artifacts
/// written.
pub fn map_artifacts<F>(
    staging: &StagingArea,
    from: Stage,
    to: Stage,
    label: &'static str,
    logger: &mut dyn PipelineLogger,
    mut step: F,
) -> Result<usize, Box<dyn std::error::Error>>
where
    F: FnMut(&Path, &Path) -> Result<(), Box<dyn std::error::Error>>,
{
    let inputs = staging.artifacts(from)?;
    if inputs.is_empty() {
        return Err(format!(
            "No .{} artifacts in {}",
            from.extension(),
            staging.dir(from).display()
        )
        .into());
    }
    staging.ensure(to)?;

    let total = inputs.len();
    for (i, input) in inputs.iter().enumerate() {
        let output = staging
            .counterpart(to, input)
            .ok_or_else(|| format!("Artifact without a file name: {}", input.display()))?;

        let started = Instant::now();
        step(input, &output).map_err(|source| FrameError {
            stage: label,
            artifact: input.clone(),
            source,
        })?;
        logger.timing(label, started.elapsed().as_secs_f64() * 1000.0);
        logger.progress(i + 1, total);
    }
    Ok(total)
}
