use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::{
    IMAGE_STAGE_DIR, IMAGE_STAGE_EXTENSION, RASTER_STAGE_DIR, RASTER_STAGE_EXTENSION,
    TEXT_STAGE_DIR, TEXT_STAGE_EXTENSION,
};
use super::frame_index::FrameIndex;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("failed to create staging directory {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list staging directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One transient hand-off point between two pipeline stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decoded source frames.
    Images,
    /// Character-grid markup rendered from each image.
    Text,
    /// Markup rasterized back into an image.
    Raster,
}

impl Stage {
    pub const ALL: &[Stage] = &[Stage::Images, Stage::Text, Stage::Raster];

    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Images => IMAGE_STAGE_DIR,
            Stage::Text => TEXT_STAGE_DIR,
            Stage::Raster => RASTER_STAGE_DIR,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Stage::Images => IMAGE_STAGE_EXTENSION,
            Stage::Text => TEXT_STAGE_EXTENSION,
            Stage::Raster => RASTER_STAGE_EXTENSION,
        }
    }
}

/// The three staging directories under a working directory.
///
/// Nothing is created up front: each stage calls [`StagingArea::ensure`]
/// for its own output directory, so a run that never starts leaves the
/// working directory untouched.
#[derive(Clone, Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// Creates the stage directory if absent and returns its path.
    pub fn ensure(&self, stage: Stage) -> Result<PathBuf, StagingError> {
        let path = self.dir(stage);
        fs::create_dir_all(&path).map_err(|source| StagingError::Create {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn artifact_path(&self, stage: Stage, index: FrameIndex) -> PathBuf {
        self.dir(stage).join(index.file_name(stage.extension()))
    }

    /// Path of the artifact in `stage` that shares `artifact`'s stem.
    pub fn counterpart(&self, stage: Stage, artifact: &Path) -> Option<PathBuf> {
        let stem = artifact.file_stem()?;
        let mut name = stem.to_os_string();
        name.push(".");
        name.push(stage.extension());
        Some(self.dir(stage).join(name))
    }

    /// Artifacts of `stage`, in Frame Index order.
    ///
    /// A stage directory that does not exist yet has no artifacts.
    pub fn artifacts(&self, stage: Stage) -> Result<Vec<PathBuf>, StagingError> {
        match list_artifacts(&self.dir(stage), stage.extension()) {
            Err(StagingError::List { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// Deletes every tracked artifact of every stage.
    ///
    /// Untracked files and the directories themselves are kept. Returns the
    /// number of files removed.
    pub fn purge(&self) -> Result<usize, StagingError> {
        let mut removed = 0;
        for &stage in Stage::ALL {
            for path in self.artifacts(stage)? {
                fs::remove_file(&path).map_err(|source| StagingError::Remove {
                    path: path.clone(),
                    source,
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Regular files in `dir` whose extension is exactly `extension`.
///
/// Files are ordered by the Frame Index in their stem, compared as numbers
/// so that stems wider than the padding still sort after narrower ones.
/// Files whose stem is not a Frame Index come last, by name.
pub fn list_artifacts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StagingError> {
    let list_error = |source: io::Error| StagingError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if path.is_file() && has_extension(&path, extension) {
            paths.push(path);
        }
    }
    paths.sort_by_cached_key(|path| {
        let index = FrameIndex::from_path(path);
        (index.is_none(), index, path.clone())
    });
    Ok(paths)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}
