use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

/// Track summary of a media file, as reported by a probe.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Metadata of the first video track, if there is one.
    pub video: Option<VideoMetadata>,
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}
