use std::path::Path;

use crate::shared::video_metadata::MediaInfo;

/// Inspects a media file's tracks without decoding it.
pub trait MediaProbe: Send {
    fn probe(&self, path: &Path) -> Result<MediaInfo, Box<dyn std::error::Error>>;
}
