use std::path::Path;

use crate::shared::video_metadata::{MediaInfo, VideoMetadata};
use crate::video::domain::media_probe::MediaProbe;

use super::ffmpeg_reader::is_video_track;

/// Reads container and stream headers with libavformat.
///
/// Only headers are inspected; no frame is decoded.
pub struct FfmpegProbe;

impl FfmpegProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaProbe for FfmpegProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let has_audio = ictx
            .streams()
            .any(|s| s.parameters().medium() == ffmpeg_next::media::Type::Audio);

        let video = match ictx.streams().find(is_video_track) {
            Some(stream) => {
                let codec_ctx =
                    ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
                let decoder = codec_ctx.decoder().video()?;
                let rate = stream.rate();
                let fps = if rate.denominator() != 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                };
                Some(VideoMetadata {
                    width: decoder.width(),
                    height: decoder.height(),
                    fps,
                    total_frames: stream.frames().max(0) as usize,
                    codec: stream.parameters().id().name().to_string(),
                    source_path: Some(path.to_path_buf()),
                })
            }
            None => None,
        };

        log::debug!(
            "Probed {}: video={}, audio={}",
            path.display(),
            video.is_some(),
            has_audio
        );

        Ok(MediaInfo { video, has_audio })
    }
}
