use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::shared::frame::Frame;
use crate::shared::frame_index::FrameIndex;
use crate::shared::staging::list_artifacts;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Adapts a directory of numbered still images to the [`VideoReader`]
/// interface.
///
/// Files are read in Frame Index order, with the same extension matching
/// as the staging area uses. The first image fixes the sequence size: later images
/// of a different size are resized to it, and odd dimensions are cropped
/// down to the nearest even size so the sequence can be encoded as YUV 4:2:0.
pub struct ImageSequenceReader {
    extension: String,
    paths: Vec<PathBuf>,
    source_size: (u32, u32),
    metadata: Option<VideoMetadata>,
}

impl ImageSequenceReader {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            paths: Vec::new(),
            source_size: (0, 0),
            metadata: None,
        }
    }
}

fn even(value: u32) -> u32 {
    value - value % 2
}

/// Brings `img` to `source_size`, then crops it to `target_size`.
fn conform(img: RgbImage, source_size: (u32, u32), target_size: (u32, u32)) -> RgbImage {
    let img = if img.dimensions() != source_size {
        imageops::resize(&img, source_size.0, source_size.1, FilterType::Triangle)
    } else {
        img
    };
    if img.dimensions() != target_size {
        imageops::crop_imm(&img, 0, 0, target_size.0, target_size.1).to_image()
    } else {
        img
    }
}

impl VideoReader for ImageSequenceReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let paths = list_artifacts(path, &self.extension)?;
        let first = paths.first().ok_or_else(|| {
            format!("No .{} images found in {}", self.extension, path.display())
        })?;

        let source_size = image::image_dimensions(first)
            .map_err(|e| format!("Failed to read {}: {e}", first.display()))?;
        let (width, height) = (even(source_size.0), even(source_size.1));
        if width == 0 || height == 0 {
            return Err(format!(
                "{} is {}x{}, too small to encode",
                first.display(),
                source_size.0,
                source_size.1
            )
            .into());
        }
        if (width, height) != source_size {
            log::info!(
                "Cropping image sequence from {}x{} to {width}x{height}",
                source_size.0,
                source_size.1
            );
        }

        let metadata = VideoMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: paths.len(),
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
        };

        self.paths = paths;
        self.source_size = source_size;
        self.metadata = Some(metadata.clone());
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(metadata) = self.metadata.as_ref() else {
            return Box::new(std::iter::once(Err("ImageSequenceReader: not opened".into())));
        };
        let source_size = self.source_size;
        let target_size = (metadata.width, metadata.height);

        Box::new(self.paths.iter().enumerate().map(
            move |(position, path)| -> Result<Frame, Box<dyn std::error::Error>> {
                let index = FrameIndex::from_path(path).map_or(position, |i| i.0);
                let img = image::open(path)
                    .map_err(|e| format!("Failed to read frame {}: {e}", path.display()))?
                    .to_rgb8();
                if img.dimensions() != source_size {
                    log::debug!(
                        "Resizing {} from {:?} to {:?}",
                        path.display(),
                        img.dimensions(),
                        source_size
                    );
                }
                Ok(Frame::from_rgb_image(
                    conform(img, source_size, target_size),
                    index,
                ))
            },
        ))
    }

    fn close(&mut self) {
        self.paths.clear();
        self.metadata = None;
    }
}
