/// Width of the zero-padded Frame Index used as every artifact's file stem.
pub const FRAME_INDEX_WIDTH: usize = 7;

pub const IMAGE_STAGE_DIR: &str = "JPG";
pub const IMAGE_STAGE_EXTENSION: &str = "jpg";
pub const TEXT_STAGE_DIR: &str = "HTML";
pub const TEXT_STAGE_EXTENSION: &str = "html";
pub const RASTER_STAGE_DIR: &str = "PNG";
pub const RASTER_STAGE_EXTENSION: &str = "png";

/// Marker appended to the input's stem to name the output video.
pub const OUTPUT_STEM_SUFFIX: &str = "-ascii";

/// Output frame rate, independent of the source's frame rate.
pub const OUTPUT_FPS: u32 = 24;

pub const TEXT_GRID_WIDTH: u32 = 128;
pub const TEXT_GRID_HEIGHT: u32 = 36;
pub const TEXT_X_SCALE: u32 = 3;
pub const TEXT_Y_SCALE: u32 = 5;
pub const TEXT_FORMAT: &str = "html";

pub const IMG2TXT_PROGRAM: &str = "img2txt";
pub const WKHTMLTOIMAGE_PROGRAM: &str = "wkhtmltoimage";
pub const VIRTUAL_DISPLAY_PROGRAM: &str = "xvfb-run";
