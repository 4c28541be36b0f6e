pub mod image_writer;
pub mod media_probe;
pub mod video_reader;
pub mod video_writer;
