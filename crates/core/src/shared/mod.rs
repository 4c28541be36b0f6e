pub mod constants;
pub mod external_tool;
pub mod frame;
pub mod frame_index;
pub mod staging;
pub mod video_metadata;

#[cfg(test)]
pub(crate) mod test_media;
#[cfg(all(test, unix))]
pub(crate) mod test_tools;
