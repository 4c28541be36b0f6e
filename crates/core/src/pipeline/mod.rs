pub mod compose_video_use_case;
pub mod convert_video_use_case;
pub mod extract_frames_use_case;
pub mod frame_stage;
pub mod pipeline_logger;
pub mod rasterize_use_case;
pub mod render_text_use_case;
