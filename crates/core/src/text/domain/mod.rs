pub mod rasterizer;
pub mod text_geometry;
pub mod text_renderer;
