pub mod img2txt_renderer;
pub mod wkhtml_rasterizer;
