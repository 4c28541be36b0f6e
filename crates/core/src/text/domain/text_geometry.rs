use crate::shared::constants::{
    TEXT_FORMAT, TEXT_GRID_HEIGHT, TEXT_GRID_WIDTH, TEXT_X_SCALE, TEXT_Y_SCALE,
};

/// Character grid size, font aspect and output format of a rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextGeometry {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Horizontal font scale.
    pub x_scale: u32,
    /// Vertical font scale.
    pub y_scale: u32,
    pub format: String,
}

impl Default for TextGeometry {
    fn default() -> Self {
        Self {
            width: TEXT_GRID_WIDTH,
            height: TEXT_GRID_HEIGHT,
            x_scale: TEXT_X_SCALE,
            y_scale: TEXT_Y_SCALE,
            format: TEXT_FORMAT.to_string(),
        }
    }
}
