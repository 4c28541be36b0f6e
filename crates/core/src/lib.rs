//! Core of the ASCII video converter.
//!
//! Each concern is split into a `domain` layer (traits and plain types) and
//! an `infrastructure` layer (FFmpeg, `image` and command-line adapters).
//! `pipeline` wires them into the four conversion steps.

pub mod pipeline;
pub mod shared;
pub mod text;
pub mod video;
