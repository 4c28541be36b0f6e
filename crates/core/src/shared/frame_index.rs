use std::fmt;
use std::path::Path;

use super::constants::FRAME_INDEX_WIDTH;

/// Zero-based ordinal of a decoded frame.
///
/// Every artifact derived from a frame is named after its index, so the
/// stem is the join key between pipeline stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub usize);

impl FrameIndex {
    /// Zero-padded decimal stem, e.g. `0000042`.
    pub fn stem(self) -> String {
        format!("{:0width$}", self.0, width = FRAME_INDEX_WIDTH)
    }

    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{extension}", self.stem())
    }

    /// Parses a stem produced by [`FrameIndex::stem`].
    ///
    /// Stems shorter than the padding width, or containing anything other
    /// than ASCII digits, are rejected.
    pub fn from_stem(stem: &str) -> Option<Self> {
        if stem.len() < FRAME_INDEX_WIDTH || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok().map(FrameIndex)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::from_stem)
    }
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}
