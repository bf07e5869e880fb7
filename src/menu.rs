//! Menu/splash length estimation from indexer output.
//!
//! Many discs start the first VOB with a menu or splash segment that no
//! program chain accounts for. The indexer sidecar gives enough hints to
//! guess its length in frames.

use serde::{Deserialize, Serialize};

/// First-segment size above which the first segment is taken to be a menu.
pub const MENU_SEGMENT_THRESHOLD: u64 = 2 << 12;

/// One indexed video file (VOB) as reported by the indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedSegment {
    /// File size in the units the indexer reports.
    pub size: u64,
}

/// Sidecar information produced by the external indexer.
///
/// Indexers differ in what they expose, so the descriptor is tagged by
/// indexer family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IndexDescriptor {
    /// D2V sidecars carry the length of the leading first-field segment
    /// directly in their header.
    D2v {
        /// Header field giving the number of leading non-title frames.
        header_field_length: u64,
    },
    /// DGI-style sidecars only list segment sizes and frame data.
    Generic {
        /// Indexed video files in playback order.
        segments: Vec<IndexedSegment>,
        /// Number of frame-data entries recorded for the first segment.
        frame_data_length: u64,
    },
}

/// Estimate how many leading frames of the decoded stream are menu/splash.
///
/// Returns 0 whenever the descriptor gives no clear sign of a menu.
pub fn estimate_menu_length(descriptor: &IndexDescriptor) -> u64 {
    let length = match descriptor {
        IndexDescriptor::D2v {
            header_field_length,
        } => *header_field_length,
        IndexDescriptor::Generic {
            segments,
            frame_data_length,
        } => match segments.first() {
            Some(first) if first.size > MENU_SEGMENT_THRESHOLD => *frame_data_length,
            _ => 0,
        },
    };

    log::debug!("Estimated menu length: {length} frames");
    length
}
