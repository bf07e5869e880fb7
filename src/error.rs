//! Error types for the `discsplit` crate.
//!
//! This module defines [`DiscSplitError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the title, chapter or
//! frame numbers involved so callers can decide whether to warn, retry with
//! different indexer settings, or abort.

use std::io::Error as IoError;

use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `discsplit` operations.
///
/// Every public function that can fail returns `Result<T, DiscSplitError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscSplitError {
    /// A program chain mixes playback times with different frame-rate codes.
    ///
    /// Variable frame rate discs are not supported.
    #[error("Title {title} mixes frame rates (codes {first} and {other}); VFR is not supported")]
    InconsistentFrameRate {
        /// Index of the offending program chain in the flattened title list.
        title: usize,
        /// Rate code of the first playback time in the chain.
        first: u8,
        /// The first rate code that differed from `first`.
        other: u8,
    },

    /// A playback time carries a rate code that is not a legal DVD value.
    #[error("Unknown DVD frame rate code {0}")]
    UnknownFrameRateCode(u8),

    /// Authored chapters run past the decoded stream and could not be
    /// trimmed back inside it.
    #[error(
        "Chapters overrun the decoded stream in title {title}: \
         boundary {boundary} does not fit in {total_frames} frames"
    )]
    ChapterOverrun {
        /// Title whose boundaries could not be repaired.
        title: usize,
        /// The offending absolute boundary (or computed endpoint).
        boundary: i64,
        /// Number of frames actually decoded.
        total_frames: u64,
    },

    /// A chapter selector resolved to an offset index outside the list.
    #[error("Chapter offset index {index} is out of range (title has {len} offsets)")]
    IndexOutOfRange {
        /// The resolved offset index (after negative-index rules).
        index: i64,
        /// Number of chapter offsets available.
        len: usize,
    },

    /// No playback times or chapter boundaries exist where some are required.
    #[error("No chapter metadata available: {0}")]
    EmptyMetadata(String),

    /// The requested title index does not exist.
    #[error("Title {title_index} is out of range (disc has {title_count} titles)")]
    TitleOutOfRange {
        /// Requested title index.
        title_index: i64,
        /// Number of titles in the split view.
        title_count: usize,
    },

    /// A resolved chapter range reaches past the end of the clip.
    #[error("Frame {frame_number} is out of range (clip has {total_frames} frames)")]
    FrameOutOfRange {
        /// Exclusive end frame that was requested.
        frame_number: u64,
        /// The number of frames in the clip.
        total_frames: u64,
    },

    /// A resolved range is empty or reversed.
    #[error("Invalid range: start ({start}) must be less than end ({end})")]
    InvalidRange {
        /// The start frame of the range.
        start: u64,
        /// The end frame of the range.
        end: u64,
    },

    /// A chapter selector string could not be parsed.
    #[error("Invalid chapter selector {0:?}")]
    InvalidSelector(String),

    /// An I/O error occurred while reading a disc layout.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// A disc layout file was not valid JSON for the expected schema.
    #[error("Layout parse error: {0}")]
    JsonError(#[from] JsonError),
}
