//! Decoded frame sequences.
//!
//! Splitting never touches pixels: it only needs an ordered sequence of
//! frames that can be cut and glued back together. [`FrameSequence`] is that
//! interface. Decoders plug their own clip type in; [`SourceFrames`] is a
//! lightweight implementation that tracks which source frames a clip is made
//! of, and `Vec<T>` works for in-memory frames.

use std::ops::Range;

/// An ordered, immutable sequence of frames.
pub trait FrameSequence: Clone {
    /// Number of frames in the sequence.
    fn frame_count(&self) -> u64;

    /// Frames `start..end`.
    ///
    /// Bounds past the end are clamped to the sequence length, and an
    /// inverted range yields an empty sequence.
    fn slice(&self, start: u64, end: u64) -> Self;

    /// This sequence followed by `other`.
    fn concat(&self, other: &Self) -> Self;
}

impl<T: Clone> FrameSequence for Vec<T> {
    fn frame_count(&self) -> u64 {
        self.len() as u64
    }

    fn slice(&self, start: u64, end: u64) -> Self {
        let end = (end as usize).min(self.len());
        let start = (start as usize).min(end);
        self[start..end].to_vec()
    }

    fn concat(&self, other: &Self) -> Self {
        let mut joined = Vec::with_capacity(self.len() + other.len());
        joined.extend_from_slice(self);
        joined.extend_from_slice(other);
        joined
    }
}

/// A clip described by the source frame ranges it is built from.
///
/// Adjacent ranges are merged, so slicing a clip and concatenating the
/// pieces back in order gives back the original ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFrames {
    ranges: Vec<Range<u64>>,
}

impl SourceFrames {
    /// A clip covering source frames `0..frame_count`.
    pub fn new(frame_count: u64) -> Self {
        Self::from_ranges([0..frame_count])
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = Range<u64>>) -> Self {
        let mut frames = SourceFrames::default();
        for range in ranges {
            frames.push(range);
        }
        frames
    }

    /// Source frame ranges in playback order.
    pub fn ranges(&self) -> &[Range<u64>] {
        &self.ranges
    }

    fn push(&mut self, range: Range<u64>) {
        if range.is_empty() {
            return;
        }
        match self.ranges.last_mut() {
            Some(last) if last.end == range.start => last.end = range.end,
            _ => self.ranges.push(range),
        }
    }
}

impl FrameSequence for SourceFrames {
    fn frame_count(&self) -> u64 {
        self.ranges.iter().map(|range| range.end - range.start).sum()
    }

    fn slice(&self, start: u64, end: u64) -> Self {
        let mut sliced = SourceFrames::default();
        let mut position = 0;

        for range in &self.ranges {
            let length = range.end - range.start;
            let local_start = start.saturating_sub(position).min(length);
            let local_end = end.saturating_sub(position).min(length);
            if local_start < local_end {
                sliced.push(range.start + local_start..range.start + local_end);
            }
            position += length;
            if position >= end {
                break;
            }
        }

        sliced
    }

    fn concat(&self, other: &Self) -> Self {
        let mut joined = self.clone();
        for range in &other.ranges {
            joined.push(range.clone());
        }
        joined
    }
}
