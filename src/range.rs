//! Chapter selection.
//!
//! A [`ChapterSelector`] picks chapters out of a title (or the joined disc)
//! the way a user thinks about them: by index, counting back from the end
//! with negative numbers, or as an inclusive span with optional open ends.
//! [`resolve_frames`] turns a selector into frame ranges and
//! [`resolve_range`] cuts those ranges out of a clip.
//!
//! # Example
//!
//! ```
//! use discsplit::{ChapterSelector, ResolvedFrames, resolve_frames};
//!
//! let offsets: [u64; 4] = [0, 100, 250, 400];
//! let last = resolve_frames(&offsets, &ChapterSelector::Index(-1))?;
//! assert_eq!(last, ResolvedFrames::Range(250..400));
//!
//! let span: ChapterSelector = "1:".parse()?;
//! assert_eq!(resolve_frames(&offsets, &span)?, ResolvedFrames::Range(100..400));
//! # Ok::<(), discsplit::DiscSplitError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::Range;
use std::str::FromStr;

use crate::error::DiscSplitError;
use crate::frames::FrameSequence;

/// Which chapters to take from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterSelector {
    /// A single chapter. Negative values count back from the end.
    Index(i64),
    /// An inclusive span of chapters. `None` leaves that side open.
    Span(Option<i64>, Option<i64>),
    /// Several selections, resolved in order.
    List(Vec<ChapterSelector>),
}

impl Display for ChapterSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ChapterSelector::Index(index) => write!(f, "{index}"),
            ChapterSelector::Span(start, end) => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                Ok(())
            }
            ChapterSelector::List(selectors) => {
                for (position, selector) in selectors.iter().enumerate() {
                    if position > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{selector}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parses `3`, `-1`, `1:3`, `:2`, `2:`, `:` and comma separated lists of
/// those, e.g. `0,2:3,-1`.
impl FromStr for ChapterSelector {
    type Err = DiscSplitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.contains(',') {
            return trimmed
                .split(',')
                .map(parse_single)
                .collect::<Result<Vec<_>, _>>()
                .map(ChapterSelector::List);
        }
        parse_single(trimmed)
    }
}

fn parse_single(value: &str) -> Result<ChapterSelector, DiscSplitError> {
    let value = value.trim();
    let invalid = || DiscSplitError::InvalidSelector(value.to_string());

    let parse_bound = |bound: &str| -> Result<Option<i64>, DiscSplitError> {
        let bound = bound.trim();
        if bound.is_empty() {
            Ok(None)
        } else {
            bound.parse().map(Some).map_err(|_| invalid())
        }
    };

    match value.split_once(':') {
        Some((start, end)) => Ok(ChapterSelector::Span(parse_bound(start)?, parse_bound(end)?)),
        None => parse_bound(value)?
            .map(ChapterSelector::Index)
            .ok_or_else(invalid),
    }
}

/// Frame ranges picked by a selector, shaped like the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFrames {
    Range(Range<u64>),
    List(Vec<ResolvedFrames>),
}

/// Clips picked by a selector, shaped like the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSlice<S> {
    Clip(S),
    List(Vec<TitleSlice<S>>),
}

impl<S> TitleSlice<S> {
    /// The clip, if this is a single selection.
    pub fn into_clip(self) -> Option<S> {
        match self {
            TitleSlice::Clip(clip) => Some(clip),
            TitleSlice::List(_) => None,
        }
    }

    /// The selections, if this is a list.
    pub fn into_list(self) -> Option<Vec<TitleSlice<S>>> {
        match self {
            TitleSlice::Clip(_) => None,
            TitleSlice::List(slices) => Some(slices),
        }
    }
}

/// Resolve `selector` against chapter `offsets` into frame ranges.
///
/// For `n` offsets:
///
/// - `Index(0)` is `offsets[0]..offsets[1]` and `Index(n - 1)` is
///   `offsets[n - 2]..offsets[n - 1]`;
/// - a negative index `i` is `offsets[n - 1 + i]..offsets[n + i]`;
/// - any other index `i` is `offsets[i]..offsets[i + 1]`;
/// - `Span(start, end)` is `offsets[start]..offsets[end + 1]`, where an open
///   start is 0, an open end is `n - 1`, and a negative bound `b` is
///   `n - 1 + b`.
///
/// # Errors
///
/// - [`DiscSplitError::EmptyMetadata`] for fewer than two offsets.
/// - [`DiscSplitError::IndexOutOfRange`] if an offset index lands outside
///   `0..n`.
/// - [`DiscSplitError::InvalidRange`] if the range is empty or reversed.
pub fn resolve_frames(
    offsets: &[u64],
    selector: &ChapterSelector,
) -> Result<ResolvedFrames, DiscSplitError> {
    let len = offsets.len();
    if len < 2 {
        return Err(DiscSplitError::EmptyMetadata(format!(
            "{len} chapter offset(s), at least 2 are needed to select a chapter"
        )));
    }

    let n = len as i64;
    let at = |index: i64| -> Result<u64, DiscSplitError> {
        usize::try_from(index)
            .ok()
            .and_then(|position| offsets.get(position).copied())
            .ok_or(DiscSplitError::IndexOutOfRange { index, len })
    };

    let (start, end) = match *selector {
        ChapterSelector::List(ref selectors) => {
            return selectors
                .iter()
                .map(|selector| resolve_frames(offsets, selector))
                .collect::<Result<Vec<_>, _>>()
                .map(ResolvedFrames::List);
        }
        ChapterSelector::Index(index) if index == n - 1 => (n - 2, n - 1),
        ChapterSelector::Index(0) => (0, 1),
        ChapterSelector::Index(index) if index < 0 => (n - 1 + index, n + index),
        ChapterSelector::Index(index) => (index, past_index(index, len)?),
        ChapterSelector::Span(start, end) => {
            let start = match start {
                None => 0,
                Some(start) if start < 0 => n - 1 + start,
                Some(start) => start,
            };
            let end = match end {
                None => n - 1,
                Some(end) if end < 0 => n - 1 + end,
                Some(end) => past_index(end, len)?,
            };
            (start, end)
        }
    };

    let (start, end) = (at(start)?, at(end)?);
    if start >= end {
        return Err(DiscSplitError::InvalidRange { start, end });
    }

    Ok(ResolvedFrames::Range(start..end))
}

fn past_index(index: i64, len: usize) -> Result<i64, DiscSplitError> {
    index
        .checked_add(1)
        .ok_or(DiscSplitError::IndexOutOfRange { index, len })
}

/// Cut the chapters picked by `selector` out of `clip`.
///
/// # Errors
///
/// Everything [`resolve_frames`] returns, plus
/// [`DiscSplitError::FrameOutOfRange`] when a range ends past the clip.
pub fn resolve_range<S: FrameSequence>(
    offsets: &[u64],
    clip: &S,
    selector: &ChapterSelector,
) -> Result<TitleSlice<S>, DiscSplitError> {
    let resolved = resolve_frames(offsets, selector)?;
    cut(clip, resolved)
}

fn cut<S: FrameSequence>(clip: &S, resolved: ResolvedFrames) -> Result<TitleSlice<S>, DiscSplitError> {
    match resolved {
        ResolvedFrames::Range(range) => {
            let total_frames = clip.frame_count();
            if range.end > total_frames {
                return Err(DiscSplitError::FrameOutOfRange {
                    frame_number: range.end,
                    total_frames,
                });
            }
            Ok(TitleSlice::Clip(clip.slice(range.start, range.end)))
        }
        ResolvedFrames::List(ranges) => ranges
            .into_iter()
            .map(|range| cut(clip, range))
            .collect::<Result<Vec<_>, _>>()
            .map(TitleSlice::List),
    }
}

#[cfg(test)]
mod tests {
    use super::ChapterSelector;

    #[test]
    fn parse_selector_forms() {
        assert_eq!("3".parse::<ChapterSelector>().unwrap(), ChapterSelector::Index(3));
        assert_eq!(" -1 ".parse::<ChapterSelector>().unwrap(), ChapterSelector::Index(-1));
        assert_eq!(
            "1:3".parse::<ChapterSelector>().unwrap(),
            ChapterSelector::Span(Some(1), Some(3))
        );
        assert_eq!(
            ":-2".parse::<ChapterSelector>().unwrap(),
            ChapterSelector::Span(None, Some(-2))
        );
        assert_eq!(":".parse::<ChapterSelector>().unwrap(), ChapterSelector::Span(None, None));
    }

    #[test]
    fn parse_selector_list() {
        let selector: ChapterSelector = "0,2:,-1".parse().unwrap();
        assert_eq!(
            selector,
            ChapterSelector::List(vec![
                ChapterSelector::Index(0),
                ChapterSelector::Span(Some(2), None),
                ChapterSelector::Index(-1),
            ])
        );
        assert_eq!(selector.to_string(), "0,2:,-1");
    }

    #[test]
    fn parse_selector_rejects_garbage() {
        assert!("".parse::<ChapterSelector>().is_err());
        assert!("a".parse::<ChapterSelector>().is_err());
        assert!("1:b".parse::<ChapterSelector>().is_err());
        assert!("1,".parse::<ChapterSelector>().is_err());
    }
}
