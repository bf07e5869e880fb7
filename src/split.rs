//! Per-title splitting and joining of the decoded stream.
//!
//! [`split`] cuts the decoded stream into one clip per title using the
//! cumulative chapter lengths, and [`join`] glues those clips and their
//! chapter marks back into a single view of the whole disc.

use crate::error::DiscSplitError;
use crate::frames::FrameSequence;

/// The decoded stream cut into titles.
///
/// When the disc has a menu segment, it is the last entry of both
/// `chapters` and `clips`, with chapters `[0, menu_length]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitState<S> {
    /// Title-local chapter offsets, one list per title.
    pub chapters: Vec<Vec<u64>>,
    /// One clip per title, in the same order as `chapters`.
    pub clips: Vec<S>,
    /// Leading menu frames that were moved to the trailing pseudo-title.
    pub menu_length: u64,
}

impl<S> SplitState<S> {
    pub fn title_count(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the last title is the synthetic menu title.
    pub fn has_menu(&self) -> bool {
        self.menu_length > 0
    }

    /// Chapter lists of the real titles, without the menu pseudo-title.
    pub fn content_chapters(&self) -> &[Vec<u64>] {
        let content = self.chapters.len() - usize::from(self.has_menu()).min(self.chapters.len());
        &self.chapters[..content]
    }
}

/// All titles as one clip with one chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedState<S> {
    pub chapters: Vec<u64>,
    pub clip: S,
}

impl<S> JoinedState<S> {
    /// The last chapter offset, i.e. the number of frames the chapters claim.
    pub fn chapter_end(&self) -> u64 {
        self.chapters.last().copied().unwrap_or(0)
    }
}

/// Cut `stream` into one clip per title.
///
/// The first `menu_length` frames are skipped before the titles are cut,
/// and re-added as a trailing pseudo-title with chapters `[0, menu_length]`.
/// Titles reaching past the end of the stream come out short or empty.
///
/// # Errors
///
/// [`DiscSplitError::EmptyMetadata`] if a title has no chapter offsets.
pub fn split<S: FrameSequence>(
    chapters: &[Vec<u64>],
    menu_length: u64,
    stream: &S,
) -> Result<SplitState<S>, DiscSplitError> {
    let mut title_lengths = Vec::with_capacity(chapters.len());
    for (title, offsets) in chapters.iter().enumerate() {
        let last = offsets.last().ok_or_else(|| {
            DiscSplitError::EmptyMetadata(format!("title {title} has no chapter offsets"))
        })?;
        title_lengths.push(*last);
    }

    let content = stream.slice(menu_length, stream.frame_count());

    let mut clips = Vec::with_capacity(chapters.len() + 1);
    let mut start = 0;
    for length in title_lengths {
        clips.push(content.slice(start, start + length));
        start += length;
    }

    let mut chapters = chapters.to_vec();
    if menu_length > 0 {
        clips.push(stream.slice(0, menu_length));
        chapters.push(vec![0, menu_length]);
    }

    log::debug!(
        "Split {} frames into {} titles (menu length {menu_length})",
        stream.frame_count(),
        clips.len()
    );

    Ok(SplitState {
        chapters,
        clips,
        menu_length,
    })
}

/// Concatenate all titles of `state` into one clip and chapter list.
///
/// The leading 0 of every title after the first is dropped and the rest of
/// its offsets are shifted by the running end of the joined list.
///
/// # Errors
///
/// [`DiscSplitError::EmptyMetadata`] if `state` has no titles.
pub fn join<S: FrameSequence>(state: &SplitState<S>) -> Result<JoinedState<S>, DiscSplitError> {
    let (first_clip, other_clips) = state
        .clips
        .split_first()
        .ok_or_else(|| DiscSplitError::EmptyMetadata("no titles to join".to_string()))?;

    let clip = other_clips
        .iter()
        .fold(first_clip.clone(), |joined, clip| joined.concat(clip));

    Ok(JoinedState {
        chapters: join_chapters(&state.chapters),
        clip,
    })
}

pub(crate) fn join_chapters(chapters: &[Vec<u64>]) -> Vec<u64> {
    let mut titles = chapters.iter();
    let mut joined = titles.next().cloned().unwrap_or_default();

    for offsets in titles {
        let base = joined.last().copied().unwrap_or(0);
        joined.extend(
            offsets
                .iter()
                .filter(|&&offset| offset != 0)
                .map(|offset| offset.saturating_add(base)),
        );
    }

    joined
}
