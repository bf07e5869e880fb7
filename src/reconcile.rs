//! Recovery for chapters that overrun the decoded stream.
//!
//! IFO chapter lengths regularly add up to more frames than the indexer
//! actually decodes. Left alone, the last chapters of the disc then point
//! past the end of the clip. Reconciliation trims the first overrunning
//! title at a safe endpoint and collapses every later title to a single
//! frame, so every chapter resolves to a real, non-empty frame range.
//!
//! The safe endpoint is a spacing rule, not something the disc encodes, so
//! it is pluggable through [`EndpointPolicy`].

use crate::error::DiscSplitError;
use crate::frames::FrameSequence;
use crate::split::{SplitState, join_chapters, split};

/// Inputs available to an [`EndpointPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointContext {
    /// Frames in the decoded stream, menu included.
    pub total_frames: u64,
    /// Length of the menu pseudo-title, 0 if there is none.
    pub menu_length: u64,
    /// Number of titles in the split, menu pseudo-title included.
    pub title_count: usize,
    /// Number of real titles.
    pub content_titles: usize,
    /// Index of the title being trimmed.
    pub title_index: usize,
}

impl EndpointContext {
    /// Real titles that follow the one being trimmed.
    pub fn titles_after(&self) -> usize {
        self.content_titles.saturating_sub(self.title_index + 1)
    }
}

/// Places the end of a trimmed title.
///
/// The returned value is an absolute frame position in the joined stream.
/// Implementations must be [`Send`] and [`Sync`] so options can be shared
/// between threads.
pub trait EndpointPolicy: Send + Sync {
    fn safe_endpoint(&self, context: &EndpointContext) -> i64;

    /// Short name used in debug output.
    fn name(&self) -> &'static str;
}

/// Ends the trimmed title so that every later title gets exactly one frame
/// and the menu fits behind them: `total - menu - titles_after`.
///
/// With a menu this equals [`LegacyEndpoint`]; without one it is one frame
/// earlier, which keeps the joined chapters inside the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedEndpoint;

impl EndpointPolicy for PackedEndpoint {
    fn safe_endpoint(&self, context: &EndpointContext) -> i64 {
        signed(context.total_frames)
            .saturating_sub(signed(context.menu_length))
            .saturating_sub(signed(context.titles_after()))
    }

    fn name(&self) -> &'static str {
        "packed"
    }
}

/// `total - menu - title_count + index + 2`, with `title_count` counting
/// the menu pseudo-title when present.
///
/// Without a menu this lands one frame past the stream, so reconciliation
/// reports [`DiscSplitError::ChapterOverrun`] instead of trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyEndpoint;

impl EndpointPolicy for LegacyEndpoint {
    fn safe_endpoint(&self, context: &EndpointContext) -> i64 {
        signed(context.total_frames)
            .saturating_sub(signed(context.menu_length))
            .saturating_sub(signed(context.title_count))
            .saturating_add(signed(context.title_index))
            .saturating_add(2)
    }

    fn name(&self) -> &'static str {
        "legacy"
    }
}

/// Saturates at `i64::MAX`; frame counts never get there on a real disc.
fn signed<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

/// Whether chapters of `content` plus the menu claim more than
/// `total_frames` frames.
pub fn is_overrun(content: &[Vec<u64>], menu_length: u64, total_frames: u64) -> bool {
    chapter_total(content, menu_length) > total_frames
}

fn chapter_total(content: &[Vec<u64>], menu_length: u64) -> u64 {
    join_chapters(content)
        .last()
        .copied()
        .unwrap_or(0)
        .saturating_add(menu_length)
}

/// Trim the chapter lists of the real titles so they fit in `total_frames`.
///
/// `content` excludes the menu pseudo-title. Returns `content` unchanged if
/// nothing overruns.
///
/// # Errors
///
/// [`DiscSplitError::ChapterOverrun`] if the policy's endpoint is negative,
/// does not come after the last kept boundary of the title, or still leaves
/// the chapters longer than the stream, or if a frame position does not fit
/// in an `i64`.
pub fn reconcile_chapters(
    content: &[Vec<u64>],
    total_frames: u64,
    menu_length: u64,
    policy: &dyn EndpointPolicy,
) -> Result<Vec<Vec<u64>>, DiscSplitError> {
    if !is_overrun(content, menu_length, total_frames) {
        return Ok(content.to_vec());
    }

    let content_titles = content.len();
    let mut rewritten = Vec::with_capacity(content_titles);
    let mut offset: u64 = 0;

    for (title_index, offsets) in content.iter().enumerate() {
        let context = EndpointContext {
            total_frames,
            menu_length,
            title_count: content_titles + usize::from(menu_length > 0),
            content_titles,
            title_index,
        };
        let endpoint = policy.safe_endpoint(&context);

        let mut cut = None;
        for (position, &boundary) in offsets.iter().enumerate() {
            let absolute = offset
                .checked_add(boundary)
                .and_then(|absolute| i64::try_from(absolute).ok())
                .ok_or(DiscSplitError::ChapterOverrun {
                    title: title_index,
                    boundary: i64::MAX,
                    total_frames,
                })?;
            if absolute > endpoint {
                cut = Some(position);
                break;
            }
        }

        let Some(cut) = cut else {
            rewritten.push(offsets.clone());
            offset = offset.saturating_add(offsets.last().copied().unwrap_or(0));
            continue;
        };

        let mut trimmed = offsets[..cut].to_vec();
        let local_end = u64::try_from(endpoint.saturating_sub(signed(offset)))
            .ok()
            .filter(|&local_end| trimmed.last().is_some_and(|&previous| local_end > previous))
            .ok_or(DiscSplitError::ChapterOverrun {
                title: title_index,
                boundary: endpoint,
                total_frames,
            })?;

        log::debug!(
            "Title {title_index}: trimming chapter {cut} from {} to {local_end}",
            offsets[cut]
        );

        trimmed.push(local_end);
        rewritten.push(trimmed);
        rewritten.extend((title_index + 1..content_titles).map(|_| vec![0, 1]));
        break;
    }

    let end = chapter_total(&rewritten, menu_length);
    if end > total_frames {
        return Err(DiscSplitError::ChapterOverrun {
            title: rewritten.len().saturating_sub(1),
            boundary: signed(end),
            total_frames,
        });
    }

    Ok(rewritten)
}

/// Re-split `stream` with chapters trimmed to fit it.
///
/// Returns a clone of `state` when nothing overruns.
///
/// # Errors
///
/// See [`reconcile_chapters`].
pub fn reconcile<S: FrameSequence>(
    state: &SplitState<S>,
    stream: &S,
    policy: &dyn EndpointPolicy,
) -> Result<SplitState<S>, DiscSplitError> {
    let total_frames = stream.frame_count();
    let content = state.content_chapters();

    if !is_overrun(content, state.menu_length, total_frames) {
        return Ok(state.clone());
    }

    log::debug!(
        "Reconciling {} titles against {total_frames} decoded frames ({} policy)",
        content.len(),
        policy.name()
    );

    let chapters = reconcile_chapters(content, total_frames, state.menu_length, policy)?;
    split(&chapters, state.menu_length, stream)
}
