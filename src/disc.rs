//! Whole-disc title access.
//!
//! [`DiscTitles`] ties the pieces together for one disc: it splits the
//! decoded stream on first use, runs at most one reconciliation pass, and
//! answers title/chapter queries against the result. [`IfoCache`] memoizes
//! IFO timing per mount path, and [`DiscLayout`] is the on-disk JSON form
//! of everything the external parsers and indexer report.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use discsplit::{
//!     ChapterSelector, DiscTitles, FrameSequence, IndexDescriptor, SourceFrames,
//!     SplitOptions, compute_chapter_offsets,
//! };
//! # use discsplit::{FrameRateCode, PlaybackTime, ProgramChain, VtsPgci};
//! # let chain = ProgramChain::new(vec![
//! #     PlaybackTime::new(0, 0, 3, 10, FrameRateCode::Ntsc),
//! #     PlaybackTime::new(0, 0, 5, 0, FrameRateCode::Ntsc),
//! # ]);
//! # let ifos = vec![VtsPgci::new(vec![chain])];
//!
//! let info = Arc::new(compute_chapter_offsets(&ifos)?);
//! let descriptor = IndexDescriptor::D2v { header_field_length: 0 };
//! let disc = DiscTitles::new(info, &descriptor, SourceFrames::new(250), SplitOptions::new());
//!
//! let chapter = disc.title(Some(0), Some(&ChapterSelector::Index(1)))?;
//! assert_eq!(chapter.into_clip().map(|clip| clip.frame_count()), Some(150));
//! # Ok::<(), discsplit::DiscSplitError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SplitOptions;
use crate::error::DiscSplitError;
use crate::frames::FrameSequence;
use crate::menu::{IndexDescriptor, estimate_menu_length};
use crate::range::{ChapterSelector, TitleSlice, resolve_range};
use crate::reconcile::reconcile;
use crate::split::{JoinedState, SplitState, join, split};
use crate::timing::{FrameRate, IfoInfo, VtsPgci, compute_chapter_offsets};

/// Everything known about a disc before splitting, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscLayout {
    /// Program chains of every VTS IFO, in file order.
    pub ifos: Vec<VtsPgci>,
    /// Indexer sidecar summary.
    pub index: IndexDescriptor,
    /// Frames the indexer decoded, menu included.
    pub total_frames: u64,
}

impl DiscLayout {
    /// Read a layout from a JSON file.
    ///
    /// # Errors
    ///
    /// [`DiscSplitError::IoError`] or [`DiscSplitError::JsonError`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DiscSplitError> {
        let path = path.as_ref();
        log::debug!("Reading disc layout from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, DiscSplitError> {
        Ok(serde_json::from_str(contents)?)
    }
}

/// Non-fatal findings from splitting a disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// Chapters claim more frames than were decoded and were left as is.
    /// Chapters near the end of the disc and negative indices may fail to
    /// resolve.
    ChapterOverrun { chapter_end: u64, total_frames: u64 },
    /// Chapters claimed more frames than were decoded and were trimmed.
    Reconciled { chapter_end: u64, trimmed_end: u64 },
}

struct SplitTitles<S> {
    split: SplitState<S>,
    joined: JoinedState<S>,
    diagnostics: Vec<Diagnostic>,
}

/// The titles of one disc, split on first use.
pub struct DiscTitles<S> {
    ifo_info: Arc<IfoInfo>,
    source: S,
    menu_length: u64,
    options: SplitOptions,
    titles: OnceCell<SplitTitles<S>>,
}

impl<S: FrameSequence> DiscTitles<S> {
    /// Prepare a disc for splitting.
    ///
    /// The menu length comes from `options` when set, otherwise from
    /// [`estimate_menu_length`]. No splitting happens until a title is
    /// requested.
    pub fn new(
        ifo_info: Arc<IfoInfo>,
        descriptor: &IndexDescriptor,
        source: S,
        options: SplitOptions,
    ) -> Self {
        let menu_length = options
            .menu_length()
            .unwrap_or_else(|| estimate_menu_length(descriptor));

        Self {
            ifo_info,
            source,
            menu_length,
            options,
            titles: OnceCell::new(),
        }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.ifo_info.frame_rate
    }

    pub fn menu_length(&self) -> u64 {
        self.menu_length
    }

    pub fn ifo_info(&self) -> &IfoInfo {
        &self.ifo_info
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Per-title chapters and clips.
    pub fn split_titles(&self) -> Result<&SplitState<S>, DiscSplitError> {
        Ok(&self.titles()?.split)
    }

    /// All titles joined into one clip and chapter list.
    pub fn joined(&self) -> Result<&JoinedState<S>, DiscSplitError> {
        Ok(&self.titles()?.joined)
    }

    pub fn diagnostics(&self) -> Result<&[Diagnostic], DiscSplitError> {
        Ok(&self.titles()?.diagnostics)
    }

    /// Select chapters from one title, or from the joined disc when
    /// `title_index` is `None`.
    ///
    /// Negative title indices count back from the last title (the menu
    /// pseudo-title, if there is one). Without a selector the whole title is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`DiscSplitError::TitleOutOfRange`] for an unknown title.
    /// - Anything splitting or [`resolve_range`] can return.
    pub fn title(
        &self,
        title_index: Option<i64>,
        selector: Option<&ChapterSelector>,
    ) -> Result<TitleSlice<S>, DiscSplitError> {
        let titles = self.titles()?;

        let (chapters, clip) = match title_index {
            None => (titles.joined.chapters.as_slice(), &titles.joined.clip),
            Some(index) => {
                let title_count = titles.split.title_count();
                let position = if index < 0 {
                    index + title_count as i64
                } else {
                    index
                };
                let position = usize::try_from(position)
                    .ok()
                    .filter(|&position| position < title_count)
                    .ok_or(DiscSplitError::TitleOutOfRange {
                        title_index: index,
                        title_count,
                    })?;
                (
                    titles.split.chapters[position].as_slice(),
                    &titles.split.clips[position],
                )
            }
        };

        match selector {
            Some(selector) => resolve_range(chapters, clip, selector),
            None => Ok(TitleSlice::Clip(clip.clone())),
        }
    }

    fn titles(&self) -> Result<&SplitTitles<S>, DiscSplitError> {
        self.titles.get_or_try_init(|| self.split_and_join())
    }

    fn split_and_join(&self) -> Result<SplitTitles<S>, DiscSplitError> {
        let state = split(&self.ifo_info.chapters, self.menu_length, &self.source)?;
        let joined = join(&state)?;

        let total_frames = self.source.frame_count();
        let chapter_end = joined.chapter_end();
        if chapter_end <= total_frames {
            return Ok(SplitTitles {
                split: state,
                joined,
                diagnostics: Vec::new(),
            });
        }

        if !self.options.safe_indices() {
            log::warn!(
                "Chapters end at frame {chapter_end} but only {total_frames} frames were \
                 decoded; the last chapters and negative indices may fail. Enable safe \
                 indices to trim them."
            );
            return Ok(SplitTitles {
                split: state,
                joined,
                diagnostics: vec![Diagnostic::ChapterOverrun {
                    chapter_end,
                    total_frames,
                }],
            });
        }

        let state = reconcile(&state, &self.source, self.options.endpoint_policy())?;
        let joined = join(&state)?;
        let trimmed_end = joined.chapter_end();
        log::info!("Trimmed chapters from {chapter_end} to {trimmed_end} frames");

        Ok(SplitTitles {
            split: state,
            joined,
            diagnostics: vec![Diagnostic::Reconciled {
                chapter_end,
                trimmed_end,
            }],
        })
    }
}

/// IFO timing memoized per disc mount path.
///
/// Disc metadata does not change while a process runs, so entries are never
/// invalidated. Concurrent requests for the same path compute it once;
/// failed computations are not cached.
#[derive(Default)]
pub struct IfoCache {
    entries: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<IfoInfo>>>>>,
}

impl IfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timing for `mount_path`, loading its IFOs with `load` on first use.
    ///
    /// # Errors
    ///
    /// Whatever `load` or [`compute_chapter_offsets`] return.
    pub fn get_or_load<F>(&self, mount_path: &Path, load: F) -> Result<Arc<IfoInfo>, DiscSplitError>
    where
        F: FnOnce(&Path) -> Result<Vec<VtsPgci>, DiscSplitError>,
    {
        let cell = self
            .entries
            .lock()
            .entry(mount_path.to_path_buf())
            .or_default()
            .clone();

        cell.get_or_try_init(|| {
            log::debug!("Loading IFO timing for {}", mount_path.display());
            let ifos = load(mount_path)?;
            compute_chapter_offsets(&ifos).map(Arc::new)
        })
        .cloned()
    }

    /// Cached timing for `mount_path`, if it has been loaded.
    pub fn get(&self, mount_path: &Path) -> Option<Arc<IfoInfo>> {
        self.entries
            .lock()
            .get(mount_path)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of mount paths with loaded timing.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
