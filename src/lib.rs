//! # discsplit
//!
//! Frame-accurate DVD title and chapter ranges.
//!
//! A DVD describes its chapters twice: once in the IFO files, as authored
//! playback times, and once implicitly, in the frames an indexer actually
//! decodes from the VOBs. The two rarely agree exactly. `discsplit` turns the
//! IFO timing into frame offsets, finds the menu/splash segment the IFOs do
//! not mention, cuts the decoded stream into titles, and trims authored
//! chapters that run past the decoded frames.
//!
//! Decoding, IFO parsing and indexer invocation stay outside the crate: the
//! decoded stream is anything implementing [`FrameSequence`], IFO timing is
//! a list of [`VtsPgci`], and indexer output is an [`IndexDescriptor`].
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use discsplit::{
//!     ChapterSelector, DiscTitles, FrameRateCode, IndexDescriptor, PlaybackTime,
//!     ProgramChain, SourceFrames, SplitOptions, VtsPgci, compute_chapter_offsets,
//! };
//!
//! let chain = ProgramChain::new(vec![
//!     PlaybackTime::new(0, 0, 3, 10, FrameRateCode::Ntsc),
//!     PlaybackTime::new(0, 0, 10, 0, FrameRateCode::Ntsc),
//! ]);
//! let info = Arc::new(compute_chapter_offsets(&[VtsPgci::new(vec![chain])])?);
//!
//! // The indexer only decoded 300 frames; the IFO claims 400.
//! let disc = DiscTitles::new(
//!     info,
//!     &IndexDescriptor::D2v { header_field_length: 0 },
//!     SourceFrames::new(300),
//!     SplitOptions::new().with_safe_indices(true),
//! );
//!
//! assert_eq!(disc.joined()?.chapters, vec![0, 100, 300]);
//! let last = disc.title(Some(0), Some(&ChapterSelector::Index(-1)))?;
//! assert!(last.into_clip().is_some());
//! # Ok::<(), discsplit::DiscSplitError>(())
//! ```
//!
//! ## Pieces
//!
//! - [`compute_chapter_offsets`] — playback times to cumulative offsets,
//!   rejecting variable frame rate titles
//! - [`estimate_menu_length`] — leading menu frames from indexer hints
//! - [`split()`] / [`join()`] — per-title clips and the joined disc view
//! - [`reconcile()`] — trim chapters that overrun the decoded stream
//! - [`resolve_range`] — chapter selectors to clip slices
//! - [`DiscTitles`] and [`IfoCache`] — lazy per-disc orchestration

pub mod config;
pub mod disc;
pub mod error;
pub mod frames;
pub mod menu;
pub mod range;
pub mod reconcile;
pub mod split;
pub mod timing;

pub use config::SplitOptions;
pub use disc::{Diagnostic, DiscLayout, DiscTitles, IfoCache};
pub use error::DiscSplitError;
pub use frames::{FrameSequence, SourceFrames};
pub use menu::{IndexDescriptor, IndexedSegment, MENU_SEGMENT_THRESHOLD, estimate_menu_length};
pub use range::{ChapterSelector, ResolvedFrames, TitleSlice, resolve_frames, resolve_range};
pub use reconcile::{
    EndpointContext, EndpointPolicy, LegacyEndpoint, PackedEndpoint, is_overrun, reconcile,
    reconcile_chapters,
};
pub use split::{JoinedState, SplitState, join, split};
pub use timing::{
    FrameRate, FrameRateCode, IfoInfo, PlaybackTime, ProgramChain, VtsPgci,
    compute_chapter_offsets,
};
