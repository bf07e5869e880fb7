//! IFO playback times to chapter frame offsets.
//!
//! Every DVD program chain lists one playback time per chapter. This module
//! converts those timecodes into cumulative frame offsets per title and
//! validates that the disc uses a single constant frame rate.
//!
//! # Example
//!
//! ```
//! use discsplit::{FrameRateCode, PlaybackTime, ProgramChain, VtsPgci};
//!
//! let chain = ProgramChain::new(vec![
//!     PlaybackTime::new(0, 0, 3, 10, FrameRateCode::Ntsc),
//!     PlaybackTime::new(0, 0, 5, 0, FrameRateCode::Ntsc),
//! ]);
//! let info = discsplit::compute_chapter_offsets(&[VtsPgci::new(vec![chain])])?;
//! assert_eq!(info.chapters, vec![vec![0, 100, 250]]);
//! # Ok::<(), discsplit::DiscSplitError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::error::DiscSplitError;

/// A rational frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    /// 30000/1001, the NTSC rate and the default when a disc has no timing.
    pub const NTSC: FrameRate = FrameRate::new(30000, 1001);
    /// 25/1, the PAL rate.
    pub const PAL: FrameRate = FrameRate::new(25, 1);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Integer frames per timecode second.
    ///
    /// DVD timecodes count 30 frames per second for 30000/1001 material and
    /// 25 for everything else.
    pub fn timecode_base(self) -> u64 {
        if self.numerator == 30000 { 30 } else { 25 }
    }

    /// The rate as a floating point value, for display.
    pub fn as_f64(self) -> f64 {
        self.numerator as f64 / self.denominator.max(1) as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        FrameRate::NTSC
    }
}

impl Display for FrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// The frame-rate field of an IFO playback time.
///
/// Only the two values allowed by the DVD-Video format exist; the other two
/// bit patterns are illegal and rejected by [`FrameRateCode::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRateCode {
    /// Code `1`: 25 fps.
    Pal,
    /// Code `3`: 30000/1001 fps.
    Ntsc,
}

impl FrameRateCode {
    /// Decode the two frame-rate bits of a playback time.
    pub fn from_bits(bits: u8) -> Result<Self, DiscSplitError> {
        match bits {
            1 => Ok(FrameRateCode::Pal),
            3 => Ok(FrameRateCode::Ntsc),
            other => Err(DiscSplitError::UnknownFrameRateCode(other)),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            FrameRateCode::Pal => 1,
            FrameRateCode::Ntsc => 3,
        }
    }

    pub fn frame_rate(self) -> FrameRate {
        match self {
            FrameRateCode::Pal => FrameRate::PAL,
            FrameRateCode::Ntsc => FrameRate::NTSC,
        }
    }
}

/// One chapter length as authored in the IFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
    pub rate: FrameRateCode,
}

impl PlaybackTime {
    pub fn new(hours: u32, minutes: u32, seconds: u32, frames: u32, rate: FrameRateCode) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
            rate,
        }
    }

    /// Length of this playback time in frames at `timecode_base` frames per
    /// second.
    pub fn frame_count(&self, timecode_base: u64) -> u64 {
        let whole_seconds =
            self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64;
        self.frames as u64 + whole_seconds * timecode_base
    }

    /// Whether this playback time is `00:00:00.00`.
    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0 && self.frames == 0
    }
}

/// A program chain: one title and its chapter playback times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramChain {
    pub playback_times: Vec<PlaybackTime>,
}

impl ProgramChain {
    pub fn new(playback_times: Vec<PlaybackTime>) -> Self {
        Self { playback_times }
    }

    /// The constant frame rate of this chain.
    ///
    /// Returns `Ok(None)` for a chain without playback times.
    ///
    /// # Errors
    ///
    /// [`DiscSplitError::InconsistentFrameRate`] if two playback times carry
    /// different rate codes. `title` is only used for the error message.
    pub fn frame_rate(&self, title: usize) -> Result<Option<FrameRate>, DiscSplitError> {
        let Some(first) = self.playback_times.first() else {
            return Ok(None);
        };

        if let Some(other) = self
            .playback_times
            .iter()
            .find(|time| time.rate != first.rate)
        {
            return Err(DiscSplitError::InconsistentFrameRate {
                title,
                first: first.rate.bits(),
                other: other.rate.bits(),
            });
        }

        Ok(Some(first.rate.frame_rate()))
    }

    /// Indices of chapters authored with a zero playback time. Such a
    /// chapter repeats the previous offset and cannot be selected.
    pub fn zero_length_chapters(&self) -> Vec<usize> {
        self.playback_times
            .iter()
            .enumerate()
            .filter(|(_, time)| time.is_zero())
            .map(|(chapter, _)| chapter)
            .collect()
    }
}

/// Program chain information table of a single VTS IFO file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VtsPgci {
    pub program_chains: Vec<ProgramChain>,
}

impl VtsPgci {
    pub fn new(program_chains: Vec<ProgramChain>) -> Self {
        Self { program_chains }
    }
}

/// Timing information for a whole disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfoInfo {
    /// Cumulative chapter offsets, one list per title. Each starts at 0.
    pub chapters: Vec<Vec<u64>>,
    /// Disc frame rate.
    pub frame_rate: FrameRate,
    /// Whether more than one VTS IFO contributed titles.
    pub multiple_ifos: bool,
}

impl IfoInfo {
    pub fn title_count(&self) -> usize {
        self.chapters.len()
    }
}

/// Convert the program chains of every VTS IFO into chapter offsets.
///
/// When more than one IFO is given, the first program chain of each IFO is
/// skipped. The returned frame rate is that of the last chain that has
/// playback times, or 30000/1001 if none do.
///
/// # Errors
///
/// - [`DiscSplitError::EmptyMetadata`] if no program chains remain.
/// - [`DiscSplitError::InconsistentFrameRate`] if any chain mixes rate codes.
pub fn compute_chapter_offsets(ifos: &[VtsPgci]) -> Result<IfoInfo, DiscSplitError> {
    let multiple_ifos = ifos.len() > 1;
    let skip = usize::from(multiple_ifos);

    let chains: Vec<&ProgramChain> = ifos
        .iter()
        .flat_map(|ifo| ifo.program_chains.iter().skip(skip))
        .collect();

    if chains.is_empty() {
        return Err(DiscSplitError::EmptyMetadata(format!(
            "no program chains in {} IFO file(s)",
            ifos.len()
        )));
    }

    let mut frame_rate = FrameRate::default();
    let mut chapters = Vec::with_capacity(chains.len());

    for (title, chain) in chains.iter().enumerate() {
        match chain.frame_rate(title)? {
            Some(rate) => {
                if rate != frame_rate {
                    log::debug!("Title {title} sets disc frame rate to {rate}");
                }
                frame_rate = rate;
            }
            None => log::warn!("Title {title} has no playback times"),
        }

        for chapter in chain.zero_length_chapters() {
            log::warn!(
                "Title {title} chapter {chapter} has a zero playback time; its offset repeats \
                 the previous one"
            );
        }

        let base = frame_rate.timecode_base();
        let offsets: Vec<u64> = std::iter::once(0)
            .chain(chain.playback_times.iter().map(|time| time.frame_count(base)))
            .scan(0u64, |total, length| {
                *total += length;
                Some(*total)
            })
            .collect();

        chapters.push(offsets);
    }

    log::debug!(
        "Computed chapter offsets for {} titles at {frame_rate} (multiple IFOs: {multiple_ifos})",
        chapters.len()
    );

    Ok(IfoInfo {
        chapters,
        frame_rate,
        multiple_ifos,
    })
}
