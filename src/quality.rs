//! Per-base quality profiles.
//!
//! Every score range is half-open (`lo..hi`): `25..30` yields 25 through 29.
//! Golden outputs are compared by hash, so these bounds must not drift.

use std::ops::Range;

use rand::Rng;

use crate::error::GenerateError;

/// Highest Phred score a fixture may carry.
pub const PHRED_MAX: u8 = 41;

/// Scores of a clean base.
pub const GOOD: Range<u8> = 25..30;
/// Scores that sit around common sliding-window thresholds.
pub const MEAN: Range<u8> = 18..21;
/// Scores of a clearly degraded base.
pub const BAD: Range<u8> = 1..3;

/// Which mate of a pair receives the degraded profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Forward,
    Reverse,
    Same,
}

impl Side {
    pub fn degrades_forward(self) -> bool {
        matches!(self, Side::Forward | Side::Same)
    }

    pub fn degrades_reverse(self) -> bool {
        matches!(self, Side::Reverse | Side::Same)
    }
}

/// Shape of a quality profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityShape {
    /// Every base drawn from one range.
    Uniform(Range<u8>),
    /// Bases in `bin` drawn from `bad`, all others from `good`.
    SlidingWindow {
        good: Range<u8>,
        bad: Range<u8>,
        bin: Range<usize>,
        side: Side,
    },
    /// Bases before `start` drawn from `good`, every base from `start` to
    /// the end of the read set to `bad`.
    Tail {
        good: Range<u8>,
        bad: u8,
        start: usize,
        side: Side,
    },
}

impl QualityShape {
    /// Mate selection of a degraded shape; `None` for uniform profiles.
    pub fn side(&self) -> Option<Side> {
        match self {
            QualityShape::Uniform(_) => None,
            QualityShape::SlidingWindow { side, .. } | QualityShape::Tail { side, .. } => {
                Some(*side)
            }
        }
    }

    /// Build a profile of exactly `length` scores.
    pub fn profile<R: Rng>(&self, length: usize, rng: &mut R) -> Result<Vec<u8>, GenerateError> {
        self.validate(length)?;
        let quals = match self {
            QualityShape::Uniform(range) => uniform(rng, range, length),
            QualityShape::SlidingWindow { good, bad, bin, .. } => {
                let mut quals = Vec::with_capacity(length);
                quals.extend((0..bin.start).map(|_| rng.gen_range(good.clone())));
                quals.extend(bin.clone().map(|_| rng.gen_range(bad.clone())));
                quals.extend((bin.end..length).map(|_| rng.gen_range(good.clone())));
                quals
            }
            QualityShape::Tail {
                good, bad, start, ..
            } => {
                let mut quals = uniform(rng, good, *start);
                quals.resize(length, *bad);
                quals
            }
        };
        debug_assert_eq!(quals.len(), length);
        Ok(quals)
    }

    fn validate(&self, length: usize) -> Result<(), GenerateError> {
        match self {
            QualityShape::Uniform(range) => check_range(range),
            QualityShape::SlidingWindow { good, bad, bin, .. } => {
                check_range(good)?;
                check_range(bad)?;
                check_bin(bin.start, bin.end, length)
            }
            QualityShape::Tail {
                good, bad, start, ..
            } => {
                check_range(good)?;
                if *bad > PHRED_MAX {
                    return Err(GenerateError::QualityOverflow(*bad));
                }
                check_bin(*start, length, length)
            }
        }
    }
}

/// Draw `length` scores from `range`.
fn uniform<R: Rng>(rng: &mut R, range: &Range<u8>, length: usize) -> Vec<u8> {
    (0..length).map(|_| rng.gen_range(range.clone())).collect()
}

fn check_range(range: &Range<u8>) -> Result<(), GenerateError> {
    if range.is_empty() {
        return Err(GenerateError::EmptyRange {
            lo: range.start,
            hi: range.end,
        });
    }
    // highest drawable score is hi - 1
    if range.end - 1 > PHRED_MAX {
        return Err(GenerateError::QualityOverflow(range.end - 1));
    }
    Ok(())
}

fn check_bin(start: usize, end: usize, length: usize) -> Result<(), GenerateError> {
    if start > end || end > length {
        return Err(GenerateError::BinBounds { start, end, length });
    }
    Ok(())
}
