//! The slice algebra used to build strided views.
//!
//! A [`Slice`] describes how one axis of a source expression is
//! addressed: a single index, a bounded range with an optional step, the
//! whole axis, an ellipsis standing for as many whole axes as needed, or
//! a fresh length-1 axis. Ranges may leave any position open; open
//! positions are resolved against the concrete axis length by
//! [`Slice::reduce`].

use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::error::{Result, ViewError};

/// A value usable in a [`range`] position: an integer bound or the
/// placeholder `..` standing for "missing".
pub trait SliceBound {
    fn into_bound(self) -> Option<isize>;
}

impl SliceBound for isize {
    fn into_bound(self) -> Option<isize> {
        Some(self)
    }
}

impl SliceBound for RangeFull {
    fn into_bound(self) -> Option<isize> {
        None
    }
}

/// One entry of a slice list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slice {
    /// Select a single position; the axis is consumed.
    Index(isize),
    /// Select a range of positions with a step. Open positions default
    /// against the axis length when the slice is reduced.
    Range {
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    },
    /// Select the whole axis.
    All,
    /// Stand for as many [`Slice::All`] entries as the source needs.
    Ellipsis,
    /// Insert a new axis of length 1 (stride 0).
    NewAxis,
}

/// Creates a slice selecting the single position `i`.
///
/// Negative values count from the end of the axis.
pub fn index(i: isize) -> Slice {
    Slice::Index(i)
}

/// Creates a slice selecting `[start, stop)` with step 1.
///
/// # Arguments
///
/// * `start` - The first selected position, or `..` for the default.
/// * `stop` - One past the last selected position, or `..` for the default.
///
/// Negative bounds count from the end of the axis.
pub fn range<A, B>(start: A, stop: B) -> Slice
where
    A: SliceBound,
    B: SliceBound,
{
    Slice::Range {
        start: start.into_bound(),
        stop: stop.into_bound(),
        step: None,
    }
}

/// Creates a slice selecting `[start, stop)` with the given step.
///
/// A negative step walks the axis backwards; the defaults of open
/// positions follow the step sign. A step of zero fails at reduction
/// time with `InvalidStep`.
pub fn range_step<A, B, C>(start: A, stop: B, step: C) -> Slice
where
    A: SliceBound,
    B: SliceBound,
    C: SliceBound,
{
    Slice::Range {
        start: start.into_bound(),
        stop: stop.into_bound(),
        step: step.into_bound(),
    }
}

/// Creates a slice selecting the whole axis.
pub fn all() -> Slice {
    Slice::All
}

/// Creates an ellipsis, standing for as many [`all`] slices as needed.
pub fn ellipsis() -> Slice {
    Slice::Ellipsis
}

/// Creates a slice inserting a new axis of length 1.
pub fn newaxis() -> Slice {
    Slice::NewAxis
}

/// The outcome of resolving one slice against a concrete axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducedSlice {
    /// The axis is consumed by a single in-range position.
    Scalar(usize),
    /// The axis survives: first position, number of positions, step.
    Axis {
        start: usize,
        length: usize,
        step: isize,
    },
    /// A new length-1 axis is inserted.
    Insert,
    /// An ellipsis, expanded by the view builder.
    Expand,
}

impl Slice {
    /// Resolves this slice against an axis of length `len`.
    ///
    /// Open range positions receive their defaults (`0`/`len`/`1` for a
    /// positive step, `len-1`/one-before-the-start/`1` negated for a
    /// negative one), negative bounds are taken from the end, and
    /// out-of-range bounds are clamped. `axis` is only used for error
    /// reporting.
    ///
    /// # Errors
    ///
    /// * `IndexOutOfBounds` - an `Index` outside `[0, len)` after
    ///   normalisation.
    /// * `InvalidStep` - a range with step `0`.
    pub fn reduce(&self, len: usize, axis: usize) -> Result<ReducedSlice> {
        let n = len as isize;
        match *self {
            Slice::Index(i) => {
                let k = if i < 0 { n + i } else { i };
                if k < 0 || k >= n {
                    return Err(ViewError::IndexOutOfBounds {
                        index: i,
                        len,
                        axis,
                    });
                }
                Ok(ReducedSlice::Scalar(k as usize))
            }
            Slice::All => Ok(ReducedSlice::Axis {
                start: 0,
                length: len,
                step: 1,
            }),
            Slice::Ellipsis => Ok(ReducedSlice::Expand),
            Slice::NewAxis => Ok(ReducedSlice::Insert),
            Slice::Range { start, stop, step } => {
                let step = step.unwrap_or(1);
                if step == 0 {
                    return Err(ViewError::InvalidStep);
                }
                let normalize = |b: isize| if b < 0 { n + b } else { b };
                if step > 0 {
                    let lo = start.map(normalize).unwrap_or(0).clamp(0, n);
                    let hi = stop.map(normalize).unwrap_or(n).clamp(0, n);
                    if hi <= lo {
                        return Ok(ReducedSlice::Axis {
                            start: 0,
                            length: 0,
                            step,
                        });
                    }
                    Ok(ReducedSlice::Axis {
                        start: lo as usize,
                        length: ((hi - lo + step - 1) / step) as usize,
                        step,
                    })
                } else {
                    // Missing stop means "one before the first element",
                    // which no normalised bound can express.
                    let lo = start.map(normalize).unwrap_or(n - 1).clamp(-1, n - 1);
                    let hi = stop.map(normalize).unwrap_or(-1).clamp(-1, n - 1);
                    if lo <= hi || lo < 0 {
                        return Ok(ReducedSlice::Axis {
                            start: 0,
                            length: 0,
                            step,
                        });
                    }
                    Ok(ReducedSlice::Axis {
                        start: lo as usize,
                        length: ((lo - hi - 1) / -step + 1) as usize,
                        step,
                    })
                }
            }
        }
    }
}

impl From<isize> for Slice {
    fn from(i: isize) -> Self {
        Slice::Index(i)
    }
}

impl From<Range<isize>> for Slice {
    fn from(r: Range<isize>) -> Self {
        Slice::Range {
            start: Some(r.start),
            stop: Some(r.end),
            step: None,
        }
    }
}

impl From<RangeFrom<isize>> for Slice {
    fn from(r: RangeFrom<isize>) -> Self {
        Slice::Range {
            start: Some(r.start),
            stop: None,
            step: None,
        }
    }
}

impl From<RangeTo<isize>> for Slice {
    fn from(r: RangeTo<isize>) -> Self {
        Slice::Range {
            start: None,
            stop: Some(r.end),
            step: None,
        }
    }
}

impl From<RangeFull> for Slice {
    fn from(_: RangeFull) -> Self {
        Slice::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(start: usize, length: usize, step: isize) -> ReducedSlice {
        ReducedSlice::Axis {
            start,
            length,
            step,
        }
    }

    #[test]
    fn test_index_reduce() {
        assert_eq!(index(2).reduce(5, 0).unwrap(), ReducedSlice::Scalar(2));
        assert_eq!(index(-1).reduce(5, 0).unwrap(), ReducedSlice::Scalar(4));
        assert!(index(5).reduce(5, 0).is_err());
        assert!(index(-6).reduce(5, 0).is_err());
    }

    #[test]
    fn test_range_defaults() {
        assert_eq!(range(.., ..).reduce(5, 0).unwrap(), axis(0, 5, 1));
        assert_eq!(range(1, ..).reduce(5, 0).unwrap(), axis(1, 4, 1));
        assert_eq!(range(.., 3).reduce(5, 0).unwrap(), axis(0, 3, 1));
    }

    #[test]
    fn test_range_negative_bounds() {
        assert_eq!(range(-3, -1).reduce(5, 0).unwrap(), axis(2, 2, 1));
        assert_eq!(range(0, -1).reduce(5, 0).unwrap(), axis(0, 4, 1));
    }

    #[test]
    fn test_range_with_step() {
        assert_eq!(range_step(0, 3, 2).reduce(3, 0).unwrap(), axis(0, 2, 2));
        assert_eq!(range_step(1, 5, 2).reduce(5, 0).unwrap(), axis(1, 2, 2));
        assert_eq!(range_step(1, 6, 2).reduce(6, 0).unwrap(), axis(1, 3, 2));
    }

    #[test]
    fn test_negative_step() {
        // Full reversal: 4, 3, 2, 1, 0.
        assert_eq!(range_step(.., .., -1).reduce(5, 0).unwrap(), axis(4, 5, -1));
        // 4, 2, 0.
        assert_eq!(range_step(.., .., -2).reduce(5, 0).unwrap(), axis(4, 3, -2));
        // Down to (but excluding) index 1: 4, 3, 2.
        assert_eq!(range_step(.., 1, -1).reduce(5, 0).unwrap(), axis(4, 3, -1));
        assert_eq!(range_step(3, 0, -1).reduce(5, 0).unwrap(), axis(3, 3, -1));
    }

    #[test]
    fn test_empty_ranges() {
        assert_eq!(range(3, 3).reduce(5, 0).unwrap(), axis(0, 0, 1));
        assert_eq!(range(4, 2).reduce(5, 0).unwrap(), axis(0, 0, 1));
        assert_eq!(range_step(0, 4, -1).reduce(5, 0).unwrap(), axis(0, 0, -1));
        assert_eq!(range(.., ..).reduce(0, 0).unwrap(), axis(0, 0, 1));
    }

    #[test]
    fn test_out_of_range_bounds_clamp() {
        assert_eq!(range(2, 100).reduce(5, 0).unwrap(), axis(2, 3, 1));
        assert_eq!(range(-100, 3).reduce(5, 0).unwrap(), axis(0, 3, 1));
        assert_eq!(range_step(100, .., -1).reduce(5, 0).unwrap(), axis(4, 5, -1));
    }

    #[test]
    fn test_zero_step_rejected() {
        assert!(matches!(
            range_step(0, 3, 0).reduce(5, 0),
            Err(ViewError::InvalidStep)
        ));
    }

    #[test]
    fn test_all_and_tags() {
        assert_eq!(all().reduce(4, 0).unwrap(), axis(0, 4, 1));
        assert_eq!(newaxis().reduce(4, 0).unwrap(), ReducedSlice::Insert);
        assert_eq!(ellipsis().reduce(4, 0).unwrap(), ReducedSlice::Expand);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Slice::from(3), Slice::Index(3));
        assert_eq!(Slice::from(..), Slice::All);
        assert_eq!(
            Slice::from(1..4),
            Slice::Range {
                start: Some(1),
                stop: Some(4),
                step: None
            }
        );
        assert_eq!(
            Slice::from(2..),
            Slice::Range {
                start: Some(2),
                stop: None,
                step: None
            }
        );
        assert_eq!(
            Slice::from(..3),
            Slice::Range {
                start: None,
                stop: Some(3),
                step: None
            }
        );
    }
}
