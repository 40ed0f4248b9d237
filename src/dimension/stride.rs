//! Stride arithmetic.
//!
//! Strides are the signed element-count steps taken in flat storage when
//! moving along each axis. This module computes canonical strides for a
//! shape and layout, derives backstrides, and converts between flat and
//! multi-dimensional indices.

use super::layout::Layout;

/// Computes the canonical strides of `shape` under `layout`.
///
/// For row-major order the last axis has stride 1; for column-major the
/// first. `Dynamic` and `Any` are treated as the crate default
/// (row-major), mirroring how non-canonical layouts are traversed.
pub fn compute_strides(shape: &[usize], layout: Layout) -> Vec<isize> {
    let ndim = shape.len();
    let mut strides = vec![0isize; ndim];
    if ndim == 0 {
        return strides;
    }
    match layout {
        Layout::ColumnMajor => {
            strides[0] = 1;
            for k in 1..ndim {
                strides[k] = strides[k - 1] * shape[k - 1].max(1) as isize;
            }
        }
        _ => {
            strides[ndim - 1] = 1;
            for k in (0..ndim - 1).rev() {
                strides[k] = strides[k + 1] * shape[k + 1].max(1) as isize;
            }
        }
    }
    strides
}

/// Derives backstrides from a shape and stride vector.
///
/// `backstrides[k] = strides[k] * (shape[k] - 1)` for non-empty axes, the
/// distance a cursor rewinds when axis `k` wraps during iteration.
pub fn adapt_strides(shape: &[usize], strides: &[isize]) -> Vec<isize> {
    shape
        .iter()
        .zip(strides.iter())
        .map(|(&len, &stride)| if len > 0 { stride * (len as isize - 1) } else { 0 })
        .collect()
}

/// Flat offset contribution of a multi-index against a stride vector.
///
/// When more indices than strides are given, only the trailing
/// `strides.len()` indices participate.
pub fn element_offset(strides: &[isize], index: &[usize]) -> isize {
    let skip = index.len().saturating_sub(strides.len());
    index[skip..]
        .iter()
        .zip(strides.iter())
        .map(|(&i, &s)| i as isize * s)
        .sum()
}

/// Unravels a flat index into a multi-index, writing into `out`.
///
/// `strides` must be the canonical strides of some shape under `layout`
/// (row- or column-major); the axes are divided out largest-stride first.
pub fn unravel_into(flat: usize, strides: &[isize], layout: Layout, out: &mut Vec<usize>) {
    out.clear();
    out.resize(strides.len(), 0);
    let mut rem = flat;
    match layout {
        Layout::ColumnMajor => {
            for k in (0..strides.len()).rev() {
                let s = strides[k] as usize;
                if s != 0 {
                    out[k] = rem / s;
                    rem %= s;
                }
            }
        }
        _ => {
            for k in 0..strides.len() {
                let s = strides[k] as usize;
                if s != 0 {
                    out[k] = rem / s;
                    rem %= s;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_strides() {
        assert_eq!(compute_strides(&[2, 3, 4], Layout::RowMajor), vec![12, 4, 1]);
        assert_eq!(compute_strides(&[], Layout::RowMajor), Vec::<isize>::new());
    }

    #[test]
    fn test_column_major_strides() {
        assert_eq!(
            compute_strides(&[2, 3, 4], Layout::ColumnMajor),
            vec![1, 2, 6]
        );
    }

    #[test]
    fn test_dynamic_defaults_to_row_major() {
        assert_eq!(compute_strides(&[2, 3], Layout::Dynamic), vec![3, 1]);
    }

    #[test]
    fn test_adapt_strides() {
        assert_eq!(adapt_strides(&[2, 3, 4], &[12, 4, 1]), vec![12, 8, 3]);
        assert_eq!(adapt_strides(&[4], &[-1]), vec![-3]);
        assert_eq!(adapt_strides(&[0, 2], &[2, 1]), vec![0, 1]);
    }

    #[test]
    fn test_element_offset() {
        assert_eq!(element_offset(&[12, 4, 1], &[1, 2, 3]), 23);
        assert_eq!(element_offset(&[-1], &[2]), -2);
        // Extra leading indices are skipped.
        assert_eq!(element_offset(&[3, 1], &[0, 1, 2]), 5);
    }

    #[test]
    fn test_unravel_row_major() {
        let strides = compute_strides(&[2, 3], Layout::RowMajor);
        let mut idx = Vec::new();
        unravel_into(4, &strides, Layout::RowMajor, &mut idx);
        assert_eq!(idx, vec![1, 1]);
    }

    #[test]
    fn test_unravel_column_major() {
        let strides = compute_strides(&[2, 3], Layout::ColumnMajor);
        let mut idx = Vec::new();
        unravel_into(4, &strides, Layout::ColumnMajor, &mut idx);
        assert_eq!(idx, vec![0, 2]);
    }

    #[test]
    fn test_unravel_round_trip() {
        let shape = [3, 4, 5];
        for layout in [Layout::RowMajor, Layout::ColumnMajor] {
            let strides = compute_strides(&shape, layout);
            let mut idx = Vec::new();
            for flat in 0..60 {
                unravel_into(flat, &strides, layout, &mut idx);
                assert_eq!(element_offset(&strides, &idx), flat as isize);
            }
        }
    }
}
