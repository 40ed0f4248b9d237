//! Memory layout classification for strided data.
//!
//! A layout names the canonical traversal order of elements: `RowMajor`
//! (last axis fastest), `ColumnMajor` (first axis fastest), `Dynamic`
//! (arbitrary strides) or `Any` (no constraint).

use crate::error::{Result, ViewError};

use super::stride::compute_strides;

/// Canonical traversal order of the elements of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Last axis varies fastest (C order).
    RowMajor,
    /// First axis varies fastest (Fortran order).
    ColumnMajor,
    /// Strides follow neither canonical order.
    Dynamic,
    /// Any layout is acceptable.
    Any,
}

impl Layout {
    /// Returns `true` for the two canonical, assignable orders.
    pub fn is_assignable(self) -> bool {
        matches!(self, Layout::RowMajor | Layout::ColumnMajor)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::RowMajor
    }
}

/// Maps a layout to one usable for linear traversal.
///
/// `RowMajor` and `ColumnMajor` are kept; `Dynamic` and `Any` fall back to
/// the crate default (row-major).
pub fn default_assignable_layout(layout: Layout) -> Layout {
    if layout.is_assignable() {
        layout
    } else {
        Layout::default()
    }
}

/// Swaps `RowMajor` and `ColumnMajor`; other layouts are returned unchanged.
pub fn transpose_layout_lossy(layout: Layout) -> Layout {
    match layout {
        Layout::RowMajor => Layout::ColumnMajor,
        Layout::ColumnMajor => Layout::RowMajor,
        other => other,
    }
}

/// Swaps `RowMajor` and `ColumnMajor`.
///
/// # Errors
///
/// Returns `TransposeError` when the layout is not one of the two
/// canonical orders, since those have no defined transpose.
pub fn transpose_layout(layout: Layout) -> Result<Layout> {
    if !layout.is_assignable() {
        return Err(ViewError::TransposeError(
            "cannot compute transposed layout of dynamic layout".to_string(),
        ));
    }
    Ok(transpose_layout_lossy(layout))
}

/// Checks whether `strides` are the canonical strides of `shape` under
/// `layout`. Axes of extent `0` or `1` are ignored; their stride never
/// affects addressing.
pub fn do_strides_match(shape: &[usize], strides: &[isize], layout: Layout) -> bool {
    match layout {
        Layout::Any => true,
        Layout::Dynamic => false,
        _ => {
            let canonical = compute_strides(shape, layout);
            shape
                .iter()
                .zip(strides.iter().zip(canonical.iter()))
                .all(|(&len, (&actual, &expected))| len <= 1 || actual == expected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assignable_layout() {
        assert_eq!(default_assignable_layout(Layout::RowMajor), Layout::RowMajor);
        assert_eq!(
            default_assignable_layout(Layout::ColumnMajor),
            Layout::ColumnMajor
        );
        assert_eq!(default_assignable_layout(Layout::Dynamic), Layout::RowMajor);
        assert_eq!(default_assignable_layout(Layout::Any), Layout::RowMajor);
    }

    #[test]
    fn test_transpose_layout() {
        assert_eq!(transpose_layout(Layout::RowMajor).unwrap(), Layout::ColumnMajor);
        assert_eq!(transpose_layout(Layout::ColumnMajor).unwrap(), Layout::RowMajor);
        assert!(transpose_layout(Layout::Dynamic).is_err());
    }

    #[test]
    fn test_strides_match_row_major() {
        assert!(do_strides_match(&[2, 3, 4], &[12, 4, 1], Layout::RowMajor));
        assert!(!do_strides_match(&[2, 3, 4], &[12, 4, 2], Layout::RowMajor));
        assert!(!do_strides_match(&[2, 3, 4], &[12, 4, 1], Layout::ColumnMajor));
    }

    #[test]
    fn test_strides_match_ignores_unit_axes() {
        // The stride of a length-1 axis is irrelevant for addressing.
        assert!(do_strides_match(&[1, 3], &[99, 1], Layout::RowMajor));
        assert!(do_strides_match(&[2, 1], &[1, 0], Layout::ColumnMajor));
    }

    #[test]
    fn test_strides_match_dynamic_and_any() {
        assert!(do_strides_match(&[2, 2], &[7, 3], Layout::Any));
        assert!(!do_strides_match(&[2, 2], &[2, 1], Layout::Dynamic));
    }
}
