//! Descriptor construction for strided views.
//!
//! The builder rewrites a source geometry (shape, strides, offset,
//! layout) and a slice list into the descriptor of the resulting view.
//! Slice validity is checked here, before any view exists.

use crate::dimension::{compute_strides, default_assignable_layout, do_strides_match, Layout};
use crate::error::{Result, ViewError};
use crate::expression::{Expression, SourceHandle};

use super::slice::{ReducedSlice, Slice};
use super::StridedView;

/// Strides and base offset under which a source is flat-addressable:
/// its own data interface when it has one, otherwise canonical strides
/// for its assignable layout (the same geometry a default flat adaptor
/// uses).
pub(crate) fn source_geometry<E: Expression>(e: &E) -> (Vec<isize>, usize) {
    match e.flat_data() {
        Some(fd) => (fd.strides.to_vec(), fd.offset),
        None => (
            compute_strides(e.shape(), default_assignable_layout(e.layout())),
            0,
        ),
    }
}

/// Rewrites a source geometry and a slice list into the descriptor of
/// the resulting view: `(shape, strides, offset, layout)`.
///
/// Axes not addressed by the slice list are appended whole. The source
/// layout is kept only when the new strides still satisfy it; otherwise
/// the view is `Dynamic`.
///
/// # Errors
///
/// * `DuplicateEllipsis` - more than one ellipsis in the list.
/// * `TooManySlices` - more axis-consuming slices than source axes.
/// * `IndexOutOfBounds` / `InvalidStep` - from slice reduction.
pub fn build_descriptor(
    src_shape: &[usize],
    src_strides: &[isize],
    base_offset: usize,
    src_layout: Layout,
    slices: &[Slice],
) -> Result<(Vec<usize>, Vec<isize>, usize, Layout)> {
    let src_dim = src_shape.len();

    let mut n_newaxis = 0usize;
    let mut n_scalar = 0usize;
    let mut consuming = 0usize;
    let mut has_ellipsis = false;
    for s in slices {
        match s {
            Slice::NewAxis => n_newaxis += 1,
            Slice::Index(_) => {
                n_scalar += 1;
                consuming += 1;
            }
            Slice::Ellipsis => {
                if has_ellipsis {
                    return Err(ViewError::DuplicateEllipsis);
                }
                has_ellipsis = true;
            }
            _ => consuming += 1,
        }
    }
    if consuming > src_dim {
        return Err(ViewError::TooManySlices {
            slices: consuming,
            dimension: src_dim,
        });
    }

    // An ellipsis stands for this many implicit `all` slices.
    let n_add_all = if has_ellipsis {
        src_dim - (slices.len() - 1 - n_newaxis)
    } else {
        0
    };

    let dimension = src_dim + n_newaxis - n_scalar;
    let mut new_shape = Vec::with_capacity(dimension);
    let mut new_strides = Vec::with_capacity(dimension);
    let mut offset = base_offset as isize;

    // `i - axis_skip` tracks which source axis the current slice
    // addresses: newaxis entries shift the correspondence one way,
    // ellipsis expansion the other.
    let mut i: isize = 0;
    let mut axis_skip: isize = 0;
    for s in slices {
        match s {
            Slice::NewAxis => {
                new_shape.push(1);
                new_strides.push(0);
                axis_skip += 1;
            }
            Slice::Ellipsis => {
                for _ in 0..n_add_all {
                    let axis = (i - axis_skip) as usize;
                    new_shape.push(src_shape[axis]);
                    new_strides.push(src_strides[axis]);
                    axis_skip -= 1;
                }
                axis_skip += 1;
            }
            _ => {
                let axis = (i - axis_skip) as usize;
                match s.reduce(src_shape[axis], axis)? {
                    ReducedSlice::Scalar(k) => {
                        offset += k as isize * src_strides[axis];
                    }
                    ReducedSlice::Axis {
                        start,
                        length,
                        step,
                    } => {
                        offset += start as isize * src_strides[axis];
                        new_shape.push(length);
                        new_strides.push(step * src_strides[axis]);
                    }
                    ReducedSlice::Insert | ReducedSlice::Expand => {
                        unreachable!("handled before reduction")
                    }
                }
            }
        }
        i += 1;
    }

    // Trailing source axes keep their extent and stride.
    while ((i - axis_skip) as usize) < src_dim {
        let axis = (i - axis_skip) as usize;
        new_shape.push(src_shape[axis]);
        new_strides.push(src_strides[axis]);
        i += 1;
    }

    debug_assert!(offset >= 0, "view offset escaped the storage front");
    let new_layout = if do_strides_match(&new_shape, &new_strides, src_layout) {
        src_layout
    } else {
        Layout::Dynamic
    };
    Ok((new_shape, new_strides, offset as usize, new_layout))
}

/// Builds a read-only strided view of `e` from a slice list.
///
/// # Errors
///
/// See [`build_descriptor`].
pub fn strided_view<'a, E: Expression>(e: &'a E, slices: &[Slice]) -> Result<StridedView<'a, E>> {
    let (src_strides, src_offset) = source_geometry(e);
    let (shape, strides, offset, layout) =
        build_descriptor(e.shape(), &src_strides, src_offset, e.layout(), slices)?;
    Ok(StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        shape,
        strides,
        offset,
        layout,
    ))
}

/// Builds a writable strided view of `e` from a slice list.
///
/// # Errors
///
/// See [`build_descriptor`].
pub fn strided_view_mut<'a, E: Expression>(
    e: &'a mut E,
    slices: &[Slice],
) -> Result<StridedView<'a, E>> {
    let (src_strides, src_offset) = source_geometry(e);
    let (shape, strides, offset, layout) =
        build_descriptor(e.shape(), &src_strides, src_offset, e.layout(), slices)?;
    Ok(StridedView::from_descriptor(
        SourceHandle::BorrowedMut(e),
        shape,
        strides,
        offset,
        layout,
    ))
}

/// Builds a strided view that takes ownership of its source.
///
/// # Errors
///
/// See [`build_descriptor`].
pub fn strided_view_owned<'a, E: Expression>(
    e: E,
    slices: &[Slice],
) -> Result<StridedView<'a, E>> {
    let (src_strides, src_offset) = source_geometry(&e);
    let (shape, strides, offset, layout) =
        build_descriptor(e.shape(), &src_strides, src_offset, e.layout(), slices)?;
    Ok(StridedView::from_descriptor(
        SourceHandle::Owned(e),
        shape,
        strides,
        offset,
        layout,
    ))
}

/// Builds a view of `e` from an explicit descriptor.
///
/// The caller is responsible for the descriptor invariants: equal shape
/// and stride lengths, and every addressable flat position inside the
/// source storage.
pub fn strided_view_with<'a, E: Expression>(
    e: &'a E,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
    layout: Layout,
) -> StridedView<'a, E> {
    StridedView::from_descriptor(SourceHandle::Borrowed(e), shape, strides, offset, layout)
}
