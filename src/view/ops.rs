//! Derived view operations.
//!
//! Every operation here is a shape rewrite: it produces a strided view
//! of its argument without touching elements. Transposition permutes
//! shape and strides, ravel and flatten linearise, squeeze and
//! expand_dims remove or insert unit axes, split partitions one axis,
//! flip reverses one, and trim_zeros shrinks a 1-D expression to its
//! non-zero core.

use num_traits::Zero;

use crate::dimension::{
    compute_strides, default_assignable_layout, do_strides_match, transpose_layout,
    transpose_layout_lossy, Layout,
};
use crate::error::{Result, ViewError};
use crate::expression::{Expression, SourceHandle};

use super::build::{source_geometry, strided_view};
use super::slice::{range, Slice};
use super::{FlatAccess, FlatAdaptor, StridedView};

/// How thoroughly an axis argument is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPolicy {
    /// Structural checks only.
    None,
    /// Reject every invalid argument up front.
    Full,
}

/// Which end of a 1-D expression `trim_zeros` shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    Front,
    Back,
    Both,
}

impl TrimMode {
    fn front(self) -> bool {
        matches!(self, TrimMode::Front | TrimMode::Both)
    }

    fn back(self) -> bool {
        matches!(self, TrimMode::Back | TrimMode::Both)
    }
}

/// Returns a view of `e` with its axes reversed.
///
/// A row-major source becomes column-major and vice versa; any other
/// layout is kept.
///
/// # Errors
///
/// Returns `TransposeError` for a source that has neither a data
/// interface nor an assignable layout, since no stride order can be
/// derived for it.
pub fn transpose<'a, E: Expression>(e: &'a E) -> Result<StridedView<'a, E>> {
    if e.flat_data().is_none() {
        // An indexed-only source is traversed by its layout's canonical
        // strides, so that layout must have a defined transpose.
        transpose_layout(e.layout())?;
    }
    let (src_strides, src_offset) = source_geometry(e);
    let mut shape = e.shape().to_vec();
    let mut strides = src_strides;
    shape.reverse();
    strides.reverse();
    Ok(StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        shape,
        strides,
        src_offset,
        transpose_layout_lossy(e.layout()),
    ))
}

/// Returns a view of `e` with its axes permuted by `perm`.
///
/// The layout is kept for an ascending permutation, swapped for a
/// strictly descending one and `Dynamic` otherwise.
///
/// # Arguments
///
/// * `perm` - for each result axis, the source axis it takes.
/// * `check` - with `CheckPolicy::Full`, duplicate axes are rejected;
///   size mismatches and out-of-range axes are rejected either way.
///
/// # Errors
///
/// Returns `TransposeError` on an invalid permutation.
pub fn transpose_axes<'a, E: Expression>(
    e: &'a E,
    perm: &[usize],
    check: CheckPolicy,
) -> Result<StridedView<'a, E>> {
    let dim = e.dimension();
    if perm.len() != dim {
        return Err(ViewError::TransposeError(
            "permutation does not have the same size as shape".to_string(),
        ));
    }
    if check == CheckPolicy::Full {
        let mut seen = vec![false; dim];
        for &axis in perm {
            if axis < dim && seen[axis] {
                return Err(ViewError::TransposeError(
                    "permutation contains axis more than once".to_string(),
                ));
            }
            if axis < dim {
                seen[axis] = true;
            }
        }
    }
    let (src_strides, src_offset) = source_geometry(e);
    let mut shape = Vec::with_capacity(dim);
    let mut strides = Vec::with_capacity(dim);
    for &axis in perm {
        if axis >= dim {
            return Err(ViewError::TransposeError(
                "permutation contains wrong axis".to_string(),
            ));
        }
        shape.push(e.shape()[axis]);
        strides.push(src_strides[axis]);
    }
    let layout = if perm.windows(2).all(|w| w[0] <= w[1]) {
        e.layout()
    } else if perm.windows(2).all(|w| w[0] >= w[1]) {
        transpose_layout_lossy(e.layout())
    } else {
        Layout::Dynamic
    };
    Ok(StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        shape,
        strides,
        src_offset,
        layout,
    ))
}

/// Returns a 1-D view of all elements of `e`, read in `layout` order.
///
/// `Dynamic` and `Any` request the crate default order (row-major). The
/// source's flat buffer is reused when its strides already realise the
/// requested order; otherwise elements are read through a flat adaptor
/// traversing the source accordingly.
pub fn ravel<'a, E: Expression>(e: &'a E, layout: Layout) -> StridedView<'a, E> {
    let requested = default_assignable_layout(layout);
    let size = e.size();
    match e.flat_data() {
        Some(fd) if do_strides_match(e.shape(), fd.strides, requested) => {
            let offset = fd.offset;
            StridedView::from_parts(
                SourceHandle::Borrowed(e),
                FlatAccess::Direct,
                vec![size],
                vec![1],
                offset,
                Layout::Dynamic,
            )
        }
        _ => {
            let strides = compute_strides(e.shape(), requested);
            let adaptor = FlatAdaptor::with_strides(strides, requested, size);
            StridedView::from_parts(
                SourceHandle::Borrowed(e),
                FlatAccess::Adapted(adaptor),
                vec![size],
                vec![1],
                0,
                Layout::Dynamic,
            )
        }
    }
}

/// Returns a 1-D view of all elements of `e` in default traversal order.
pub fn flatten<'a, E: Expression>(e: &'a E) -> StridedView<'a, E> {
    ravel(e, Layout::Dynamic)
}

/// Returns a view of `e` with every length-1 axis removed.
pub fn squeeze<'a, E: Expression>(e: &'a E) -> StridedView<'a, E> {
    let (src_strides, src_offset) = source_geometry(e);
    let mut shape = Vec::new();
    let mut strides = Vec::new();
    for (&len, &stride) in e.shape().iter().zip(src_strides.iter()) {
        if len != 1 {
            shape.push(len);
            strides.push(stride);
        }
    }
    StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        shape,
        strides,
        src_offset,
        e.layout(),
    )
}

/// Returns a view of `e` with the listed axes removed.
///
/// # Arguments
///
/// * `axes` - the axes to drop.
/// * `check` - with `CheckPolicy::Full`, every listed axis must exist
///   and have length 1.
///
/// # Errors
///
/// Returns `SqueezeError` under `CheckPolicy::Full` when a listed axis
/// is out of range or has length other than 1.
pub fn squeeze_axes<'a, E: Expression>(
    e: &'a E,
    axes: &[usize],
    check: CheckPolicy,
) -> Result<StridedView<'a, E>> {
    if check == CheckPolicy::Full {
        for &axis in axes {
            if axis >= e.dimension() {
                return Err(ViewError::SqueezeError(format!(
                    "axis {} out of range for dimension {}",
                    axis,
                    e.dimension()
                )));
            }
            if e.shape()[axis] != 1 {
                return Err(ViewError::SqueezeError(format!(
                    "axis {} has length {}, expected 1",
                    axis,
                    e.shape()[axis]
                )));
            }
        }
    }
    let (src_strides, src_offset) = source_geometry(e);
    let mut shape = Vec::new();
    let mut strides = Vec::new();
    for (axis, (&len, &stride)) in e.shape().iter().zip(src_strides.iter()).enumerate() {
        if !axes.contains(&axis) {
            shape.push(len);
            strides.push(stride);
        }
    }
    Ok(StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        shape,
        strides,
        src_offset,
        e.layout(),
    ))
}

/// Returns a view of `e` with a new length-1 axis at position `axis`.
///
/// # Errors
///
/// Returns `DimensionError` when `axis > e.dimension()`.
pub fn expand_dims<'a, E: Expression>(e: &'a E, axis: usize) -> Result<StridedView<'a, E>> {
    let dim = e.dimension();
    if axis > dim {
        return Err(ViewError::DimensionError(format!(
            "cannot insert axis {} into {} dimensions",
            axis, dim
        )));
    }
    let mut slices = vec![Slice::All; dim + 1];
    slices[axis] = Slice::NewAxis;
    strided_view(e, &slices)
}

/// Returns a view of `e` with at least `n` dimensions.
///
/// Missing axes are inserted as length-1 axes, distributed between the
/// front and the back: `round((n - dim) / n)` leading, the rest
/// trailing. A 1-D expression raised to 3-D becomes `[1, len, 1]`.
pub fn atleast_nd<'a, E: Expression>(e: &'a E, n: usize) -> Result<StridedView<'a, E>> {
    let dim = e.dimension();
    let mut slices = vec![Slice::All; n.max(dim)];
    if dim < n {
        let leading = (((n - dim) as f64) / (n as f64)).round() as usize;
        for s in slices.iter_mut().take(leading) {
            *s = Slice::NewAxis;
        }
        for s in slices.iter_mut().skip(leading + dim) {
            *s = Slice::NewAxis;
        }
    }
    strided_view(e, &slices)
}

/// Returns a view of `e` with at least 1 dimension.
pub fn atleast_1d<'a, E: Expression>(e: &'a E) -> Result<StridedView<'a, E>> {
    atleast_nd(e, 1)
}

/// Returns a view of `e` with at least 2 dimensions.
pub fn atleast_2d<'a, E: Expression>(e: &'a E) -> Result<StridedView<'a, E>> {
    atleast_nd(e, 2)
}

/// Returns a view of `e` with at least 3 dimensions.
pub fn atleast_3d<'a, E: Expression>(e: &'a E) -> Result<StridedView<'a, E>> {
    atleast_nd(e, 3)
}

/// Splits `e` into `n` equal views along `axis`.
///
/// # Errors
///
/// Returns `SplitError` when `axis` does not exist, `n` is zero, or the
/// axis length is not divisible by `n`.
pub fn split<'a, E: Expression>(
    e: &'a E,
    n: usize,
    axis: usize,
) -> Result<Vec<StridedView<'a, E>>> {
    if axis >= e.dimension() {
        return Err(ViewError::SplitError(format!(
            "split along axis {} >= dimension {}",
            axis,
            e.dimension()
        )));
    }
    if n == 0 {
        return Err(ViewError::SplitError("cannot split into zero parts".to_string()));
    }
    let len = e.shape()[axis];
    if len % n != 0 {
        return Err(ViewError::SplitError(format!(
            "{} does not divide axis of length {}",
            n, len
        )));
    }
    let step = len / n;
    let mut parts = Vec::with_capacity(n);
    for i in 0..n {
        let mut slices = vec![Slice::All; e.dimension()];
        slices[axis] = range((i * step) as isize, ((i + 1) * step) as isize);
        parts.push(strided_view(e, &slices)?);
    }
    Ok(parts)
}

/// Returns a view of `e` with the element order along `axis` reversed.
///
/// The stride of `axis` is negated and the base offset moved to the old
/// last element; the result layout is `Dynamic`.
///
/// # Errors
///
/// Returns `DimensionError` when `axis` does not exist.
pub fn flip<'a, E: Expression>(e: &'a E, axis: usize) -> Result<StridedView<'a, E>> {
    if axis >= e.dimension() {
        return Err(ViewError::DimensionError(format!(
            "cannot flip axis {} of {} dimensions",
            axis,
            e.dimension()
        )));
    }
    let (src_strides, src_offset) = source_geometry(e);
    let len = e.shape()[axis];
    let mut strides = src_strides;
    let mut offset = src_offset as isize;
    if len > 0 {
        offset += strides[axis] * (len as isize - 1);
    }
    strides[axis] = -strides[axis];
    Ok(StridedView::from_descriptor(
        SourceHandle::Borrowed(e),
        e.shape().to_vec(),
        strides,
        offset as usize,
        Layout::Dynamic,
    ))
}

/// Returns a view of a 1-D expression with zeros trimmed from its ends.
///
/// # Errors
///
/// Returns `DimensionError` for a non-1-D expression.
pub fn trim_zeros<'a, E>(e: &'a E, mode: TrimMode) -> Result<StridedView<'a, E>>
where
    E: Expression,
    E::Elem: Zero,
{
    if e.dimension() != 1 {
        return Err(ViewError::DimensionError(format!(
            "trim_zeros expects 1 dimension, got {}",
            e.dimension()
        )));
    }
    let mut begin = 0;
    let mut end = e.size();
    if mode.front() {
        while begin < end && e.element(&[begin]).is_zero() {
            begin += 1;
        }
    }
    if mode.back() && begin != end {
        while end > begin && e.element(&[end - 1]).is_zero() {
            end -= 1;
        }
    }
    strided_view(e, &[range(begin as isize, end as isize)])
}
