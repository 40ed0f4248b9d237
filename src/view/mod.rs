//! Strided views over expressions.
//!
//! A [`StridedView`] re-interprets the elements of a source expression
//! under a new shape, stride vector, base offset and layout. No element
//! is copied: reading through the view resolves to an address in the
//! source, and a view built over a mutable source writes through.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::dimension::{adapt_strides, broadcast_shapes, can_broadcast_to, element_offset, Layout};
use crate::error::{Result, ViewError};
use crate::expression::{Expression, ExpressionMut, FlatData, SourceHandle};

mod adaptor;
mod build;
mod iter;
mod ops;
pub mod slice;

pub use adaptor::FlatAdaptor;
pub use build::{
    build_descriptor, strided_view, strided_view_mut, strided_view_owned, strided_view_with,
};
pub use iter::{Iter, Stepper};
pub use ops::{
    atleast_1d, atleast_2d, atleast_3d, atleast_nd, expand_dims, flatten, flip, ravel, split,
    squeeze, squeeze_axes, transpose, transpose_axes, trim_zeros, CheckPolicy, TrimMode,
};
pub use slice::{
    all, ellipsis, index, newaxis, range, range_step, ReducedSlice, Slice, SliceBound,
};

/// How view elements are resolved in flat storage.
#[derive(Debug)]
pub(crate) enum FlatAccess {
    /// The source exposes a flat buffer; addresses are computed directly.
    Direct,
    /// Elements are reached through an adaptor over multi-index access.
    Adapted(FlatAdaptor),
}

/// A non-owning strided view of an expression.
///
/// The view holds a handle to its source (borrowed or owned), a flat
/// access strategy selected from the source's capabilities at
/// construction time, and an immutable descriptor: shape, signed
/// strides, backstrides, base offset and layout. The flat position of
/// multi-index `(i0, ..., in-1)` is `offset + sum(ik * strides[k])`.
pub struct StridedView<'a, E: Expression> {
    source: SourceHandle<'a, E>,
    flat: FlatAccess,
    shape: Vec<usize>,
    strides: Vec<isize>,
    backstrides: Vec<isize>,
    offset: usize,
    layout: Layout,
}

impl<'a, E: Expression> StridedView<'a, E> {
    /// Assembles a view from a source handle and a descriptor, selecting
    /// direct or adapted flat access from the source's data interface.
    pub(crate) fn from_descriptor(
        source: SourceHandle<'a, E>,
        shape: Vec<usize>,
        strides: Vec<isize>,
        offset: usize,
        layout: Layout,
    ) -> Self {
        let flat = match source.get().flat_data() {
            Some(_) => FlatAccess::Direct,
            None => FlatAccess::Adapted(FlatAdaptor::new(source.get())),
        };
        Self::from_parts(source, flat, shape, strides, offset, layout)
    }

    /// Assembles a view with an explicitly chosen flat access strategy.
    pub(crate) fn from_parts(
        source: SourceHandle<'a, E>,
        flat: FlatAccess,
        shape: Vec<usize>,
        strides: Vec<isize>,
        offset: usize,
        layout: Layout,
    ) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        let backstrides = adapt_strides(&shape, &strides);
        Self {
            source,
            flat,
            shape,
            strides,
            backstrides,
            offset,
            layout,
        }
    }

    /// Returns the shape of the view.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the signed strides of the view.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the backstrides: `strides[k] * (shape[k] - 1)` per axis.
    pub fn backstrides(&self) -> &[isize] {
        &self.backstrides
    }

    /// Returns the flat position of the element at the all-zero index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the layout of the view.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the number of dimensions.
    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Read access to the underlying source expression.
    pub fn source(&self) -> &E {
        self.source.get()
    }

    /// Returns `true` when the view can write through to its source.
    pub fn is_writable(&self) -> bool {
        self.source.is_writable()
    }

    /// Returns the element at the all-zero multi-index.
    pub fn first(&self) -> &E::Elem {
        self.flat_get(self.offset)
    }

    /// Returns the element at `index` after full dimension and bounds
    /// checking.
    ///
    /// # Errors
    ///
    /// * `DimensionError` - `index.len()` differs from the dimension.
    /// * `IndexOutOfBounds` - some position is outside its axis.
    pub fn at(&self, index: &[usize]) -> Result<&E::Elem> {
        self.check_access(index)?;
        Ok(self.flat_get(self.flat_index(index)))
    }

    /// Mutable counterpart of [`StridedView::at`].
    ///
    /// # Errors
    ///
    /// As [`StridedView::at`], plus `ReadOnlyView` when the source
    /// handle is a shared borrow.
    pub fn at_mut(&mut self, index: &[usize]) -> Result<&mut E::Elem>
    where
        E: ExpressionMut,
    {
        self.check_access(index)?;
        let flat = self.flat_index(index);
        self.flat_get_mut(flat)
    }

    /// Fills every element with `value`, in iteration order.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyView` when the view cannot write to its source.
    pub fn fill(&mut self, value: E::Elem) -> Result<()>
    where
        E: ExpressionMut,
        E::Elem: Clone,
    {
        if !self.source.is_writable() {
            return Err(ViewError::ReadOnlyView);
        }
        let total = self.size();
        let dim = self.dimension();
        let mut index = vec![0usize; dim];
        let mut cursor = self.offset as isize;
        for _ in 0..total {
            self.flat_set(cursor as usize, value.clone())?;
            self.advance(&mut index, &mut cursor);
        }
        Ok(())
    }

    /// Assigns the elements of `rhs` into this view.
    ///
    /// The right-hand shape must broadcast to the view's shape; the copy
    /// is element-wise in iteration order, so an equal-shape `rhs` (such
    /// as a materialised temporary) degenerates to a linear copy.
    ///
    /// # Errors
    ///
    /// * `BroadcastError` - the shapes are not broadcast-compatible.
    /// * `ReadOnlyView` - the view cannot write to its source.
    pub fn assign<R>(&mut self, rhs: &R) -> Result<()>
    where
        E: ExpressionMut,
        E::Elem: Clone,
        R: Expression<Elem = E::Elem>,
    {
        if !self.source.is_writable() {
            return Err(ViewError::ReadOnlyView);
        }
        if !can_broadcast_to(rhs.shape(), &self.shape) {
            return Err(ViewError::BroadcastError(
                rhs.shape().to_vec(),
                self.shape.clone(),
            ));
        }
        let dim = self.dimension();
        let rdim = rhs.dimension();
        let skip = dim - rdim;
        let rshape = rhs.shape().to_vec();
        let mut index = vec![0usize; dim];
        let mut rindex = vec![0usize; rdim];
        let mut cursor = self.offset as isize;
        for _ in 0..self.size() {
            for (j, r) in rindex.iter_mut().enumerate() {
                *r = if rshape[j] == 1 { 0 } else { index[skip + j] };
            }
            let value = rhs.element(&rindex).clone();
            self.flat_set(cursor as usize, value)?;
            self.advance(&mut index, &mut cursor);
        }
        Ok(())
    }

    /// Widens `out` to be broadcast-compatible with this view's shape.
    ///
    /// Returns whether broadcasting is trivial, i.e. the widened shape
    /// equals the view's own.
    pub fn broadcast_shape(&self, out: &mut Vec<usize>) -> Result<bool> {
        broadcast_shapes(&self.shape, out)
    }

    /// Returns `true` iff `strides` matches this view's strides
    /// pointwise.
    pub fn is_trivial_broadcast(&self, strides: &[isize]) -> bool {
        strides.len() == self.strides.len()
            && strides.iter().zip(self.strides.iter()).all(|(a, b)| a == b)
    }

    pub(crate) fn flat_get(&self, flat: usize) -> &E::Elem {
        match &self.flat {
            FlatAccess::Direct => match self.source.get().flat_data() {
                Some(fd) => &fd.data[flat],
                None => unreachable!("direct access requires a flat source"),
            },
            FlatAccess::Adapted(adaptor) => adaptor.get(self.source.get(), flat),
        }
    }

    fn flat_get_mut(&mut self, flat: usize) -> Result<&mut E::Elem>
    where
        E: ExpressionMut,
    {
        let source = self.source.get_mut()?;
        match &self.flat {
            FlatAccess::Direct => match source.flat_data_mut() {
                Some(data) => Ok(&mut data[flat]),
                None => unreachable!("direct access requires a flat source"),
            },
            FlatAccess::Adapted(adaptor) => Ok(adaptor.get_mut(source, flat)),
        }
    }

    fn flat_set(&mut self, flat: usize, value: E::Elem) -> Result<()>
    where
        E: ExpressionMut,
    {
        *self.flat_get_mut(flat)? = value;
        Ok(())
    }

    /// Flat position of a multi-index; extra leading indices beyond the
    /// dimension are skipped.
    fn flat_index(&self, index: &[usize]) -> usize {
        (self.offset as isize + element_offset(&self.strides, index)) as usize
    }

    fn debug_check_index(&self, index: &[usize]) {
        debug_assert!(
            index.len() >= self.dimension(),
            "expected at least {} indices, got {}",
            self.dimension(),
            index.len()
        );
        let skip = index.len() - self.dimension();
        debug_assert!(
            index[..skip].iter().all(|&i| i == 0),
            "extra leading indices must be zero"
        );
        debug_assert!(
            index[skip..]
                .iter()
                .zip(self.shape.iter())
                .all(|(&i, &n)| i < n),
            "index {:?} out of bounds for shape {:?}",
            index,
            self.shape
        );
    }

    fn check_access(&self, index: &[usize]) -> Result<()> {
        if index.len() != self.dimension() {
            return Err(ViewError::DimensionError(format!(
                "expected {} indices, got {}",
                self.dimension(),
                index.len()
            )));
        }
        for (axis, (&i, &n)) in index.iter().zip(self.shape.iter()).enumerate() {
            if i >= n {
                return Err(ViewError::IndexOutOfBounds {
                    index: i as isize,
                    len: n,
                    axis,
                });
            }
        }
        Ok(())
    }

    /// Row-major step to the next multi-index, keeping `cursor` in sync
    /// through strides and backstrides.
    fn advance(&self, index: &mut [usize], cursor: &mut isize) {
        for k in (0..index.len()).rev() {
            index[k] += 1;
            if index[k] < self.shape[k] {
                *cursor += self.strides[k];
                return;
            }
            index[k] = 0;
            *cursor -= self.backstrides[k];
        }
    }
}

impl<'a, E: Expression> Expression for StridedView<'a, E> {
    type Elem = E::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn element(&self, index: &[usize]) -> &E::Elem {
        self.debug_check_index(index);
        self.flat_get(self.flat_index(index))
    }

    fn flat_data(&self) -> Option<FlatData<'_, E::Elem>> {
        match (&self.flat, self.source.get().flat_data()) {
            (FlatAccess::Direct, Some(fd)) => Some(FlatData {
                data: fd.data,
                offset: self.offset,
                strides: &self.strides,
            }),
            _ => None,
        }
    }
}

impl<'a, E: ExpressionMut> ExpressionMut for StridedView<'a, E> {
    /// # Panics
    ///
    /// Panics when the view was built from a shared borrow; use
    /// [`StridedView::at_mut`] for a fallible write path.
    fn element_mut(&mut self, index: &[usize]) -> &mut E::Elem {
        self.debug_check_index(index);
        let flat = self.flat_index(index);
        match self.flat_get_mut(flat) {
            Ok(elem) => elem,
            Err(_) => panic!("cannot write through a read-only view"),
        }
    }

    fn flat_data_mut(&mut self) -> Option<&mut [E::Elem]> {
        if !self.source.is_writable() {
            return None;
        }
        match &self.flat {
            FlatAccess::Direct => match self.source.get_mut() {
                Ok(source) => source.flat_data_mut(),
                Err(_) => None,
            },
            FlatAccess::Adapted(_) => None,
        }
    }
}

impl<'a, E: Expression> Index<&[usize]> for StridedView<'a, E> {
    type Output = E::Elem;

    fn index(&self, index: &[usize]) -> &E::Elem {
        self.element(index)
    }
}

impl<'a, E: Expression, const N: usize> Index<[usize; N]> for StridedView<'a, E> {
    type Output = E::Elem;

    fn index(&self, index: [usize; N]) -> &E::Elem {
        self.element(&index)
    }
}

impl<'a, E: Expression> Index<usize> for StridedView<'a, E> {
    type Output = E::Elem;

    /// 1-D convenience: `view[i]` is `view.element(&[i])`.
    fn index(&self, i: usize) -> &E::Elem {
        self.element(&[i])
    }
}

impl<'a, E: ExpressionMut> IndexMut<&[usize]> for StridedView<'a, E> {
    fn index_mut(&mut self, index: &[usize]) -> &mut E::Elem {
        self.element_mut(index)
    }
}

impl<'a, E: ExpressionMut, const N: usize> IndexMut<[usize; N]> for StridedView<'a, E> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut E::Elem {
        self.element_mut(&index)
    }
}

impl<'a, E: ExpressionMut> IndexMut<usize> for StridedView<'a, E> {
    fn index_mut(&mut self, i: usize) -> &mut E::Elem {
        self.element_mut(&[i])
    }
}

impl<'a, E: Expression> fmt::Debug for StridedView<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StridedView")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DenseArray;

    fn sample() -> DenseArray<f64> {
        DenseArray::from_vec((1..=6).map(f64::from).collect(), vec![2, 3]).unwrap()
    }

    #[test]
    fn test_identity_view_access() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        assert_eq!(v.shape(), &[2, 3]);
        assert_eq!(v.strides(), &[3, 1]);
        assert_eq!(v.backstrides(), &[3, 2]);
        assert_eq!(v[[0, 0]], 1.0);
        assert_eq!(v[[1, 2]], 6.0);
        assert_eq!(*v.first(), 1.0);
    }

    #[test]
    fn test_extra_leading_indices() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        assert_eq!(*v.element(&[0, 1, 2]), 6.0);
    }

    #[test]
    fn test_at_checks() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        assert_eq!(*v.at(&[1, 1]).unwrap(), 5.0);
        assert!(matches!(
            v.at(&[0]),
            Err(ViewError::DimensionError(_))
        ));
        assert!(matches!(
            v.at(&[0, 3]),
            Err(ViewError::IndexOutOfBounds { axis: 1, .. })
        ));
    }

    #[test]
    fn test_one_dimensional_convenience() {
        let a = DenseArray::from_vec(vec![10, 20, 30], vec![3]).unwrap();
        let v = strided_view(&a, &[]).unwrap();
        assert_eq!(v[1], 20);
    }

    #[test]
    fn test_fill_through_view() {
        let mut a = sample();
        let mut v = strided_view_mut(&mut a, &[slice::range(0, 1)]).unwrap();
        v.fill(0.0).unwrap();
        assert_eq!(a.as_slice(), &[0.0, 0.0, 0.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_assign_broadcasts() {
        let mut a = sample();
        let row = DenseArray::from_vec(vec![7.0, 8.0, 9.0], vec![1, 3]).unwrap();
        let mut v = strided_view_mut(&mut a, &[]).unwrap();
        v.assign(&row).unwrap();
        assert_eq!(a.as_slice(), &[7.0, 8.0, 9.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_assign_shape_mismatch() {
        let mut a = sample();
        let bad = DenseArray::from_vec(vec![1.0, 2.0], vec![2]).unwrap();
        let mut v = strided_view_mut(&mut a, &[]).unwrap();
        assert!(matches!(
            v.assign(&bad),
            Err(ViewError::BroadcastError(..))
        ));
    }

    #[test]
    fn test_read_only_view_rejects_writes() {
        let mut a = sample();
        let v = strided_view(&a, &[]).unwrap();
        assert!(!v.is_writable());
        drop(v);
        let mut w = strided_view_mut(&mut a, &[]).unwrap();
        assert!(w.is_writable());
        *w.at_mut(&[0, 0]).unwrap() = 42.0;
        assert_eq!(a.as_slice()[0], 42.0);
    }

    #[test]
    fn test_broadcast_queries() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        let mut out = vec![4, 1, 3];
        assert!(!v.broadcast_shape(&mut out).unwrap());
        assert_eq!(out, vec![4, 2, 3]);
        let mut out = vec![1, 2, 3];
        assert!(v.broadcast_shape(&mut out).unwrap());
        assert_eq!(out, vec![1, 2, 3]);
        assert!(v.is_trivial_broadcast(&[3, 1]));
        assert!(!v.is_trivial_broadcast(&[1, 3]));
        assert!(!v.is_trivial_broadcast(&[1]));
    }

    #[test]
    fn test_zero_dimensional_view() {
        let a = sample();
        let v = strided_view(&a, &[slice::index(1), slice::index(2)]).unwrap();
        assert_eq!(v.dimension(), 0);
        assert_eq!(v.size(), 1);
        assert_eq!(*v.first(), 6.0);
    }

    #[test]
    fn test_view_of_view_composes() {
        let a = sample();
        let v = strided_view(&a, &[slice::range(0, 2), slice::range(1, 3)]).unwrap();
        let w = strided_view(&v, &[slice::index(1)]).unwrap();
        assert_eq!(w.shape(), &[2]);
        assert_eq!(w[0], 5.0);
        assert_eq!(w[1], 6.0);
    }
}
