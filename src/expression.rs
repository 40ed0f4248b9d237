//! The expression interface consumed by views.
//!
//! Anything with a shape, a layout and multi-index element access can be
//! viewed. Sources that additionally expose a flat buffer with strides
//! report it through [`Expression::flat_data`]; the view uses that probe
//! to pick direct stride arithmetic over indexed access.

use crate::dimension::Layout;
use crate::error::{Result, ViewError};

/// The data interface of a contiguous source: a flat buffer, the offset
/// of the element at the all-zero index, and the signed strides mapping
/// multi-indices into the buffer.
#[derive(Debug, Clone, Copy)]
pub struct FlatData<'a, T> {
    pub data: &'a [T],
    pub offset: usize,
    pub strides: &'a [isize],
}

/// An expression exposing an n-dimensional shape and element access.
pub trait Expression {
    /// The element type.
    type Elem;

    /// Returns the shape of the expression.
    fn shape(&self) -> &[usize];

    /// Returns the layout of the expression.
    fn layout(&self) -> Layout;

    /// Returns the element at the given multi-index.
    ///
    /// Implementations accept `index.len() >= self.dimension()` and use
    /// the trailing `self.dimension()` values.
    fn element(&self, index: &[usize]) -> &Self::Elem;

    /// Returns the number of dimensions.
    fn dimension(&self) -> usize {
        self.shape().len()
    }

    /// Returns the total number of elements.
    fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Reports the flat buffer behind this expression, if it has one.
    ///
    /// The default is `None`: elements are only reachable through
    /// [`Expression::element`] and views of this source go through a
    /// flat adaptor.
    fn flat_data(&self) -> Option<FlatData<'_, Self::Elem>> {
        None
    }
}

/// A mutable expression: element-wise write access.
pub trait ExpressionMut: Expression {
    /// Returns a mutable reference to the element at the given multi-index.
    fn element_mut(&mut self, index: &[usize]) -> &mut Self::Elem;

    /// Mutable counterpart of [`Expression::flat_data`]; same buffer,
    /// same addressing.
    fn flat_data_mut(&mut self) -> Option<&mut [Self::Elem]> {
        None
    }
}

/// How a view holds its source expression.
///
/// A view built from a shared borrow is read-only; one built from a
/// unique borrow or from an owned source can write through to the
/// underlying elements.
#[derive(Debug)]
pub enum SourceHandle<'a, E> {
    Borrowed(&'a E),
    BorrowedMut(&'a mut E),
    Owned(E),
}

impl<'a, E> SourceHandle<'a, E> {
    /// Read access to the source.
    pub fn get(&self) -> &E {
        match self {
            SourceHandle::Borrowed(e) => e,
            SourceHandle::BorrowedMut(e) => e,
            SourceHandle::Owned(e) => e,
        }
    }

    /// Write access to the source.
    ///
    /// # Errors
    ///
    /// Returns `ReadOnlyView` for a shared borrow.
    pub fn get_mut(&mut self) -> Result<&mut E> {
        match self {
            SourceHandle::Borrowed(_) => Err(ViewError::ReadOnlyView),
            SourceHandle::BorrowedMut(e) => Ok(e),
            SourceHandle::Owned(e) => Ok(e),
        }
    }

    /// Returns `true` when the handle permits writes.
    pub fn is_writable(&self) -> bool {
        !matches!(self, SourceHandle::Borrowed(_))
    }
}

impl<'a, E: Expression> Expression for &'a E {
    type Elem = E::Elem;

    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    fn layout(&self) -> Layout {
        (**self).layout()
    }

    fn element(&self, index: &[usize]) -> &Self::Elem {
        (**self).element(index)
    }

    fn flat_data(&self) -> Option<FlatData<'_, Self::Elem>> {
        (**self).flat_data()
    }
}
