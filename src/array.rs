//! A minimal owning dense array.
//!
//! [`DenseArray`] is the smallest concrete source the view engine can be
//! exercised against: a row-major `Vec<T>` with a shape, strides and a
//! full data interface. Anything richer (lazy expressions, alternative
//! storage) lives behind the [`Expression`] trait instead.

use crate::dimension::{compute_strides, element_offset, Layout};
use crate::error::{Result, ViewError};
use crate::expression::{Expression, ExpressionMut, FlatData};

/// An owning, row-major n-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseArray<T> {
    data: Vec<T>,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl<T> DenseArray<T> {
    /// Creates an array from flat data and a shape.
    ///
    /// # Errors
    ///
    /// Returns `DimensionError` when the data length does not equal the
    /// shape's element count.
    pub fn from_vec(data: Vec<T>, shape: Vec<usize>) -> Result<Self> {
        let size: usize = shape.iter().product();
        if data.len() != size {
            return Err(ViewError::DimensionError(format!(
                "{} elements do not fill shape {:?}",
                data.len(),
                shape
            )));
        }
        let strides = compute_strides(&shape, Layout::RowMajor);
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Creates an array filled with copies of `value`.
    pub fn from_elem(value: T, shape: Vec<usize>) -> Self
    where
        T: Clone,
    {
        let size = shape.iter().product();
        let strides = compute_strides(&shape, Layout::RowMajor);
        Self {
            data: vec![value; size],
            shape,
            strides,
        }
    }

    /// The flat element buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn flat_index(&self, index: &[usize]) -> usize {
        debug_assert!(index.len() >= self.shape.len());
        debug_assert!(
            index[index.len() - self.shape.len()..]
                .iter()
                .zip(self.shape.iter())
                .all(|(&i, &n)| i < n),
            "index {:?} out of bounds for shape {:?}",
            index,
            self.shape
        );
        element_offset(&self.strides, index) as usize
    }
}

impl<T> From<Vec<T>> for DenseArray<T> {
    /// A vector becomes a 1-D array.
    fn from(data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        let strides = compute_strides(&shape, Layout::RowMajor);
        Self {
            data,
            shape,
            strides,
        }
    }
}

impl<T> Expression for DenseArray<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        Layout::RowMajor
    }

    fn element(&self, index: &[usize]) -> &T {
        &self.data[self.flat_index(index)]
    }

    fn flat_data(&self) -> Option<FlatData<'_, T>> {
        Some(FlatData {
            data: &self.data,
            offset: 0,
            strides: &self.strides,
        })
    }
}

impl<T> ExpressionMut for DenseArray<T> {
    fn element_mut(&mut self, index: &[usize]) -> &mut T {
        let flat = self.flat_index(index);
        &mut self.data[flat]
    }

    fn flat_data_mut(&mut self) -> Option<&mut [T]> {
        Some(&mut self.data)
    }
}

impl<T, I: AsRef<[usize]>> std::ops::Index<I> for DenseArray<T> {
    type Output = T;

    fn index(&self, index: I) -> &T {
        self.element(index.as_ref())
    }
}

impl<T, I: AsRef<[usize]>> std::ops::IndexMut<I> for DenseArray<T> {
    fn index_mut(&mut self, index: I) -> &mut T {
        self.element_mut(index.as_ref())
    }
}
