//! Linear access over sources without a flat buffer.
//!
//! A [`FlatAdaptor`] makes an indexed-access expression addressable by a
//! single linear index: the index is unravelled against a canonical
//! stride vector and the resulting multi-index is handed to the source.
//! The unravel scratch buffer lives in a `RefCell`, so the adaptor (and
//! any view holding one) is not `Sync` and must stay on one thread.

use std::cell::RefCell;

use crate::dimension::{compute_strides, default_assignable_layout, unravel_into, Layout};
use crate::expression::{Expression, ExpressionMut};

/// Presents a non-contiguous expression as a linear-indexable sequence.
#[derive(Debug)]
pub struct FlatAdaptor {
    strides: Vec<isize>,
    layout: Layout,
    len: usize,
    scratch: RefCell<Vec<usize>>,
}

impl FlatAdaptor {
    /// Builds an adaptor traversing `source` in its own layout, or in
    /// the crate default order when that layout is not assignable.
    pub fn new<E: Expression>(source: &E) -> Self {
        let layout = default_assignable_layout(source.layout());
        Self::with_strides(
            compute_strides(source.shape(), layout),
            layout,
            source.size(),
        )
    }

    /// Builds an adaptor with a caller-chosen stride vector and layout,
    /// reflecting a specific traversal order.
    pub fn with_strides(strides: Vec<isize>, layout: Layout, len: usize) -> Self {
        let dim = strides.len();
        Self {
            strides,
            layout,
            len,
            scratch: RefCell::new(vec![0; dim]),
        }
    }

    /// Number of addressable elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The stride vector the linear index is unravelled against.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// The traversal layout of the linear index.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Resolves linear index `flat` to an element of `source`.
    pub fn get<'e, E: Expression>(&self, source: &'e E, flat: usize) -> &'e E::Elem {
        let mut index = self.scratch.borrow_mut();
        unravel_into(flat, &self.strides, self.layout, &mut index);
        source.element(&index)
    }

    /// Resolves linear index `flat` to a mutable element of `source`.
    pub fn get_mut<'e, E: ExpressionMut>(
        &self,
        source: &'e mut E,
        flat: usize,
    ) -> &'e mut E::Elem {
        let mut index = self.scratch.borrow_mut();
        unravel_into(flat, &self.strides, self.layout, &mut index);
        source.element_mut(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Layout;

    // A 2-D source that stores each row separately, so it has no flat
    // buffer to hand out.
    #[derive(Debug)]
    struct Rows {
        rows: Vec<Vec<i32>>,
        shape: Vec<usize>,
    }

    impl Rows {
        fn new(rows: Vec<Vec<i32>>) -> Self {
            let shape = vec![rows.len(), rows[0].len()];
            Self { rows, shape }
        }
    }

    impl Expression for Rows {
        type Elem = i32;

        fn shape(&self) -> &[usize] {
            &self.shape
        }

        fn layout(&self) -> Layout {
            Layout::Dynamic
        }

        fn element(&self, index: &[usize]) -> &i32 {
            let skip = index.len() - 2;
            &self.rows[index[skip]][index[skip + 1]]
        }
    }

    impl ExpressionMut for Rows {
        fn element_mut(&mut self, index: &[usize]) -> &mut i32 {
            let skip = index.len() - 2;
            &mut self.rows[index[skip]][index[skip + 1]]
        }
    }

    #[test]
    fn test_default_adaptor_row_order() {
        let source = Rows::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let adaptor = FlatAdaptor::new(&source);
        assert_eq!(adaptor.len(), 6);
        assert_eq!(adaptor.layout(), Layout::RowMajor);
        let values: Vec<i32> = (0..6).map(|i| *adaptor.get(&source, i)).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_explicit_column_order() {
        let source = Rows::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let strides = compute_strides(source.shape(), Layout::ColumnMajor);
        let adaptor = FlatAdaptor::with_strides(strides, Layout::ColumnMajor, source.size());
        let values: Vec<i32> = (0..6).map(|i| *adaptor.get(&source, i)).collect();
        assert_eq!(values, vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut source = Rows::new(vec![vec![1, 2], vec![3, 4]]);
        let adaptor = FlatAdaptor::new(&source);
        *adaptor.get_mut(&mut source, 3) = 40;
        assert_eq!(source.rows[1][1], 40);
    }
}
