//! Steppers and element iteration.
//!
//! A [`Stepper`] is the cursor protocol an iterable layer drives: it
//! moves a flat position through the view's storage one axis at a time,
//! using strides to step and backstrides to reset. Whether a step
//! resolves through direct buffer arithmetic or through the flat adaptor
//! was decided when the view was built; the stepper itself is oblivious.
//!
//! [`Iter`] walks the whole view in row-major order.

use crate::dimension::Layout;
use crate::expression::Expression;

use super::StridedView;

/// A cursor over a view, stepped axis-by-axis by an iterable layer.
///
/// When the stepper is created against a broadcast target shape, the
/// leading `target.len() - view.dimension()` axes are virtual: stepping
/// along them leaves the cursor in place.
pub struct Stepper<'v, 'a, E: Expression> {
    view: &'v StridedView<'a, E>,
    cursor: isize,
    skip: usize,
}

impl<'v, 'a, E: Expression> Stepper<'v, 'a, E> {
    /// Steps `n` positions forward along `dim` of the target shape.
    pub fn step(&mut self, dim: usize, n: usize) {
        if dim >= self.skip {
            self.cursor += n as isize * self.view.strides()[dim - self.skip];
        }
    }

    /// Steps `n` positions backward along `dim` of the target shape.
    pub fn step_back(&mut self, dim: usize, n: usize) {
        if dim >= self.skip {
            self.cursor -= n as isize * self.view.strides()[dim - self.skip];
        }
    }

    /// Rewinds `dim` from its last position to its first.
    pub fn reset(&mut self, dim: usize) {
        if dim >= self.skip {
            self.cursor -= self.view.backstrides()[dim - self.skip];
        }
    }

    /// Forwards `dim` from its first position to its last.
    pub fn reset_back(&mut self, dim: usize) {
        if dim >= self.skip {
            self.cursor += self.view.backstrides()[dim - self.skip];
        }
    }

    /// Repositions at the first element.
    pub fn to_begin(&mut self) {
        self.cursor = self.view.offset() as isize;
    }

    /// Repositions past the last element of a traversal in `layout`
    /// order.
    pub fn to_end(&mut self, layout: Layout) {
        self.cursor = self.view.offset() as isize;
        if self.view.is_empty() {
            return;
        }
        for &back in self.view.backstrides() {
            self.cursor += back;
        }
        let strides = self.view.strides();
        self.cursor += match layout {
            Layout::ColumnMajor => strides.first().copied().unwrap_or(1),
            _ => strides.last().copied().unwrap_or(1),
        };
    }

    /// The element under the cursor.
    pub fn value(&self) -> &'v E::Elem {
        self.view.flat_get(self.cursor as usize)
    }

    /// The flat storage position under the cursor.
    pub fn position(&self) -> isize {
        self.cursor
    }
}

impl<'a, E: Expression> StridedView<'a, E> {
    /// Creates a stepper positioned at the first element, against a
    /// broadcast `target_shape` of at least the view's dimension.
    pub fn stepper_begin(&self, target_shape: &[usize]) -> Stepper<'_, 'a, E> {
        Stepper {
            view: self,
            cursor: self.offset() as isize,
            skip: target_shape.len() - self.dimension(),
        }
    }

    /// Creates the past-the-end stepper for a traversal of
    /// `target_shape` in `layout` order.
    pub fn stepper_end(&self, target_shape: &[usize], layout: Layout) -> Stepper<'_, 'a, E> {
        let mut stepper = self.stepper_begin(target_shape);
        stepper.to_end(layout);
        stepper
    }

    /// Iterates the view's elements in row-major order.
    pub fn iter(&self) -> Iter<'_, 'a, E> {
        Iter {
            view: self,
            index: vec![0; self.dimension()],
            cursor: self.offset() as isize,
            remaining: self.size(),
        }
    }
}

/// Row-major iterator over the elements of a view.
pub struct Iter<'v, 'a, E: Expression> {
    view: &'v StridedView<'a, E>,
    index: Vec<usize>,
    cursor: isize,
    remaining: usize,
}

impl<'v, 'a, E: Expression> Iterator for Iter<'v, 'a, E> {
    type Item = &'v E::Elem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.view.flat_get(self.cursor as usize);
        self.view.advance(&mut self.index, &mut self.cursor);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'v, 'a, E: Expression> ExactSizeIterator for Iter<'v, 'a, E> {}

impl<'v, 'a, E: Expression> IntoIterator for &'v StridedView<'a, E> {
    type Item = &'v E::Elem;
    type IntoIter = Iter<'v, 'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DenseArray;
    use crate::view::slice::{all, range_step};
    use crate::view::strided_view;

    fn sample() -> DenseArray<i32> {
        DenseArray::from_vec((1..=6).collect(), vec![2, 3]).unwrap()
    }

    #[test]
    fn test_iter_row_major_order() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        let values: Vec<i32> = v.iter().copied().collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_iter_strided() {
        let a = sample();
        let v = strided_view(&a, &[all(), range_step(.., .., -1)]).unwrap();
        let values: Vec<i32> = v.iter().copied().collect();
        assert_eq!(values, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_iter_empty_view() {
        let a = sample();
        let v = strided_view(&a, &[crate::view::slice::range(1, 1)]).unwrap();
        assert_eq!(v.size(), 0);
        assert_eq!(v.iter().count(), 0);
    }

    #[test]
    fn test_stepper_protocol() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        let mut s = v.stepper_begin(&[2, 3]);
        assert_eq!(*s.value(), 1);
        s.step(1, 2);
        assert_eq!(*s.value(), 3);
        s.step(0, 1);
        assert_eq!(*s.value(), 6);
        s.reset(1);
        assert_eq!(*s.value(), 4);
        s.to_begin();
        assert_eq!(*s.value(), 1);
    }

    #[test]
    fn test_stepper_broadcast_offset() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        // Against a broader target, the leading axis is virtual.
        let mut s = v.stepper_begin(&[4, 2, 3]);
        s.step(0, 3);
        assert_eq!(*s.value(), 1);
        s.step(2, 1);
        assert_eq!(*s.value(), 2);
    }

    #[test]
    fn test_stepper_end_positions() {
        let a = sample();
        let v = strided_view(&a, &[]).unwrap();
        let end = v.stepper_end(&[2, 3], Layout::RowMajor);
        // One past the last element of a row-major walk.
        assert_eq!(end.position(), 6);
        let end = v.stepper_end(&[2, 3], Layout::ColumnMajor);
        assert_eq!(end.position(), 8);
    }
}
