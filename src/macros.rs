//! Convenience macros for building slice lists.

/// Builds a `Vec<Slice>` from mixed slice expressions.
///
/// Accepts anything convertible into a [`Slice`](crate::Slice):
/// integers, ranges, `..`, or slice values built with the constructor
/// functions.
///
/// # Examples
/// ```
/// use strideview::{slices, DenseArray, strided_view};
///
/// let a = DenseArray::from_vec((0..12).collect::<Vec<i32>>(), vec![3, 4]).unwrap();
/// let v = strided_view(&a, &slices![1, 0..2]).unwrap();
/// assert_eq!(v.shape(), &[2]);
/// ```
#[macro_export]
macro_rules! slices {
    ($($s:expr),* $(,)?) => {
        vec![$($crate::Slice::from($s)),*]
    };
}
