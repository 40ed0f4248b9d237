//! Strided, non-owning views over multi-dimensional expressions.
//!
//! Given a source with a shape and element access, this crate builds
//! views that re-interpret the same elements under a new shape, stride
//! vector, base offset and layout — slicing, transposition, flattening,
//! axis insertion and removal, reversal and splitting, all without
//! copying storage. Sources with a flat buffer are addressed by stride
//! arithmetic; anything else is reached through a flat adaptor over its
//! multi-index access.
//!
//! ```
//! use strideview::{range, range_step, strided_view, DenseArray};
//!
//! let a = DenseArray::from_vec(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
//! let v = strided_view(&a, &[range(0, 1), range_step(0, 3, 2)]).unwrap();
//! assert_eq!(v.shape(), &[1, 2]);
//! assert_eq!(v[[0, 1]], 3);
//! ```

pub mod array;
pub mod dimension;
pub mod error;
pub mod expression;
mod macros;
pub mod view;

pub use array::DenseArray;
pub use dimension::{
    adapt_strides, broadcast_shapes, compute_strides, default_assignable_layout, do_strides_match,
    transpose_layout, Layout,
};
pub use error::{Result, ViewError};
pub use expression::{Expression, ExpressionMut, FlatData, SourceHandle};
pub use view::{
    all, atleast_1d, atleast_2d, atleast_3d, atleast_nd, build_descriptor, ellipsis, expand_dims,
    flatten, flip, index, newaxis, range, range_step, ravel, split, squeeze, squeeze_axes,
    strided_view, strided_view_mut, strided_view_owned, strided_view_with, transpose,
    transpose_axes, trim_zeros, CheckPolicy, FlatAdaptor, Iter, ReducedSlice, Slice, SliceBound,
    Stepper, StridedView, TrimMode,
};
