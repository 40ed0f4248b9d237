//! Shapes, strides, layouts and broadcasting.
//!
//! This module holds the arithmetic underneath every view: canonical
//! stride computation, backstride derivation, flat/multi index
//! conversion, layout predicates and shape broadcasting.

pub mod broadcast;
pub mod layout;
pub mod stride;

pub use broadcast::{broadcast_shapes, can_broadcast_to};
pub use layout::{
    default_assignable_layout, do_strides_match, transpose_layout, transpose_layout_lossy, Layout,
};
pub use stride::{adapt_strides, compute_strides, element_offset, unravel_into};
