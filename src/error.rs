use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Index out of bounds: {index} for dimension of size {len} at axis {axis}")]
    IndexOutOfBounds {
        index: isize,
        len: usize,
        axis: usize,
    },
    #[error("Dimension error: {0}")]
    DimensionError(String),
    #[error("Range step cannot be zero")]
    InvalidStep,
    #[error("Ellipsis can only appear once in a slice list")]
    DuplicateEllipsis,
    #[error("Too many slices: {slices} axis-consuming slices for {dimension} dimensions")]
    TooManySlices { slices: usize, dimension: usize },
    #[error("Transpose error: {0}")]
    TransposeError(String),
    #[error("Squeeze error: {0}")]
    SqueezeError(String),
    #[error("Split error: {0}")]
    SplitError(String),
    #[error("Broadcast error: cannot broadcast shape {0:?} to {1:?}")]
    BroadcastError(Vec<usize>, Vec<usize>),
    #[error("Cannot write through a read-only view")]
    ReadOnlyView,
}

pub type Result<T> = std::result::Result<T, ViewError>;
