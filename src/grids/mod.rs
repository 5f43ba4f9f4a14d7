//! Scalar fields on regular grids with missing data.

pub mod grid_data;
pub mod index;
pub mod mask;

pub use grid_data::GridData;
pub use index::index_of_point;
pub use mask::{is_missing, MaskSource};
