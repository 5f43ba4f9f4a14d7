use std::fmt::Display;

use pyo3::{
    exceptions::{PyIOError, PyIndexError, PyValueError},
    PyErr,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Incompatible input array sizes: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("No missing data specification: pass a masked array, a mask or a missing data value")]
    UnspecifiedMask,
    #[error("Invalid coordinate axis: {0}")]
    InvalidAxis(String),
    #[error("Point ({x}, {y}) not contained in the gridded data")]
    OutOfDomain { x: f64, y: f64 },
    #[error("Not enough data to interpolate value at ({x}, {y})")]
    InsufficientData { x: f64, y: f64 },
    #[error("Grid index ({i}, {j}) out of bounds for shape ({ny}, {nx})")]
    IndexOutOfBounds {
        i: usize,
        j: usize,
        ny: usize,
        nx: usize,
    },
    #[error("Region [{xmin}, {xmax}] x [{ymin}, {ymax}] does not overlap the gridded data")]
    EmptySubset {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Om file error: {0}")]
    Om(String),
}

impl GridError {
    pub(crate) fn out_of_domain<T: num_traits::Float>(x: T, y: T) -> Self {
        GridError::OutOfDomain {
            x: to_f64(x),
            y: to_f64(y),
        }
    }

    pub(crate) fn insufficient_data<T: num_traits::Float>(x: T, y: T) -> Self {
        GridError::InsufficientData {
            x: to_f64(x),
            y: to_f64(y),
        }
    }

    pub(crate) fn om(error: impl Display) -> Self {
        GridError::Om(error.to_string())
    }
}

impl From<std::io::Error> for GridError {
    fn from(error: std::io::Error) -> Self {
        GridError::Io(error.to_string())
    }
}

pub(crate) fn to_f64<T: num_traits::Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[derive(Error, Debug)]
pub enum UcdError {
    #[error("I/O error while reading UCD file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed UCD file at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Unexpected end of UCD file at line {line}")]
    UnexpectedEof { line: usize },
    #[error("Unsupported number of data components: {0} (expected 1 or 2)")]
    UnsupportedComponents(usize),
}

pub fn convert_grid_error(e: GridError) -> PyErr {
    match e {
        GridError::IndexOutOfBounds { .. } => PyIndexError::new_err(e.to_string()),
        GridError::Io(_) => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

pub fn convert_ucd_error(e: UcdError) -> PyErr {
    match e {
        UcdError::Io(_) => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

impl From<GridError> for PyErr {
    fn from(e: GridError) -> Self {
        convert_grid_error(e)
    }
}

impl From<UcdError> for PyErr {
    fn from(e: UcdError) -> Self {
        convert_ucd_error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = GridError::out_of_domain(1.5f32, -2.0f32);
        assert_eq!(e.to_string(), "Point (1.5, -2) not contained in the gridded data");

        let e = GridError::insufficient_data(0.5, 0.25);
        assert_eq!(
            e.to_string(),
            "Not enough data to interpolate value at (0.5, 0.25)"
        );
    }

    #[test]
    fn test_python_exception_types() {
        pyo3::prepare_freethreaded_python();

        pyo3::Python::with_gil(|py| {
            let err: PyErr = GridError::UnspecifiedMask.into();
            assert!(err.is_instance_of::<PyValueError>(py));

            let err: PyErr = GridError::IndexOutOfBounds {
                i: 5,
                j: 0,
                ny: 2,
                nx: 2,
            }
            .into();
            assert!(err.is_instance_of::<PyIndexError>(py));

            let err: PyErr = UcdError::UnsupportedComponents(3).into();
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }
}
