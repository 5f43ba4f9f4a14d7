use numpy::IntoPyArray;
use pyo3::{prelude::*, types::PyTuple};
use pyo3_stub_gen::{define_stub_info_gatherer, derive::gen_stub_pyfunction};

pub mod errors;
mod grid_data_py;
pub mod grids;
pub mod reader;
mod test_utils;
pub mod ucd;

/// Read a .ucd file containing a 2D deal.II quad mesh and velocity data.
///
/// Parameters
/// ----------
/// path : str
///     Path to the .ucd file
///
/// Returns
/// -------
/// tuple
///     `(x, y, cells, q)` for scalar data or `(x, y, cells, u, v)` for
///     vector data; `cells` holds zero-based vertex indices
///
/// Raises
/// ------
/// OSError
///     If the file cannot be read
/// ValueError
///     If the file is malformed
#[gen_stub_pyfunction]
#[pyfunction]
fn read_ucd<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyTuple>> {
    let mesh = ucd::read_ucd_file(path)?;

    let mut items = vec![
        mesh.x.into_pyarray(py).into_any(),
        mesh.y.into_pyarray(py).into_any(),
        mesh.cells.into_pyarray(py).into_any(),
    ];
    match mesh.field {
        ucd::UcdField::Scalar(q) => items.push(q.into_pyarray(py).into_any()),
        ucd::UcdField::Vector { u, v } => {
            items.push(u.into_pyarray(py).into_any());
            items.push(v.into_pyarray(py).into_any());
        }
    }
    PyTuple::new(py, items)
}

/// Gridded data sets with masked bilinear interpolation.
#[pymodule(gil_used = false)]
fn griddata<'py>(m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<grid_data_py::PyGridData>()?;
    m.add_function(wrap_pyfunction!(read_ucd, m)?)?;

    Ok(())
}

define_stub_info_gatherer!(stub_info);
