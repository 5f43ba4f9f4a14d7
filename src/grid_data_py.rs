use delegate::delegate;
use numpy::{
    dtype,
    ndarray::{Array, Dimension, Ix1, Ix2, Zip},
    Element, PyArray, PyArray1, PyArray2, PyArrayMethods, ToPyArray,
};
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};

use crate::{
    errors::convert_grid_error,
    grids::{GridData, MaskSource},
    reader::{read_grid_data, OmGridVariables},
};

/// Data set defined on a regular spatial grid, with missing data.
///
/// There are several ways to specify the missing data mask:
/// * pass in a numpy masked array for the `data` argument
/// * pass in the array `mask` of boolean values to indicate where data
///   is missing
/// * pass in a specific value `missing_data_value` indicating that any
///   entry in `data` with this exact value is actually a missing data
///   point
///
/// The grid is evaluated by bilinear interpolation. The coordinates are
/// assumed to be uniformly spaced.
#[gen_stub_pyclass]
#[pyclass(module = "griddata.griddata", name = "GridData", frozen)]
pub struct PyGridData {
    inner: GridData<f64>,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyGridData {
    /// Create a new gridded data set.
    ///
    /// Parameters
    /// ----------
    /// x, y : array-like
    ///     Strictly increasing coordinates of the grid points
    /// data : array-like or numpy.ma.MaskedArray
    ///     Values of the gridded data set, with shape `(len(y), len(x))`
    /// mask : array-like of bool, optional
    ///     Array describing missing data values; `True` indicates missing
    /// missing_data_value : float, optional
    ///     Value in `data` to indicate missing data
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If the array sizes are incompatible or no way of identifying
    ///     missing data was given
    #[new]
    #[pyo3(signature = (x, y, data, *, mask=None, missing_data_value=None))]
    fn new(
        x: &Bound<'_, PyAny>,
        y: &Bound<'_, PyAny>,
        data: &Bound<'_, PyAny>,
        mask: Option<&Bound<'_, PyAny>>,
        missing_data_value: Option<f64>,
    ) -> PyResult<Self> {
        let x = to_owned_array::<f64, Ix1>(x)?;
        let y = to_owned_array::<f64, Ix1>(y)?;

        let inner = if is_masked_array(data)? {
            let ma = data.py().import("numpy.ma")?;
            let values = to_owned_array::<f64, Ix2>(&ma.call_method1("getdata", (data,))?)?;
            let mask = to_owned_array::<bool, Ix2>(&ma.call_method1("getmaskarray", (data,))?)?;
            let pre_masked = Zip::from(&values)
                .and(&mask)
                .map_collect(|&v, &missing| if missing { None } else { Some(v) });
            GridData::new(x, y, MaskSource::PreMasked(pre_masked))
        } else {
            let values = to_owned_array::<f64, Ix2>(data)?;
            let mask = mask.map(to_owned_array::<bool, Ix2>).transpose()?;
            GridData::from_parts(x, y, values, mask, missing_data_value)
        }
        .map_err(convert_grid_error)?;

        Ok(Self { inner })
    }

    /// Load a gridded data set from an .om file.
    ///
    /// Parameters
    /// ----------
    /// path : str
    ///     Path to the .om file
    /// x, y, data : str
    ///     Names of the coordinate and data variables in the file
    /// missing_data_value : float, optional
    ///     Value in `data` to indicate missing data; NaN if not given
    ///
    /// Returns
    /// -------
    /// GridData
    ///     The gridded data set
    ///
    /// Raises
    /// ------
    /// OSError
    ///     If the file cannot be opened
    /// ValueError
    ///     If a variable is missing or has the wrong shape
    #[staticmethod]
    #[pyo3(signature = (path, x="x", y="y", data="data", missing_data_value=None))]
    fn from_om_file(
        path: &str,
        x: &str,
        y: &str,
        data: &str,
        missing_data_value: Option<f64>,
    ) -> PyResult<Self> {
        let variables = OmGridVariables { x, y, data };
        let inner =
            read_grid_data(path, &variables, missing_data_value).map_err(convert_grid_error)?;
        Ok(Self { inner })
    }

    /// Evaluate the gridded data set at a given point.
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If the point is outside the grid or there is not enough data
    ///     around it
    fn __call__(&self, point: &Bound<'_, PyAny>) -> PyResult<f64> {
        self.inner
            .evaluate(extract_point(point)?)
            .map_err(convert_grid_error)
    }

    /// Retrieve a given entry from the raw data, or None if it is missing.
    ///
    /// Negative indices count from the end, as in numpy.
    fn __getitem__(&self, indices: (isize, isize)) -> PyResult<Option<f64>> {
        let (i, j) = indices;
        let (ny, nx) = self.inner.shape();
        self.inner
            .at(wrap_index(i, ny)?, wrap_index(j, nx)?)
            .map_err(convert_grid_error)
    }

    /// Returns `True` if the data cannot be interpolated to a point.
    fn is_masked(&self, point: &Bound<'_, PyAny>) -> PyResult<bool> {
        self.inner
            .is_masked(extract_point(point)?)
            .map_err(convert_grid_error)
    }

    /// Return a sub-sample of a gridded dataset for the region between
    /// two points.
    ///
    /// The region is clipped to the grid, and the result contains every grid
    /// cell that touches it.
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If the region does not overlap the grid
    fn subset(&self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> PyResult<Self> {
        let inner = self
            .inner
            .subset(xmin, ymin, xmax, ymax)
            .map_err(convert_grid_error)?;
        Ok(Self { inner })
    }

    /// Coordinates of the grid columns.
    #[getter]
    fn x<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.x().to_pyarray(py)
    }

    /// Coordinates of the grid rows.
    #[getter]
    fn y<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.y().to_pyarray(py)
    }

    /// Missing data mask; `True` indicates missing.
    #[getter]
    fn mask<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<bool>> {
        self.inner.mask().to_pyarray(py)
    }

    /// The data as a numpy masked array.
    #[getter]
    fn data<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        let ma = py.import("numpy.ma")?;
        ma.call_method1(
            "MaskedArray",
            (self.inner.values().to_pyarray(py), self.inner.mask().to_pyarray(py)),
        )
    }

    /// Shape `(ny, nx)` of the data.
    #[getter]
    fn shape(&self) -> (usize, usize) {
        (self.ny(), self.nx())
    }

    /// Bounding box `(xmin, ymin, xmax, ymax)` of the grid.
    #[getter]
    fn extent(&self) -> (f64, f64, f64, f64) {
        self.bounds()
    }

    fn __repr__(&self) -> String {
        let (xmin, ymin, xmax, ymax) = self.bounds();
        format!(
            "GridData(nx={}, ny={}, x=[{}, {}], y=[{}, {}])",
            self.nx(),
            self.ny(),
            xmin,
            xmax,
            ymin,
            ymax
        )
    }
}

impl PyGridData {
    delegate! {
        to self.inner {
            fn nx(&self) -> usize;
            fn ny(&self) -> usize;
            fn bounds(&self) -> (f64, f64, f64, f64);
        }
    }
}

/// Read the first two entries of any indexable point: tuple, list or numpy
/// coordinate row.
fn extract_point(point: &Bound<'_, PyAny>) -> PyResult<(f64, f64)> {
    Ok((point.get_item(0)?.extract()?, point.get_item(1)?.extract()?))
}

fn wrap_index(index: isize, len: usize) -> PyResult<usize> {
    let wrapped = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    };
    wrapped.ok_or_else(|| {
        PyErr::new::<pyo3::exceptions::PyIndexError, _>(format!(
            "index {} is out of bounds for axis with size {}",
            index, len
        ))
    })
}

fn is_masked_array(data: &Bound<'_, PyAny>) -> PyResult<bool> {
    data.py()
        .import("numpy.ma")?
        .call_method1("isMaskedArray", (data,))?
        .extract()
}

/// Convert any array-like into an owned array of the given element type and
/// dimensionality.
fn to_owned_array<T, D>(value: &Bound<'_, PyAny>) -> PyResult<Array<T, D>>
where
    T: Element + Clone,
    D: Dimension,
{
    let py = value.py();
    let converted = py
        .import("numpy")?
        .call_method1("asarray", (value, dtype::<T>(py)))?;
    let array = converted.downcast::<PyArray<T, D>>().map_err(|_| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
            "Expected a {}-dimensional array",
            D::NDIM.unwrap_or(0)
        ))
    })?;
    Ok(array.to_owned_array())
}
