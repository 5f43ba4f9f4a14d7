use log::{debug, trace};
use num_traits::Float;
use numpy::ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};

use super::index::index_of_point;
use super::mask::{is_missing, MaskSource};
use crate::errors::{to_f64, GridError};

/// A scalar field sampled on a regular grid, with some samples missing.
///
/// Values are stored with shape `(ny, nx)`: row `i` lies at `y[i]` and
/// column `j` at `x[j]`. The grid owns copies of its axes, values and mask
/// and never changes after construction, so it can be shared freely between
/// threads.
///
/// Both the cell lookup and the interpolation weights use the spacing of the
/// first two coordinates of each axis. Axes must be strictly increasing; they
/// are expected, but not checked, to be uniformly spaced.
#[derive(Clone, Debug)]
pub struct GridData<T> {
    x: Array1<T>,
    y: Array1<T>,
    values: Array2<T>,
    mask: Array2<bool>,
}

impl<T: Float> GridData<T> {
    /// Create a new gridded data set from its coordinate axes and samples.
    pub fn new(
        x: impl Into<Array1<T>>,
        y: impl Into<Array1<T>>,
        source: MaskSource<T>,
    ) -> Result<Self, GridError> {
        let x = x.into();
        let y = y.into();
        check_axis("x", &x.view())?;
        check_axis("y", &y.view())?;

        let expected = (y.len(), x.len());
        let actual = source.shape();
        if actual != expected {
            return Err(GridError::ShapeMismatch { expected, actual });
        }
        if let MaskSource::ExplicitMask(_, mask) = &source {
            if mask.dim() != expected {
                return Err(GridError::ShapeMismatch {
                    expected,
                    actual: mask.dim(),
                });
            }
        }

        let (values, mask) = source.into_values_and_mask();
        debug!(
            "created grid with shape {:?} over [{}, {}] x [{}, {}], {} missing samples",
            expected,
            to_f64(x[0]),
            to_f64(x[x.len() - 1]),
            to_f64(y[0]),
            to_f64(y[y.len() - 1]),
            mask.iter().filter(|&&m| m).count()
        );

        Ok(Self { x, y, values, mask })
    }

    /// Create a gridded data set where the mask is given by whichever of the
    /// optional arguments is present.
    ///
    /// A missing data value takes precedence over an explicit mask. Fails
    /// with [`GridError::UnspecifiedMask`] if neither is given.
    pub fn from_parts(
        x: impl Into<Array1<T>>,
        y: impl Into<Array1<T>>,
        values: Array2<T>,
        mask: Option<Array2<bool>>,
        missing_data_value: Option<T>,
    ) -> Result<Self, GridError> {
        let source = match (missing_data_value, mask) {
            (Some(sentinel), _) => MaskSource::SentinelValue(values, sentinel),
            (None, Some(mask)) => MaskSource::ExplicitMask(values, mask),
            (None, None) => return Err(GridError::UnspecifiedMask),
        };
        Self::new(x, y, source)
    }

    pub fn x(&self) -> ArrayView1<'_, T> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, T> {
        self.y.view()
    }

    /// Raw sample values; masked entries hold whatever the input held there.
    pub fn values(&self) -> ArrayView2<'_, T> {
        self.values.view()
    }

    pub fn mask(&self) -> ArrayView2<'_, bool> {
        self.mask.view()
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Bounding box `(xmin, ymin, xmax, ymax)` of the grid.
    pub fn bounds(&self) -> (T, T, T, T) {
        (
            self.x[0],
            self.y[0],
            self.x[self.nx() - 1],
            self.y[self.ny() - 1],
        )
    }

    /// The sample stored at row `i`, column `j`, or `None` if it is missing.
    pub fn at(&self, i: usize, j: usize) -> Result<Option<T>, GridError> {
        let (ny, nx) = self.shape();
        if i >= ny || j >= nx {
            return Err(GridError::IndexOutOfBounds { i, j, ny, nx });
        }
        if self.mask[[i, j]] {
            Ok(None)
        } else {
            Ok(Some(self.values[[i, j]]))
        }
    }

    /// Whether the data cannot be interpolated to `point`, i.e. whether any
    /// corner of the cell containing it is missing.
    pub fn is_masked(&self, point: (T, T)) -> Result<bool, GridError> {
        let (i, j) = self.locate(point)?;
        Ok(is_missing(&self.mask.view(), i, j))
    }

    /// Bilinearly interpolate the data to `point`.
    ///
    /// Fails with [`GridError::OutOfDomain`] outside the grid and with
    /// [`GridError::InsufficientData`] if a corner of the enclosing cell is
    /// missing.
    pub fn evaluate(&self, point: (T, T)) -> Result<T, GridError> {
        let (px, py) = point;
        let (i, j) = self.locate(point)?;
        if is_missing(&self.mask.view(), i, j) {
            return Err(GridError::insufficient_data(px, py));
        }

        let (x, y, q) = (&self.x, &self.y, &self.values);
        let ax = (px - x[j]) / (x[1] - x[0]);
        let ay = (py - y[i]) / (y[1] - y[0]);

        let q00 = q[[i, j]];
        let q01 = q[[i, j + 1]];
        let q10 = q[[i + 1, j]];
        let q11 = q[[i + 1, j + 1]];

        let dq_dx = q01 - q00;
        let dq_dy = q10 - q00;
        let d2q_dx_dy = q00 + q11 - q10 - q01;

        Ok(q00 + ax * dq_dx + ay * dq_dy + ax * ay * d2q_dx_dy)
    }

    /// Extract the part of the grid covering the rectangle
    /// `[xmin, xmax] x [ymin, ymax]`.
    ///
    /// The rectangle is first clipped to the grid. The result contains every
    /// cell that touches the clipped rectangle, so any point of it that can be
    /// interpolated in `self` can be interpolated in the subset with the same
    /// result. A rectangle that does not overlap the grid at all is an
    /// [`GridError::EmptySubset`] error.
    pub fn subset(&self, xmin: T, ymin: T, xmax: T, ymax: T) -> Result<Self, GridError> {
        let empty = || GridError::EmptySubset {
            xmin: to_f64(xmin),
            ymin: to_f64(ymin),
            xmax: to_f64(xmax),
            ymax: to_f64(ymax),
        };
        // Float::max/min would silently drop a NaN bound
        if [xmin, ymin, xmax, ymax].iter().any(|v| v.is_nan()) {
            return Err(empty());
        }

        let (x0, y0, x1, y1) = self.bounds();
        let clipped_xmin = xmin.max(x0);
        let clipped_ymin = ymin.max(y0);
        let clipped_xmax = xmax.min(x1);
        let clipped_ymax = ymax.min(y1);
        if clipped_xmin > clipped_xmax || clipped_ymin > clipped_ymax {
            return Err(empty());
        }

        let (imin, jmin) = self.locate((clipped_xmin, clipped_ymin))?;
        let (imax, jmax) = self.locate((clipped_xmax, clipped_ymax))?;
        trace!(
            "subset rows {}..{}, columns {}..{}",
            imin,
            imax + 2,
            jmin,
            jmax + 2
        );

        let x = self.x.slice(s![jmin..jmax + 2]).to_owned();
        let y = self.y.slice(s![imin..imax + 2]).to_owned();
        let values = self
            .values
            .slice(s![imin..imax + 2, jmin..jmax + 2])
            .to_owned();
        let mask = self
            .mask
            .slice(s![imin..imax + 2, jmin..jmax + 2])
            .to_owned();

        Self::new(x, y, MaskSource::ExplicitMask(values, mask))
    }

    fn locate(&self, (px, py): (T, T)) -> Result<(usize, usize), GridError> {
        index_of_point(
            self.x.as_slice().unwrap_or(&[]),
            self.y.as_slice().unwrap_or(&[]),
            px,
            py,
        )
    }
}

fn check_axis<T: Float>(name: &str, axis: &ArrayView1<'_, T>) -> Result<(), GridError> {
    if axis.len() < 2 {
        return Err(GridError::InvalidAxis(format!(
            "{} needs at least two coordinates, got {}",
            name,
            axis.len()
        )));
    }
    // also rejects NaN coordinates
    if !axis.windows(2).into_iter().all(|w| w[0] < w[1]) {
        return Err(GridError::InvalidAxis(format!(
            "{} coordinates must be strictly increasing",
            name
        )));
    }
    Ok(())
}
