use num_traits::Float;

use crate::errors::GridError;

/// Find the lower-left indices `(i, j)` of the grid cell containing the
/// point `(px, py)`, where `i` indexes the `y` axis and `j` the `x` axis.
///
/// The domain is the closed rectangle spanned by the first and last
/// coordinates of each axis. Indices are clamped so that `i + 1 < ny` and
/// `j + 1 < nx`, which puts points on the last grid line into the last cell.
///
/// The cell is found arithmetically from the first spacing of each axis, so
/// the result is only correct for uniformly spaced axes.
pub fn index_of_point<T: Float>(
    x: &[T],
    y: &[T],
    px: T,
    py: T,
) -> Result<(usize, usize), GridError> {
    let (nx, ny) = (x.len(), y.len());
    if nx < 2 || ny < 2 {
        return Err(GridError::InvalidAxis(format!(
            "axes need at least two coordinates, got nx = {}, ny = {}",
            nx, ny
        )));
    }

    // NaN fails both comparisons and lands out of domain.
    let inside = x[0] <= px && px <= x[nx - 1] && y[0] <= py && py <= y[ny - 1];
    if !inside {
        return Err(GridError::out_of_domain(px, py));
    }

    let i = cell_offset(py - y[0], y[1] - y[0]);
    let j = cell_offset(px - x[0], x[1] - x[0]);

    Ok((i.min(ny - 2), j.min(nx - 2)))
}

/// Unrepresentable quotients saturate so the caller's clamp picks the last cell.
#[inline]
fn cell_offset<T: Float>(distance: T, spacing: T) -> usize {
    (distance / spacing).floor().to_usize().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_point() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [10.0, 20.0, 30.0];

        assert_eq!(index_of_point(&x, &y, 1.5, 25.0).unwrap(), (1, 1));
        assert_eq!(index_of_point(&x, &y, 0.2, 10.5).unwrap(), (0, 0));
    }

    #[test]
    fn test_boundaries_are_inside() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 0.5, 1.0];

        assert_eq!(index_of_point(&x, &y, 0.0, 0.0).unwrap(), (0, 0));
        // last grid line is clamped into the last cell
        assert_eq!(index_of_point(&x, &y, 3.0, 1.0).unwrap(), (1, 2));
        assert_eq!(index_of_point(&x, &y, 2.0, 0.5).unwrap(), (1, 2));
    }

    #[test]
    fn test_outside_domain() {
        let x = [0.0, 1.0];
        let y = [0.0, 1.0];

        for (px, py) in [(-1e-9, 0.5), (0.5, 1.0 + 1e-9), (2.0, 2.0), (f64::NAN, 0.5)] {
            let result = index_of_point(&x, &y, px, py);
            assert!(
                matches!(result, Err(GridError::OutOfDomain { .. })),
                "({}, {}) gave {:?}",
                px,
                py,
                result
            );
        }
    }

    #[test]
    fn test_overflowing_offset_saturates_to_last_cell() {
        assert_eq!(cell_offset(f64::INFINITY, 1.0), usize::MAX);
        assert_eq!(cell_offset(2.5, 1.0), 2);

        // Spacing collapses to zero, which only non-uniform axes can produce.
        let x = [0.0, 0.0, 1.0, 2.0];
        let y = [0.0, 1.0];
        assert_eq!(index_of_point(&x, &y, 1.5, 0.5).unwrap(), (0, 2));
    }

    #[test]
    fn test_single_precision() {
        let x = [0.0f32, 0.25, 0.5];
        let y = [0.0f32, 0.25, 0.5];
        assert_eq!(index_of_point(&x, &y, 0.3, 0.1).unwrap(), (0, 1));
    }
}
