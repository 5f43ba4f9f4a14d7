use num_traits::Float;
use numpy::ndarray::{Array2, ArrayView2};

/// How the missing samples of a gridded data set are specified.
///
/// All three variants describe the same thing: a value array plus one
/// "missing" flag per sample. They are resolved into that canonical form
/// once, when a [`GridData`](super::GridData) is constructed.
#[derive(Clone, Debug)]
pub enum MaskSource<T> {
    /// Samples that are `None` are missing.
    PreMasked(Array2<Option<T>>),
    /// `true` entries of the mask mark missing samples.
    ExplicitMask(Array2<T>, Array2<bool>),
    /// Samples exactly equal to the sentinel are missing. A NaN sentinel
    /// marks NaN samples.
    SentinelValue(Array2<T>, T),
}

impl<T: Float> MaskSource<T> {
    /// Shape `(ny, nx)` of the sample array.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MaskSource::PreMasked(data) => data.dim(),
            MaskSource::ExplicitMask(data, _) => data.dim(),
            MaskSource::SentinelValue(data, _) => data.dim(),
        }
    }

    /// Split into the sample values and the missing-data mask.
    ///
    /// Masked entries of a pre-masked array are stored as NaN. The caller is
    /// responsible for checking that an explicit mask has the same shape as
    /// the values.
    pub fn into_values_and_mask(self) -> (Array2<T>, Array2<bool>) {
        match self {
            MaskSource::PreMasked(data) => {
                let values = data.mapv(|v| v.unwrap_or_else(T::nan));
                let mask = data.mapv(|v| v.is_none());
                (values, mask)
            }
            MaskSource::ExplicitMask(values, mask) => (values, mask),
            MaskSource::SentinelValue(values, sentinel) => {
                let mask = if sentinel.is_nan() {
                    values.mapv(|v| v.is_nan())
                } else {
                    values.mapv(|v| v == sentinel)
                };
                (values, mask)
            }
        }
    }
}

/// Whether any of the four corners of the cell with lower-left indices
/// `(i, j)` is missing.
#[inline]
pub fn is_missing(mask: &ArrayView2<'_, bool>, i: usize, j: usize) -> bool {
    mask[[i, j]] || mask[[i, j + 1]] || mask[[i + 1, j]] || mask[[i + 1, j + 1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use numpy::ndarray::array;

    #[test]
    fn test_is_missing_checks_all_corners() {
        let mut mask = Array2::from_elem((3, 3), false);
        assert!(!is_missing(&mask.view(), 0, 0));

        for corner in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            mask.fill(false);
            mask[corner] = true;
            assert!(is_missing(&mask.view(), 1, 1), "corner {:?}", corner);
            // the opposite cell only shares (1, 1)
            assert_eq!(is_missing(&mask.view(), 0, 0), corner == (1, 1));
        }
    }

    #[test]
    fn test_sentinel_value() {
        let values = array![[1.0, -9999.0], [3.0, 4.0]];
        let (values, mask) = MaskSource::SentinelValue(values, -9999.0).into_values_and_mask();
        assert_eq!(mask, array![[false, true], [false, false]]);
        assert_eq!(values[[0, 1]], -9999.0);
    }

    #[test]
    fn test_nan_sentinel() {
        let values = array![[1.0, f64::NAN], [f64::NAN, 4.0]];
        let (_, mask) = MaskSource::SentinelValue(values, f64::NAN).into_values_and_mask();
        assert_eq!(mask, array![[false, true], [true, false]]);
    }

    #[test]
    fn test_pre_masked() {
        let data = array![[Some(1.0f32), None], [Some(3.0), Some(4.0)]];
        let source = MaskSource::PreMasked(data);
        assert_eq!(source.shape(), (2, 2));

        let (values, mask) = source.into_values_and_mask();
        assert_eq!(mask, array![[false, true], [false, false]]);
        assert!(values[[0, 1]].is_nan());
        assert_eq!(values[[1, 1]], 4.0);
    }
}
