use std::{collections::HashMap, fs::File, ops::Range, path::Path, sync::Arc};

use log::debug;
use numpy::ndarray::{Array, Dimension, Ix1, Ix2};
use omfiles_rs::{
    backend::mmapfile::{MmapFile, Mode},
    core::data_types::DataType,
    io::reader::OmFileReader,
};

use crate::{errors::GridError, grids::GridData};

/// Names of the variables that make up a gridded data set in an `.om` file.
#[derive(Clone, Debug)]
pub struct OmGridVariables<'a> {
    pub x: &'a str,
    pub y: &'a str,
    pub data: &'a str,
}

impl Default for OmGridVariables<'_> {
    fn default() -> Self {
        Self {
            x: "x",
            y: "y",
            data: "data",
        }
    }
}

/// Load a gridded data set from the `x`, `y` and 2D data variables of an
/// `.om` file.
///
/// Samples equal to `missing_data_value` are masked. Without one, NaN
/// samples are masked, which is how `.om` files store missing data.
pub fn read_grid_data(
    path: impl AsRef<Path>,
    variables: &OmGridVariables<'_>,
    missing_data_value: Option<f64>,
) -> Result<GridData<f64>, GridError> {
    let path = path.as_ref();
    let file_handle = File::open(path)?;
    let backend = MmapFile::new(file_handle, Mode::ReadOnly).map_err(GridError::om)?;
    let reader = OmFileReader::new(Arc::new(backend)).map_err(GridError::om)?;

    let mut children: HashMap<String, _> =
        reader.get_flat_variable_metadata().into_iter().collect();
    debug!(
        "reading grid variables {:?} from {} ({} variables)",
        variables,
        path.display(),
        children.len()
    );

    let mut read_child = |name: &str| -> Result<_, GridError> {
        // flat metadata is keyed by path, so also accept the last path segment
        let key = children
            .keys()
            .find(|key| key.as_str() == name || key.rsplit('/').next() == Some(name))
            .cloned()
            .ok_or_else(|| GridError::Om(format!("variable `{}` not found", name)))?;
        let offset_size = children
            .remove(&key)
            .ok_or_else(|| GridError::Om(format!("variable `{}` not found", name)))?;
        reader
            .init_child_from_offset_size(offset_size)
            .map_err(GridError::om)
    };

    let x = read_array::<Ix1, _>(&read_child(variables.x)?, variables.x)?;
    let y = read_array::<Ix1, _>(&read_child(variables.y)?, variables.y)?;
    let data = read_array::<Ix2, _>(&read_child(variables.data)?, variables.data)?;

    let sentinel = missing_data_value.unwrap_or(f64::NAN);
    GridData::from_parts(x, y, data, None, Some(sentinel))
}

fn read_array<D, Backend>(
    reader: &OmFileReader<Backend>,
    name: &str,
) -> Result<Array<f64, D>, GridError>
where
    D: Dimension,
    Backend: omfiles_rs::backend::backends::OmFileReaderBackend,
{
    let dimensions = reader.get_dimensions().to_vec();
    if D::NDIM != Some(dimensions.len()) {
        return Err(GridError::Om(format!(
            "variable `{}` has {} dimensions, expected {:?}",
            name,
            dimensions.len(),
            D::NDIM
        )));
    }
    let ranges: Vec<Range<u64>> = dimensions.iter().map(|&n| 0..n).collect();

    let array = match reader.data_type() {
        DataType::FloatArray => reader
            .read::<f32>(&ranges, None, None)
            .map_err(GridError::om)?
            .mapv(f64::from),
        DataType::DoubleArray => reader
            .read::<f64>(&ranges, None, None)
            .map_err(GridError::om)?,
        other => {
            return Err(GridError::Om(format!(
                "variable `{}` has unsupported data type {}",
                name, other as u8
            )))
        }
    };

    array
        .into_dimensionality::<D>()
        .map_err(|e| GridError::Om(format!("variable `{}`: {}", name, e)))
}
