#[cfg(test)]
pub use utils::*;

#[cfg(test)]
mod utils {
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};

    use numpy::ndarray::{Array1, Array2};
    use omfiles_rs::{
        core::compression::CompressionType,
        io::writer::{OmFileWriter, OmOffsetSize},
    };
    use pyo3::types::PyAnyMethods;

    use crate::errors::GridError;

    /// Make packages installed into `.venv` (numpy in particular) importable
    /// from the embedded interpreter.
    /// https://github.com/PyO3/pyo3/discussions/3726#discussioncomment-9061697
    pub fn add_venv_site_packages(py: pyo3::Python<'_>) -> pyo3::PyResult<()> {
        let unix_site_packages = fs::read_dir(".venv/lib").ok().and_then(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path().join("site-packages"))
                .find(|path| path.exists())
        });
        let site_packages = unix_site_packages
            .or_else(|| Some(PathBuf::from(".venv/Lib/site-packages")).filter(|p| p.exists()));

        if let Some(site_packages) = site_packages.as_deref().and_then(Path::to_str) {
            py.import("sys")?
                .getattr("path")?
                .call_method1("append", (site_packages,))?;
        }
        Ok(())
    }

    pub fn ensure_test_dir() -> std::io::Result<()> {
        fs::create_dir_all("test_files")?;
        Ok(())
    }

    pub fn create_text_file(filename: &str, contents: &str) -> std::io::Result<PathBuf> {
        ensure_test_dir()?;
        let path = Path::new("test_files").join(filename);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write `x`, `y` and `data` as children of a `grid` group into an `.om`
    /// file under `test_files/`.
    pub fn create_grid_om_file(
        filename: &str,
        x: &Array1<f64>,
        y: &Array1<f64>,
        data: &Array2<f64>,
    ) -> Result<PathBuf, GridError> {
        ensure_test_dir()?;
        let path = Path::new("test_files").join(filename);
        let mut writer = OmFileWriter::new(File::create(&path)?, 8 * 1024);

        let mut write = |name: &str,
                         values: numpy::ndarray::ArrayViewD<'_, f64>|
         -> Result<OmOffsetSize, GridError> {
            let dimensions: Vec<u64> = values.shape().iter().map(|&n| n as u64).collect();
            let mut array_writer = writer
                .prepare_array::<f64>(
                    dimensions.clone(),
                    dimensions,
                    CompressionType::FpxXor2d,
                    1.0,
                    0.0,
                )
                .map_err(GridError::om)?;
            array_writer
                .write_data(values, None, None)
                .map_err(GridError::om)?;
            let finalized = array_writer.finalize();
            writer
                .write_array(finalized, name, &[])
                .map_err(GridError::om)
        };

        let x_variable = write("x", x.view().into_dyn())?;
        let y_variable = write("y", y.view().into_dyn())?;
        let data_variable = write("data", data.view().into_dyn())?;

        let root = writer
            .write_none("grid", &[x_variable, y_variable, data_variable])
            .map_err(GridError::om)?;
        writer.write_trailer(root).map_err(GridError::om)?;
        Ok(path)
    }
}
