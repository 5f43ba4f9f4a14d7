//! Reader for deal.II `.ucd` files holding a 2D quad mesh and the velocity
//! (or some other scalar) sampled at its vertices.
//!
//! The data is not gridded: points are scattered and cells refer to them by
//! index. Nothing is masked.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use log::debug;
use numpy::ndarray::{Array1, Array2};

use crate::errors::UcdError;

/// Per-vertex samples stored in a UCD file.
#[derive(Clone, Debug, PartialEq)]
pub enum UcdField {
    Scalar(Array1<f64>),
    Vector { u: Array1<f64>, v: Array1<f64> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct UcdMesh {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    /// Zero-based vertex indices, one row of four per quad.
    pub cells: Array2<usize>,
    pub field: UcdField,
}

impl UcdMesh {
    pub fn num_points(&self) -> usize {
        self.x.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.nrows()
    }
}

pub fn read_ucd_file(path: impl AsRef<Path>) -> Result<UcdMesh, UcdError> {
    let path = path.as_ref();
    debug!("reading UCD mesh from {}", path.display());
    read_ucd(BufReader::new(File::open(path)?))
}

pub fn read_ucd<R: BufRead>(reader: R) -> Result<UcdMesh, UcdError> {
    let mut lines = Lines::new(reader);

    let header: Vec<usize> = lines.parse_fields()?;
    if header.len() < 3 {
        return Err(lines.error("expected `num_points num_cells num_components ...`"));
    }
    let (num_points, num_cells, components) = (header[0], header[1], header[2]);
    if components != 1 && components != 2 {
        return Err(UcdError::UnsupportedComponents(components));
    }

    // Header counts are untrusted; storage grows only with lines actually read.
    let mut x = Vec::new();
    let mut y = Vec::new();
    for _ in 0..num_points {
        let fields: Vec<f64> = lines.parse_fields()?;
        let [_, px, py, ..] = fields.as_slice() else {
            return Err(lines.error("expected `id x y z`"));
        };
        x.push(*px);
        y.push(*py);
    }

    lines.skip(1)?;

    let mut cells = Vec::new();
    for _ in 0..num_cells {
        let line = lines.next_line()?;
        let vertices = line
            .split_whitespace()
            .skip(3)
            .map(|s| lines.parse::<usize>(s))
            .collect::<Result<Vec<_>, _>>()?;
        if vertices.len() != 4 {
            return Err(lines.error(format!("expected 4 vertices, got {}", vertices.len())));
        }
        for &vertex in &vertices {
            if vertex == 0 || vertex > num_points {
                return Err(lines.error(format!("vertex index {} out of range", vertex)));
            }
            cells.push(vertex - 1);
        }
    }
    let cells = Array2::from_shape_vec((num_cells, 4), cells)
        .map_err(|e| lines.error(format!("bad cell array: {}", e)))?;

    lines.skip(2)?;

    let field = if components == 1 {
        lines.skip(1)?;
        let mut q = Vec::new();
        for _ in 0..num_points {
            let fields: Vec<f64> = lines.parse_fields()?;
            let [_, value, ..] = fields.as_slice() else {
                return Err(lines.error("expected `id q`"));
            };
            q.push(*value);
        }
        UcdField::Scalar(Array1::from(q))
    } else {
        lines.skip(2)?;
        let mut u = Vec::new();
        let mut v = Vec::new();
        for _ in 0..num_points {
            let fields: Vec<f64> = lines.parse_fields()?;
            let [_, pu, pv, ..] = fields.as_slice() else {
                return Err(lines.error("expected `id u v`"));
            };
            u.push(*pu);
            v.push(*pv);
        }
        UcdField::Vector {
            u: Array1::from(u),
            v: Array1::from(v),
        }
    };

    debug!(
        "read UCD mesh with {} points, {} cells and {} data component(s)",
        num_points, num_cells, components
    );

    Ok(UcdMesh {
        x: Array1::from(x),
        y: Array1::from(y),
        cells,
        field,
    })
}

/// Line cursor that remembers the current line number for error messages.
struct Lines<R> {
    reader: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
        }
    }

    fn next_line(&mut self) -> Result<String, UcdError> {
        self.buffer.clear();
        self.line += 1;
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Err(UcdError::UnexpectedEof { line: self.line });
        }
        Ok(self.buffer.clone())
    }

    fn skip(&mut self, count: usize) -> Result<(), UcdError> {
        for _ in 0..count {
            self.next_line()?;
        }
        Ok(())
    }

    fn parse_fields<T: FromStr>(&mut self) -> Result<Vec<T>, UcdError>
    where
        T::Err: std::fmt::Display,
    {
        let line = self.next_line()?;
        line.split_whitespace().map(|s| self.parse(s)).collect()
    }

    fn parse<T: FromStr>(&self, token: &str) -> Result<T, UcdError>
    where
        T::Err: std::fmt::Display,
    {
        token
            .parse()
            .map_err(|e: T::Err| self.error(format!("cannot parse `{}`: {}", token, e)))
    }

    fn error(&self, message: impl Into<String>) -> UcdError {
        UcdError::Parse {
            line: self.line,
            message: message.into(),
        }
    }
}
