//! Two-dimensional cell fields and corner fields.

use crate::constants::CORNER_COUNT;
use crate::error::{GridError, GridResult};

/// A row-major `(ny, nx)` array, one value per grid cell.
///
/// Row `j` runs west to east; rows are ordered as the source model orders them.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D<T> {
    ny: usize,
    nx: usize,
    data: Vec<T>,
}

impl<T: Clone> Field2D<T> {
    /// Create a field filled with one value.
    pub fn filled(ny: usize, nx: usize, value: T) -> Self {
        Self {
            ny,
            nx,
            data: vec![value; ny * nx],
        }
    }
}

impl<T> Field2D<T> {
    /// Wrap a flat row-major buffer, checking its length.
    pub fn from_vec(ny: usize, nx: usize, data: Vec<T>) -> GridResult<Self> {
        if data.len() != ny * nx {
            return Err(GridError::dimension_mismatch(
                "field buffer",
                vec![ny * nx],
                vec![data.len()],
            ));
        }
        Ok(Self { ny, nx, data })
    }

    /// Build a field by evaluating `f(j, i)` for every cell.
    pub fn from_fn(ny: usize, nx: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(ny * nx);
        for j in 0..ny {
            for i in 0..nx {
                data.push(f(j, i));
            }
        }
        Self { ny, nx, data }
    }

    /// `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, j: usize, i: usize) -> &T {
        &self.data[j * self.nx + i]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Apply `f` to every value, keeping the shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Field2D<U> {
        Field2D {
            ny: self.ny,
            nx: self.nx,
            data: self.data.iter().map(f).collect(),
        }
    }
}

/// The four corners of every cell, stored as `(corner, ny, nx)`.
///
/// Corner slots follow [`crate::constants::corner`]: SW, SE, NE, NW.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerField {
    ny: usize,
    nx: usize,
    data: Vec<f64>,
}

impl CornerField {
    /// Wrap a flat `(4, ny, nx)` buffer.
    pub fn from_vec(ny: usize, nx: usize, data: Vec<f64>) -> GridResult<Self> {
        if data.len() != CORNER_COUNT * ny * nx {
            return Err(GridError::dimension_mismatch(
                "corner buffer",
                vec![CORNER_COUNT * ny * nx],
                vec![data.len()],
            ));
        }
        Ok(Self { ny, nx, data })
    }

    /// Build corners by evaluating `f(j, i)` for every cell; the closure
    /// returns the four corner values in slot order.
    pub fn from_fn(
        ny: usize,
        nx: usize,
        mut f: impl FnMut(usize, usize) -> [f64; CORNER_COUNT],
    ) -> Self {
        let plane = ny * nx;
        let mut data = vec![0.0; CORNER_COUNT * plane];
        for j in 0..ny {
            for i in 0..nx {
                let cell = f(j, i);
                for (k, value) in cell.into_iter().enumerate() {
                    data[k * plane + j * nx + i] = value;
                }
            }
        }
        Self { ny, nx, data }
    }

    /// `(ny, nx)` of the cell grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// All four corners of cell `(j, i)`.
    pub fn cell(&self, j: usize, i: usize) -> [f64; CORNER_COUNT] {
        let plane = self.ny * self.nx;
        let offset = j * self.nx + i;
        std::array::from_fn(|k| self.data[k * plane + offset])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn map(&self, f: impl FnMut(&f64) -> f64) -> CornerField {
        CornerField {
            ny: self.ny,
            nx: self.nx,
            data: self.data.iter().map(f).collect(),
        }
    }
}
