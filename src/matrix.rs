//! Dense row-major grid container.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{GameError, Result};
use crate::geom::{Pos2D, Size2D};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }
}

impl<T> Matrix<T> {
    /// Build a matrix from nested rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let row_count = rows.len();
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(row_count * cols);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(GameError::invalid_argument(format!(
                    "row {r} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            rows: row_count,
            cols,
            data,
        })
    }

    pub fn num_of_row(&self) -> usize {
        self.rows
    }

    pub fn num_of_col(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> Size2D {
        Size2D::new(self.cols, self.rows)
    }

    pub fn contains(&self, pos: Pos2D) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    fn offset(&self, pos: Pos2D) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.cols + pos.x as usize)
    }

    pub fn get(&self, pos: Pos2D) -> Option<&T> {
        self.offset(pos).map(|i| &self.data[i])
    }

    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Positions of all cells in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos2D> + use<T> {
        let cols = self.cols;
        (0..self.rows * cols).map(move |i| Pos2D::new((i % cols) as i32, (i / cols) as i32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos2D, &T)> {
        self.positions().zip(self.data.iter())
    }
}

impl<T> Index<Pos2D> for Matrix<T> {
    type Output = T;

    fn index(&self, pos: Pos2D) -> &T {
        match self.offset(pos) {
            Some(i) => &self.data[i],
            None => panic!("position {pos} outside {}x{} matrix", self.cols, self.rows),
        }
    }
}

impl<T> IndexMut<Pos2D> for Matrix<T> {
    fn index_mut(&mut self, pos: Pos2D) -> &mut T {
        match self.offset(pos) {
            Some(i) => &mut self.data[i],
            None => panic!("position {pos} outside {}x{} matrix", self.cols, self.rows),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                writeln!(f)?;
            }
            for cell in self.row(r) {
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}
