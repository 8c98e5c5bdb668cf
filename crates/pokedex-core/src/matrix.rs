//! Dense row-major `f32` matrix holding one embedding per row.

use crate::DatasetError;

/// A `rows × cols` matrix stored as a flat row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// An empty matrix whose rows will have `cols` columns.
    pub fn with_cols(cols: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols,
        }
    }

    /// Build a matrix from flat row-major data, checking `data.len() == rows * cols`.
    pub fn from_flat(data: Vec<f32>, rows: usize, cols: usize) -> Result<Self, DatasetError> {
        let expected = rows.checked_mul(cols);
        if expected != Some(data.len()) {
            return Err(DatasetError::ShapeMismatch {
                len: data.len(),
                rows,
                cols,
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`, the shape recorded in the dataset file.
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Flat row-major view of all values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_flat(self) -> Vec<f32> {
        self.data
    }

    /// Row `i`, or `None` when out of range.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Iterate rows in insertion order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size.
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Append a row at the end.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), DatasetError> {
        if row.len() != self.cols {
            return Err(DatasetError::DimensionMismatch {
                expected: self.cols,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_checks_shape() {
        let m = Matrix::from_flat(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.shape(), [2, 3]);
        assert_eq!(m.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(m.row(2), None);

        let err = Matrix::from_flat(vec![1.0, 2.0, 3.0], 2, 3).unwrap_err();
        assert_eq!(
            err,
            DatasetError::ShapeMismatch {
                len: 3,
                rows: 2,
                cols: 3
            }
        );
    }

    #[test]
    fn push_row_appends_in_order() {
        let mut m = Matrix::with_cols(2);
        m.push_row(&[1.0, 2.0]).unwrap();
        m.push_row(&[3.0, 4.0]).unwrap();

        let rows: Vec<&[f32]> = m.iter_rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut m = Matrix::with_cols(2);
        let err = m.push_row(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            DatasetError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(m.rows(), 0);
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        assert!(Matrix::from_flat(vec![], usize::MAX, 2).is_err());
    }
}
