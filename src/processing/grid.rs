// src/processing/grid.rs

/// Row-major 2-D matrix of magnitudes. Rows are frequency bins or packet
/// nodes, columns are time.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    /// Drops the `n` leftmost columns of every row and zeroes the `n`
    /// rightmost ones.
    pub fn shift_left(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let cols = self.cols;
        let n = n.min(cols);
        for row in self.data.chunks_mut(cols) {
            row.copy_within(n.., 0);
            row[cols - n..].fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_left_moves_history_and_clears_the_edge() {
        let mut grid = Grid::zeros(2, 4);
        for col in 0..4 {
            grid.set(0, col, col as f64);
            grid.set(1, col, 10.0 + col as f64);
        }
        grid.shift_left(1);
        assert_eq!(grid.row(0), &[1.0, 2.0, 3.0, 0.0]);
        assert_eq!(grid.row(1), &[11.0, 12.0, 13.0, 0.0]);
        assert_eq!(grid.shape(), (2, 4));
    }

    #[test]
    fn shift_past_width_clears_everything() {
        let mut grid = Grid::zeros(1, 3);
        grid.row_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        grid.shift_left(7);
        assert_eq!(grid.row(0), &[0.0, 0.0, 0.0]);
    }
}
