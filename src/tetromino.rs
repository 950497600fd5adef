//! Tetromino definitions and shape matrices
//!
//! All 7 standard tetrominoes as square 0/1 matrices (I is 4x4, O is 2x2,
//! the rest 3x3), rotated on demand by a 90-degree clockwise transform.

use ratatui::style::Color;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    J, // Blue - J-shape
    L, // Orange - L-shape
    O, // Yellow - square
    S, // Green - S-shape
    T, // Purple - T-shape
    Z, // Red - Z-shape
}

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Cyan,
            TetrominoType::J => Color::Blue,
            TetrominoType::L => Color::Rgb(255, 165, 0), // Orange
            TetrominoType::O => Color::Yellow,
            TetrominoType::S => Color::Green,
            TetrominoType::T => Color::Magenta,
            TetrominoType::Z => Color::Red,
        }
    }

    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::J,
            TetrominoType::L,
            TetrominoType::O,
            TetrominoType::S,
            TetrominoType::T,
            TetrominoType::Z,
        ]
    }

    /// The base (spawn) rotation state for this tetromino
    pub fn matrix(&self) -> ShapeMatrix {
        let (size, rows): (usize, [[u8; 4]; 4]) = match self {
            TetrominoType::I => (
                4,
                [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::J => (
                3,
                [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::L => (
                3,
                [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::O => (
                2,
                [[1, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::S => (
                3,
                [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::T => (
                3,
                [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
            TetrominoType::Z => (
                3,
                [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            ),
        };
        ShapeMatrix::from_rows(size, rows)
    }
}

/// A square rotation-state matrix, padded into a fixed 4x4 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMatrix {
    size: usize,
    bits: [[bool; 4]; 4],
}

impl ShapeMatrix {
    fn from_rows(size: usize, rows: [[u8; 4]; 4]) -> Self {
        let mut bits = [[false; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                bits[r][c] = v != 0;
            }
        }
        Self { size, bits }
    }

    /// Side length of the square matrix (2, 3, or 4)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the cell at (row, col) is part of the piece
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.bits[row][col]
    }

    /// Iterate over the (row, col) offsets of all filled cells
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size)
            .flat_map(move |r| (0..self.size).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.bits[r][c])
    }

    /// Rotate 90 degrees clockwise: R[i][j] = M[N-1-j][i]
    ///
    /// Four applications return the original matrix.
    pub fn rotated_cw(&self) -> ShapeMatrix {
        let n = self.size;
        let mut bits = [[false; 4]; 4];
        for (i, row) in bits.iter_mut().take(n).enumerate() {
            for (j, cell) in row.iter_mut().take(n).enumerate() {
                *cell = self.bits[n - 1 - j][i];
            }
        }
        Self { size: n, bits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_involution() {
        // Four clockwise rotations must return every shape to its original
        for kind in TetrominoType::all() {
            let base = kind.matrix();
            let rotated = base.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
            assert_eq!(base, rotated, "{:?} broke rotation involution", kind);
        }
    }

    #[test]
    fn test_each_shape_has_four_cells() {
        for kind in TetrominoType::all() {
            assert_eq!(kind.matrix().filled().count(), 4, "{:?}", kind);
        }
    }

    #[test]
    fn test_rotate_t_piece() {
        // T pointing up rotates to T pointing right
        let rotated = TetrominoType::T.matrix().rotated_cw();
        assert!(rotated.is_set(0, 1));
        assert!(rotated.is_set(1, 1));
        assert!(rotated.is_set(1, 2));
        assert!(rotated.is_set(2, 1));
    }

    #[test]
    fn test_o_piece_rotation_is_identity() {
        let base = TetrominoType::O.matrix();
        assert_eq!(base, base.rotated_cw());
    }
}
