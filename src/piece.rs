//! Active falling piece logic

use crate::board::{Board, BOARD_WIDTH};
use crate::tetromino::{ShapeMatrix, TetrominoType};

/// The currently falling piece
#[derive(Debug, Clone)]
pub struct ActivePiece {
    /// The type of tetromino
    pub kind: TetrominoType,
    /// Current rotation state
    pub matrix: ShapeMatrix,
    /// Position of the matrix's top-left corner; row 0 is the top of the
    /// board and may be negative while the piece is entering
    pub row: i32,
    pub col: i32,
}

impl ActivePiece {
    /// Create a new piece at its spawn position
    ///
    /// Horizontally centered; the I piece spawns one row lower than the
    /// rest to compensate for its taller bounding box, so all kinds enter
    /// the visible board at the same apparent rate.
    pub fn spawn(kind: TetrominoType) -> Self {
        let matrix = kind.matrix();
        let size = matrix.size() as i32;
        let col = BOARD_WIDTH as i32 / 2 - (size + 1) / 2;
        let row = if kind == TetrominoType::I { -1 } else { -2 };
        Self {
            kind,
            matrix,
            row,
            col,
        }
    }

    /// Get the absolute (row, col) positions of all filled cells
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix
            .filled()
            .map(|(r, c)| (self.row + r as i32, self.col + c as i32))
    }

    /// Try to move horizontally by `dx` columns, returns true if successful
    pub fn shift(&mut self, board: &Board, dx: i32) -> bool {
        if board.is_legal(&self.matrix, self.row, self.col + dx) {
            self.col += dx;
            true
        } else {
            false
        }
    }

    /// Try to rotate clockwise, returns true if successful
    ///
    /// No wall kicks: a rotation that would collide is rejected outright.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let rotated = self.matrix.rotated_cw();
        if board.is_legal(&rotated, self.row, self.col) {
            self.matrix = rotated;
            true
        } else {
            false
        }
    }

    /// Try to move down one row, returns true if successful
    ///
    /// A false return means the piece is resting and should lock.
    pub fn step_down(&mut self, board: &Board) -> bool {
        if board.is_legal(&self.matrix, self.row + 1, self.col) {
            self.row += 1;
            true
        } else {
            false
        }
    }

    /// The row this piece would come to rest on if dropped straight down
    ///
    /// Pure query; used for the ghost projection and by hard drop.
    pub fn landing_row(&self, board: &Board) -> i32 {
        let mut row = self.row;
        while board.is_legal(&self.matrix, row + 1, self.col) {
            row += 1;
        }
        row
    }

    /// Drop to the landing row and return the distance travelled
    ///
    /// The caller must lock the piece immediately afterwards.
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let landing = self.landing_row(board);
        let distance = landing - self.row;
        self.row = landing;
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    #[test]
    fn test_spawn_positions() {
        // I: 4-wide matrix, col = 5 - 2 = 3, row -1
        let i = ActivePiece::spawn(TetrominoType::I);
        assert_eq!((i.row, i.col), (-1, 3));
        // O: 2-wide matrix, col = 5 - 1 = 4, row -2
        let o = ActivePiece::spawn(TetrominoType::O);
        assert_eq!((o.row, o.col), (-2, 4));
        // T: 3-wide matrix, col = 5 - 2 = 3, row -2
        let t = ActivePiece::spawn(TetrominoType::T);
        assert_eq!((t.row, t.col), (-2, 3));
    }

    #[test]
    fn test_shift_respects_walls() {
        let board = Board::new(25);
        let mut piece = ActivePiece::spawn(TetrominoType::O);
        // O occupies cols 4-5; four shifts left reach the wall
        for _ in 0..4 {
            assert!(piece.shift(&board, -1));
        }
        assert!(!piece.shift(&board, -1));
        assert_eq!(piece.col, 0);
    }

    #[test]
    fn test_rotate_rejected_on_collision() {
        let mut board = Board::new(25);
        let mut piece = ActivePiece::spawn(TetrominoType::I);
        piece.row = 10;
        // Block the column the vertical I would swing into
        let blocked = board.lock(
            &TetrominoType::O.matrix(),
            12,
            piece.col + 2,
            TetrominoType::O,
        );
        assert_eq!(blocked, crate::board::LockOutcome::Placed);
        let before = piece.matrix;
        assert!(!piece.rotate(&board));
        assert_eq!(piece.matrix, before);
    }

    #[test]
    fn test_step_down_stops_at_floor() {
        let board = Board::new(25);
        let mut piece = ActivePiece::spawn(TetrominoType::T);
        while piece.step_down(&board) {}
        // T's filled rows are 0 and 1, so it rests with row 1 on the floor
        assert_eq!(piece.row, 23);
    }

    #[test]
    fn test_landing_row_matches_hard_drop_and_is_pure() {
        let board = Board::new(25);
        let mut piece = ActivePiece::spawn(TetrominoType::L);
        let ghost = piece.landing_row(&board);
        let row_before = piece.row;
        assert_eq!(piece.landing_row(&board), ghost);
        assert_eq!(piece.row, row_before);

        let distance = piece.hard_drop(&board);
        assert_eq!(piece.row, ghost);
        assert_eq!(distance, ghost - row_before);
    }

    #[test]
    fn test_hard_drop_lands_on_stack() {
        let mut board = Board::new(25);
        board.lock(&TetrominoType::O.matrix(), 23, 4, TetrominoType::O);
        let mut piece = ActivePiece::spawn(TetrominoType::O);
        piece.hard_drop(&board);
        board.lock(&piece.matrix, piece.row, piece.col, piece.kind);
        // Stacked directly on top of the first O
        assert_eq!(board.get(21, 4), Some(Cell::Filled(TetrominoType::O)));
        assert_eq!(board.get(22, 5), Some(Cell::Filled(TetrominoType::O)));
    }
}
