use cozy_chess::*;

use super::{MoveOutcome, MoveValidator, ValidatorError};

/// Standard chess rules, backed by a [`cozy_chess::Board`].
///
/// Castling is accepted in the usual king-moves-two-squares form (`e1g1`).
#[derive(Debug, Clone, Default)]
pub struct StandardValidator {
    board: Board
}

impl StandardValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary position instead of the standard one.
    /// [`MoveValidator::reset`] still returns to the standard position.
    pub fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Translate a from/to pair into a move in the board's encoding,
    /// together with what the move will do to the other pieces.
    fn resolve(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Piece>
    ) -> Result<(Move, MoveOutcome), ValidatorError> {
        let board = &self.board;
        let color = board.side_to_move();
        if board.color_on(from) != Some(color) {
            return Err(ValidatorError::Illegal);
        }
        // Also rules out same-square moves and the board's
        // king-takes-own-rook castling encoding.
        if board.color_on(to) == Some(color) {
            return Err(ValidatorError::Illegal);
        }

        let mut mv = Move { from, to, promotion: None };
        let mut outcome = MoveOutcome::default();
        let back_rank = Rank::First.relative_to(color);
        match board.piece_on(from) {
            Some(Piece::King) => {
                let castles = from == Square::new(File::E, back_rank)
                    && to.rank() == back_rank
                    && matches!(to.file(), File::C | File::G);
                if castles {
                    let rights = board.castle_rights(color);
                    let (rook_file, rook_dest) = if to.file() == File::G {
                        (rights.short, File::F)
                    } else {
                        (rights.long, File::D)
                    };
                    let rook_file = rook_file.ok_or(ValidatorError::Illegal)?;
                    let rook_square = Square::new(rook_file, back_rank);
                    mv.to = rook_square;
                    outcome.rook_move = Some((rook_square, Square::new(rook_dest, back_rank)));
                }
            }
            Some(Piece::Pawn) => {
                if to.rank() == Rank::Eighth.relative_to(color) {
                    mv.promotion = promotion;
                    outcome.promotion = promotion;
                }
                let ep_square = board.en_passant().map(|ep| {
                    Square::new(ep, Rank::Sixth.relative_to(color))
                });
                if Some(to) == ep_square {
                    outcome.captured_on = Some(Square::new(to.file(), Rank::Fifth.relative_to(color)));
                }
            }
            _ => {}
        }
        if board.color_on(to) == Some(!color) {
            outcome.captured_on = Some(to);
        }
        Ok((mv, outcome))
    }
}

impl MoveValidator for StandardValidator {
    fn reset(&mut self) {
        self.board = Board::default();
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>
    ) -> Result<MoveOutcome, ValidatorError> {
        let (mv, outcome) = self.resolve(from, to, promotion)?;
        self.board.try_play(mv).map_err(|_| ValidatorError::Illegal)?;
        Ok(outcome)
    }
}
