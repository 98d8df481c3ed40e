use std::fmt::{self, Display};

use cozy_chess::*;

mod standard;

pub use standard::StandardValidator;

/// The authority on chess rules and owner of the canonical game state.
///
/// A rejected move, whether [`ValidatorError::Illegal`] or a fault,
/// must leave the validator's state exactly as it was.
pub trait MoveValidator {
    /// Return to the standard starting position.
    fn reset(&mut self);

    /// Try to play `from` to `to` for the side to move.
    /// `promotion` is a hint for the kind a pawn becomes on the last rank.
    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>
    ) -> Result<MoveOutcome, ValidatorError>;
}

impl<V: MoveValidator, R: std::ops::DerefMut<Target=V>> MoveValidator for R {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>
    ) -> Result<MoveOutcome, ValidatorError> {
        (**self).apply_move(from, to, promotion)
    }
}

/// What an accepted move did besides moving the piece itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// Square of the captured piece. Only differs from the target square for en passant.
    pub captured_on: Option<Square>,
    /// The rook's relocation when castling.
    pub rook_move: Option<(Square, Square)>,
    pub promotion: Option<Piece>
}

impl MoveOutcome {
    pub fn is_capture(&self) -> bool {
        self.captured_on.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// The move is not legal in the current position.
    Illegal,
    /// The validator failed for a reason unrelated to legality.
    Fault(String)
}

impl Display for ValidatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidatorError::Illegal => write!(f, "illegal move"),
            ValidatorError::Fault(message) => write!(f, "validator fault: {}", message)
        }
    }
}

impl std::error::Error for ValidatorError {}
