use std::any::Any;
use std::fmt::{self, Display};
use std::panic::{self, AssertUnwindSafe};
use std::time::SystemTime;

use arrayvec::ArrayVec;
use cozy_chess::*;
use log::{debug, error, trace, warn};

use crate::journal::{MoveJournal, MoveRecord};
use crate::piece::{starting_pieces, BoardPiece, PieceId, STARTING_PIECE_COUNT};
use crate::validator::{MoveOutcome, MoveValidator, ValidatorError};

#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Promotion hint sent to the validator with every move.
    pub promotion: Piece
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            promotion: Piece::Queen
        }
    }
}

/// Why a move was not applied. The ledger is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// No piece with this id is on the board.
    UnknownPiece(PieceId),
    /// The validator refused the move or failed while checking it.
    Rejected(ValidatorError)
}

impl MoveError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, MoveError::Rejected(_))
    }
}

impl Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MoveError::UnknownPiece(id) => write!(f, "no piece {} on the board", id),
            MoveError::Rejected(error) => write!(f, "move rejected: {}", error)
        }
    }
}

impl std::error::Error for MoveError {}

/// Everything a move changes, worked out before anything is changed.
struct StagedMove {
    captured: ArrayVec<PieceId, 3>,
    rook: Option<(PieceId, Square)>,
    record: MoveRecord
}

/// The pieces on the board and the moves that put them there.
///
/// Every move goes through the validator first; the ledger only changes
/// after the validator has accepted and applied the same move, so both
/// always describe the same game.
pub struct PieceLedger<V> {
    validator: V,
    pieces: ArrayVec<BoardPiece, STARTING_PIECE_COUNT>,
    journal: MoveJournal,
    options: LedgerOptions
}

impl<V: MoveValidator> PieceLedger<V> {
    pub fn new(validator: V) -> Self {
        Self::with_options(validator, LedgerOptions::default())
    }

    pub fn with_options(validator: V, options: LedgerOptions) -> Self {
        let mut ledger = Self {
            validator,
            pieces: ArrayVec::new(),
            journal: MoveJournal::new(),
            options
        };
        ledger.initialize();
        ledger
    }

    /// Set up the standard starting position, here and in the validator.
    pub fn initialize(&mut self) {
        self.validator.reset();
        self.pieces = starting_pieces();
        self.journal.clear();
        debug!("board initialized with {} pieces", self.pieces.len());
    }

    pub fn reset_board(&mut self) {
        let moves = self.journal.len();
        self.initialize();
        debug!("board reset after {} moves", moves);
    }

    pub fn pieces(&self) -> Vec<BoardPiece> {
        self.pieces.to_vec()
    }

    pub fn piece_at(&self, square: Square) -> Option<BoardPiece> {
        self.pieces.iter().find(|p| p.square == square).copied()
    }

    pub fn piece(&self, id: PieceId) -> Option<BoardPiece> {
        self.pieces.iter().find(|p| p.id == id).copied()
    }

    pub fn move_history(&self) -> Vec<MoveRecord> {
        self.journal.all()
    }

    pub fn journal(&self) -> &MoveJournal {
        &self.journal
    }

    /// The side to move, counted from the journal since the last reset.
    pub fn side_to_move(&self) -> Color {
        if self.journal.len() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn options(&self) -> &LedgerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LedgerOptions) {
        self.options = options;
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Move a piece to `target` if the validator allows it.
    ///
    /// On success any captured piece is gone, the mover stands on `target`,
    /// and the returned record has been appended to the journal.
    /// # Errors
    /// [`MoveError::UnknownPiece`] if `id` is not on the board, and
    /// [`MoveError::Rejected`] if the validator refuses or fails.
    /// Nothing changes on error.
    pub fn move_piece(&mut self, id: PieceId, target: Square) -> Result<MoveRecord, MoveError> {
        let from = match self.piece(id) {
            Some(piece) => piece.square,
            None => {
                trace!("move of unknown piece {} to {} refused", id, target);
                return Err(MoveError::UnknownPiece(id));
            }
        };
        let outcome = self.consult_validator(from, target)?;
        let staged = self.stage(id, from, target, outcome);
        let record = staged.record;
        self.commit(staged);
        debug!("committed {}", record);
        Ok(record)
    }

    fn consult_validator(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        let promotion = Some(self.options.promotion);
        let validator = &mut self.validator;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            validator.apply_move(from, to, promotion)
        }));
        match result {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(ValidatorError::Illegal)) => {
                trace!("validator rejected {}{}", from, to);
                Err(MoveError::Rejected(ValidatorError::Illegal))
            }
            Ok(Err(fault)) => {
                warn!("validator failed on {}{}: {}", from, to, fault);
                Err(MoveError::Rejected(fault))
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                error!("validator panicked on {}{}: {}", from, to, message);
                Err(MoveError::Rejected(ValidatorError::Fault(message)))
            }
        }
    }

    // Captures are identified before the mover's square changes,
    // so the mover can never be taken for its own victim.
    fn stage(&self, id: PieceId, from: Square, to: Square, outcome: MoveOutcome) -> StagedMove {
        let rook = outcome.rook_move.and_then(|(rook_from, rook_to)| {
            let rook = self.piece_at(rook_from).filter(|p| p.id != id);
            match rook {
                Some(_) if rook_to == to => {
                    warn!("validator moved a rook onto the target square {}, rook left in place", to);
                    None
                }
                Some(rook) => Some((rook.id, rook_to)),
                None => {
                    warn!("validator moved a rook from {} but the square holds no rook to move", rook_from);
                    None
                }
            }
        });

        // Whatever stands on the target, the en passant square or the rook's
        // destination goes, so no square ends up holding two pieces.
        let mut captured = ArrayVec::new();
        let squares = [Some(to), outcome.captured_on, rook.map(|(_, rook_to)| rook_to)];
        for square in squares.into_iter().flatten() {
            let victim = self.pieces.iter()
                .find(|p| p.square == square && p.id != id && Some(p.id) != rook.map(|(r, _)| r));
            match victim {
                Some(victim) if !captured.contains(&victim.id) => captured.push(victim.id),
                Some(_) => {}
                None if Some(square) == outcome.captured_on => {
                    warn!("validator reported a capture on {} but the square is empty", square);
                }
                None => {}
            }
        }

        StagedMove {
            captured,
            rook,
            record: MoveRecord {
                piece: id,
                from,
                to,
                promotion: outcome.promotion,
                timestamp: SystemTime::now()
            }
        }
    }

    fn commit(&mut self, staged: StagedMove) {
        for &captured in &staged.captured {
            self.pieces.retain(|p| p.id != captured);
            debug!("{} captured", captured);
        }
        let mover = staged.record.piece;
        for piece in self.pieces.iter_mut() {
            if piece.id == mover {
                piece.square = staged.record.to;
            } else if let Some((rook, rook_to)) = staged.rook {
                if piece.id == rook {
                    piece.square = rook_to;
                }
            }
        }
        self.journal.append(staged.record);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
