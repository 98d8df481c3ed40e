pub mod journal;
pub mod ledger;
pub mod piece;
pub mod validator;

pub use journal::{MoveJournal, MoveRecord};
pub use ledger::{LedgerOptions, MoveError, PieceLedger};
pub use piece::{BoardPiece, PieceId};
pub use validator::{MoveOutcome, MoveValidator, StandardValidator, ValidatorError};
