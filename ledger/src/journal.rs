use std::fmt::{self, Display};
use std::time::SystemTime;

use cozy_chess::*;

use crate::piece::{kind_char, PieceId};

/// A committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    /// The piece that moved. It may since have been captured.
    pub piece: PieceId,
    pub from: Square,
    pub to: Square,
    /// What a promoting pawn became.
    pub promotion: Option<Piece>,
    pub timestamp: SystemTime
}

impl Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}{}", self.piece, self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", kind_char(promotion))?;
        }
        Ok(())
    }
}

/// Append-only log of committed moves, in commit order.
#[derive(Debug, Clone, Default)]
pub struct MoveJournal {
    records: Vec<MoveRecord>
}

impl MoveJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// An independent copy of every record.
    pub fn all(&self) -> Vec<MoveRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
