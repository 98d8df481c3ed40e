use std::fmt::{self, Display};
use std::str::FromStr;

use arrayvec::ArrayVec;
use cozy_chess::*;

/// The number of pieces on the board at the start of a game.
pub const STARTING_PIECE_COUNT: usize = 32;

/// Stable identifier of a piece, assigned when the board is set up.
///
/// The text form is a color letter, a piece letter, and an ordinal for
/// pieces that exist more than once per side: `wk`, `bq`, `wr1`, `bn2`, `wp8`.
/// Pawns are numbered by file from the a-file, rooks, knights and bishops
/// from the queen side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceId {
    color: Color,
    kind: Piece,
    ordinal: u8
}

impl PieceId {
    /// Create an id, or [`None`] if no piece with this ordinal exists in a standard setup.
    pub fn new(color: Color, kind: Piece, ordinal: u8) -> Option<Self> {
        let max_ordinal = match kind {
            Piece::King | Piece::Queen => 0,
            Piece::Rook | Piece::Knight | Piece::Bishop => 2,
            Piece::Pawn => 8
        };
        let valid = if max_ordinal == 0 {
            ordinal == 0
        } else {
            (1..=max_ordinal).contains(&ordinal)
        };
        if valid {
            Some(Self { color, kind, ordinal })
        } else {
            None
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> Piece {
        self.kind
    }

    pub fn ordinal(&self) -> u8 {
        self.ordinal
    }
}

fn color_char(color: Color) -> char {
    match color {
        Color::White => 'w',
        Color::Black => 'b'
    }
}

pub(crate) fn kind_char(kind: Piece) -> char {
    match kind {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k'
    }
}

impl Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", color_char(self.color), kind_char(self.kind))?;
        if self.ordinal != 0 {
            write!(f, "{}", self.ordinal)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePieceIdError;

impl Display for ParsePieceIdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid piece id")
    }
}

impl std::error::Error for ParsePieceIdError {}

impl FromStr for PieceId {
    type Err = ParsePieceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let color = match chars.next() {
            Some('w') => Color::White,
            Some('b') => Color::Black,
            _ => return Err(ParsePieceIdError)
        };
        let kind = match chars.next() {
            Some('p') => Piece::Pawn,
            Some('n') => Piece::Knight,
            Some('b') => Piece::Bishop,
            Some('r') => Piece::Rook,
            Some('q') => Piece::Queen,
            Some('k') => Piece::King,
            _ => return Err(ParsePieceIdError)
        };
        let rest = chars.as_str();
        let ordinal = if rest.is_empty() {
            0
        } else {
            // Reject "+1" and friends that u8 parsing would accept.
            if !rest.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParsePieceIdError);
            }
            rest.parse::<u8>().map_err(|_| ParsePieceIdError)?
        };
        PieceId::new(color, kind, ordinal).ok_or(ParsePieceIdError)
    }
}

/// A piece as seen by the board: identity, kind, color and current square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPiece {
    pub id: PieceId,
    pub kind: Piece,
    pub color: Color,
    pub square: Square
}

impl BoardPiece {
    fn new(id: PieceId, square: Square) -> Self {
        Self {
            id,
            kind: id.kind(),
            color: id.color(),
            square
        }
    }
}

const BACK_RANK: [(Piece, File, u8); 8] = [
    (Piece::Rook, File::A, 1),
    (Piece::Rook, File::H, 2),
    (Piece::Knight, File::B, 1),
    (Piece::Knight, File::G, 2),
    (Piece::Bishop, File::C, 1),
    (Piece::Bishop, File::F, 2),
    (Piece::Queen, File::D, 0),
    (Piece::King, File::E, 0)
];

/// The 32 pieces of the standard starting position, white first.
pub fn starting_pieces() -> ArrayVec<BoardPiece, STARTING_PIECE_COUNT> {
    let mut pieces = ArrayVec::new();
    for &color in &Color::ALL {
        let back_rank = Rank::First.relative_to(color);
        let pawn_rank = Rank::Second.relative_to(color);
        for &(kind, file, ordinal) in &BACK_RANK {
            let id = PieceId { color, kind, ordinal };
            pieces.push(BoardPiece::new(id, Square::new(file, back_rank)));
        }
        for (i, &file) in File::ALL.iter().enumerate() {
            let id = PieceId { color, kind: Piece::Pawn, ordinal: i as u8 + 1 };
            pieces.push(BoardPiece::new(id, Square::new(file, pawn_rank)));
        }
    }
    pieces
}
