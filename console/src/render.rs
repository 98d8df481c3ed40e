use std::fmt::Write;

use cozy_chess::*;
use ledgerboard::{BoardPiece, MoveRecord};

fn glyph(piece: &BoardPiece, unicode: bool) -> char {
    if unicode {
        match (piece.color, piece.kind) {
            (Color::White, Piece::King) => '♔',
            (Color::White, Piece::Queen) => '♕',
            (Color::White, Piece::Rook) => '♖',
            (Color::White, Piece::Bishop) => '♗',
            (Color::White, Piece::Knight) => '♘',
            (Color::White, Piece::Pawn) => '♙',
            (Color::Black, Piece::King) => '♚',
            (Color::Black, Piece::Queen) => '♛',
            (Color::Black, Piece::Rook) => '♜',
            (Color::Black, Piece::Bishop) => '♝',
            (Color::Black, Piece::Knight) => '♞',
            (Color::Black, Piece::Pawn) => '♟'
        }
    } else {
        let c = match piece.kind {
            Piece::King => 'k',
            Piece::Queen => 'q',
            Piece::Rook => 'r',
            Piece::Bishop => 'b',
            Piece::Knight => 'n',
            Piece::Pawn => 'p'
        };
        match piece.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c
        }
    }
}

/// Show promoted pawns as what they became, going by the journal.
pub fn apply_promotions(pieces: &mut [BoardPiece], history: &[MoveRecord]) {
    for record in history {
        if let Some(promotion) = record.promotion {
            if let Some(piece) = pieces.iter_mut().find(|p| p.id == record.piece) {
                piece.kind = promotion;
            }
        }
    }
}

/// Draw the board from white's side, rank 8 first.
pub fn render_board(pieces: &[BoardPiece], unicode: bool) -> String {
    let mut grid = [[None; File::NUM]; Rank::NUM];
    for piece in pieces {
        grid[piece.square.rank() as usize][piece.square.file() as usize] = Some(glyph(piece, unicode));
    }
    let mut out = String::new();
    for &rank in Rank::ALL.iter().rev() {
        let _ = write!(out, "{} ", rank);
        for &file in &File::ALL {
            let c = grid[rank as usize][file as usize].unwrap_or('.');
            let _ = write!(out, " {}", c);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &File::ALL {
        let _ = write!(out, " {}", file);
    }
    out.push('\n');
    out
}

pub fn render_piece(piece: &BoardPiece) -> String {
    format!("{:<4} {:?} {:?} on {}", piece.id.to_string(), piece.color, piece.kind, piece.square)
}
