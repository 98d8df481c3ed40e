use std::collections::VecDeque;
use std::time::SystemTime;

use cozy_chess::*;
use ledgerboard::*;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn id(s: &str) -> PieceId {
    s.parse().unwrap()
}

fn standard() -> PieceLedger<StandardValidator> {
    PieceLedger::new(StandardValidator::new())
}

fn play<V: MoveValidator>(ledger: &mut PieceLedger<V>, moves: &[(&str, &str)]) {
    for &(piece, target) in moves {
        if let Err(error) = ledger.move_piece(id(piece), sq(target)) {
            panic!("{} to {} failed: {}", piece, target, error);
        }
    }
}

fn snapshot<V: MoveValidator>(ledger: &PieceLedger<V>) -> (Vec<BoardPiece>, Vec<MoveRecord>) {
    (ledger.pieces(), ledger.move_history())
}

enum Reply {
    Accept(MoveOutcome),
    Reject,
    Fault,
    Panic
}

/// Answers moves from a script, accepting anything once the script runs out.
#[derive(Default)]
struct ScriptedValidator {
    replies: VecDeque<Reply>,
    calls: Vec<(Square, Square, Option<Piece>)>,
    resets: u32
}

impl ScriptedValidator {
    fn with_replies(replies: impl IntoIterator<Item=Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl MoveValidator for ScriptedValidator {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>
    ) -> Result<MoveOutcome, ValidatorError> {
        self.calls.push((from, to, promotion));
        match self.replies.pop_front().unwrap_or(Reply::Accept(MoveOutcome::default())) {
            Reply::Accept(outcome) => Ok(outcome),
            Reply::Reject => Err(ValidatorError::Illegal),
            Reply::Fault => Err(ValidatorError::Fault("engine offline".to_owned())),
            Reply::Panic => panic!("scripted validator panic")
        }
    }
}

#[test]
fn initial_piece_set() {
    let ledger = standard();
    let pieces = ledger.pieces();
    assert_eq!(pieces.len(), 32);
    let count_color = |color| pieces.iter().filter(|p| p.color == color).count();
    assert_eq!(count_color(Color::White), 16);
    assert_eq!(count_color(Color::Black), 16);
    let count_kind = |kind| pieces.iter().filter(|p| p.kind == kind).count();
    assert_eq!(count_kind(Piece::King), 2);
    assert_eq!(count_kind(Piece::Queen), 2);
    assert_eq!(count_kind(Piece::Rook), 4);
    assert_eq!(count_kind(Piece::Bishop), 4);
    assert_eq!(count_kind(Piece::Knight), 4);
    assert_eq!(count_kind(Piece::Pawn), 16);
    assert!(ledger.move_history().is_empty());

    let king = ledger.piece_at(sq("e1")).unwrap();
    assert_eq!(king.id, id("wk"));
    assert_eq!(king.kind, Piece::King);
    assert_eq!(king.color, Color::White);
    assert_eq!(ledger.piece(id("bq")).unwrap().square, sq("d8"));
    assert_eq!(ledger.piece_at(sq("a3")), None);
}

#[test]
fn initialize_is_idempotent() {
    let mut ledger = standard();
    let first = snapshot(&ledger);
    ledger.initialize();
    ledger.initialize();
    assert_eq!(snapshot(&ledger), first);
}

#[test]
fn move_to_empty_square() {
    let mut ledger = standard();
    let record = ledger.move_piece(id("wp1"), sq("a3")).unwrap();
    assert_eq!((record.from, record.to), (sq("a2"), sq("a3")));
    let piece = ledger.piece_at(sq("a3")).unwrap();
    assert_eq!(piece.id, id("wp1"));
    assert_eq!(piece.square, sq("a3"));
    assert_eq!(ledger.piece_at(sq("a2")), None);
}

#[test]
fn blocked_rook_is_rejected() {
    let mut ledger = standard();
    let before = snapshot(&ledger);
    let result = ledger.move_piece(id("wr1"), sq("a8"));
    assert_eq!(result, Err(MoveError::Rejected(ValidatorError::Illegal)));
    assert!(result.unwrap_err().is_rejection());
    assert_eq!(snapshot(&ledger), before);
}

#[test]
fn rejected_moves_change_nothing() {
    let mut ledger = standard();
    play(&mut ledger, &[("wp5", "e4")]);
    let before = snapshot(&ledger);
    let attempts = [
        ("wp4", "d4"), // not white's turn
        ("bp5", "e4"), // too far
        ("bn1", "b6"), // not a knight move
        ("bk", "e7"), // own piece
        ("bq", "h4") // blocked by own pawn
    ];
    for (piece, target) in attempts {
        assert!(ledger.move_piece(id(piece), sq(target)).is_err(), "{} to {} accepted", piece, target);
    }
    assert_eq!(snapshot(&ledger), before);
    // The validator is still in step: black can reply normally.
    play(&mut ledger, &[("bp5", "e5")]);
}

#[test]
fn pawn_capture_sequence() {
    let mut ledger = standard();
    play(&mut ledger, &[("wp5", "e4"), ("bp4", "d5"), ("wp5", "d5")]);

    let piece = ledger.piece_at(sq("d5")).unwrap();
    assert_eq!(piece.id, id("wp5"));
    assert_eq!(piece.color, Color::White);
    assert_eq!(ledger.piece_at(sq("e4")), None);
    assert_eq!(ledger.piece(id("bp4")), None);
    assert_eq!(ledger.pieces().len(), 31);
    assert_eq!(ledger.pieces().iter().filter(|p| p.square == sq("d5")).count(), 1);

    let history = ledger.move_history();
    assert_eq!(history.len(), 3);
    let froms: Vec<_> = history.iter().map(|r| r.from.to_string()).collect();
    assert_eq!(froms, ["e2", "d7", "e4"]);
    assert_eq!(history[2].piece, id("wp5"));
}

#[test]
fn unknown_piece() {
    assert!("nonexistent".parse::<PieceId>().is_err());

    let mut ledger = standard();
    play(&mut ledger, &[("wp5", "e4"), ("bp4", "d5"), ("wp5", "d5")]);
    let before = snapshot(&ledger);
    let result = ledger.move_piece(id("bp4"), sq("d4"));
    assert_eq!(result, Err(MoveError::UnknownPiece(id("bp4"))));
    assert!(!result.unwrap_err().is_rejection());
    assert_eq!(snapshot(&ledger), before);
}

#[test]
fn history_order_and_timestamps() {
    let mut ledger = standard();
    let start = SystemTime::now();
    play(&mut ledger, &[("wp1", "a3"), ("bp1", "a6")]);
    let end = SystemTime::now();

    let history = ledger.move_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].piece, id("wp1"));
    assert_eq!((history[0].from, history[0].to), (sq("a2"), sq("a3")));
    assert_eq!(history[1].piece, id("bp1"));
    assert_eq!((history[1].from, history[1].to), (sq("a7"), sq("a6")));
    for record in &history {
        assert!(record.timestamp >= start && record.timestamp <= end);
    }
    assert!(history[0].timestamp <= history[1].timestamp);
}

#[test]
fn reset_restores_start() {
    let mut ledger = standard();
    let initial = ledger.pieces();
    play(&mut ledger, &[("wp5", "e4"), ("bp4", "d5"), ("wp5", "d5"), ("bq", "d5")]);
    assert_eq!(ledger.pieces().len(), 30);

    ledger.reset_board();
    assert!(ledger.move_history().is_empty());
    assert_eq!(ledger.pieces(), initial);
    assert_eq!(ledger.piece(id("wp5")).unwrap().square, sq("e2"));
    // White to move again in the validator too.
    play(&mut ledger, &[("wp5", "e4")]);
}

#[test]
fn same_square_is_forwarded_and_rejected() {
    let mut ledger = standard();
    let before = snapshot(&ledger);
    let result = ledger.move_piece(id("wp1"), sq("a2"));
    assert_eq!(result, Err(MoveError::Rejected(ValidatorError::Illegal)));
    assert_eq!(snapshot(&ledger), before);
}

#[test]
fn same_square_accepted_by_permissive_validator() {
    let mut ledger = PieceLedger::new(ScriptedValidator::default());
    let record = ledger.move_piece(id("wp1"), sq("a2")).unwrap();
    assert_eq!(record.from, record.to);
    assert_eq!(ledger.validator().calls, [(sq("a2"), sq("a2"), Some(Piece::Queen))]);
    assert_eq!(ledger.move_history().len(), 1);
    assert_eq!(ledger.pieces().len(), 32);
    assert_eq!(ledger.piece_at(sq("a2")).unwrap().id, id("wp1"));
}

#[test]
fn occupied_target_is_cleared() {
    // A permissive validator lets the rook land on its own pawn.
    let mut ledger = PieceLedger::new(ScriptedValidator::default());
    let pawn = ledger.piece_at(sq("e2")).unwrap();
    ledger.move_piece(id("wr1"), sq("e2")).unwrap();

    let piece = ledger.piece_at(sq("e2")).unwrap();
    assert_eq!(piece.id, id("wr1"));
    assert_eq!(piece.kind, Piece::Rook);
    assert_eq!(ledger.piece(pawn.id), None);
    assert_eq!(ledger.pieces().len(), 31);
}

#[test]
fn validator_faults_are_contained() {
    let replies = [Reply::Fault, Reply::Panic, Reply::Reject];
    let mut ledger = PieceLedger::new(ScriptedValidator::with_replies(replies));
    let before = snapshot(&ledger);

    let fault = ledger.move_piece(id("wp5"), sq("e4"));
    assert_eq!(fault, Err(MoveError::Rejected(ValidatorError::Fault("engine offline".to_owned()))));
    let panic = ledger.move_piece(id("wp5"), sq("e4"));
    assert_eq!(panic, Err(MoveError::Rejected(ValidatorError::Fault("scripted validator panic".to_owned()))));
    let reject = ledger.move_piece(id("wp5"), sq("e4"));
    assert_eq!(reject, Err(MoveError::Rejected(ValidatorError::Illegal)));
    assert_eq!(snapshot(&ledger), before);

    ledger.move_piece(id("wp5"), sq("e4")).unwrap();
    assert_eq!(ledger.validator().calls.len(), 4);
}

#[test]
fn reset_reaches_validator() {
    let mut ledger = PieceLedger::new(ScriptedValidator::default());
    assert_eq!(ledger.validator().resets, 1);
    ledger.reset_board();
    assert_eq!(ledger.validator().resets, 2);
}

#[test]
fn promotion_hint_follows_options() {
    let options = LedgerOptions { promotion: Piece::Knight };
    let mut ledger = PieceLedger::with_options(ScriptedValidator::default(), options);
    ledger.move_piece(id("wp1"), sq("a3")).unwrap();
    ledger.set_options(LedgerOptions::default());
    ledger.move_piece(id("bp1"), sq("a6")).unwrap();
    let hints: Vec<_> = ledger.validator().calls.iter().map(|c| c.2).collect();
    assert_eq!(hints, [Some(Piece::Knight), Some(Piece::Queen)]);
}

#[test]
fn castling_moves_the_rook() {
    let mut ledger = standard();
    play(&mut ledger, &[
        ("wp5", "e4"), ("bp5", "e5"),
        ("wn2", "f3"), ("bn1", "c6"),
        ("wb2", "c4"), ("bn2", "f6"),
        ("wk", "g1")
    ]);
    assert_eq!(ledger.piece_at(sq("g1")).unwrap().id, id("wk"));
    assert_eq!(ledger.piece_at(sq("f1")).unwrap().id, id("wr2"));
    assert_eq!(ledger.piece_at(sq("h1")), None);
    assert_eq!(ledger.pieces().len(), 32);

    let history = ledger.move_history();
    assert_eq!(history.len(), 7);
    let last = history.last().unwrap();
    assert_eq!((last.piece, last.from, last.to), (id("wk"), sq("e1"), sq("g1")));
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut ledger = standard();
    play(&mut ledger, &[
        ("wp5", "e4"), ("bp1", "a6"),
        ("wp5", "e5"), ("bp4", "d5"),
        ("wp5", "d6")
    ]);
    assert_eq!(ledger.piece_at(sq("d6")).unwrap().id, id("wp5"));
    assert_eq!(ledger.piece_at(sq("d5")), None);
    assert_eq!(ledger.piece(id("bp4")), None);
    assert_eq!(ledger.pieces().len(), 31);
}

#[test]
fn promotion_is_journaled() {
    let mut ledger = standard();
    play(&mut ledger, &[
        ("wp1", "a4"), ("bp2", "b5"),
        ("wp1", "b5"), ("bp1", "a6"),
        ("wp1", "a6"), ("bb1", "b7"),
        ("wp1", "b7"), ("bn1", "c6"),
        ("wp1", "a8")
    ]);
    let piece = ledger.piece_at(sq("a8")).unwrap();
    assert_eq!(piece.id, id("wp1"));
    assert_eq!(ledger.piece(id("br1")), None);
    assert_eq!(ledger.pieces().len(), 28);
    let last = ledger.move_history().pop().unwrap();
    assert_eq!(last.promotion, Some(Piece::Queen));
    assert_eq!(ledger.validator().board().piece_on(sq("a8")), Some(Piece::Queen));
}

fn occupants<V: MoveValidator>(ledger: &PieceLedger<V>, square: &str) -> Vec<PieceId> {
    ledger.pieces().iter().filter(|p| p.square == sq(square)).map(|p| p.id).collect()
}

#[test]
fn capture_square_and_target_are_both_cleared() {
    let outcome = MoveOutcome {
        captured_on: Some(sq("d7")),
        ..MoveOutcome::default()
    };
    let mut ledger = PieceLedger::new(ScriptedValidator::with_replies([Reply::Accept(outcome)]));
    play(&mut ledger, &[("wq", "e7")]);
    assert_eq!(occupants(&ledger, "e7"), [id("wq")]);
    assert_eq!(ledger.piece(id("bp5")), None);
    assert_eq!(ledger.piece(id("bp4")), None);
    assert_eq!(ledger.piece_at(sq("d7")), None);
    assert_eq!(ledger.pieces().len(), 30);
}

#[test]
fn empty_capture_square_still_clears_target() {
    let outcome = MoveOutcome {
        captured_on: Some(sq("d5")),
        ..MoveOutcome::default()
    };
    let mut ledger = PieceLedger::new(ScriptedValidator::with_replies([Reply::Accept(outcome)]));
    play(&mut ledger, &[("wr1", "a7")]);
    assert_eq!(occupants(&ledger, "a7"), [id("wr1")]);
    assert_eq!(ledger.pieces().len(), 31);
}

#[test]
fn rook_destination_is_cleared() {
    let outcome = MoveOutcome {
        rook_move: Some((sq("h1"), sq("g1"))),
        ..MoveOutcome::default()
    };
    let mut ledger = PieceLedger::new(ScriptedValidator::with_replies([Reply::Accept(outcome)]));
    play(&mut ledger, &[("wk", "f1")]);
    assert_eq!(occupants(&ledger, "f1"), [id("wk")]);
    assert_eq!(occupants(&ledger, "g1"), [id("wr2")]);
    assert_eq!(ledger.piece_at(sq("h1")), None);
    assert_eq!(ledger.piece(id("wn2")), None);
    assert_eq!(ledger.piece(id("wb2")), None);
    assert_eq!(ledger.pieces().len(), 30);
}

#[test]
fn rook_is_not_moved_onto_the_target() {
    let outcome = MoveOutcome {
        rook_move: Some((sq("h1"), sq("g1"))),
        ..MoveOutcome::default()
    };
    let mut ledger = PieceLedger::new(ScriptedValidator::with_replies([Reply::Accept(outcome)]));
    play(&mut ledger, &[("wk", "g1")]);
    assert_eq!(occupants(&ledger, "g1"), [id("wk")]);
    assert_eq!(occupants(&ledger, "h1"), [id("wr2")]);
    assert_eq!(ledger.pieces().len(), 31);
}
