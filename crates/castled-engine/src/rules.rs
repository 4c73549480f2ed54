//! Legality filtering, state update, and terminal-state evaluation.
//!
//! A move is legal when it is pseudo-legal and does not leave the mover's
//! king in check afterward. The latter is decided by simulating the move on
//! a cloned position and running the attack scan there; pins and discovered
//! checks fall out of that re-evaluation with no dedicated logic.

use crate::movegen::{in_check, pseudo_legal, MoveList};
use crate::{Position, Wing};
use castled_core::{Color, Move, MoveFlag, Piece, Square};

/// Verdict on a position as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The side to move has at least one legal move.
    Ongoing,
    /// The side to move has no legal moves and is in check; the payload
    /// names the winner.
    Checkmate(Color),
    /// The side to move has no legal moves but is not in check.
    Stalemate,
}

/// What applying a move did, for callers that drive captured-piece tallies,
/// sound selection, and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move as applied, with its derived flag.
    pub mov: Move,
    /// The captured piece and the square it stood on. For an en-passant
    /// capture this is not the destination square.
    pub captured: Option<(Piece, Square)>,
    /// The piece the moved pawn became, when the move promoted.
    pub promoted: Option<Piece>,
}

/// Returns true if moving from `from` to `to` is legal for the side to move.
pub fn is_legal(position: &Position, from: Square, to: Square) -> bool {
    match position.board.piece_at(from) {
        Some((_, color)) if color == position.side_to_move => {}
        _ => return false,
    }
    if !pseudo_legal(position, from, to) {
        return false;
    }
    let (next, _) = apply(position, from, to);
    !in_check(&next, position.side_to_move)
}

/// Applies an already-validated move, returning the successor position and
/// the outcome record.
///
/// Callers must have established legality via [`is_legal`]; passing an
/// illegal move is a contract violation and aborts in debug builds. The
/// [`Game`](crate::Game) session is the surface that always re-validates.
pub fn make_move(position: &Position, from: Square, to: Square) -> (Position, MoveOutcome) {
    debug_assert!(
        is_legal(position, from, to),
        "make_move called with illegal move {}{}",
        from,
        to
    );
    apply(position, from, to)
}

/// Collects every legal move starting on the given square.
pub fn legal_moves_from(position: &Position, from: Square) -> MoveList {
    let mut moves = MoveList::new();
    for to in Square::all() {
        if is_legal(position, from, to) {
            moves.push(Move::new(from, to, classify(position, from, to)));
        }
    }
    moves
}

/// Collects every legal move for the side to move.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    for (from, _) in position.board.pieces_of(position.side_to_move) {
        for to in Square::all() {
            if is_legal(position, from, to) {
                moves.push(Move::new(from, to, classify(position, from, to)));
            }
        }
    }
    moves
}

/// Evaluates the position for the side to move.
///
/// Runs the legality filter over every piece and destination of the side to
/// move. Quadratic in board squares, with another attack scan inside each
/// simulation: fine for human-paced play, unsuitable for search.
pub fn status(position: &Position) -> GameStatus {
    if !generate_moves(position).is_empty() {
        return GameStatus::Ongoing;
    }
    if in_check(position, position.side_to_move) {
        GameStatus::Checkmate(position.side_to_move.opponent())
    } else {
        GameStatus::Stalemate
    }
}

/// Derives the special effect a move from `from` to `to` would carry.
///
/// Callers supply only the endpoints; the flag is inferred from the piece
/// and the position.
fn classify(position: &Position, from: Square, to: Square) -> MoveFlag {
    let Some((piece, color)) = position.board.piece_at(from) else {
        return MoveFlag::Normal;
    };
    let file_delta = to.file_index() as i8 - from.file_index() as i8;
    let rank_delta = to.rank_index() as i8 - from.rank_index() as i8;

    match piece {
        Piece::King if rank_delta == 0 && file_delta == 2 => MoveFlag::CastleKingside,
        Piece::King if rank_delta == 0 && file_delta == -2 => MoveFlag::CastleQueenside,
        Piece::Pawn => {
            if to.rank_index() == color.promotion_rank() {
                MoveFlag::Promotion
            } else if rank_delta.abs() == 2 {
                MoveFlag::DoublePush
            } else if file_delta != 0
                && position.board.is_vacant(to)
                && position.en_passant == Some(to)
            {
                MoveFlag::EnPassant
            } else {
                MoveFlag::Normal
            }
        }
        _ => MoveFlag::Normal,
    }
}

/// Unvalidated move application shared by [`make_move`] and the legality
/// filter's simulation step.
fn apply(position: &Position, from: Square, to: Square) -> (Position, MoveOutcome) {
    let (piece, color) = position
        .board
        .piece_at(from)
        .expect("no piece on origin square");
    let flag = classify(position, from, to);
    let mut next = position.clone();

    // Capture bookkeeping first, so the outcome names the emptied square.
    let mut captured = next.board.remove(to).map(|(victim, _)| (victim, to));
    if flag == MoveFlag::EnPassant {
        // The captured pawn stands beside the destination, on the
        // capturing pawn's starting rank.
        if let Some(beside) = to.offset(0, -color.pawn_direction()) {
            captured = next.board.remove(beside).map(|(victim, _)| (victim, beside));
        }
    }

    next.board.remove(from);
    let arriving = if flag == MoveFlag::Promotion {
        Piece::Queen
    } else {
        piece
    };
    next.board.place(to, arriving, color);

    // The skipped square is a capture target for the immediate reply only.
    next.en_passant = if flag == MoveFlag::DoublePush {
        from.offset(0, color.pawn_direction())
    } else {
        None
    };

    if piece == Piece::King {
        next.castling.revoke_both(color);
    }
    if piece == Piece::Rook {
        for wing in Wing::BOTH {
            if from == wing.rook_home(color) {
                next.castling.revoke(color, wing);
            }
        }
    }
    // Landing on a rook home square kills that corner's right. If the right
    // was still held, the occupant was necessarily its home rook.
    for owner in [Color::White, Color::Black] {
        for wing in Wing::BOTH {
            if to == wing.rook_home(owner) {
                next.castling.revoke(owner, wing);
            }
        }
    }

    match flag {
        MoveFlag::CastleKingside | MoveFlag::CastleQueenside => {
            let wing = if flag == MoveFlag::CastleKingside {
                Wing::Kingside
            } else {
                Wing::Queenside
            };
            next.board.remove(wing.rook_home(color));
            next.board.place(wing.rook_target(color), Piece::Rook, color);
        }
        _ => {}
    }

    next.side_to_move = color.opponent();

    let outcome = MoveOutcome {
        mov: Move::new(from, to, flag),
        captured,
        promoted: (flag == MoveFlag::Promotion).then_some(Piece::Queen),
    };
    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CastlingRights;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn twenty_legal_moves_at_the_start() {
        let moves = generate_moves(&Position::initial());
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn pawn_hints_from_the_start() {
        let moves = legal_moves_from(&Position::initial(), sq("e2"));
        let mut targets: Vec<String> = moves.targets().map(|t| t.to_string()).collect();
        targets.sort();
        assert_eq!(targets, vec!["e3", "e4"]);
    }

    #[test]
    fn empty_origin_is_illegal() {
        assert!(!is_legal(&Position::initial(), sq("e4"), sq("e5")));
    }

    #[test]
    fn opponent_piece_is_illegal_to_move() {
        // White to move; the e7 pawn belongs to Black.
        assert!(!is_legal(&Position::initial(), sq("e7"), sq("e5")));
    }

    #[test]
    fn pinned_piece_cannot_expose_the_king() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("e2"), Piece::Rook, Color::White);
        pos.board.place(sq("e8"), Piece::Rook, Color::Black);
        pos.board.place(sq("a8"), Piece::King, Color::Black);

        // Along the pin line is fine, off it is not.
        assert!(is_legal(&pos, sq("e2"), sq("e5")));
        assert!(!is_legal(&pos, sq("e2"), sq("a2")));
    }

    #[test]
    fn king_cannot_step_into_an_attack() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("d8"), Piece::Rook, Color::Black);
        pos.board.place(sq("h8"), Piece::King, Color::Black);
        assert!(!is_legal(&pos, sq("e1"), sq("d1")));
        assert!(!is_legal(&pos, sq("e1"), sq("d2")));
        assert!(is_legal(&pos, sq("e1"), sq("e2")));
    }

    #[test]
    fn check_must_be_answered() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("a2"), Piece::Rook, Color::White);
        pos.board.place(sq("e8"), Piece::Rook, Color::Black);
        pos.board.place(sq("g8"), Piece::King, Color::Black);

        // The rook may block the check but not wander off.
        assert!(is_legal(&pos, sq("a2"), sq("e2")));
        assert!(!is_legal(&pos, sq("a2"), sq("a5")));
        assert!(is_legal(&pos, sq("e1"), sq("d1")));
        assert!(!is_legal(&pos, sq("e1"), sq("e2")));
    }

    #[test]
    fn classify_infers_flags() {
        let pos = Position::initial();
        assert_eq!(classify(&pos, sq("e2"), sq("e4")), MoveFlag::DoublePush);
        assert_eq!(classify(&pos, sq("e2"), sq("e3")), MoveFlag::Normal);
        assert_eq!(classify(&pos, sq("g1"), sq("f3")), MoveFlag::Normal);
    }

    #[test]
    fn apply_moves_the_piece_and_flips_the_turn() {
        let pos = Position::initial();
        let (next, outcome) = make_move(&pos, sq("e2"), sq("e4"));
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.piece_at(sq("e4")), Some((Piece::Pawn, Color::White)));
        assert_eq!(next.piece_at(sq("e2")), None);
        assert_eq!(outcome.captured, None);
        assert_eq!(outcome.promoted, None);
        assert_eq!(outcome.mov.flag, MoveFlag::DoublePush);
        // The original position is untouched.
        assert_eq!(pos.piece_at(sq("e2")), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn double_push_sets_the_en_passant_target() {
        let (next, _) = make_move(&Position::initial(), sq("e2"), sq("e4"));
        assert_eq!(next.en_passant, Some(sq("e3")));

        // Any reply that is not a double push clears it.
        let (after_reply, _) = make_move(&next, sq("g8"), sq("f6"));
        assert_eq!(after_reply.en_passant, None);
    }

    #[test]
    fn capture_is_reported_with_its_square() {
        let mut pos = Position::empty();
        pos.board.place(sq("d4"), Piece::Queen, Color::White);
        pos.board.place(sq("d7"), Piece::Knight, Color::Black);
        pos.board.place(sq("a1"), Piece::King, Color::White);
        pos.board.place(sq("h8"), Piece::King, Color::Black);

        let (next, outcome) = make_move(&pos, sq("d4"), sq("d7"));
        assert_eq!(outcome.captured, Some((Piece::Knight, sq("d7"))));
        assert_eq!(next.piece_at(sq("d7")), Some((Piece::Queen, Color::White)));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut pos = Position::empty();
        pos.board.place(sq("e5"), Piece::Pawn, Color::White);
        pos.board.place(sq("d5"), Piece::Pawn, Color::Black);
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);
        pos.en_passant = Some(sq("d6"));

        assert!(is_legal(&pos, sq("e5"), sq("d6")));
        let (next, outcome) = make_move(&pos, sq("e5"), sq("d6"));
        assert_eq!(outcome.mov.flag, MoveFlag::EnPassant);
        // The victim was on d5, not on the destination d6.
        assert_eq!(outcome.captured, Some((Piece::Pawn, sq("d5"))));
        assert_eq!(next.piece_at(sq("d5")), None);
        assert_eq!(next.piece_at(sq("d6")), Some((Piece::Pawn, Color::White)));
    }

    #[test]
    fn promotion_arrives_as_a_queen() {
        let mut pos = Position::empty();
        pos.board.place(sq("a7"), Piece::Pawn, Color::White);
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);

        let (next, outcome) = make_move(&pos, sq("a7"), sq("a8"));
        assert_eq!(next.piece_at(sq("a8")), Some((Piece::Queen, Color::White)));
        assert_eq!(outcome.mov.flag, MoveFlag::Promotion);
        assert_eq!(outcome.promoted, Some(Piece::Queen));
    }

    #[test]
    fn capturing_promotion_is_still_a_promotion() {
        let mut pos = Position::empty();
        pos.board.place(sq("a7"), Piece::Pawn, Color::White);
        pos.board.place(sq("b8"), Piece::Rook, Color::Black);
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);

        let (next, outcome) = make_move(&pos, sq("a7"), sq("b8"));
        assert_eq!(next.piece_at(sq("b8")), Some((Piece::Queen, Color::White)));
        assert_eq!(outcome.captured, Some((Piece::Rook, sq("b8"))));
        assert_eq!(outcome.promoted, Some(Piece::Queen));
    }

    #[test]
    fn castling_relocates_the_rook() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("h1"), Piece::Rook, Color::White);
        pos.board.place(sq("a1"), Piece::Rook, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);
        pos.castling = CastlingRights::ALL;

        let (next, outcome) = make_move(&pos, sq("e1"), sq("g1"));
        assert_eq!(outcome.mov.flag, MoveFlag::CastleKingside);
        assert_eq!(next.piece_at(sq("g1")), Some((Piece::King, Color::White)));
        assert_eq!(next.piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
        assert_eq!(next.piece_at(sq("h1")), None);
        assert!(!next.castling.allows(Color::White, Wing::Kingside));
        assert!(!next.castling.allows(Color::White, Wing::Queenside));

        let (next, outcome) = make_move(&pos, sq("e1"), sq("c1"));
        assert_eq!(outcome.mov.flag, MoveFlag::CastleQueenside);
        assert_eq!(next.piece_at(sq("c1")), Some((Piece::King, Color::White)));
        assert_eq!(next.piece_at(sq("d1")), Some((Piece::Rook, Color::White)));
        assert_eq!(next.piece_at(sq("a1")), None);
    }

    #[test]
    fn king_move_revokes_both_rights() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("a1"), Piece::Rook, Color::White);
        pos.board.place(sq("h1"), Piece::Rook, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);
        pos.castling = CastlingRights::ALL;

        let (next, _) = make_move(&pos, sq("e1"), sq("e2"));
        assert!(!next.castling.allows(Color::White, Wing::Kingside));
        assert!(!next.castling.allows(Color::White, Wing::Queenside));
        assert!(next.castling.allows(Color::Black, Wing::Kingside));
    }

    #[test]
    fn rook_move_revokes_one_right() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("a1"), Piece::Rook, Color::White);
        pos.board.place(sq("h1"), Piece::Rook, Color::White);
        pos.board.place(sq("e8"), Piece::King, Color::Black);
        pos.castling = CastlingRights::ALL;

        let (next, _) = make_move(&pos, sq("h1"), sq("h4"));
        assert!(!next.castling.allows(Color::White, Wing::Kingside));
        assert!(next.castling.allows(Color::White, Wing::Queenside));
    }

    #[test]
    fn capturing_a_home_rook_revokes_its_right() {
        let mut pos = Position::empty();
        pos.board.place(sq("e1"), Piece::King, Color::White);
        pos.board.place(sq("h8"), Piece::Rook, Color::Black);
        pos.board.place(sq("e8"), Piece::King, Color::Black);
        pos.board.place(sq("h1"), Piece::Rook, Color::White);
        pos.board.place(sq("a8"), Piece::Rook, Color::Black);
        pos.castling = CastlingRights::ALL;

        // White rook takes the h8 rook on its home square.
        let (next, outcome) = make_move(&pos, sq("h1"), sq("h8"));
        assert_eq!(outcome.captured, Some((Piece::Rook, sq("h8"))));
        assert!(!next.castling.allows(Color::Black, Wing::Kingside));
        assert!(next.castling.allows(Color::Black, Wing::Queenside));
        // White's own kingside right died with the rook leaving h1.
        assert!(!next.castling.allows(Color::White, Wing::Kingside));
    }

    #[test]
    fn back_rank_mate() {
        let mut pos = Position::empty();
        pos.board.place(sq("g8"), Piece::King, Color::Black);
        pos.board.place(sq("f7"), Piece::Pawn, Color::Black);
        pos.board.place(sq("g7"), Piece::Pawn, Color::Black);
        pos.board.place(sq("h7"), Piece::Pawn, Color::Black);
        pos.board.place(sq("a8"), Piece::Rook, Color::White);
        pos.board.place(sq("a1"), Piece::King, Color::White);
        pos.side_to_move = Color::Black;

        assert_eq!(status(&pos), GameStatus::Checkmate(Color::White));
    }

    #[test]
    fn cornered_king_stalemate() {
        let mut pos = Position::empty();
        pos.board.place(sq("h8"), Piece::King, Color::Black);
        pos.board.place(sq("f7"), Piece::Queen, Color::White);
        pos.board.place(sq("g6"), Piece::King, Color::White);
        pos.side_to_move = Color::Black;

        assert!(!in_check(&pos, Color::Black));
        assert_eq!(status(&pos), GameStatus::Stalemate);
    }

    #[test]
    fn startpos_is_ongoing() {
        assert_eq!(status(&Position::initial()), GameStatus::Ongoing);
    }
}
