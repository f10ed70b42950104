//! `do_move`/`undo_move`/`do_null_move`/`undo_null_move`: the only
//! way a `Position`'s board state changes after construction.
//!
//! Grounded on the teacher's `board/make_unmake.rs` decomposition
//! (`remove_captured_piece`, `execute_castling`,
//! `update_castling_rights`, `place_moving_piece`, ...): each concern
//! gets its own small private step, and every step folds its Zobrist
//! delta into the new `State::key` as it goes, rather than
//! recomputing the hash from scratch.

use super::state::RULE50_HIGH_THRESHOLD;
use super::{Position, State};
use crate::types::{CastlingRights, Color, File, Move, MoveKind, Piece, PieceType, Square, NO_PIECE, SQUARE_NONE};
use crate::zobrist::{non_pawn_bucket, ZOBRIST};

impl Position {
    /// Apply `m`, pushing a new [`State`] onto the history stack.
    /// `m` must be a legal move in the current position (debug-only
    /// precondition; see [`crate::error::LogicError::MalformedMove`]).
    pub fn do_move(&mut self, m: Move) {
        crate::error::debug_assert_logic!(m.is_well_formed(), crate::error::LogicError::MalformedMove);

        let us = self.side_to_move;
        let them = !us;
        let prev = self.state().clone();
        let mut next = prev.clone();
        next.en_passant = SQUARE_NONE;
        next.rule50 = prev.rule50 + 1;
        next.null_ply = 0;

        let from = m.from();
        let to = m.to();
        let moving_piece = self.piece_on(from);

        let mut key = prev.key;
        let mut pawn_key = prev.pawn_key;
        let mut non_pawn_key = prev.non_pawn_key;

        if moving_piece.piece_type == PieceType::Pawn {
            next.rule50 = 0;
        }

        next.captured = NO_PIECE;

        match m.kind() {
            MoveKind::Castling => {
                let rook_from = to;
                let kingside = rook_from.file().0 > from.file().0;
                let rank = from.rank();
                let king_to = Square::new(if kingside { File::G } else { File::C }, rank);
                let rook_to = Square::new(if kingside { File::F } else { File::D }, rank);

                key ^= ZOBRIST.piece_key(moving_piece, from);
                self.remove_piece(from);
                let rook = self.remove_piece(rook_from);
                key ^= ZOBRIST.piece_key(rook, rook_from);

                self.put_piece(moving_piece, king_to);
                key ^= ZOBRIST.piece_key(moving_piece, king_to);
                self.put_piece(rook, rook_to);
                key ^= ZOBRIST.piece_key(rook, rook_to);

                next.has_castled_hint(us);
            }
            MoveKind::EnPassant => {
                let captured_sq = Square::new(to.file(), from.rank());
                let captured = self.remove_piece(captured_sq);
                key ^= ZOBRIST.piece_key(captured, captured_sq);
                pawn_key ^= ZOBRIST.piece_key(captured, captured_sq);
                next.captured = captured;
                next.rule50 = 0;

                key ^= ZOBRIST.piece_key(moving_piece, from);
                self.remove_piece(from);
                pawn_key ^= ZOBRIST.piece_key(moving_piece, from);

                self.put_piece(moving_piece, to);
                key ^= ZOBRIST.piece_key(moving_piece, to);
                pawn_key ^= ZOBRIST.piece_key(moving_piece, to);
            }
            MoveKind::Promotion => {
                if !self.is_empty(to) {
                    let captured = self.remove_piece(to);
                    key ^= ZOBRIST.piece_key(captured, to);
                    if captured.piece_type == PieceType::Pawn {
                        pawn_key ^= ZOBRIST.piece_key(captured, to);
                    } else {
                        non_pawn_key[captured.color.index()][non_pawn_bucket(captured.piece_type)] ^=
                            ZOBRIST.piece_key(captured, to);
                    }
                    next.captured = captured;
                }
                key ^= ZOBRIST.piece_key(moving_piece, from);
                pawn_key ^= ZOBRIST.piece_key(moving_piece, from);
                self.remove_piece(from);

                let promoted = Piece::new(us, m.promotion_piece().expect("promotion move carries a piece"));
                self.put_piece(promoted, to);
                key ^= ZOBRIST.piece_key(promoted, to);
                non_pawn_key[us.index()][non_pawn_bucket(promoted.piece_type)] ^= ZOBRIST.piece_key(promoted, to);
            }
            MoveKind::Normal => {
                if !self.is_empty(to) {
                    let captured = self.remove_piece(to);
                    key ^= ZOBRIST.piece_key(captured, to);
                    if captured.piece_type == PieceType::Pawn {
                        pawn_key ^= ZOBRIST.piece_key(captured, to);
                    } else {
                        non_pawn_key[captured.color.index()][non_pawn_bucket(captured.piece_type)] ^=
                            ZOBRIST.piece_key(captured, to);
                    }
                    next.captured = captured;
                    next.rule50 = 0;
                }
                key ^= ZOBRIST.piece_key(moving_piece, from);
                self.remove_piece(from);
                self.put_piece(moving_piece, to);
                key ^= ZOBRIST.piece_key(moving_piece, to);

                if moving_piece.piece_type == PieceType::Pawn {
                    pawn_key ^= ZOBRIST.piece_key(moving_piece, from) ^ ZOBRIST.piece_key(moving_piece, to);
                    if to.0.abs_diff(from.0) == 16 {
                        next.en_passant = Square::new(from.file(), rank_between(from, to));
                    }
                } else if moving_piece.piece_type != PieceType::King {
                    non_pawn_key[us.index()][non_pawn_bucket(moving_piece.piece_type)] ^=
                        ZOBRIST.piece_key(moving_piece, from) ^ ZOBRIST.piece_key(moving_piece, to);
                }
            }
        }

        next.has_rule50_high = prev.has_rule50_high || next.rule50 >= RULE50_HIGH_THRESHOLD;

        key ^= ZOBRIST.castling_key(prev.castling_rights);
        let mut rights = prev.castling_rights;
        rights = rights.remove(rights_lost_by_move(from, to));
        next.castling_rights = rights;
        key ^= ZOBRIST.castling_key(next.castling_rights);

        if prev.en_passant != SQUARE_NONE {
            key ^= ZOBRIST.en_passant_key(prev.en_passant.file());
        }
        if next.en_passant != SQUARE_NONE {
            key ^= ZOBRIST.en_passant_key(next.en_passant.file());
        }

        key ^= ZOBRIST.turn_key();

        next.key = key;
        next.pawn_key = pawn_key;
        next.non_pawn_key = non_pawn_key;

        self.history.push(next);
        self.side_to_move = them;
        self.game_ply += 1;
        self.refresh_check_info();
        self.record_repetition();
    }

    /// Undo the most recently applied move, popping its [`State`].
    /// `m` must be the same move passed to the matching `do_move`
    /// (debug-only precondition).
    pub fn undo_move(&mut self, m: Move) {
        crate::error::debug_assert_logic!(self.history.len() > 1, crate::error::LogicError::EmptyStateStack);

        self.side_to_move = !self.side_to_move;
        self.game_ply -= 1;
        let us = self.side_to_move;

        let from = m.from();
        let to = m.to();

        match m.kind() {
            MoveKind::Castling => {
                let rook_from = to;
                let kingside = rook_from.file().0 > from.file().0;
                let rank = from.rank();
                let king_to = Square::new(if kingside { File::G } else { File::C }, rank);
                let rook_to = Square::new(if kingside { File::F } else { File::D }, rank);

                let king = self.remove_piece(king_to);
                let rook = self.remove_piece(rook_to);
                self.put_piece(king, from);
                self.put_piece(rook, rook_from);
            }
            MoveKind::EnPassant => {
                let pawn = self.remove_piece(to);
                self.put_piece(pawn, from);
                let captured_sq = Square::new(to.file(), from.rank());
                let captured = self.state().captured;
                self.put_piece(captured, captured_sq);
            }
            MoveKind::Promotion => {
                self.remove_piece(to);
                self.put_piece(Piece::new(us, PieceType::Pawn), from);
                let captured = self.state().captured;
                if captured != NO_PIECE {
                    self.put_piece(captured, to);
                }
            }
            MoveKind::Normal => {
                let piece = self.remove_piece(to);
                self.put_piece(piece, from);
                let captured = self.state().captured;
                if captured != NO_PIECE {
                    self.put_piece(captured, to);
                }
            }
        }

        self.history.pop();
    }

    /// Apply a null move: flip the side to move, clear the en passant
    /// square, leave the board untouched. Illegal while in check
    /// (debug-only precondition; a null move while in check cannot be
    /// undone into a consistent position by search pruning heuristics).
    pub fn do_null_move(&mut self) {
        crate::error::debug_assert_logic!(!self.in_check(), crate::error::LogicError::NullMoveInCheck);

        let prev = self.state().clone();
        let mut next = prev.clone();
        next.captured = NO_PIECE;
        next.en_passant = SQUARE_NONE;
        next.rule50 = prev.rule50 + 1;
        next.null_ply = prev.null_ply + 1;
        next.has_rule50_high = prev.has_rule50_high || next.rule50 >= RULE50_HIGH_THRESHOLD;

        let mut key = prev.key;
        if prev.en_passant != SQUARE_NONE {
            key ^= ZOBRIST.en_passant_key(prev.en_passant.file());
        }
        key ^= ZOBRIST.turn_key();
        next.key = key;

        self.history.push(next);
        self.side_to_move = !self.side_to_move;
        self.game_ply += 1;
        self.refresh_check_info();
    }

    pub fn undo_null_move(&mut self) {
        crate::error::debug_assert_logic!(self.history.len() > 1, crate::error::LogicError::EmptyStateStack);
        self.history.pop();
        self.side_to_move = !self.side_to_move;
        self.game_ply -= 1;
    }

    fn record_repetition(&mut self) {
        let key = self.key();
        let limit = self.state().rule50 as usize;
        let len = self.history.len();
        let mut repetition = 0i32;
        if limit >= 4 {
            let mut i = 4;
            while i <= limit && i < len {
                if self.history[len - 1 - i].key == key {
                    repetition = i as i32;
                    break;
                }
                i += 2;
            }
        }
        self.state_mut().repetition = repetition;
    }
}

fn rank_between(from: Square, to: Square) -> crate::types::Rank {
    crate::types::Rank((from.rank().0 + to.rank().0) / 2)
}

fn rights_lost_by_move(from: Square, to: Square) -> CastlingRights {
    let mut lost = CastlingRights::NONE;
    for sq in [from, to] {
        lost = lost.union(rights_touching_square(sq));
    }
    lost
}

fn rights_touching_square(sq: Square) -> CastlingRights {
    match sq.0 {
        0 => CastlingRights::WHITE_OOO,
        7 => CastlingRights::WHITE_OO,
        4 => CastlingRights::WHITE_OO.union(CastlingRights::WHITE_OOO),
        56 => CastlingRights::BLACK_OOO,
        63 => CastlingRights::BLACK_OO,
        60 => CastlingRights::BLACK_OO.union(CastlingRights::BLACK_OOO),
        _ => CastlingRights::NONE,
    }
}

impl State {
    /// No-op hook kept for symmetry with the teacher's explicit
    /// "has this side castled" bookkeeping; this crate tracks it via
    /// `castling_rights` losing both rights on the castling move
    /// itself; a dedicated bit isn't needed by anything in this
    /// crate's scope, so the hook only exists to document the
    /// omission.
    fn has_castled_hint(&mut self, _color: Color) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn make_then_unmake_restores_fen() {
        let mut pos = Position::startpos();
        let fen_before = pos.fen();
        let m = crate::types::Move::new(
            Square::from_coord("e2").unwrap(),
            Square::from_coord("e4").unwrap(),
            MoveKind::Normal,
            None,
        );
        pos.do_move(m);
        assert_ne!(pos.fen(), fen_before);
        pos.undo_move(m);
        assert_eq!(pos.fen(), fen_before);
    }

    #[test]
    fn e4_e5_nf3_leaves_no_checkers_and_no_ep_square() {
        let mut pos = Position::startpos();
        let e2e4 = Move::new(Square::from_coord("e2").unwrap(), Square::from_coord("e4").unwrap(), MoveKind::Normal, None);
        let e7e5 = Move::new(Square::from_coord("e7").unwrap(), Square::from_coord("e5").unwrap(), MoveKind::Normal, None);
        let g1f3 = Move::new(Square::from_coord("g1").unwrap(), Square::from_coord("f3").unwrap(), MoveKind::Normal, None);
        pos.do_move(e2e4);
        pos.do_move(e7e5);
        pos.do_move(g1f3);
        assert_eq!(pos.checkers(), 0);
        assert_eq!(pos.en_passant_square(), SQUARE_NONE);
    }

    #[test]
    fn double_push_sets_en_passant_square() {
        let mut pos = Position::startpos();
        let e2e4 = Move::new(Square::from_coord("e2").unwrap(), Square::from_coord("e4").unwrap(), MoveKind::Normal, None);
        pos.do_move(e2e4);
        assert_eq!(pos.en_passant_square(), Square::from_coord("e3").unwrap());
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = Move::new(Square::from_coord("e1").unwrap(), Square::from_coord("h1").unwrap(), MoveKind::Castling, None);
        pos.do_move(castle);
        assert_eq!(pos.piece_on(Square::from_coord("g1").unwrap()).piece_type, PieceType::King);
        assert_eq!(pos.piece_on(Square::from_coord("f1").unwrap()).piece_type, PieceType::Rook);
        pos.undo_move(castle);
        assert_eq!(pos.piece_on(Square::from_coord("e1").unwrap()).piece_type, PieceType::King);
        assert_eq!(pos.piece_on(Square::from_coord("h1").unwrap()).piece_type, PieceType::Rook);
    }
}
