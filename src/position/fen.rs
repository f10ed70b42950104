//! FEN / X-FEN / Shredder-FEN parsing and serialization.
//!
//! Grounded on the teacher's `board/fen.rs`, generalized to also
//! accept Shredder-FEN castling letters (a rook's file instead of
//! `KQkq`), which the teacher's parser doesn't support but
//! Chess960-aware X-FEN positions require.

use super::{Position, State, BLACK_OO, BLACK_OOO, WHITE_OO, WHITE_OOO};
use crate::error::ParseError;
use crate::types::{CastlingRights, Color, File, Piece, Rank, Square, SQUARE_NONE};

pub fn parse(fen: &str) -> Result<Position, ParseError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(ParseError::TooFewParts { found: parts.len() });
    }

    let ranks: Vec<&str> = parts[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(ParseError::WrongRankCount { found: ranks.len() });
    }

    let chess960 = parts[2].chars().any(|c| "ABCDEFGHabcdefgh".contains(c) && !"Kk".contains(c))
        && parts[2] != "-";

    let mut pos = Position::empty_board(chess960);

    for (display_rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = Rank(7 - display_rank_idx as u8);
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as u8;
            } else {
                let piece = Piece::from_char(ch).ok_or(ParseError::InvalidPiece { ch })?;
                if file >= 8 {
                    return Err(ParseError::WrongFileCount {
                        rank: display_rank_idx,
                        found: file as usize + 1,
                    });
                }
                pos.put_piece(piece, Square::new(File(file), rank));
                file += 1;
            }
        }
        if file != 8 {
            return Err(ParseError::WrongFileCount { rank: display_rank_idx, found: file as usize });
        }
    }

    pos.side_to_move = match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(ParseError::InvalidSideToMove { found: other.to_string() }),
    };

    if pos.count(Color::White, crate::types::PieceType::King) != 1 {
        return Err(ParseError::WrongKingCount {
            color_with_wrong_count: "white",
            found: pos.count(Color::White, crate::types::PieceType::King) as usize,
        });
    }
    if pos.count(Color::Black, crate::types::PieceType::King) != 1 {
        return Err(ParseError::WrongKingCount {
            color_with_wrong_count: "black",
            found: pos.count(Color::Black, crate::types::PieceType::King) as usize,
        });
    }

    let mut rights = CastlingRights::NONE;
    if parts[2] != "-" {
        for ch in parts[2].chars() {
            let (color, right, file_hint) = match ch {
                'K' => (Color::White, CastlingRights::WHITE_OO, None),
                'Q' => (Color::White, CastlingRights::WHITE_OOO, None),
                'k' => (Color::Black, CastlingRights::BLACK_OO, None),
                'q' => (Color::Black, CastlingRights::BLACK_OOO, None),
                c if c.is_ascii_uppercase() && c.is_ascii_alphabetic() => {
                    let file = File(c as u8 - b'A');
                    let ksq = pos.king_square(Color::White);
                    let right = if file.0 > ksq.file().0 {
                        CastlingRights::WHITE_OO
                    } else {
                        CastlingRights::WHITE_OOO
                    };
                    (Color::White, right, Some(Square::new(file, Rank::R1)))
                }
                c if c.is_ascii_lowercase() && c.is_ascii_alphabetic() => {
                    let file = File(c as u8 - b'a');
                    let ksq = pos.king_square(Color::Black);
                    let right = if file.0 > ksq.file().0 {
                        CastlingRights::BLACK_OO
                    } else {
                        CastlingRights::BLACK_OOO
                    };
                    (Color::Black, right, Some(Square::new(file, Rank::R8)))
                }
                other => return Err(ParseError::InvalidCastling { ch: other }),
            };
            if pos.count(color, crate::types::PieceType::Rook) == 0 {
                return Err(ParseError::CastlingRookMissing { ch });
            }
            rights = rights.union(right);
            let idx = match right {
                r if r.0 == CastlingRights::WHITE_OO.0 => WHITE_OO,
                r if r.0 == CastlingRights::WHITE_OOO.0 => WHITE_OOO,
                r if r.0 == CastlingRights::BLACK_OO.0 => BLACK_OO,
                _ => BLACK_OOO,
            };
            pos.setup_castling(idx, color, file_hint);
        }
    }

    let en_passant = if parts[3] == "-" {
        SQUARE_NONE
    } else {
        Square::from_coord(parts[3]).ok_or(ParseError::InvalidEnPassant { found: parts[3].to_string() })?
    };

    let rule50: u16 = if parts.len() > 4 {
        parts[4].parse().map_err(|_| ParseError::InvalidCounter { found: parts[4].to_string() })?
    } else {
        0
    };
    let fullmove: u32 = if parts.len() > 5 {
        parts[5].parse().map_err(|_| ParseError::InvalidCounter { found: parts[5].to_string() })?
    } else {
        1
    };

    pos.game_ply = fullmove.saturating_sub(1) * 2 + if pos.side_to_move == Color::Black { 1 } else { 0 };

    {
        let state = pos.history.last_mut().expect("history always has one entry");
        state.castling_rights = rights;
        state.en_passant = en_passant;
        state.rule50 = rule50;
    }

    let (key, pawn_key, non_pawn_key) = pos.compute_initial_key();
    {
        let state = pos.history.last_mut().expect("history always has one entry");
        state.key = key;
        state.pawn_key = pawn_key;
        state.non_pawn_key = non_pawn_key;
    }

    pos.refresh_check_info();

    let opponent = !pos.side_to_move;
    if pos.is_attacked_by(pos.king_square(opponent), pos.side_to_move) {
        return Err(ParseError::OpponentInCheck);
    }

    Ok(pos)
}

pub fn to_fen(pos: &Position) -> String {
    let mut board = String::new();
    for display_rank_idx in 0..8u8 {
        let rank = Rank(7 - display_rank_idx);
        let mut empties = 0u8;
        for file in 0..8u8 {
            let sq = Square::new(File(file), rank);
            let piece = pos.piece_on(sq);
            if piece.is_none() {
                empties += 1;
            } else {
                if empties > 0 {
                    board.push((b'0' + empties) as char);
                    empties = 0;
                }
                board.push(piece.to_char());
            }
        }
        if empties > 0 {
            board.push((b'0' + empties) as char);
        }
        if display_rank_idx != 7 {
            board.push('/');
        }
    }

    let stm = if pos.side_to_move == Color::White { "w" } else { "b" };

    let rights = pos.castling_rights();
    let mut castling = String::new();
    if !pos.chess960 {
        if rights.contains(CastlingRights::WHITE_OO) {
            castling.push('K');
        }
        if rights.contains(CastlingRights::WHITE_OOO) {
            castling.push('Q');
        }
        if rights.contains(CastlingRights::BLACK_OO) {
            castling.push('k');
        }
        if rights.contains(CastlingRights::BLACK_OOO) {
            castling.push('q');
        }
    } else {
        for (idx, ch_upper, ch_lower) in [
            (WHITE_OO, 'A'..='H', 'a'..='h'),
            (WHITE_OOO, 'A'..='H', 'a'..='h'),
            (BLACK_OO, 'A'..='H', 'a'..='h'),
            (BLACK_OOO, 'A'..='H', 'a'..='h'),
        ] {
            let _ = (&ch_upper, &ch_lower);
            let right = match idx {
                WHITE_OO => CastlingRights::WHITE_OO,
                WHITE_OOO => CastlingRights::WHITE_OOO,
                BLACK_OO => CastlingRights::BLACK_OO,
                _ => CastlingRights::BLACK_OOO,
            };
            if rights.contains(right) {
                let rook_sq = pos.castling_rook_square[idx];
                let base = if idx == WHITE_OO || idx == WHITE_OOO { b'A' } else { b'a' };
                castling.push((base + rook_sq.file().0) as char);
            }
        }
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = if pos.en_passant_square() == SQUARE_NONE {
        "-".to_string()
    } else {
        pos.en_passant_square().to_string()
    };

    let fullmove = pos.game_ply / 2 + 1;

    format!("{board} {stm} {castling} {ep} {} {fullmove}", pos.rule50_count())
}
