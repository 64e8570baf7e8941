//! In-place move application with exact undo.

use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::chess_move::{Move, MoveKind};
use crate::color::Color;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// State needed to revert one applied move (or null move).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Undo {
    /// `None` for a null move.
    pub(crate) mv: Option<Move>,
    pub(crate) moved: Option<Piece>,
    pub(crate) captured: Option<Piece>,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
}

/// Square of the pawn removed by an en passant capture.
#[inline]
fn en_passant_victim(mv: Move) -> Square {
    Square::new(mv.to().file(), mv.from().rank())
}

/// Rook source and destination for a castling king move.
#[inline]
fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to {
        Square::G1 => (Square::H1, Square::F1),
        Square::C1 => (Square::A1, Square::D1),
        Square::G8 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

impl Board {
    fn snapshot(&self, mv: Option<Move>, moved: Option<Piece>, captured: Option<Piece>) -> Undo {
        Undo {
            mv,
            moved,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        }
    }

    #[inline]
    fn lift(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.squares[sq.index()].take();
        if let Some(p) = piece {
            self.hash ^= zobrist::piece_square(p, sq);
        }
        piece
    }

    #[inline]
    fn drop_piece(&mut self, piece: Piece, sq: Square) {
        self.squares[sq.index()] = Some(piece);
        self.hash ^= zobrist::piece_square(piece, sq);
    }

    /// Play `mv`, which must be legal in the current position.
    ///
    /// The hash is updated by XOR-ing only the keys that change.
    pub fn apply(&mut self, mv: Move) {
        let us = self.side_to_move;
        let Some(piece) = self.squares[mv.from().index()] else {
            debug_assert!(false, "no piece on {} for {mv}", mv.from());
            self.history.push(self.snapshot(Some(mv), None, None));
            self.pass_turn();
            return;
        };

        let capture_square = match mv.kind() {
            MoveKind::EnPassant => Some(en_passant_victim(mv)),
            MoveKind::Capture | MoveKind::PromotionCapture(_) => Some(mv.to()),
            _ => None,
        };
        let captured = capture_square.and_then(|sq| self.squares[sq.index()]);
        self.history.push(self.snapshot(Some(mv), Some(piece), captured));
        if let Some(sq) = capture_square {
            self.lift(sq);
        }

        self.lift(mv.from());
        let placed = match mv.promotion() {
            Some(kind) => Piece::new(kind, us),
            None => piece,
        };
        self.drop_piece(placed, mv.to());

        if mv.kind() == MoveKind::Castle {
            let (rook_from, rook_to) = castle_rook_squares(mv.to());
            if let Some(rook) = self.lift(rook_from) {
                self.drop_piece(rook, rook_to);
            }
        }
        if piece.kind() == PieceKind::King {
            self.kings[us.index()] = mv.to();
        }

        let rights = self
            .castling
            .remove(CastleRights::revoked_by(mv.from()))
            .remove(CastleRights::revoked_by(mv.to()));
        self.hash ^= zobrist::castling(self.castling) ^ zobrist::castling(rights);
        self.castling = rights;

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::en_passant(ep);
        }
        if mv.kind() == MoveKind::DoublePush {
            let ep = Square::new(mv.from().file(), (mv.from().rank() + mv.to().rank()) / 2);
            self.en_passant = Some(ep);
            self.hash ^= zobrist::en_passant(ep);
        }

        if piece.kind() == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = !us;
        self.hash ^= zobrist::side_to_move();
    }

    /// Revert `mv`, which must be the most recently applied move.
    pub fn undo(&mut self, mv: Move) {
        let Some(record) = self.history.pop() else {
            debug_assert!(false, "undo of {mv} with empty history");
            return;
        };
        debug_assert_eq!(record.mv, Some(mv), "undo out of order");

        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;

        if let (Some(mv), Some(piece)) = (record.mv, record.moved) {
            self.squares[mv.to().index()] = None;
            self.squares[mv.from().index()] = Some(piece);

            match mv.kind() {
                MoveKind::Castle => {
                    let (rook_from, rook_to) = castle_rook_squares(mv.to());
                    self.squares[rook_from.index()] = self.squares[rook_to.index()].take();
                }
                MoveKind::EnPassant => {
                    self.squares[en_passant_victim(mv).index()] = record.captured;
                }
                _ => {
                    if record.captured.is_some() {
                        self.squares[mv.to().index()] = record.captured;
                    }
                }
            }
            if piece.kind() == PieceKind::King {
                self.kings[us.index()] = mv.from();
            }
        }

        self.restore(&record);
    }

    /// Pass the turn without moving. Clears the en passant square.
    pub fn apply_null(&mut self) {
        self.history.push(self.snapshot(None, None, None));
        self.pass_turn();
    }

    /// Revert the most recent [`Board::apply_null`].
    pub fn undo_null(&mut self) {
        let Some(record) = self.history.pop() else {
            debug_assert!(false, "undo_null with empty history");
            return;
        };
        debug_assert!(record.mv.is_none(), "undo_null out of order");
        self.side_to_move = !self.side_to_move;
        self.restore(&record);
    }

    fn pass_turn(&mut self) {
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::en_passant(ep);
        }
        self.halfmove_clock += 1;
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = !self.side_to_move;
        self.hash ^= zobrist::side_to_move();
    }

    fn restore(&mut self, record: &Undo) {
        self.castling = record.castling;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.fullmove_number = record.fullmove_number;
        self.hash = record.hash;
    }
}
