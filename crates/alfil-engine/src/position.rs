//! Capability traits consumed by the search, and the apply/undo guard.

use std::ops::{Deref, DerefMut};

use alfil_core::{Board, Color, Move, MoveKind, MoveList, Piece, PieceKind};

/// What the search needs from a game position.
///
/// Transitions mutate in place; every `apply` must be matched by an `undo`
/// of the same move, in reverse order.
pub trait Position {
    fn legal_moves(&self) -> MoveList;

    /// Captures and promotions, used by quiescence search.
    fn legal_captures(&self) -> MoveList;

    fn apply(&mut self, mv: Move);
    fn undo(&mut self, mv: Move);

    /// Pass the turn.
    fn apply_null(&mut self);
    fn undo_null(&mut self);

    fn is_in_check(&self) -> bool;

    fn is_checkmate(&self) -> bool {
        self.is_in_check() && self.legal_moves().is_empty()
    }

    fn is_stalemate(&self) -> bool {
        !self.is_in_check() && self.legal_moves().is_empty()
    }

    /// Draw by rule (repetition, fifty moves, insufficient material).
    fn is_draw(&self) -> bool;

    /// Zobrist key of position and side to move.
    fn hash(&self) -> u64;

    fn side_to_move(&self) -> Color;

    /// The piece that `mv` moves, looked up before the move is applied.
    fn moving_piece(&self, mv: Move) -> Option<Piece>;

    /// The kind of piece `mv` removes; a pawn for en passant.
    fn captured_piece(&self, mv: Move) -> Option<PieceKind>;

    fn has_non_pawn_material(&self, color: Color) -> bool;
}

impl Position for Board {
    fn legal_moves(&self) -> MoveList {
        Board::legal_moves(self)
    }

    fn legal_captures(&self) -> MoveList {
        Board::legal_captures(self)
    }

    fn apply(&mut self, mv: Move) {
        Board::apply(self, mv)
    }

    fn undo(&mut self, mv: Move) {
        Board::undo(self, mv)
    }

    fn apply_null(&mut self) {
        Board::apply_null(self)
    }

    fn undo_null(&mut self) {
        Board::undo_null(self)
    }

    fn is_in_check(&self) -> bool {
        Board::is_in_check(self)
    }

    fn is_draw(&self) -> bool {
        Board::is_draw(self)
    }

    fn hash(&self) -> u64 {
        Board::hash(self)
    }

    fn side_to_move(&self) -> Color {
        Board::side_to_move(self)
    }

    fn moving_piece(&self, mv: Move) -> Option<Piece> {
        self.piece_at(mv.from())
    }

    fn captured_piece(&self, mv: Move) -> Option<PieceKind> {
        match mv.kind() {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            MoveKind::Capture | MoveKind::PromotionCapture(_) => {
                self.piece_at(mv.to()).map(Piece::kind)
            }
            _ => None,
        }
    }

    fn has_non_pawn_material(&self, color: Color) -> bool {
        Board::has_non_pawn_material(self, color)
    }
}

/// Static evaluation in centipawns from the side to move's point of view.
pub trait Evaluator<P: ?Sized> {
    fn evaluate(&self, pos: &P) -> i32;
}

impl<P: ?Sized, F: Fn(&P) -> i32> Evaluator<P> for F {
    fn evaluate(&self, pos: &P) -> i32 {
        self(pos)
    }
}

/// A move applied to a position for as long as the guard lives.
///
/// Dropping the guard undoes the move, so every exit path out of a search
/// frame (cutoff, cancellation, normal return) leaves the position restored.
pub(crate) struct Played<'a, P: Position + ?Sized> {
    pos: &'a mut P,
    mv: Option<Move>,
}

impl<'a, P: Position + ?Sized> Played<'a, P> {
    pub(crate) fn new(pos: &'a mut P, mv: Move) -> Self {
        pos.apply(mv);
        Self { pos, mv: Some(mv) }
    }

    pub(crate) fn null(pos: &'a mut P) -> Self {
        pos.apply_null();
        Self { pos, mv: None }
    }
}

impl<P: Position + ?Sized> Deref for Played<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.pos
    }
}

impl<P: Position + ?Sized> DerefMut for Played<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.pos
    }
}

impl<P: Position + ?Sized> Drop for Played<'_, P> {
    fn drop(&mut self) {
        match self.mv {
            Some(mv) => self.pos.undo(mv),
            None => self.pos.undo_null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_restores_on_drop() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let mv = board.parse_move("e2e4").unwrap();
        {
            let played = Played::new(&mut board, mv);
            assert_eq!(played.side_to_move(), Color::Black);
        }
        assert_eq!(board, before);
        {
            let passed = Played::null(&mut board);
            assert_eq!(Position::side_to_move(&*passed), Color::Black);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_victim_is_a_pawn() {
        let board: Board = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2".parse().unwrap();
        let mv = board.parse_move("e5d6").unwrap();
        assert_eq!(Position::captured_piece(&board, mv), Some(PieceKind::Pawn));
        assert_eq!(
            Position::moving_piece(&board, mv).map(Piece::kind),
            Some(PieceKind::Pawn)
        );
    }

    #[test]
    fn closures_are_evaluators() {
        let board = Board::starting_position();
        let material = |_: &Board| 42;
        assert_eq!(material.evaluate(&board), 42);
    }
}
