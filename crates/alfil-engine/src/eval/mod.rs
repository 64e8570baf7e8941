//! Static evaluation: material plus tapered PeSTO piece-square tables.

pub mod phase;
pub mod pst;

use alfil_core::{Board, Color, PieceKind};

use crate::eval::phase::{MAX_PHASE, game_phase};
use crate::position::Evaluator;

/// Centipawn value of a piece kind.
///
/// The king's value only matters for ordering; it is excluded from material.
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}

/// Evaluate `board` from the side to move's point of view.
pub fn evaluate(board: &Board) -> i32 {
    let mut mg = 0;
    let mut eg = 0;
    for (sq, piece) in board.pieces() {
        let kind = piece.kind();
        let material = if kind == PieceKind::King { 0 } else { piece_value(kind) };
        let (mg_table, eg_table) = pst::tables(kind);
        match piece.color() {
            Color::White => {
                let idx = sq.flip_rank().index();
                mg += material + mg_table[idx];
                eg += material + eg_table[idx];
            }
            Color::Black => {
                let idx = sq.index();
                mg -= material + mg_table[idx];
                eg -= material + eg_table[idx];
            }
        }
    }

    let phase = game_phase(board);
    let tapered = (mg * phase + eg * (MAX_PHASE - phase)).div_euclid(MAX_PHASE);
    match board.side_to_move() {
        Color::White => tapered,
        Color::Black => -tapered,
    }
}

/// The default evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PestoEvaluator;

impl Evaluator<Board> for PestoEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        evaluate(board)
    }
}
