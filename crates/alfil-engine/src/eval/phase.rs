//! Game phase for tapering between middlegame and endgame scores.

use alfil_core::{Board, PieceKind};

/// Phase of the opening position; the taper divisor.
pub const MAX_PHASE: i32 = 24;

/// Phase weight contributed by one piece of the given kind.
pub const fn phase_weight(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Knight | PieceKind::Bishop => 1,
        PieceKind::Rook => 2,
        PieceKind::Queen => 4,
        PieceKind::Pawn | PieceKind::King => 0,
    }
}

/// Remaining non-pawn material as a phase in `0..=MAX_PHASE` (24 = opening).
pub fn game_phase(board: &Board) -> i32 {
    board
        .pieces()
        .map(|(_, piece)| phase_weight(piece.kind()))
        .sum::<i32>()
        .min(MAX_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_is_full_phase() {
        assert_eq!(game_phase(&Board::starting_position()), MAX_PHASE);
    }

    #[test]
    fn pawn_ending_is_zero() {
        let board: Board = "8/5pk1/6p1/7p/7P/6P1/5PK1/8 w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&board), 0);
    }

    #[test]
    fn promoted_queens_are_capped() {
        let board: Board = "6qk/6pp/8/8/8/8/8/K1QQQQQQ w - - 0 1".parse().unwrap();
        assert_eq!(game_phase(&board), MAX_PHASE);
    }
}
