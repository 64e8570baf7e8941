//! Perft: leaf-node counting for move generator validation.

use crate::board::Board;

/// Count leaf nodes of the legal move tree to `depth` plies.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for &mv in moves.iter() {
        board.apply(mv);
        nodes += perft(board, depth - 1);
        board.undo(mv);
    }
    nodes
}
