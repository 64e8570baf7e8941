//! Move ordering: TT move, MVV-LVA, killers, then history.
//!
//! Ordering only reads the heuristic tables; the search updates them on cutoffs.

use std::cmp::Reverse;

use alfil_core::{Move, MoveList, PieceKind};

use crate::eval::piece_value;
use crate::position::Position;
use crate::search::heuristics::{HistoryTable, KillerTable};

/// Score given to the transposition table's suggestion.
pub const TT_MOVE_SCORE: i32 = 1_000_000;

/// Base of the capture/promotion band.
pub const CAPTURE_BASE: i32 = 10_000;

/// Score of the most recent killer; the older one scores one less.
pub const KILLER_SCORE: i32 = 9_000;

/// Value of a piece as an attacker in MVV-LVA.
///
/// A capturing king risks nothing, since the move is already legal.
const fn attacker_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::King => 0,
        kind => piece_value(kind),
    }
}

/// MVV-LVA score for a capture or promotion; `None` for a quiet move.
///
/// `10000 + victim - attacker`, plus the promoted piece's value.
pub fn tactical_score<P: Position + ?Sized>(pos: &P, mv: Move) -> Option<i32> {
    if mv.is_quiet() {
        return None;
    }
    let victim = pos.captured_piece(mv).map_or(0, piece_value);
    let attacker = pos
        .moving_piece(mv)
        .map_or(0, |piece| attacker_value(piece.kind()));
    let promotion = mv.promotion().map_or(0, piece_value);
    Some(CAPTURE_BASE + victim - attacker + promotion)
}

/// Score a move for the main search.
pub fn score_move<P: Position + ?Sized>(
    pos: &P,
    mv: Move,
    ply: usize,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
) -> i32 {
    if tt_move == Some(mv) {
        return TT_MOVE_SCORE;
    }
    if let Some(score) = tactical_score(pos, mv) {
        return score;
    }
    if let Some(slot) = killers.slot_of(ply, mv) {
        return KILLER_SCORE - slot as i32;
    }
    pos.moving_piece(mv)
        .map_or(0, |piece| history.score(piece, mv.to().index()))
}

/// Sort `moves` into search order. Ties keep their generation order.
pub fn order_moves<P: Position + ?Sized>(
    pos: &P,
    moves: &mut MoveList,
    ply: usize,
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
) {
    moves.sort_by_cached_key(|&mv| Reverse(score_move(pos, mv, ply, tt_move, killers, history)));
}

/// Sort captures and promotions for quiescence search by MVV-LVA.
pub fn order_captures<P: Position + ?Sized>(pos: &P, moves: &mut MoveList) {
    moves.sort_by_cached_key(|&mv| Reverse(tactical_score(pos, mv).unwrap_or(0)));
}
