//! Iterative deepening and the root move loop.

use std::time::Duration;

use alfil_core::{Move, MoveList};
use tracing::{debug, info};

use crate::position::{Evaluator, Played, Position};
use crate::search::negamax::negamax;
use crate::search::ordering::order_moves;
use crate::search::session::SearchSession;
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::{INF, MATE_SCORE, MATE_THRESHOLD};

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move found at the highest completed depth; `None` only when
    /// the position has no legal moves.
    pub best_move: Option<Move>,
    /// Evaluation score in centipawns from the side to move's perspective.
    pub score: i32,
    /// Depth reached; 0 when no iteration completed.
    pub depth: i32,
    /// Total nodes visited during the search.
    pub nodes: u64,
    /// Full principal variation line.
    pub pv: Vec<Move>,
}

/// Progress report after each completed iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationInfo<'a> {
    pub depth: i32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Transposition table occupancy in permille.
    pub hashfull: u32,
    pub pv: &'a [Move],
}

enum RootOutcome {
    Completed { best: Move, score: i32 },
    Aborted { partial: Option<Move> },
}

/// Search `pos` by iterative deepening within `time_budget`.
///
/// Each depth is started only if the clock allows; a depth interrupted by
/// the clock or by cancellation is thrown away, except that a partial
/// first depth still supplies its best move. With no completed depth the
/// first move in ordering is returned, so a legal move comes back whenever
/// one exists. Calls `on_iter` after every completed depth.
pub fn find_best_move<P, E, F>(
    pos: &mut P,
    eval: &E,
    time_budget: Duration,
    session: &mut SearchSession<'_>,
    mut on_iter: F,
) -> SearchResult
where
    P: Position + ?Sized,
    E: Evaluator<P> + ?Sized,
    F: FnMut(&IterationInfo<'_>),
{
    session.begin(time_budget);

    let mut root_moves = pos.legal_moves();
    if root_moves.is_empty() {
        let score = if pos.is_in_check() { -MATE_SCORE } else { 0 };
        info!(score, "no legal moves at the root");
        return SearchResult {
            best_move: None,
            score,
            depth: 0,
            nodes: 0,
            pv: Vec::new(),
        };
    }

    let tt_move = session.tt.lookup(pos.hash(), 0).and_then(|e| e.best_move);
    order_moves(pos, &mut root_moves, 0, tt_move, &*session.killers, &*session.history);

    let fallback = root_moves[0];
    let mut result = SearchResult {
        best_move: Some(fallback),
        score: eval.evaluate(pos),
        depth: 0,
        nodes: 0,
        pv: vec![fallback],
    };
    let mut last_iteration = None;

    for depth in 1..=session.max_depth() {
        if session.control().should_stop_iterating(last_iteration) {
            debug!(depth, elapsed = ?session.elapsed(), "not starting next depth");
            break;
        }

        let started = session.elapsed();
        match search_root(pos, eval, &mut root_moves, depth, session) {
            RootOutcome::Completed { best, score } => {
                session.record_completed(best);
                let pv = principal_variation(pos, best, &*session.tt, depth as usize);
                let elapsed = session.elapsed();
                last_iteration = Some(elapsed.saturating_sub(started));

                result = SearchResult {
                    best_move: Some(best),
                    score,
                    depth,
                    nodes: session.nodes(),
                    pv,
                };
                debug!(depth, score, nodes = result.nodes, best = %best, "depth completed");
                on_iter(&IterationInfo {
                    depth,
                    score,
                    nodes: result.nodes,
                    elapsed,
                    hashfull: session.tt.hashfull(),
                    pv: &result.pv,
                });

                if mate_proven(score, depth) {
                    break;
                }
            }
            RootOutcome::Aborted { partial } => {
                if depth == 1
                    && let Some(mv) = partial
                {
                    result.best_move = Some(mv);
                    result.pv = vec![mv];
                }
                debug!(depth, "depth aborted");
                break;
            }
        }
    }

    result.nodes = session.nodes();
    info!(
        depth = result.depth,
        score = result.score,
        nodes = result.nodes,
        elapsed = ?session.elapsed(),
        "search finished"
    );
    result
}

/// Search every root move at `depth` with a full window.
///
/// On completion the best move is moved to the front of `root_moves` so the
/// next iteration tries it first.
fn search_root<P, E>(
    pos: &mut P,
    eval: &E,
    root_moves: &mut MoveList,
    depth: i32,
    session: &mut SearchSession<'_>,
) -> RootOutcome
where
    P: Position + ?Sized,
    E: Evaluator<P> + ?Sized,
{
    if session.checkpoint() {
        return RootOutcome::Aborted { partial: None };
    }

    let child_depth = if pos.is_in_check() { depth } else { depth - 1 };
    let mut alpha = -INF;
    let mut best: Option<(usize, Move)> = None;

    for (index, &mv) in root_moves.iter().enumerate() {
        let score = {
            let mut child = Played::new(&mut *pos, mv);
            -negamax(&mut *child, eval, child_depth, 1, -INF, -alpha, true, session)
        };
        if session.is_stopped() {
            return RootOutcome::Aborted {
                partial: best.map(|(_, mv)| mv),
            };
        }
        if score > alpha || best.is_none() {
            alpha = alpha.max(score);
            best = Some((index, mv));
        }
    }

    let Some((index, best)) = best else {
        return RootOutcome::Aborted { partial: None };
    };
    root_moves[..=index].rotate_right(1);
    session
        .tt
        .store(pos.hash(), depth, alpha, Bound::Exact, Some(best), 0);

    RootOutcome::Completed { best, score: alpha }
}

fn mate_proven(score: i32, depth: i32) -> bool {
    score.abs() >= MATE_THRESHOLD && MATE_SCORE - score.abs() <= depth
}

/// Follow best moves through the transposition table, starting with `first`.
fn principal_variation<P: Position + ?Sized>(
    pos: &mut P,
    first: Move,
    tt: &TranspositionTable,
    max_len: usize,
) -> Vec<Move> {
    let mut pv = vec![first];
    let mut child = Played::new(pos, first);
    extend_pv(&mut *child, tt, &mut pv, max_len.max(1));
    pv
}

fn extend_pv<P: Position + ?Sized>(
    pos: &mut P,
    tt: &TranspositionTable,
    pv: &mut Vec<Move>,
    max_len: usize,
) {
    if pv.len() >= max_len {
        return;
    }
    let Some(mv) = tt.lookup(pos.hash(), 0).and_then(|e| e.best_move) else {
        return;
    };
    if !pos.legal_moves().contains(&mv) {
        return;
    }
    pv.push(mv);
    let mut child = Played::new(pos, mv);
    extend_pv(&mut *child, tt, pv, max_len);
}
