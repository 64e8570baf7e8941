//! Negamax alpha-beta search below the root.

use crate::position::{Evaluator, Played, Position};
use crate::search::ordering::order_moves;
use crate::search::quiescence::quiescence;
use crate::search::session::SearchSession;
use crate::search::tt::Bound;
use crate::search::{MATE_SCORE, MATE_THRESHOLD, MAX_PLY};

/// Negamax alpha-beta search, failing hard.
///
/// Returns a score for the side to move clamped to `[alpha, beta]`, except
/// for terminal nodes and transposition hits, which report their own value.
/// Returns 0 once the session is stopped; callers must check
/// [`SearchSession::is_stopped`] before trusting the result.
#[allow(clippy::too_many_arguments)]
pub(crate) fn negamax<P, E>(
    pos: &mut P,
    eval: &E,
    depth: i32,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    null_allowed: bool,
    session: &mut SearchSession<'_>,
) -> i32
where
    P: Position + ?Sized,
    E: Evaluator<P> + ?Sized,
{
    if session.checkpoint() {
        return 0;
    }

    if ply >= MAX_PLY {
        return eval.evaluate(pos);
    }

    // No legal moves: checkmate or stalemate
    let mut moves = pos.legal_moves();
    let in_check = pos.is_in_check();
    if moves.is_empty() {
        return if in_check {
            -(MATE_SCORE - ply as i32)
        } else {
            0
        };
    }

    if pos.is_draw() {
        return 0;
    }

    // Probe transposition table
    let hash = pos.hash();
    let entry = session.tt.lookup(hash, ply);
    let tt_move = entry.and_then(|e| e.best_move);
    if let Some(score) = entry.and_then(|e| e.cutoff(depth, alpha, beta)) {
        return score;
    }

    // Leaf node: drop into quiescence search
    if depth <= 0 {
        return quiescence(pos, eval, ply, alpha, beta, session);
    }

    let depth = if in_check { depth + 1 } else { depth };

    // Null move: if passing still fails high, a real move would too
    let config = session.config;
    if config.null_move
        && null_allowed
        && !in_check
        && depth >= config.null_move_min_depth
        && beta.abs() < MATE_THRESHOLD
        && pos.has_non_pawn_material(pos.side_to_move())
    {
        let score = {
            let mut passed = Played::null(&mut *pos);
            -negamax(
                &mut *passed,
                eval,
                depth - 1 - config.null_move_reduction,
                ply + 1,
                -beta,
                -beta + 1,
                false,
                session,
            )
        };
        if session.is_stopped() {
            return 0;
        }
        if score >= beta {
            return beta;
        }
    }

    order_moves(pos, &mut moves, ply, tt_move, &*session.killers, &*session.history);

    let original_alpha = alpha;
    let mut best_move = None;

    for &mv in moves.iter() {
        let quiet_piece = if mv.is_quiet() {
            pos.moving_piece(mv)
        } else {
            None
        };

        let score = {
            let mut child = Played::new(&mut *pos, mv);
            -negamax(&mut *child, eval, depth - 1, ply + 1, -beta, -alpha, true, session)
        };
        if session.is_stopped() {
            return 0;
        }

        if score >= beta {
            if let Some(piece) = quiet_piece {
                session.killers.store(ply, mv);
                session.history.reward(piece, mv.to().index(), depth);
            }
            session.tt.store(hash, depth, beta, Bound::LowerBound, Some(mv), ply);
            return beta;
        }
        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }
    }

    let bound = if alpha > original_alpha {
        Bound::Exact
    } else {
        Bound::UpperBound
    };
    // An all-node keeps the previous hint for ordering
    session
        .tt
        .store(hash, depth, alpha, bound, best_move.or(tt_move), ply);

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alfil_core::Board;

    use crate::config::SearchConfig;
    use crate::eval::PestoEvaluator;
    use crate::search::control::CancelToken;
    use crate::search::{INF, Searcher};

    fn search(board: &mut Board, depth: i32, config: SearchConfig) -> i32 {
        let mut searcher = Searcher::new(SearchConfig {
            tt_entries: 1 << 14,
            ..config
        });
        let mut session = searcher.session(CancelToken::new());
        session.begin(Duration::from_secs(60));
        negamax(board, &PestoEvaluator, depth, 1, -INF, INF, true, &mut session)
    }

    #[test]
    fn checkmated_node_scores_mate_at_ply() {
        let mut board: Board = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(search(&mut board, 3, SearchConfig::default()), -(MATE_SCORE - 1));
    }

    #[test]
    fn stalemate_scores_zero() {
        let mut board: Board = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(search(&mut board, 3, SearchConfig::default()), 0);
    }

    #[test]
    fn insufficient_material_scores_zero() {
        let mut board: Board = "8/8/4k3/8/8/3NK3/8/8 w - - 0 1".parse().unwrap();
        assert_eq!(search(&mut board, 4, SearchConfig::default()), 0);
    }

    #[test]
    fn fifty_move_rule_scores_zero() {
        let mut board: Board = "4k3/8/8/8/8/8/3Q4/4K3 w - - 100 80".parse().unwrap();
        assert_eq!(search(&mut board, 2, SearchConfig::default()), 0);
    }

    #[test]
    fn finds_mate_in_one_from_inside_the_tree() {
        // Back-rank mate: Re8# is one ply below this node.
        let mut board: Board = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1".parse().unwrap();
        assert_eq!(search(&mut board, 2, SearchConfig::default()), MATE_SCORE - 2);
    }

    #[test]
    fn quiet_cutoff_becomes_killer() {
        let mut board = Board::starting_position();
        let mut searcher = Searcher::new(SearchConfig {
            tt_entries: 1 << 14,
            ..SearchConfig::default()
        });
        let mut session = searcher.session(CancelToken::new());
        session.begin(Duration::from_secs(60));
        negamax(&mut board, &PestoEvaluator, 3, 0, -INF, INF, true, &mut session);
        drop(session);

        // Black refutations of weaker first moves are quiet in the opening.
        let refutation_remembered = board.legal_moves().iter().any(|&mv| {
            let mut child = board.clone();
            child.apply(mv);
            child
                .legal_moves()
                .iter()
                .any(|&reply| searcher.killers.is_killer(1, reply))
        });
        assert!(refutation_remembered, "a quiet refutation should be kept as a killer");
    }

    #[test]
    fn null_move_does_not_change_clear_result() {
        let fen = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1";
        let mut with_null: Board = fen.parse().unwrap();
        let mut without: Board = fen.parse().unwrap();
        let a = search(&mut with_null, 4, SearchConfig::default());
        let b = search(&mut without, 4, SearchConfig::default().exact());
        assert_eq!(a, b);
    }

    fn nodes_at_depth(fen: &str, depth: i32, config: SearchConfig) -> u64 {
        let mut board: Board = fen.parse().unwrap();
        let mut searcher = Searcher::new(SearchConfig {
            tt_entries: 1 << 16,
            ..config
        });
        searcher
            .search(
                &mut board,
                &PestoEvaluator,
                Duration::from_secs(600),
                CancelToken::new(),
                Some(depth),
                |_| {},
            )
            .nodes
    }

    #[test]
    fn null_move_prunes_full_window_searches() {
        let italian = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
        let with_null = nodes_at_depth(italian, 5, SearchConfig::default());
        let without = nodes_at_depth(
            italian,
            5,
            SearchConfig {
                null_move: false,
                ..SearchConfig::default()
            },
        );
        assert!(
            with_null < without,
            "null move searched {with_null} nodes, plain search {without}"
        );
    }

    #[test]
    fn stops_when_cancelled() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let mut searcher = Searcher::new(SearchConfig {
            tt_entries: 1 << 14,
            check_interval: 1,
            ..SearchConfig::default()
        });
        let token = CancelToken::new();
        let mut session = searcher.session(token.clone());
        session.begin(Duration::from_secs(60));
        token.cancel();
        let score = negamax(&mut board, &PestoEvaluator, 6, 0, -INF, INF, true, &mut session);
        assert_eq!(score, 0);
        assert!(session.is_stopped());
        assert_eq!(session.nodes(), 1);
        assert_eq!(board, before);
    }
}
