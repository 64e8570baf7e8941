//! Quiescence search: resolve captures before trusting the static evaluation.

use crate::eval::piece_value;
use crate::position::{Evaluator, Played, Position};
use crate::search::ordering::{order_captures, order_moves};
use crate::search::session::SearchSession;
use crate::search::{MATE_SCORE, MAX_PLY};

/// Search captures and promotions until the position is quiet.
///
/// Fails hard on beta. When no capture raises alpha the stand-pat score is
/// returned as is, which may lie below the window.
pub(crate) fn quiescence<P, E>(
    pos: &mut P,
    eval: &E,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    session: &mut SearchSession<'_>,
) -> i32
where
    P: Position + ?Sized,
    E: Evaluator<P> + ?Sized,
{
    if session.checkpoint() {
        return 0;
    }

    // Ply ceiling to prevent runaway recursion
    if ply >= MAX_PLY {
        return eval.evaluate(pos);
    }

    if pos.is_in_check() {
        return evasions(pos, eval, ply, alpha, beta, session);
    }

    // Stand-pat: the side to move can choose not to capture
    let stand_pat = eval.evaluate(pos);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut moves = pos.legal_captures();
    order_captures(pos, &mut moves);

    let mut improved = false;
    for &mv in moves.iter() {
        if session.config.delta_pruning && mv.promotion().is_none() {
            let gain = pos.captured_piece(mv).map_or(0, piece_value);
            if stand_pat + gain + session.config.delta_margin <= alpha {
                continue;
            }
        }

        let score = {
            let mut child = Played::new(&mut *pos, mv);
            -quiescence(&mut *child, eval, ply + 1, -beta, -alpha, session)
        };
        if session.is_stopped() {
            return 0;
        }

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
            improved = true;
        }
    }

    if improved { alpha } else { stand_pat }
}

/// In check nothing may be skipped: every evasion is searched and having
/// none is mate.
fn evasions<P, E>(
    pos: &mut P,
    eval: &E,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    session: &mut SearchSession<'_>,
) -> i32
where
    P: Position + ?Sized,
    E: Evaluator<P> + ?Sized,
{
    let mut moves = pos.legal_moves();
    if moves.is_empty() {
        return -(MATE_SCORE - ply as i32);
    }
    order_moves(pos, &mut moves, ply, None, &*session.killers, &*session.history);

    for &mv in moves.iter() {
        let score = {
            let mut child = Played::new(&mut *pos, mv);
            -quiescence(&mut *child, eval, ply + 1, -beta, -alpha, session)
        };
        if session.is_stopped() {
            return 0;
        }

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use alfil_core::Board;

    use crate::config::SearchConfig;
    use crate::eval::PestoEvaluator;
    use crate::search::control::CancelToken;
    use crate::search::{INF, Searcher};

    fn qsearch(board: &mut Board, config: SearchConfig) -> i32 {
        let mut searcher = Searcher::new(SearchConfig {
            tt_entries: 64,
            ..config
        });
        let mut session = searcher.session(CancelToken::new());
        session.begin(std::time::Duration::from_secs(60));
        quiescence(board, &PestoEvaluator, 0, -INF, INF, &mut session)
    }

    #[test]
    fn quiet_position_returns_stand_pat() {
        let mut board = Board::starting_position();
        let score = qsearch(&mut board, SearchConfig::default());
        assert_eq!(score, PestoEvaluator.evaluate(&board));
    }

    #[test]
    fn wins_hanging_queen() {
        // Black queen on d5 en prise to the e4 pawn, nothing recaptures.
        let mut board: Board = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        let stand_pat = PestoEvaluator.evaluate(&board);
        let score = qsearch(&mut board, SearchConfig::default());
        assert!(score > stand_pat + 700, "score {score}, stand pat {stand_pat}");
    }

    #[test]
    fn declines_losing_capture() {
        // Qxd5 loses the queen to the c6 pawn, standing pat is better.
        let mut board: Board = "4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let stand_pat = PestoEvaluator.evaluate(&board);
        assert_eq!(qsearch(&mut board, SearchConfig::default()), stand_pat);
    }

    #[test]
    fn mate_found_when_in_check_without_evasions() {
        // Back-rank mate already on the board, black to move.
        let mut board: Board = "4R1k1/5ppp/8/8/8/8/8/6K1 b - - 0 1".parse().unwrap();
        assert_eq!(qsearch(&mut board, SearchConfig::default()), -MATE_SCORE);
    }

    #[test]
    fn delta_pruning_does_not_change_clear_wins() {
        let fen = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1";
        let mut pruned: Board = fen.parse().unwrap();
        let mut exact: Board = fen.parse().unwrap();
        let a = qsearch(&mut pruned, SearchConfig::default());
        let b = qsearch(&mut exact, SearchConfig::default().exact());
        assert_eq!(a, b);
    }

    #[test]
    fn leaves_board_unchanged() {
        let mut board: Board =
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
                .parse()
                .unwrap();
        let before = board.clone();
        qsearch(&mut board, SearchConfig::default());
        assert_eq!(board, before);
    }
}
