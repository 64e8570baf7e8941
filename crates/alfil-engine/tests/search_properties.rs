//! Behavioural properties of the search, checked against an exhaustive
//! reference and a few well-known positions.

use std::thread;
use std::time::{Duration, Instant};

use alfil_core::{Board, Color, Move, PieceKind};
use alfil_engine::search::tt::Bound;
use alfil_engine::{
    CancelToken, Evaluator, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, PestoEvaluator, SearchConfig,
    SearchResult, Searcher, evaluate,
};

const BACK_RANK_MATE_IN_ONE: &str = "6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1";

/// Re8+ Rxe8 Rxe8#.
const BACK_RANK_MATE_IN_TWO: &str = "2r3k1/5ppp/8/8/8/8/4RPPP/4R1K1 w - - 0 1";

/// White is in check from the rook, which the d-pawn can take.
const SMALL_TACTIC: &str = "4k3/8/3p4/4r3/3P4/2N5/8/4K3 w - - 0 1";

const KING_AND_PAWN: &str = "8/8/4k3/8/2P5/8/3K4/8 w - - 0 1";

fn searcher(config: SearchConfig) -> Searcher {
    Searcher::new(SearchConfig {
        tt_entries: 1 << 18,
        ..config
    })
}

fn fixed_depth(searcher: &mut Searcher, board: &mut Board, depth: i32) -> SearchResult {
    searcher.search(
        board,
        &PestoEvaluator,
        Duration::from_secs(600),
        CancelToken::new(),
        Some(depth),
        |_| {},
    )
}

// ── Exhaustive reference ──────────────────────────────────────────────────────

/// Capture-only minimax with stand-pat, and full width while in check.
fn reference_quiescence(board: &mut Board, ply: i32) -> i32 {
    if ply >= MAX_PLY as i32 {
        return evaluate(board);
    }
    if board.is_in_check() {
        let moves = board.legal_moves();
        if moves.is_empty() {
            return -(MATE_SCORE - ply);
        }
        let mut best = -MATE_SCORE;
        for &mv in moves.iter() {
            board.apply(mv);
            best = best.max(-reference_quiescence(board, ply + 1));
            board.undo(mv);
        }
        return best;
    }
    let mut best = evaluate(board);
    for &mv in board.legal_captures().iter() {
        board.apply(mv);
        best = best.max(-reference_quiescence(board, ply + 1));
        board.undo(mv);
    }
    best
}

/// Plain minimax with the same horizon rules as the engine.
fn reference_minimax(board: &mut Board, depth: i32, ply: i32) -> i32 {
    if ply >= MAX_PLY as i32 {
        return evaluate(board);
    }
    let moves = board.legal_moves();
    let in_check = board.is_in_check();
    if moves.is_empty() {
        return if in_check { -(MATE_SCORE - ply) } else { 0 };
    }
    if board.is_draw() {
        return 0;
    }
    if depth <= 0 {
        return reference_quiescence(board, ply);
    }
    let depth = if in_check { depth + 1 } else { depth };
    let mut best = -MATE_SCORE;
    for &mv in moves.iter() {
        board.apply(mv);
        best = best.max(-reference_minimax(board, depth - 1, ply + 1));
        board.undo(mv);
    }
    best
}

/// Value of each root move under the reference search.
fn reference_root(board: &mut Board, depth: i32) -> Vec<(Move, i32)> {
    let child_depth = if board.is_in_check() { depth } else { depth - 1 };
    board
        .legal_moves()
        .iter()
        .map(|&mv| {
            board.apply(mv);
            let score = -reference_minimax(board, child_depth, 1);
            board.undo(mv);
            (mv, score)
        })
        .collect()
}

fn material(board: &Board, color: Color) -> i32 {
    board
        .pieces()
        .filter(|(_, piece)| piece.color() == color && piece.kind() != PieceKind::King)
        .map(|(_, piece)| alfil_engine::eval::piece_value(piece.kind()))
        .sum()
}

// ── Alpha-beta equivalence ────────────────────────────────────────────────────

fn assert_matches_minimax(fen: &str, depth: i32) {
    let mut board: Board = fen.parse().unwrap();
    let reference = reference_root(&mut board, depth);
    let best_value = reference.iter().map(|&(_, s)| s).max().unwrap();

    let mut engine = searcher(SearchConfig::default().exact());
    let result = fixed_depth(&mut engine, &mut board, depth);

    assert_eq!(result.depth, depth);
    assert_eq!(result.score, best_value, "{fen} at depth {depth}");
    let chosen = result.best_move.unwrap();
    let chosen_value = reference.iter().find(|&&(mv, _)| mv == chosen).unwrap().1;
    assert_eq!(chosen_value, best_value, "{chosen} is not a minimax-best move");
}

#[test]
fn alpha_beta_equals_minimax_startpos_depth_2() {
    assert_matches_minimax(alfil_core::STARTING_FEN, 2);
}

#[test]
fn alpha_beta_equals_minimax_startpos_depth_3() {
    assert_matches_minimax(alfil_core::STARTING_FEN, 3);
}

#[test]
fn alpha_beta_equals_minimax_with_check_at_root() {
    assert_matches_minimax(SMALL_TACTIC, 1);
}

#[test]
fn alpha_beta_equals_minimax_in_pawn_ending() {
    assert_matches_minimax(KING_AND_PAWN, 3);
}

// ── Transposition table soundness ─────────────────────────────────────────────

fn assert_bound_holds(board: &mut Board, depth: i32, ply: i32, bound: Bound, score: i32) {
    let truth = reference_minimax(board, depth, ply);
    match bound {
        Bound::Exact => assert_eq!(truth, score),
        Bound::LowerBound => assert!(truth >= score, "lower bound {score} above {truth}"),
        Bound::UpperBound => assert!(truth <= score, "upper bound {score} below {truth}"),
    }
}

#[test]
fn tt_bounds_are_sound() {
    let mut board = Board::starting_position();
    let mut engine = searcher(SearchConfig::default().exact());
    fixed_depth(&mut engine, &mut board, 3);

    let root = engine.tt().lookup(board.hash(), 0).expect("root entry");
    assert_eq!(root.bound, Bound::Exact);
    assert_bound_holds(&mut board, root.depth, 0, root.bound, root.score);

    let mut checked = 0;
    for &mv in board.legal_moves().iter() {
        board.apply(mv);
        if let Some(entry) = engine.tt().lookup(board.hash(), 1) {
            assert_bound_holds(&mut board, entry.depth, 1, entry.bound, entry.score);
            checked += 1;
        }
        for &reply in board.legal_moves().iter() {
            board.apply(reply);
            if let Some(entry) = engine.tt().lookup(board.hash(), 2) {
                assert_bound_holds(&mut board, entry.depth, 2, entry.bound, entry.score);
                checked += 1;
            }
            board.undo(reply);
        }
        board.undo(mv);
    }
    assert!(checked > 20, "only {checked} entries inspected");
}

// ── Mate scoring ──────────────────────────────────────────────────────────────

#[test]
fn finds_mate_in_two_within_five_seconds() {
    let mut board: Board = BACK_RANK_MATE_IN_TWO.parse().unwrap();
    let mut engine = searcher(SearchConfig::default());
    let started = Instant::now();
    let result = engine.search(
        &mut board,
        &PestoEvaluator,
        Duration::from_secs(5),
        CancelToken::new(),
        None,
        |_| {},
    );
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(result.best_move.map(|mv| mv.to_string()).as_deref(), Some("e2e8"));
    assert_eq!(result.score, MATE_SCORE - 3);
    assert_eq!(alfil_engine::mate_in(result.score), Some(2));
}

#[test]
fn shorter_mates_score_higher() {
    let mut one: Board = BACK_RANK_MATE_IN_ONE.parse().unwrap();
    let mut two: Board = BACK_RANK_MATE_IN_TWO.parse().unwrap();
    let in_one = fixed_depth(&mut searcher(SearchConfig::default()), &mut one, 4).score;
    let in_two = fixed_depth(&mut searcher(SearchConfig::default()), &mut two, 4).score;
    assert_eq!(in_one, MATE_SCORE - 1);
    assert!(in_one > in_two);
    assert!(in_two > MATE_THRESHOLD);
    for k in 0..MAX_PLY as i32 - 2 {
        assert!(MATE_SCORE - k > MATE_SCORE - (k + 2));
    }
}

#[test]
fn mated_root_reports_mate_score() {
    let mut lost: Board = "4R1k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1".parse().unwrap();
    let result = fixed_depth(&mut searcher(SearchConfig::default()), &mut lost, 2);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -MATE_SCORE);
    assert_eq!(alfil_engine::mate_in(result.score), Some(0));
}

// ── Iterative deepening ───────────────────────────────────────────────────────

#[test]
fn node_count_grows_with_depth() {
    let mut board: Board = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3"
        .parse()
        .unwrap();
    let mut reports = Vec::new();
    searcher(SearchConfig::default()).search(
        &mut board,
        &PestoEvaluator,
        Duration::from_secs(600),
        CancelToken::new(),
        Some(4),
        |info| reports.push((info.depth, info.nodes)),
    );
    assert_eq!(reports.len(), 4);
    for pair in reports.windows(2) {
        assert_eq!(pair[1].0, pair[0].0 + 1);
        assert!(pair[1].1 > pair[0].1, "nodes did not grow: {reports:?}");
    }

    let shallow = fixed_depth(&mut searcher(SearchConfig::default()), &mut board, 2).nodes;
    let deep = fixed_depth(&mut searcher(SearchConfig::default()), &mut board, 3).nodes;
    assert!(deep > shallow);
}

#[test]
fn depth_three_move_does_not_hang_material() {
    let mut board = Board::starting_position();
    let mut white = searcher(SearchConfig::default());
    let mut black = searcher(SearchConfig::default());

    let first = fixed_depth(&mut white, &mut board, 3).best_move.unwrap();
    board.apply(first);
    let reply = fixed_depth(&mut black, &mut board, 3).best_move.unwrap();
    board.apply(reply);

    assert!(
        material(&board, Color::White) >= material(&board, Color::Black),
        "1.{first} {reply} lost material"
    );
}

#[test]
fn search_restores_the_position() {
    let mut board: Board = SMALL_TACTIC.parse().unwrap();
    let before = board.clone();
    fixed_depth(&mut searcher(SearchConfig::default()), &mut board, 4);
    assert_eq!(board, before);
}

// ── Budget and cancellation ───────────────────────────────────────────────────

#[test]
fn zero_budget_still_returns_legal_move() {
    let mut board: Board = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3"
        .parse()
        .unwrap();
    let result = searcher(SearchConfig::default()).search(
        &mut board,
        &PestoEvaluator,
        Duration::ZERO,
        CancelToken::new(),
        None,
        |_| {},
    );
    let mv = result.best_move.expect("a legal move");
    assert!(board.legal_moves().contains(&mv));
    assert_eq!(result.depth, 0);
}

#[test]
fn precancelled_search_returns_legal_move() {
    let mut board = Board::starting_position();
    let token = CancelToken::new();
    token.cancel();
    let result = searcher(SearchConfig::default()).search(
        &mut board,
        &PestoEvaluator,
        Duration::from_secs(60),
        token,
        None,
        |_| {},
    );
    assert!(board.legal_moves().contains(&result.best_move.unwrap()));
}

#[test]
fn cancellation_from_another_thread_ends_search() {
    let mut board = Board::starting_position();
    let token = CancelToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        remote.cancel();
    });

    let started = Instant::now();
    let result = searcher(SearchConfig::default()).search(
        &mut board,
        &PestoEvaluator,
        alfil_engine::time::UNLIMITED,
        token,
        None,
        |_| {},
    );
    canceller.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(board.legal_moves().contains(&result.best_move.unwrap()));
    assert_eq!(board, Board::starting_position());
}

#[test]
fn short_budget_is_respected() {
    let mut board = Board::starting_position();
    let started = Instant::now();
    let result = searcher(SearchConfig::default()).search(
        &mut board,
        &PestoEvaluator,
        Duration::from_millis(300),
        CancelToken::new(),
        None,
        |_| {},
    );
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(result.best_move.is_some());
}

#[test]
fn closure_evaluator_drives_search() {
    // Pure material counting still sees the free queen.
    let mut board: Board = "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
    let count = |b: &Board| {
        let us = b.side_to_move();
        material(b, us) - material(b, !us)
    };
    let result = searcher(SearchConfig::default()).search(
        &mut board,
        &count,
        Duration::from_secs(60),
        CancelToken::new(),
        Some(2),
        |_| {},
    );
    assert_eq!(result.best_move.map(|mv| mv.to_string()).as_deref(), Some("e4d5"));
    assert!(count.evaluate(&board) < 0);
}
