//! Event-driven UCI engine with the search on a worker thread.

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use alfil_core::Board;
use alfil_engine::{
    CancelToken, IterationInfo, PestoEvaluator, SearchConfig, SearchResult, Searcher,
    budget_from_go, mate_in,
};

use crate::command::{Command, GoParams, UciOption, parse_command};
use crate::error::UciError;

/// Configuration knobs adjustable via `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { hash_mb: 16 }
    }
}

/// Whether a search is running.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Longest a search may take when it has to run on the protocol thread,
/// where `stop` cannot reach it.
const INLINE_BUDGET: Duration = Duration::from_secs(1);

/// Everything a search thread needs, handed over as one value.
struct SearchJob {
    searcher: Searcher,
    board: Board,
    budget: Duration,
    cancel: CancelToken,
    depth_limit: Option<i32>,
}

impl SearchJob {
    fn run(self) -> SearchDone {
        let SearchJob {
            mut searcher,
            mut board,
            budget,
            cancel,
            depth_limit,
        } = self;
        let result = searcher.search(
            &mut board,
            &PestoEvaluator,
            budget,
            cancel,
            depth_limit,
            |iteration| println!("{}", info_line(iteration)),
        );
        SearchDone { result, searcher }
    }
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// The UCI engine, holding the current position and the searcher.
///
/// Runs an event-driven loop on the main thread, dispatching searches
/// to a worker thread and processing UCI commands concurrently. While a
/// search runs the worker owns the [`Searcher`]; table changes requested
/// in the meantime are applied when it comes back.
pub struct UciEngine {
    board: Board,
    searcher: Option<Searcher>,
    state: EngineState,
    cancel: CancelToken,
    config: EngineConfig,
    pending_new_game: bool,
    /// Pending TT resize (MB) to apply when the search thread returns the searcher.
    pending_resize: Option<usize>,
    /// Events that arrived while waiting for a search to wind down.
    backlog: VecDeque<EngineEvent>,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new(config: EngineConfig) -> Result<Self, UciError> {
        let searcher = Searcher::with_hash_mb(SearchConfig::default(), config.hash_mb)?;
        Ok(Self {
            board: Board::starting_position(),
            searcher: Some(searcher),
            state: EngineState::Idle,
            cancel: CancelToken::new(),
            config,
            pending_new_game: false,
            pending_resize: None,
            backlog: VecDeque::new(),
        })
    }

    /// Run the UCI event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        // Spawn stdin reader thread
        let stdin_tx = tx.clone();
        thread::Builder::new()
            .name("uci-input".into())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(source) => {
                            warn!(error = %UciError::from(source), "stdin read failed");
                            break;
                        }
                    };
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    debug!(cmd = %trimmed, "received UCI command");
                    if stdin_tx
                        .send(EngineEvent::UciCommand(parse_command(trimmed)))
                        .is_err()
                    {
                        return;
                    }
                }
                let _ = stdin_tx.send(EngineEvent::InputClosed);
            })?;

        info!(hash_mb = self.config.hash_mb, "alfil ready");

        while let Some(event) = self.next_event(&rx) {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => self.handle_isready(),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(board) => self.handle_position(board),
                    Command::Go(params) => self.handle_go(params, &tx, &rx),
                    Command::SetOption(option) => self.handle_setoption(option),
                    Command::Stop => self.handle_stop(),
                    Command::Quit => {
                        self.wait_for_search(&rx);
                        break;
                    }
                    Command::Unknown(cmd) => {
                        if !cmd.is_empty() {
                            debug!(cmd = %cmd, "ignoring unknown command");
                        }
                    }
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => {
                    self.wait_for_search(&rx);
                    break;
                }
            }
        }

        info!("alfil shutting down");
        Ok(())
    }

    fn next_event(&mut self, rx: &mpsc::Receiver<EngineEvent>) -> Option<EngineEvent> {
        self.backlog.pop_front().or_else(|| rx.recv().ok())
    }

    fn handle_uci(&self) {
        println!("id name alfil {}", env!("CARGO_PKG_VERSION"));
        println!("id author the alfil developers");
        println!(
            "option name Hash type spin default {} min 1 max {}",
            EngineConfig::default().hash_mb,
            alfil_engine::config::MAX_HASH_MB
        );
        println!("uciok");
    }

    fn handle_isready(&self) {
        println!("readyok");
    }

    fn handle_ucinewgame(&mut self) {
        self.board = Board::starting_position();
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.new_game();
        } else {
            // Search thread owns the searcher; defer until it comes back
            self.pending_new_game = true;
        }
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::Hash(mb) => {
                self.config.hash_mb = mb;
                if let Some(searcher) = self.searcher.as_mut() {
                    searcher.resize_tt(mb);
                } else {
                    self.pending_resize = Some(mb);
                }
            }
        }
    }

    fn handle_position(&mut self, board: Board) {
        self.board = board;
    }

    fn handle_go(
        &mut self,
        params: GoParams,
        tx: &mpsc::Sender<EngineEvent>,
        rx: &mpsc::Receiver<EngineEvent>,
    ) {
        if matches!(self.state, EngineState::Searching) {
            warn!("go received while searching, stopping the previous search");
            self.wait_for_search(rx);
        }

        let Some(searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return;
        };

        self.cancel = CancelToken::new();
        let job = SearchJob {
            searcher,
            board: self.board.clone(),
            budget: budget_from_go(self.board.side_to_move(), &params.clock),
            cancel: self.cancel.clone(),
            depth_limit: params.depth,
        };

        debug!(
            budget = ?job.budget,
            depth_limit = ?job.depth_limit,
            infinite = params.infinite,
            "starting search"
        );
        self.dispatch(job, spawn_worker(tx));
    }

    /// Hand `job` to a search thread.
    ///
    /// Without a worker the search runs here under [`INLINE_BUDGET`], so the
    /// searcher comes back and `bestmove` is still sent.
    fn dispatch(&mut self, job: SearchJob, worker: io::Result<mpsc::Sender<SearchJob>>) {
        let mut job = match worker {
            Ok(worker) => match worker.send(job) {
                Ok(()) => {
                    self.state = EngineState::Searching;
                    return;
                }
                Err(mpsc::SendError(job)) => {
                    warn!("search thread exited early, searching inline");
                    job
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to spawn search thread, searching inline");
                job
            }
        };
        job.budget = job.budget.min(INLINE_BUDGET);
        self.finish_search(job.run());
    }

    fn handle_stop(&mut self) {
        self.cancel.cancel();
    }

    /// Cancel any running search and block until its result is in.
    ///
    /// Other events received meanwhile are queued for the main loop.
    fn wait_for_search(&mut self, rx: &mpsc::Receiver<EngineEvent>) {
        if !matches!(self.state, EngineState::Searching) {
            return;
        }
        self.cancel.cancel();
        for event in rx {
            if let EngineEvent::SearchDone(done) = event {
                self.finish_search(done);
                return;
            }
            self.backlog.push_back(event);
        }
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;

        if let Some(mb) = self.pending_resize.take() {
            // A fresh table is already empty
            searcher.resize_tt(mb);
        }
        if std::mem::take(&mut self.pending_new_game) {
            searcher.new_game();
        }

        self.searcher = Some(searcher);
        self.state = EngineState::Idle;
        println!("{}", bestmove_line(&done.result));
    }
}

/// Start a search thread that runs the job it is sent and reports on `tx`.
fn spawn_worker(tx: &mpsc::Sender<EngineEvent>) -> io::Result<mpsc::Sender<SearchJob>> {
    let (job_tx, job_rx) = mpsc::channel::<SearchJob>();
    let tx = tx.clone();
    thread::Builder::new()
        .name("search".into())
        .spawn(move || {
            if let Ok(job) = job_rx.recv() {
                let _ = tx.send(EngineEvent::SearchDone(job.run()));
            }
        })?;
    Ok(job_tx)
}

/// Format a completed iteration as a UCI `info` line.
fn info_line(info: &IterationInfo<'_>) -> String {
    let elapsed_ms = info.elapsed.as_millis().max(1);
    let nps = u128::from(info.nodes) * 1000 / elapsed_ms;
    let score = match mate_in(info.score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {}", info.score),
    };
    let pv: Vec<String> = info.pv.iter().map(ToString::to_string).collect();

    format!(
        "info depth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
        info.depth,
        score,
        info.nodes,
        nps,
        info.hashfull,
        info.elapsed.as_millis(),
        pv.join(" ")
    )
}

/// Format the final answer; `0000` stands for "no legal move".
fn bestmove_line(result: &SearchResult) -> String {
    match result.best_move {
        Some(mv) => format!("bestmove {mv}"),
        None => "bestmove 0000".to_string(),
    }
}
