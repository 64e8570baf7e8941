//! Time management: convert clock parameters to a search budget.

use std::time::Duration;

use alfil_core::Color;

/// Budget used when the clock imposes no limit (`go infinite`, bare `go`).
pub const UNLIMITED: Duration = Duration::from_millis(10_000_000);

/// Moves assumed to remain in the game when the GUI does not say.
const DEFAULT_MOVES_TO_GO: u64 = 40;

/// Clock-related arguments of a `go` command, all in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub movetime: Option<u64>,
}

/// Pick the time budget for `side` to spend on its next move.
///
/// Priority order:
/// 1. `movetime` is used as given.
/// 2. The mover's clock: `remaining / movestogo + increment`, at least 1 ms,
///    with 40 moves assumed when `movestogo` is absent.
/// 3. Otherwise (`go infinite`, `go depth N`): [`UNLIMITED`], leaving
///    `stop` or the depth cap to end the search.
pub fn budget_from_go(side: Color, params: &ClockParams) -> Duration {
    if let Some(movetime) = params.movetime {
        return Duration::from_millis(movetime);
    }

    // Pick the time/increment for the side to move
    let (remaining, increment) = match side {
        Color::White => (params.wtime, params.winc),
        Color::Black => (params.btime, params.binc),
    };

    match remaining {
        Some(remaining) => {
            let moves_to_go = params
                .movestogo
                .map_or(DEFAULT_MOVES_TO_GO, |n| u64::from(n.max(1)));
            let ms = remaining / moves_to_go + increment.unwrap_or(0);
            Duration::from_millis(ms.max(1))
        }
        None => UNLIMITED,
    }
}
