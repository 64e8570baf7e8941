//! UCI command parsing.

use alfil_core::Board;
use alfil_engine::ClockParams;
use alfil_engine::config::check_hash_mb;

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches until `stop`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Clock state, passed on to the time budget.
    pub clock: ClockParams,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search until `stop` (no time limit unless a clock is also given).
    pub infinite: bool,
}

/// Engine options settable through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(Board),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (ignored, as UCI requires).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(args),
        "go" => parse_go(args),
        "setoption" => parse_setoption(args),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut board, rest) = match tokens.split_first() {
        Some((&"startpos", rest)) => (Board::starting_position(), rest),
        Some((&"fen", rest)) => {
            // The FEN runs up to the optional "moves" keyword
            let end = rest.iter().position(|&t| t == "moves").unwrap_or(rest.len());
            let fen = rest[..end].join(" ");
            let board = fen
                .parse::<Board>()
                .map_err(|source| UciError::InvalidFen { fen, source })?;
            (board, &rest[end..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    if let Some((&"moves", moves)) = rest.split_first() {
        for token in moves {
            let mv = board.parse_move(token)?;
            board.apply(mv);
        }
    }

    Ok(Command::Position(board))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, movetime, depth and
/// infinite. Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1).copied();
        match tokens[i] {
            "wtime" => params.clock.wtime = Some(parse_clock(value, "wtime")?),
            "btime" => params.clock.btime = Some(parse_clock(value, "btime")?),
            "winc" => params.clock.winc = Some(parse_clock(value, "winc")?),
            "binc" => params.clock.binc = Some(parse_clock(value, "binc")?),
            "movestogo" => params.clock.movestogo = Some(parse_value(value, "movestogo")?),
            "movetime" => params.clock.movetime = Some(parse_value(value, "movetime")?),
            "depth" => {
                let depth: i32 = parse_value(value, "depth")?;
                if depth < 1 {
                    return Err(UciError::InvalidGoValue {
                        param: "depth".to_string(),
                        value: depth.to_string(),
                    });
                }
                params.depth = Some(depth);
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            // Unknown token -- skip, as UCI requires
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse the `setoption name <name> value <value>` arguments.
///
/// Option names are matched case-insensitively; unsupported options are
/// reported as [`Command::Unknown`] so the engine can ignore them.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let Some((&"name", rest)) = tokens.split_first() else {
        return Ok(Command::Unknown("setoption".to_string()));
    };
    let split = rest.iter().position(|&t| t == "value").unwrap_or(rest.len());
    let name = rest[..split].join(" ");
    let value = rest.get(split + 1..).unwrap_or_default().join(" ");

    if !name.eq_ignore_ascii_case("hash") {
        return Ok(Command::Unknown(format!("setoption {name}")));
    }
    let mb: usize = value.parse().map_err(|_| UciError::InvalidOption {
        name: name.clone(),
        value: value.clone(),
    })?;
    Ok(Command::SetOption(UciOption::Hash(check_hash_mb(mb)?)))
}

/// Parse a clock reading in milliseconds.
///
/// GUIs report an overdrawn clock as a negative number; it counts as zero
/// so the engine still answers with a move.
fn parse_clock(token: Option<&str>, param: &str) -> Result<u64, UciError> {
    let ms: i64 = parse_value(token, param)?;
    Ok(ms.max(0).unsigned_abs())
}

/// Parse the numeric value following a `go` parameter.
fn parse_value<T: std::str::FromStr>(token: Option<&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use alfil_engine::ConfigError;

    use super::*;

    fn go(line: &str) -> GoParams {
        match parse_command(line).unwrap() {
            Command::Go(params) => params,
            other => panic!("expected Go, got {other:?}"),
        }
    }

    fn position(line: &str) -> Board {
        match parse_command(line).unwrap() {
            Command::Position(board) => board,
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("ucinewgame").unwrap(), Command::UciNewGame));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_position_startpos() {
        assert_eq!(position("position startpos"), Board::starting_position());
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let board = position("position startpos moves e2e4 e7e5 g1f3");
        let expected: Board = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
            .parse()
            .unwrap();
        assert_eq!(board.to_string(), expected.to_string());
        assert_eq!(board.hash(), expected.hash());
    }

    #[test]
    fn parse_position_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        assert_eq!(position(&format!("position fen {fen}")).to_string(), fen);
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let board = position("position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4 e8d7");
        assert_eq!(board.to_string(), "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2");
    }

    #[test]
    fn repeated_moves_are_remembered() {
        let board = position("position startpos moves g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1 f6g8");
        assert!(board.is_repetition());
    }

    #[test]
    fn parse_go_depth() {
        assert_eq!(go("go depth 6").depth, Some(6));
    }

    #[test]
    fn parse_go_bare_defaults() {
        assert_eq!(go("go"), GoParams::default());
    }

    #[test]
    fn parse_go_clock() {
        let params = go("go wtime 300000 btime 290000 winc 2000 binc 1000 movestogo 20");
        assert_eq!(
            params.clock,
            ClockParams {
                wtime: Some(300_000),
                btime: Some(290_000),
                winc: Some(2_000),
                binc: Some(1_000),
                movestogo: Some(20),
                movetime: None,
            }
        );
    }

    #[test]
    fn parse_go_movetime() {
        assert_eq!(go("go movetime 5000").clock.movetime, Some(5_000));
    }

    #[test]
    fn parse_go_infinite_skips_unknown_tokens() {
        let params = go("go ponder infinite nodes");
        assert!(params.infinite);
        assert_eq!(params.clock, ClockParams::default());
    }

    #[test]
    fn parse_go_missing_wtime_value() {
        assert!(matches!(
            parse_command("go wtime"),
            Err(UciError::MissingGoValue { param }) if param == "wtime"
        ));
    }

    #[test]
    fn parse_go_invalid_values() {
        assert!(matches!(
            parse_command("go depth abc"),
            Err(UciError::InvalidGoValue { .. })
        ));
        assert!(matches!(
            parse_command("go depth 0"),
            Err(UciError::InvalidGoValue { .. })
        ));
        assert!(matches!(
            parse_command("go wtime soon"),
            Err(UciError::InvalidGoValue { .. })
        ));
    }

    #[test]
    fn overdrawn_clock_counts_as_zero() {
        let params = go("go wtime -50 btime 1000 winc 100 binc 100");
        assert_eq!(params.clock.wtime, Some(0));
        assert_eq!(params.clock.btime, Some(1_000));
        assert_eq!(
            alfil_engine::budget_from_go(alfil_core::Color::White, &params.clock),
            std::time::Duration::from_millis(100)
        );

        let flagged = go("go wtime -50 btime -20");
        assert_eq!(
            alfil_engine::budget_from_go(alfil_core::Color::Black, &flagged.clock),
            std::time::Duration::from_millis(1)
        );
    }

    #[test]
    fn parse_setoption_hash() {
        assert!(matches!(
            parse_command("setoption name Hash value 64").unwrap(),
            Command::SetOption(UciOption::Hash(64))
        ));
        assert!(matches!(
            parse_command("setoption name hash value 1").unwrap(),
            Command::SetOption(UciOption::Hash(1))
        ));
    }

    #[test]
    fn parse_setoption_rejects_bad_hash() {
        assert!(matches!(
            parse_command("setoption name Hash value lots"),
            Err(UciError::InvalidOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 0"),
            Err(UciError::Config(ConfigError::HashSize { mb: 0, .. }))
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 5000"),
            Err(UciError::Config(ConfigError::HashSize { mb: 5000, .. }))
        ));
    }

    #[test]
    fn parse_setoption_unknown_name() {
        assert!(matches!(
            parse_command("setoption name Move Overhead value 30").unwrap(),
            Command::Unknown(_)
        ));
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }

    #[test]
    fn parse_position_missing_keyword() {
        assert!(matches!(
            parse_command("position"),
            Err(UciError::MalformedPosition)
        ));
        assert!(matches!(
            parse_command("position somewhere"),
            Err(UciError::MalformedPosition)
        ));
    }

    #[test]
    fn parse_position_invalid_fen() {
        assert!(matches!(
            parse_command("position fen invalid"),
            Err(UciError::InvalidFen { .. })
        ));
    }

    #[test]
    fn parse_position_illegal_move() {
        assert!(matches!(
            parse_command("position startpos moves e2e5"),
            Err(UciError::InvalidMove { .. })
        ));
    }
}
