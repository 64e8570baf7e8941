//! Board representation and game rules for alfil.
//!
//! A mailbox board with in-place apply/undo, incremental Zobrist hashing,
//! legal move generation, FEN support and terminal-state detection.

mod board;
mod castle_rights;
mod chess_move;
mod color;
mod error;
mod fen;
mod make_move;
mod movegen;
mod perft;
mod piece;
mod rules;
mod square;
mod zobrist;

pub use board::Board;
pub use castle_rights::CastleRights;
pub use chess_move::{Move, MoveKind, MoveList};
pub use color::Color;
pub use error::{BoardError, FenError, MoveParseError};
pub use fen::STARTING_FEN;
pub use perft::perft;
pub use piece::{Piece, PieceKind};
pub use square::Square;
pub use zobrist::hash_from_scratch;
