//! Zobrist keys and from-scratch hashing.
//!
//! Keys are drawn at compile time from one xorshift64 stream, in the order
//! piece-square, side to move, castling bits, en passant files.

use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::piece::Piece;
use crate::square::Square;

const SEED: u64 = 0x616c_6669_6c5f_7a62;

const PIECE_SQUARE_KEYS: usize = Piece::COUNT * Square::COUNT;
const TOTAL_KEYS: usize = PIECE_SQUARE_KEYS + 1 + 4 + 8;

static KEYS: [u64; TOTAL_KEYS] = {
    let mut keys = [0u64; TOTAL_KEYS];
    let mut state = SEED;
    let mut i = 0;
    while i < TOTAL_KEYS {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        keys[i] = state;
        i += 1;
    }
    keys
};

const SIDE_OFFSET: usize = PIECE_SQUARE_KEYS;
const CASTLING_OFFSET: usize = SIDE_OFFSET + 1;
const EN_PASSANT_OFFSET: usize = CASTLING_OFFSET + 4;

/// Key for `piece` standing on `sq`.
#[inline]
pub(crate) fn piece_square(piece: Piece, sq: Square) -> u64 {
    KEYS[piece.index() * Square::COUNT + sq.index()]
}

/// Key toggled when Black is to move.
#[inline]
pub(crate) fn side_to_move() -> u64 {
    KEYS[SIDE_OFFSET]
}

/// XOR of the keys of every right held.
#[inline]
pub(crate) fn castling(rights: CastleRights) -> u64 {
    let bits = rights.bits();
    let mut key = 0;
    for bit in 0..4 {
        if bits & (1 << bit) != 0 {
            key ^= KEYS[CASTLING_OFFSET + bit];
        }
    }
    key
}

/// Key for an en passant square, by file.
#[inline]
pub(crate) fn en_passant(sq: Square) -> u64 {
    KEYS[EN_PASSANT_OFFSET + sq.file() as usize]
}

/// Recompute a board's hash from its contents, ignoring the cached value.
pub fn hash_from_scratch(board: &Board) -> u64 {
    let mut hash = 0;
    for sq in Square::all() {
        if let Some(piece) = board.piece_at(sq) {
            hash ^= piece_square(piece, sq);
        }
    }
    if board.side_to_move() == Color::Black {
        hash ^= side_to_move();
    }
    hash ^= castling(board.castling());
    if let Some(ep) = board.en_passant() {
        hash ^= en_passant(ep);
    }
    hash
}
