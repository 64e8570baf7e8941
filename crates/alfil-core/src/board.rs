//! Mailbox board state.

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::BoardError;
use crate::make_move::Undo;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// A chess position plus the history needed to undo moves and detect repetitions.
///
/// Moves are applied in place with [`Board::apply`] and reverted with
/// [`Board::undo`]. The Zobrist hash is kept up to date incrementally.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pub(crate) squares: [Option<Piece>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling: CastleRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: u64,
    pub(crate) kings: [Square; Color::COUNT],
    pub(crate) history: Vec<Undo>,
}

impl Board {
    /// The standard initial position.
    pub fn starting_position() -> Board {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut squares = [None; 64];
        for (file, &kind) in BACK_RANK.iter().enumerate() {
            let file = file as u8;
            squares[Square::new(file, 0).index()] = Some(Piece::new(kind, Color::White));
            squares[Square::new(file, 1).index()] = Some(Piece::new(PieceKind::Pawn, Color::White));
            squares[Square::new(file, 6).index()] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            squares[Square::new(file, 7).index()] = Some(Piece::new(kind, Color::Black));
        }
        let mut board = Board {
            squares,
            side_to_move: Color::White,
            castling: CastleRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            kings: [Square::E1, Square::E8],
            history: Vec::new(),
        };
        board.hash = zobrist::hash_from_scratch(&board);
        board
    }

    /// Assemble a board from parsed FEN parts and check it for structural problems.
    pub(crate) fn from_parts(
        squares: [Option<Piece>; 64],
        side_to_move: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Result<Board, BoardError> {
        let mut kings = [Square::E1, Square::E8];
        for color in Color::ALL {
            let mut count = 0;
            for sq in Square::all() {
                if squares[sq.index()] == Some(Piece::new(PieceKind::King, color)) {
                    kings[color.index()] = sq;
                    count += 1;
                }
            }
            if count != 1 {
                return Err(BoardError::InvalidKingCount {
                    color: match color {
                        Color::White => "white",
                        Color::Black => "black",
                    },
                    count,
                });
            }
        }

        let pawn_on_back_rank = Square::all().any(|sq| {
            (sq.rank() == 0 || sq.rank() == 7)
                && squares[sq.index()].is_some_and(|p| p.kind() == PieceKind::Pawn)
        });
        if pawn_on_back_rank {
            return Err(BoardError::PawnsOnBackRank);
        }

        let mut board = Board {
            squares,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            kings,
            history: Vec::new(),
        };
        board.hash = zobrist::hash_from_scratch(&board);

        let waiting = !side_to_move;
        if board.is_square_attacked(board.king_square(waiting), side_to_move) {
            return Err(BoardError::OpponentInCheck);
        }
        Ok(board)
    }

    /// The piece on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Zobrist hash of the current position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Number of moves (including null moves) that can currently be undone.
    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Every occupied square with its piece, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Whether `color` has any knight, bishop, rook or queen.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        self.pieces().any(|(_, p)| {
            p.color() == color && !matches!(p.kind(), PieceKind::Pawn | PieceKind::King)
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}
