//! Legal move generation on the mailbox board.
//!
//! Pseudo-legal moves are generated per piece, then each is checked by
//! playing it on a scratch copy of the squares and testing king safety.

use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::chess_move::{Move, MoveKind, MoveList};
use crate::color::Color;
use crate::error::MoveParseError;
use crate::piece::{Piece, PieceKind};
use crate::square::Square;

type Squares = [Option<Piece>; 64];

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Which moves to produce.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    /// Captures and promotions only.
    Tactical,
}

struct CastlePath {
    right: CastleRights,
    king_from: Square,
    king_to: Square,
    rook: Square,
    empty: &'static [Square],
    /// Squares the king stands on or crosses.
    safe: &'static [Square],
}

const CASTLE_PATHS: [CastlePath; 4] = [
    CastlePath {
        right: CastleRights::WHITE_KING,
        king_from: Square::E1,
        king_to: Square::G1,
        rook: Square::H1,
        empty: &[Square::F1, Square::G1],
        safe: &[Square::E1, Square::F1, Square::G1],
    },
    CastlePath {
        right: CastleRights::WHITE_QUEEN,
        king_from: Square::E1,
        king_to: Square::C1,
        rook: Square::A1,
        empty: &[Square::B1, Square::C1, Square::D1],
        safe: &[Square::E1, Square::D1, Square::C1],
    },
    CastlePath {
        right: CastleRights::BLACK_KING,
        king_from: Square::E8,
        king_to: Square::G8,
        rook: Square::H8,
        empty: &[Square::F8, Square::G8],
        safe: &[Square::E8, Square::F8, Square::G8],
    },
    CastlePath {
        right: CastleRights::BLACK_QUEEN,
        king_from: Square::E8,
        king_to: Square::C8,
        rook: Square::A8,
        empty: &[Square::B8, Square::C8, Square::D8],
        safe: &[Square::E8, Square::D8, Square::C8],
    },
];

/// Whether any piece of color `by` attacks `target` on the given squares.
fn attacked_on(squares: &Squares, target: Square, by: Color) -> bool {
    let holds = |sq: Option<Square>, kind: PieceKind| {
        sq.is_some_and(|s| squares[s.index()] == Some(Piece::new(kind, by)))
    };

    let behind = -by.pawn_direction();
    if holds(target.offset(-1, behind), PieceKind::Pawn)
        || holds(target.offset(1, behind), PieceKind::Pawn)
    {
        return true;
    }
    if KNIGHT_STEPS
        .iter()
        .any(|&(df, dr)| holds(target.offset(df, dr), PieceKind::Knight))
    {
        return true;
    }
    if KING_STEPS
        .iter()
        .any(|&(df, dr)| holds(target.offset(df, dr), PieceKind::King))
    {
        return true;
    }

    let slider_hits = |dirs: &[(i8, i8)], kind: PieceKind| {
        dirs.iter().any(|&(df, dr)| {
            let mut cur = target;
            while let Some(next) = cur.offset(df, dr) {
                if let Some(piece) = squares[next.index()] {
                    return piece.color() == by
                        && (piece.kind() == kind || piece.kind() == PieceKind::Queen);
                }
                cur = next;
            }
            false
        })
    };
    slider_hits(&DIAGONALS, PieceKind::Bishop) || slider_hits(&ORTHOGONALS, PieceKind::Rook)
}

impl Board {
    /// Whether `sq` is attacked by any piece of color `by`.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        attacked_on(&self.squares, sq, by)
    }

    /// Whether the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        let us = self.side_to_move;
        self.is_square_attacked(self.king_square(us), !us)
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        self.generate(Scope::All)
    }

    /// Legal captures (en passant included) and promotions.
    pub fn legal_captures(&self) -> MoveList {
        self.generate(Scope::Tactical)
    }

    /// Resolve a wire token such as `e2e4` or `e7e8q` to a legal move.
    pub fn parse_move(&self, token: &str) -> Result<Move, MoveParseError> {
        let malformed = || MoveParseError::Malformed {
            token: token.to_string(),
        };
        if !(4..=5).contains(&token.len()) || !token.is_ascii() {
            return Err(malformed());
        }
        let from = Square::from_algebraic(&token[0..2]).ok_or_else(malformed)?;
        let to = Square::from_algebraic(&token[2..4]).ok_or_else(malformed)?;
        let promotion = match token[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_fen_char(c) {
                Some(kind) if PieceKind::PROMOTIONS.contains(&kind) && c.is_ascii_lowercase() => {
                    Some(kind)
                }
                _ => return Err(malformed()),
            },
        };

        self.legal_moves()
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion() == promotion)
            .ok_or_else(|| MoveParseError::Illegal {
                token: token.to_string(),
            })
    }

    fn generate(&self, scope: Scope) -> MoveList {
        let mut list = MoveList::new();
        let us = self.side_to_move;
        for sq in Square::all() {
            let Some(piece) = self.squares[sq.index()] else {
                continue;
            };
            if piece.color() != us {
                continue;
            }
            match piece.kind() {
                PieceKind::Pawn => self.pawn_moves(sq, scope, &mut list),
                PieceKind::Knight => self.step_moves(sq, &KNIGHT_STEPS, scope, &mut list),
                PieceKind::Bishop => self.slide_moves(sq, &DIAGONALS, scope, &mut list),
                PieceKind::Rook => self.slide_moves(sq, &ORTHOGONALS, scope, &mut list),
                PieceKind::Queen => {
                    self.slide_moves(sq, &DIAGONALS, scope, &mut list);
                    self.slide_moves(sq, &ORTHOGONALS, scope, &mut list);
                }
                PieceKind::King => self.step_moves(sq, &KING_STEPS, scope, &mut list),
            }
        }
        if scope == Scope::All {
            self.castle_moves(&mut list);
        }
        list.retain(|mv| self.is_legal(mv));
        list
    }

    fn pawn_moves(&self, from: Square, scope: Scope, list: &mut MoveList) {
        let us = self.side_to_move;
        let dir = us.pawn_direction();
        let promotes = |to: Square| to.rank() == us.promotion_rank();

        if let Some(to) = from.offset(0, dir) {
            if self.squares[to.index()].is_none() {
                if promotes(to) {
                    for kind in PieceKind::PROMOTIONS {
                        list.push(Move::new(from, to, MoveKind::Promotion(kind)));
                    }
                } else if scope == Scope::All {
                    list.push(Move::new(from, to, MoveKind::Quiet));
                    if from.rank() == us.pawn_start_rank() {
                        if let Some(two) = to.offset(0, dir) {
                            if self.squares[two.index()].is_none() {
                                list.push(Move::new(from, two, MoveKind::DoublePush));
                            }
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(to) = from.offset(df, dir) else {
                continue;
            };
            match self.squares[to.index()] {
                Some(target) if target.color() != us => {
                    if promotes(to) {
                        for kind in PieceKind::PROMOTIONS {
                            list.push(Move::new(from, to, MoveKind::PromotionCapture(kind)));
                        }
                    } else {
                        list.push(Move::new(from, to, MoveKind::Capture));
                    }
                }
                None if self.en_passant == Some(to) => {
                    list.push(Move::new(from, to, MoveKind::EnPassant));
                }
                _ => {}
            }
        }
    }

    fn step_moves(&self, from: Square, steps: &[(i8, i8)], scope: Scope, list: &mut MoveList) {
        let us = self.side_to_move;
        for &(df, dr) in steps {
            let Some(to) = from.offset(df, dr) else {
                continue;
            };
            match self.squares[to.index()] {
                None if scope == Scope::All => list.push(Move::new(from, to, MoveKind::Quiet)),
                Some(target) if target.color() != us => {
                    list.push(Move::new(from, to, MoveKind::Capture));
                }
                _ => {}
            }
        }
    }

    fn slide_moves(&self, from: Square, dirs: &[(i8, i8)], scope: Scope, list: &mut MoveList) {
        let us = self.side_to_move;
        for &(df, dr) in dirs {
            let mut cur = from;
            while let Some(to) = cur.offset(df, dr) {
                match self.squares[to.index()] {
                    None => {
                        if scope == Scope::All {
                            list.push(Move::new(from, to, MoveKind::Quiet));
                        }
                        cur = to;
                    }
                    Some(target) => {
                        if target.color() != us {
                            list.push(Move::new(from, to, MoveKind::Capture));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn castle_moves(&self, list: &mut MoveList) {
        let us = self.side_to_move;
        let king = Piece::new(PieceKind::King, us);
        let rook = Piece::new(PieceKind::Rook, us);
        for path in &CASTLE_PATHS {
            let available = self.castling.contains(path.right)
                && self.squares[path.king_from.index()] == Some(king)
                && self.squares[path.rook.index()] == Some(rook)
                && path.empty.iter().all(|sq| self.squares[sq.index()].is_none())
                && path.safe.iter().all(|&sq| !self.is_square_attacked(sq, !us));
            if available {
                list.push(Move::new(path.king_from, path.king_to, MoveKind::Castle));
            }
        }
    }

    /// Play `mv` on a scratch copy and check that our king is not left attacked.
    fn is_legal(&self, mv: Move) -> bool {
        let us = self.side_to_move;
        let mut squares = self.squares;
        let Some(piece) = squares[mv.from().index()].take() else {
            return false;
        };
        if mv.kind() == MoveKind::EnPassant {
            squares[Square::new(mv.to().file(), mv.from().rank()).index()] = None;
        }
        squares[mv.to().index()] = Some(match mv.promotion() {
            Some(kind) => Piece::new(kind, us),
            None => piece,
        });
        let king = if piece.kind() == PieceKind::King {
            mv.to()
        } else {
            self.king_square(us)
        };
        !attacked_on(&squares, king, !us)
    }
}
