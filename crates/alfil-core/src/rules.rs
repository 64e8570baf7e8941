//! Terminal-state detection: mate, stalemate and draws by rule.

use crate::board::Board;
use crate::piece::PieceKind;

impl Board {
    /// Side to move is in check and has no legal move.
    pub fn is_checkmate(&self) -> bool {
        self.is_in_check() && self.legal_moves().is_empty()
    }

    /// Side to move is not in check and has no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check() && self.legal_moves().is_empty()
    }

    /// How many earlier positions since the last irreversible move equal this one.
    ///
    /// The scan stops at a null move, since positions on the far side of
    /// a passed turn were not reached by legal play.
    pub fn repetition_count(&self) -> usize {
        let window = self.halfmove_clock as usize;
        let mut count = 0;
        for (back, record) in self.history.iter().rev().enumerate().take(window) {
            if record.mv.is_none() {
                break;
            }
            // records at odd distances were taken with the same side to move
            if back % 2 == 1 && record.hash == self.hash {
                count += 1;
            }
        }
        count
    }

    /// Threefold repetition.
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// Fifty moves by each side without a capture or pawn move.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can possibly deliver mate.
    ///
    /// Covers bare kings, a single minor piece, and any number of bishops
    /// that all stand on squares of one color.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut knights = 0;
        let mut light_bishops = false;
        let mut dark_bishops = false;
        for (sq, piece) in self.pieces() {
            match piece.kind() {
                PieceKind::King => {}
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
                PieceKind::Knight => {
                    minors += 1;
                    knights += 1;
                }
                PieceKind::Bishop => {
                    minors += 1;
                    if sq.is_light() {
                        light_bishops = true;
                    } else {
                        dark_bishops = true;
                    }
                }
            }
        }
        minors <= 1 || (knights == 0 && !(light_bishops && dark_bishops))
    }

    /// Draw by repetition, fifty-move rule or insufficient material.
    ///
    /// Does not include stalemate; see [`Board::is_stalemate`].
    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.is_insufficient_material() || self.is_repetition()
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;

    fn play(board: &mut Board, tokens: &[&str]) {
        for token in tokens {
            let mv = board.parse_move(token).unwrap();
            board.apply(mv);
        }
    }

    #[test]
    fn scholars_mate_is_checkmate() {
        let board: Board = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4"
            .parse()
            .unwrap();
        assert!(board.is_checkmate());
        assert!(!board.is_stalemate());
    }

    #[test]
    fn cornered_king_is_stalemated() {
        let board: Board = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert!(board.is_stalemate());
        assert!(!board.is_checkmate());
    }

    #[test]
    fn threefold_repetition_by_knight_shuffle() {
        let mut board = Board::starting_position();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut board, &shuffle);
        assert_eq!(board.repetition_count(), 1);
        assert!(!board.is_repetition());
        play(&mut board, &shuffle);
        assert_eq!(board.repetition_count(), 2);
        assert!(board.is_repetition());
        assert!(board.is_draw());
    }

    #[test]
    fn pawn_move_resets_repetition_window() {
        let mut board = Board::starting_position();
        play(&mut board, &["g1f3", "g8f6", "f3g1", "f6g8", "e2e4"]);
        assert_eq!(board.repetition_count(), 0);
    }

    #[test]
    fn fifty_move_rule() {
        let board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 100 80".parse().unwrap();
        assert!(board.is_fifty_move_draw());
        assert!(board.is_draw());
    }

    #[test]
    fn insufficient_material_cases() {
        let drawn = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/2B1K3 w - - 0 1",
        ];
        for fen in drawn {
            let board: Board = fen.parse().unwrap();
            assert!(board.is_insufficient_material(), "{fen} should be drawn");
        }
        let alive = [
            "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
            "4k3/8/8/8/8/8/8/3NKN2 w - - 0 1",
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        ];
        for fen in alive {
            let board: Board = fen.parse().unwrap();
            assert!(!board.is_insufficient_material(), "{fen} can still be won");
        }
    }
}
