use serde::{Deserialize, Serialize};

use crate::piece::{Color, Piece, PieceType};

/// Options chosen at game start. Immutable for the lifetime of a game; they
/// travel with snapshots, saved games and network state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub timer: bool,
    pub triceratops: bool,
    pub assassin: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            timer: true,
            triceratops: false,
            assassin: false,
        }
    }
}

/// Per-color kingside/queenside availability. Flags are only ever cleared:
/// by a king move, a rook leaving its corner, or the corner square's
/// occupant being replaced.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn initial() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn clear_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    pub fn clear_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        self.clear_kingside(color);
        self.clear_queenside(color);
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Pure 8x8 grid. Row 0 is black's back rank, row 7 white's; columns run
/// file a through file h. Placement only — legality lives in the move
/// generator.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl Board {
    /// Board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    pub fn new(config: &GameConfig) -> Self {
        let mut board = Board::empty();

        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(piece_type, Color::Black));
            board.squares[7][col] = Some(Piece::new(piece_type, Color::White));
        }
        for col in 0..8 {
            board.squares[1][col] = Some(Piece::new(PieceType::Pawn, Color::Black));
            board.squares[6][col] = Some(Piece::new(PieceType::Pawn, Color::White));
        }

        // Triceratopses start on the king file, one rank ahead of the pawns.
        if config.triceratops {
            board.squares[2][4] = Some(Piece::new(PieceType::Triceratops, Color::Black));
            board.squares[5][4] = Some(Piece::new(PieceType::Triceratops, Color::White));
        }

        board
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn find_king(&self, color: Color) -> Option<(usize, usize)> {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.piece_type == PieceType::King && p.color == color {
                        return Some((r, c));
                    }
                }
            }
        }
        None
    }
}
