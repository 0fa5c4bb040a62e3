use crate::board::Board;
use crate::game::GameState;
use crate::moves::{CastleSide, Move};
use crate::piece::{Color, Piece, PieceType};
use crate::visibility::effective_piece;

pub const KNIGHT_JUMPS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const ALL_DIRECTIONS: [(i32, i32); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
];

impl GameState {
    /// Moves satisfying piece shape and blocking rules, before king-safety
    /// filtering. `board` may be a scratch copy; visibility is resolved
    /// against it. Castling generation is gated on `allow_castle` so attack
    /// detection does not recurse through the king-safety checks.
    pub fn pseudo_moves(
        &self,
        row: usize,
        col: usize,
        piece: Piece,
        board: &Board,
        allow_castle: bool,
    ) -> Vec<Move> {
        let mut moves = Vec::new();
        match piece.piece_type {
            PieceType::Pawn => self.pawn_moves(row, col, piece.color, board, &mut moves),
            PieceType::Assassin => self.assassin_moves(row, col, piece.color, board, &mut moves),
            _ => {
                if matches!(
                    piece.piece_type,
                    PieceType::Knight | PieceType::Triceratops
                ) {
                    for (dr, dc) in KNIGHT_JUMPS {
                        let (tr, tc) = (row as i32 + dr, col as i32 + dc);
                        if !Board::in_bounds(tr, tc) {
                            continue;
                        }
                        let target = effective_piece(tr as usize, tc as usize, board, &self.config);
                        if target.map_or(true, |t| t.color != piece.color) {
                            push_move(board, piece.color, &mut moves, tr, tc, false, None);
                        }
                    }
                }
                if piece.piece_type != PieceType::Knight {
                    let directions: &[(i32, i32)] = match piece.piece_type {
                        PieceType::Bishop => &DIAGONALS,
                        PieceType::Rook => &ORTHOGONALS,
                        _ => &ALL_DIRECTIONS,
                    };
                    let slides = matches!(
                        piece.piece_type,
                        PieceType::Bishop
                            | PieceType::Rook
                            | PieceType::Queen
                            | PieceType::Triceratops
                    );
                    for &(dr, dc) in directions {
                        let (mut tr, mut tc) = (row as i32 + dr, col as i32 + dc);
                        while Board::in_bounds(tr, tc) {
                            match effective_piece(tr as usize, tc as usize, board, &self.config) {
                                Some(target) => {
                                    if target.color != piece.color {
                                        push_move(board, piece.color, &mut moves, tr, tc, false, None);
                                    }
                                    break;
                                }
                                None => {
                                    push_move(board, piece.color, &mut moves, tr, tc, false, None)
                                }
                            }
                            if !slides {
                                break;
                            }
                            tr += dr;
                            tc += dc;
                        }
                    }
                    if piece.piece_type == PieceType::King
                        && allow_castle
                        && !self.is_attacked((row, col), piece.color, board, board)
                    {
                        self.castle_moves(row, col, piece.color, board, &mut moves);
                    }
                }
            }
        }
        moves
    }

    fn pawn_moves(
        &self,
        row: usize,
        col: usize,
        color: Color,
        board: &Board,
        moves: &mut Vec<Move>,
    ) {
        let (dir, home_row): (i32, usize) = match color {
            Color::White => (-1, 6),
            Color::Black => (1, 1),
        };

        let forward = row as i32 + dir;
        if Board::in_bounds(forward, col as i32)
            && effective_piece(forward as usize, col, board, &self.config).is_none()
        {
            push_move(board, color, moves, forward, col as i32, false, None);
            if row == home_row {
                let double = forward + dir;
                if Board::in_bounds(double, col as i32)
                    && effective_piece(double as usize, col, board, &self.config).is_none()
                {
                    push_move(board, color, moves, double, col as i32, false, None);
                }
            }
        }

        for dc in [-1i32, 1] {
            let (tr, tc) = (forward, col as i32 + dc);
            if !Board::in_bounds(tr, tc) {
                continue;
            }
            if let Some(target) = effective_piece(tr as usize, tc as usize, board, &self.config) {
                if target.color != color {
                    push_move(board, color, moves, tr, tc, false, None);
                }
            }
            if self.en_passant == Some((tr as usize, tc as usize)) {
                push_move(board, color, moves, tr, tc, true, None);
            }
        }
    }

    /// Assassin reach: within Chebyshev distance 2. Distance-2 destinations
    /// must look empty (the jump clears any occupant); distance-1 squares
    /// allow steps and captures of visible enemies.
    fn assassin_moves(
        &self,
        row: usize,
        col: usize,
        color: Color,
        board: &Board,
        moves: &mut Vec<Move>,
    ) {
        for dr in -2..=2i32 {
            for dc in -2..=2i32 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let (tr, tc) = (row as i32 + dr, col as i32 + dc);
                if !Board::in_bounds(tr, tc) {
                    continue;
                }
                let distance = dr.abs().max(dc.abs());
                let target = effective_piece(tr as usize, tc as usize, board, &self.config);
                if distance == 2 {
                    if target.is_none() {
                        push_move(board, color, moves, tr, tc, false, None);
                    }
                } else if target.map_or(true, |t| t.color != color) {
                    push_move(board, color, moves, tr, tc, false, None);
                }
            }
        }
    }

    fn castle_moves(
        &self,
        row: usize,
        col: usize,
        color: Color,
        board: &Board,
        moves: &mut Vec<Move>,
    ) {
        let back_rank = match color {
            Color::White => 7,
            Color::Black => 0,
        };
        if row != back_rank || col != 4 {
            return;
        }
        let clear = |cols: &[usize]| {
            cols.iter()
                .all(|&c| effective_piece(back_rank, c, board, &self.config).is_none())
        };
        // The destination square's safety is enforced by the legal filter,
        // which simulates the king standing there.
        if self.castling.kingside(color)
            && clear(&[5, 6])
            && !self.is_attacked((back_rank, 5), color, board, board)
        {
            moves.push(Move {
                to: (back_rank, 6),
                en_passant: false,
                castle: Some(CastleSide::Kingside),
            });
        }
        if self.castling.queenside(color)
            && clear(&[1, 2, 3])
            && !self.is_attacked((back_rank, 3), color, board, board)
        {
            moves.push(Move {
                to: (back_rank, 2),
                en_passant: false,
                castle: Some(CastleSide::Queenside),
            });
        }
    }

    /// Pseudo-moves for the piece on (row, col) of the live board, minus any
    /// that would leave its own king attacked. Simulation relocates the piece
    /// (and removes an en-passant victim) on a scratch board; stealth is
    /// still judged against the real position.
    pub fn legal_moves(&self, row: usize, col: usize) -> Vec<Move> {
        if row >= 8 || col >= 8 {
            return Vec::new();
        }
        let piece = match self.board.squares[row][col] {
            Some(piece) => piece,
            None => return Vec::new(),
        };
        self.pseudo_moves(row, col, piece, &self.board, true)
            .into_iter()
            .filter(|mv| {
                let mut sim = self.board.clone();
                let (tr, tc) = mv.to;
                sim.squares[tr][tc] = sim.squares[row][col];
                sim.squares[row][col] = None;
                if mv.en_passant {
                    sim.squares[row][tc] = None;
                }
                // Castling already verified its squares; the rook stays put
                // for the simulation.
                match sim.find_king(piece.color) {
                    Some(king) => !self.is_attacked(king, piece.color, &sim, &self.board),
                    None => false,
                }
            })
            .collect()
    }

    /// True if any enemy piece's pseudo-move set covers `target`. Assassins
    /// hidden per the `visibility` board threaten nothing; castling is
    /// disabled to avoid recursing through the king-safety checks.
    pub fn is_attacked(
        &self,
        target: (usize, usize),
        color: Color,
        board: &Board,
        visibility: &Board,
    ) -> bool {
        for r in 0..8 {
            for c in 0..8 {
                let piece = match board.squares[r][c] {
                    Some(piece) if piece.color != color => piece,
                    _ => continue,
                };
                if self.config.assassin
                    && piece.piece_type == PieceType::Assassin
                    && effective_piece(r, c, visibility, &self.config).is_none()
                {
                    continue;
                }
                if self
                    .pseudo_moves(r, c, piece, board, false)
                    .iter()
                    .any(|mv| mv.to == target)
                {
                    return true;
                }
            }
        }
        false
    }

    pub fn in_check(&self, color: Color) -> bool {
        match self.board.find_king(color) {
            Some(king) => self.is_attacked(king, color, &self.board, &self.board),
            None => false,
        }
    }

    pub(crate) fn has_any_legal_move(&self, color: Color) -> bool {
        for row in 0..8 {
            for col in 0..8 {
                match self.board.squares[row][col] {
                    Some(piece) if piece.color == color => {}
                    _ => continue,
                }
                if !self.legal_moves(row, col).is_empty() {
                    return true;
                }
            }
        }
        false
    }
}

/// Shared landing filter: own pieces block, except an own assassin — that
/// collision is generated here and confirmed at execution time.
fn push_move(
    board: &Board,
    color: Color,
    moves: &mut Vec<Move>,
    tr: i32,
    tc: i32,
    en_passant: bool,
    castle: Option<CastleSide>,
) {
    if !Board::in_bounds(tr, tc) {
        return;
    }
    let (tr, tc) = (tr as usize, tc as usize);
    if let Some(occupant) = board.squares[tr][tc] {
        if occupant.color == color && occupant.piece_type != PieceType::Assassin {
            return;
        }
    }
    moves.push(Move {
        to: (tr, tc),
        en_passant,
        castle,
    });
}
