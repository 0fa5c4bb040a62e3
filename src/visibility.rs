use crate::board::{Board, GameConfig};
use crate::piece::{Color, Piece, PieceType};

/// The piece that rule evaluation may observe at a square.
///
/// Assassins are invisible until an enemy pawn either threatens them
/// diagonally forward or has advanced past their rank. Move generation,
/// attack detection and capture logging must all look through this function
/// instead of reading the board directly; when simulating a hypothetical
/// position, callers pass the real board here so stealth is judged against
/// the actual game, not the simulation.
pub fn effective_piece(
    row: usize,
    col: usize,
    board: &Board,
    config: &GameConfig,
) -> Option<Piece> {
    if row >= 8 || col >= 8 {
        return None;
    }
    let piece = board.squares[row][col]?;
    if !config.assassin || piece.piece_type != PieceType::Assassin {
        return Some(piece);
    }

    let enemy = piece.color.opposite();
    // White pawns advance toward row 0, black pawns toward row 7.
    let forward: i32 = match enemy {
        Color::White => -1,
        Color::Black => 1,
    };

    for pr in 0..8usize {
        for pc in 0..8usize {
            match board.squares[pr][pc] {
                Some(p) if p.piece_type == PieceType::Pawn && p.color == enemy => {}
                _ => continue,
            }
            // Revealed when the pawn's forward diagonal lands on the assassin.
            let threat_row = pr as i32 + forward;
            if threat_row == row as i32 && (pc as i32 - col as i32).abs() == 1 {
                return Some(piece);
            }
            // Revealed once any enemy pawn has advanced beyond the
            // assassin's rank.
            let advanced_past = match enemy {
                Color::White => pr < row,
                Color::Black => pr > row,
            };
            if advanced_past {
                return Some(piece);
            }
        }
    }

    None
}
