use serde::{Deserialize, Serialize};

/// Which rook a two-square king move pairs with.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CastleSide {
    #[serde(rename = "k")]
    Kingside,
    #[serde(rename = "q")]
    Queenside,
}

/// A destination square plus the flags needed to execute the move. The
/// origin square is supplied separately when applying. Promotion is not
/// encoded here: a pawn reaching the last rank suspends the turn until a
/// piece type is chosen.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Move {
    pub to: (usize, usize),
    #[serde(default)]
    pub en_passant: bool,
    #[serde(default)]
    pub castle: Option<CastleSide>,
}

impl Move {
    pub fn plain(to: (usize, usize)) -> Move {
        Move {
            to,
            en_passant: false,
            castle: None,
        }
    }
}

/// Square name in file-rank form, e.g. (7, 4) -> "e1", (0, 0) -> "a8".
pub fn square_name(row: usize, col: usize) -> String {
    let file = (b'a' + col as u8) as char;
    let rank = 8 - row;
    format!("{file}{rank}")
}
