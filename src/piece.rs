use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Capitalized side name as shown in result strings ("White Wins!").
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kinds, including the two optional variant pieces. Triceratops and
/// assassin only appear on the board when the matching config flag is on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Triceratops,
    Assassin,
}

impl PieceType {
    /// Lowercase code letter used in notation, fingerprints and saved games.
    pub fn letter(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
            PieceType::Triceratops => 't',
            PieceType::Assassin => 'a',
        }
    }

    pub fn from_letter(letter: char) -> Option<PieceType> {
        match letter.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            't' => Some(PieceType::Triceratops),
            'a' => Some(PieceType::Assassin),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    /// Single-character code: uppercase for white, lowercase for black.
    pub fn to_char(self) -> char {
        match self.color {
            Color::White => self.piece_type.letter().to_ascii_uppercase(),
            Color::Black => self.piece_type.letter(),
        }
    }

    pub fn from_char(code: char) -> Option<Piece> {
        let piece_type = PieceType::from_letter(code)?;
        let color = if code.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(piece_type, color))
    }
}

// Pieces cross the persistence/wire boundary in the single-character
// case-as-color form: saved games and sync payloads carry boards as arrays
// of "P"/"a"/null. Everywhere else the explicit struct is used.
impl Serialize for Piece {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.to_char())
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Piece, D::Error> {
        struct PieceVisitor;

        impl Visitor<'_> for PieceVisitor {
            type Value = Piece;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single piece-code character")
            }

            fn visit_char<E: de::Error>(self, code: char) -> Result<Piece, E> {
                Piece::from_char(code)
                    .ok_or_else(|| E::custom(format!("unknown piece code {code:?}")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Piece, E> {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(code), None) => self.visit_char(code),
                    _ => Err(E::custom(format!("unknown piece code {value:?}"))),
                }
            }
        }

        deserializer.deserialize_char(PieceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_codes_round_trip() {
        let types = [
            PieceType::Pawn,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
            PieceType::Triceratops,
            PieceType::Assassin,
        ];
        for piece_type in types {
            for color in [Color::White, Color::Black] {
                let piece = Piece::new(piece_type, color);
                assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
            }
        }
    }

    #[test]
    fn case_encodes_color() {
        assert_eq!(
            Piece::from_char('P'),
            Some(Piece::new(PieceType::Pawn, Color::White))
        );
        assert_eq!(
            Piece::from_char('t'),
            Some(Piece::new(PieceType::Triceratops, Color::Black))
        );
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn serializes_as_single_character() {
        let queen = Piece::new(PieceType::Queen, Color::White);
        let json = serde_json::to_string(&queen).unwrap();
        assert_eq!(json, "\"Q\"");
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, queen);
    }
}
