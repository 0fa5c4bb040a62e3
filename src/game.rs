use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, CastlingRights, GameConfig};
use crate::moves::{square_name, CastleSide, Move};
use crate::piece::{Color, Piece, PieceType};
use crate::visibility::effective_piece;

/// Remaining clock seconds per side. The engine stores the values and
/// consumes the time-expired signal; tick scheduling belongs to the caller.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Timers {
    pub white: u32,
    pub black: u32,
}

impl Default for Timers {
    fn default() -> Self {
        Timers {
            white: 600,
            black: 600,
        }
    }
}

/// Tracks which sides have completed the assassin setup phase.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct AssassinsPlaced {
    pub white: bool,
    pub black: bool,
}

impl AssassinsPlaced {
    pub fn get(&self, color: Color) -> bool {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn set(&mut self, color: Color) {
        match color {
            Color::White => self.white = true,
            Color::Black => self.black = true,
        }
    }
}

/// Pieces each side has captured. Captures of still-hidden assassins are
/// not logged; the log only ever shows what was visible when it was taken.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct CapturedPieces {
    pub by_white: Vec<Piece>,
    pub by_black: Vec<Piece>,
}

impl CapturedPieces {
    pub fn by(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => &self.by_white,
            Color::Black => &self.by_black,
        }
    }

    fn log(&mut self, captor: Color, piece: Piece) {
        match captor {
            Color::White => self.by_white.push(piece),
            Color::Black => self.by_black.push(piece),
        }
    }
}

/// Last executed move, for highlighting. `hidden` marks a non-capturing
/// assassin move whose destination is still concealed, so collaborators can
/// suppress the highlight instead of leaking the square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LastMove {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub hidden: bool,
    pub side: Color,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum WinReason {
    Checkmate,
    KingCaptured,
    Timeout,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameOutcome {
    Win { winner: Color, reason: WinReason },
    Draw(DrawReason),
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Win { winner, reason } => match reason {
                WinReason::Checkmate => write!(f, "{} Wins by Checkmate!", winner.name()),
                WinReason::KingCaptured => write!(f, "{} Wins!", winner.name()),
                WinReason::Timeout => write!(f, "{} wins on time!", winner.name()),
            },
            GameOutcome::Draw(reason) => match reason {
                DrawReason::Stalemate => write!(f, "Draw by Stalemate"),
                DrawReason::InsufficientMaterial => write!(f, "Draw by Insufficient Material"),
                DrawReason::FiftyMoveRule => write!(f, "Draw by Fifty-Move Rule"),
                DrawReason::ThreefoldRepetition => write!(f, "Draw by Threefold Repetition"),
            },
        }
    }
}

/// A pawn is parked on the last rank and the turn is suspended. `notation`
/// holds the move text computed so far; the promotion choice completes it.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PendingPromotion {
    pub square: (usize, usize),
    pub notation: String,
}

/// Where the turn machinery stands. `complete_promotion` is the only exit
/// from `AwaitingPromotion`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TurnPhase {
    Playing,
    AwaitingPromotion(PendingPromotion),
}

/// Why a requested action was rejected. All of these are recoverable: the
/// state is untouched and the caller may retry with different input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveError {
    GameOver,
    PromotionPending,
    NoPendingPromotion,
    InvalidPromotion,
    AssassinNotPlaced,
    AssassinDisabled,
    AlreadyPlaced,
    InvalidPlacement,
    OffBoard,
    EmptySquare,
    OutOfTurn,
    IllegalMove,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            MoveError::GameOver => "the game is already over",
            MoveError::PromotionPending => "a promotion is waiting to be completed",
            MoveError::NoPendingPromotion => "no promotion is pending",
            MoveError::InvalidPromotion => "that piece type cannot be promoted to",
            MoveError::AssassinNotPlaced => "the assassin must be placed first",
            MoveError::AssassinDisabled => "the assassin option is not enabled",
            MoveError::AlreadyPlaced => "this side's assassin is already placed",
            MoveError::InvalidPlacement => "the assassin must go in front of one of your pawns",
            MoveError::OffBoard => "square is off the board",
            MoveError::EmptySquare => "no piece on that square",
            MoveError::OutOfTurn => "that piece does not belong to the side to move",
            MoveError::IllegalMove => "that move is not legal",
        };
        f.write_str(message)
    }
}

impl std::error::Error for MoveError {}

/// Result of a successful `apply_move` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ApplyOutcome {
    /// The move executed and the turn ended.
    Completed,
    /// A pawn reached the last rank; the turn is suspended until
    /// `complete_promotion` is called.
    AwaitingPromotion,
    /// The destination holds the mover's own assassin. Nothing was mutated;
    /// repeat the call via `apply_move_confirmed` to go through with it.
    ConfirmationRequired,
}

/// The full turn-by-turn aggregate. An explicit value — callers own it (or a
/// `GameSession` wrapping it) rather than the crate holding a global.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<(usize, usize)>,
    pub config: GameConfig,
    pub assassins_placed: AssassinsPlaced,
    pub reveal_hidden: bool,
    pub phase: TurnPhase,
    pub outcome: Option<GameOutcome>,
    pub move_list: Vec<String>,
    pub captured: CapturedPieces,
    pub last_move: Option<LastMove>,
    pub halfmove_clock: u32,
    pub position_history: Vec<String>,
    pub timers: Timers,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        GameState {
            board: Board::new(&config),
            turn: Color::White,
            castling: CastlingRights::initial(),
            en_passant: None,
            config,
            assassins_placed: AssassinsPlaced::default(),
            reveal_hidden: false,
            phase: TurnPhase::Playing,
            outcome: None,
            move_list: Vec::new(),
            captured: CapturedPieces::default(),
            last_move: None,
            halfmove_clock: 0,
            position_history: Vec::new(),
            timers: Timers::default(),
        }
    }

    /// Visibility-resolved view of a square on the live board.
    pub fn effective_at(&self, row: usize, col: usize) -> Option<Piece> {
        effective_piece(row, col, &self.board, &self.config)
    }

    /// True while `color` still has to place its assassin before moving.
    pub fn placement_pending(&self, color: Color) -> bool {
        self.config.assassin && !self.assassins_placed.get(color)
    }

    /// Squares where the side to move may currently place its assassin:
    /// directly in front of one of its own still-present home-rank pawns.
    pub fn placement_squares(&self) -> Vec<(usize, usize)> {
        if !self.placement_pending(self.turn) || self.outcome.is_some() {
            return Vec::new();
        }
        let (placement_row, pawn_row) = match self.turn {
            Color::White => (5, 6),
            Color::Black => (2, 1),
        };
        (0..8)
            .filter(|&col| {
                self.board.squares[pawn_row][col]
                    == Some(Piece::new(PieceType::Pawn, self.turn))
                    && self.board.squares[placement_row][col].is_none()
            })
            .map(|col| (placement_row, col))
            .collect()
    }

    /// Places the side-to-move's assassin and ends the turn. The setup phase
    /// is per-color: the opponent may still be waiting to place while this
    /// side already plays real moves.
    pub fn place_assassin(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        if !self.config.assassin {
            return Err(MoveError::AssassinDisabled);
        }
        if self.assassins_placed.get(self.turn) {
            return Err(MoveError::AlreadyPlaced);
        }
        if row >= 8 || col >= 8 {
            return Err(MoveError::OffBoard);
        }
        if !self.placement_squares().contains(&(row, col)) {
            return Err(MoveError::InvalidPlacement);
        }
        self.board.squares[row][col] = Some(Piece::new(PieceType::Assassin, self.turn));
        self.assassins_placed.set(self.turn);
        self.end_turn();
        Ok(())
    }

    pub fn apply_move(&mut self, from: (usize, usize), mv: &Move) -> Result<ApplyOutcome, MoveError> {
        self.apply_move_inner(from, mv, false)
    }

    /// Like `apply_move`, but proceeds through a capture of the mover's own
    /// assassin. Call only after the player explicitly confirmed it.
    pub fn apply_move_confirmed(
        &mut self,
        from: (usize, usize),
        mv: &Move,
    ) -> Result<ApplyOutcome, MoveError> {
        self.apply_move_inner(from, mv, true)
    }

    fn apply_move_inner(
        &mut self,
        from: (usize, usize),
        mv: &Move,
        own_capture_confirmed: bool,
    ) -> Result<ApplyOutcome, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        if matches!(self.phase, TurnPhase::AwaitingPromotion(_)) {
            return Err(MoveError::PromotionPending);
        }
        if self.placement_pending(self.turn) {
            return Err(MoveError::AssassinNotPlaced);
        }
        if from.0 >= 8 || from.1 >= 8 {
            return Err(MoveError::OffBoard);
        }
        let piece = self.board.squares[from.0][from.1].ok_or(MoveError::EmptySquare)?;
        if piece.color != self.turn {
            return Err(MoveError::OutOfTurn);
        }
        if !self.legal_moves(from.0, from.1).contains(mv) {
            return Err(MoveError::IllegalMove);
        }

        let (tr, tc) = mv.to;
        let captured = self.board.squares[tr][tc];

        if let Some(target) = captured {
            if target.color == piece.color
                && target.piece_type == PieceType::Assassin
                && !own_capture_confirmed
            {
                return Ok(ApplyOutcome::ConfirmationRequired);
            }
        }

        // Notation before the board changes: pawn captures as "px", other
        // pieces by letter with "x" on capture, then the destination name.
        let mut notation = if piece.piece_type == PieceType::Pawn {
            if captured.is_some() {
                String::from("px")
            } else {
                String::new()
            }
        } else {
            let mut text = piece.piece_type.letter().to_ascii_uppercase().to_string();
            if captured.is_some() {
                text.push('x');
            }
            text
        };
        notation.push_str(&square_name(tr, tc));

        // En passant removes the pawn from the square it was passed on, not
        // the landing square.
        let victim_square = if mv.en_passant { (from.0, tc) } else { (tr, tc) };
        let victim = if mv.en_passant {
            self.board.squares[from.0][tc]
        } else {
            captured
        };
        if let Some(victim_piece) = victim {
            let visible = victim_piece.piece_type != PieceType::Assassin
                || effective_piece(victim_square.0, victim_square.1, &self.board, &self.config)
                    .is_some();
            if visible {
                self.captured.log(piece.color, victim_piece);
            }
        }

        if piece.piece_type == PieceType::Pawn || victim.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.board.squares[tr][tc] = Some(piece);
        self.board.squares[from.0][from.1] = None;
        if mv.en_passant {
            self.board.squares[from.0][tc] = None;
        }
        if let Some(side) = mv.castle {
            let row = match piece.color {
                Color::White => 7,
                Color::Black => 0,
            };
            let (src, dst) = match side {
                CastleSide::Kingside => (7, 5),
                CastleSide::Queenside => (0, 3),
            };
            self.board.squares[row][dst] = self.board.squares[row][src];
            self.board.squares[row][src] = None;
        }

        if piece.piece_type == PieceType::King {
            self.castling.clear_color(piece.color);
        }
        if piece.piece_type == PieceType::Rook {
            match (piece.color, from) {
                (Color::White, (7, 0)) => self.castling.clear_queenside(Color::White),
                (Color::White, (7, 7)) => self.castling.clear_kingside(Color::White),
                (Color::Black, (0, 0)) => self.castling.clear_queenside(Color::Black),
                (Color::Black, (0, 7)) => self.castling.clear_kingside(Color::Black),
                _ => {}
            }
        }
        // A corner square changing occupants kills that side's right too.
        match (tr, tc) {
            (0, 0) => self.castling.clear_queenside(Color::Black),
            (0, 7) => self.castling.clear_kingside(Color::Black),
            (7, 0) => self.castling.clear_queenside(Color::White),
            (7, 7) => self.castling.clear_kingside(Color::White),
            _ => {}
        }

        self.en_passant = if piece.piece_type == PieceType::Pawn
            && (from.0 as i32 - tr as i32).abs() == 2
        {
            Some(((from.0 + tr) / 2, from.1))
        } else {
            None
        };

        // A non-capturing assassin move whose destination is still concealed
        // must not leak through notation or highlighting.
        let still_hidden = piece.piece_type == PieceType::Assassin
            && captured.is_none()
            && effective_piece(tr, tc, &self.board, &self.config).is_none();
        self.last_move = Some(LastMove {
            from,
            to: (tr, tc),
            hidden: still_hidden,
            side: piece.color,
        });

        if piece.piece_type == PieceType::Pawn && (tr == 0 || tr == 7) {
            self.phase = TurnPhase::AwaitingPromotion(PendingPromotion {
                square: (tr, tc),
                notation,
            });
            return Ok(ApplyOutcome::AwaitingPromotion);
        }

        self.move_list.push(if still_hidden {
            String::from("A??")
        } else {
            notation
        });
        self.end_turn();
        Ok(ApplyOutcome::Completed)
    }

    /// The single legal transition out of `AwaitingPromotion`: put the chosen
    /// piece on the pending square and end the suspended turn.
    pub fn complete_promotion(&mut self, piece_type: PieceType) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }
        let pending = match &self.phase {
            TurnPhase::AwaitingPromotion(pending) => pending.clone(),
            TurnPhase::Playing => return Err(MoveError::NoPendingPromotion),
        };
        let allowed = match piece_type {
            PieceType::Queen | PieceType::Rook | PieceType::Bishop | PieceType::Knight => true,
            PieceType::Triceratops => self.config.triceratops,
            PieceType::Assassin => self.config.assassin,
            PieceType::Pawn | PieceType::King => false,
        };
        if !allowed {
            return Err(MoveError::InvalidPromotion);
        }

        let (row, col) = pending.square;
        self.board.squares[row][col] = Some(Piece::new(piece_type, self.turn));

        let label = piece_type.letter().to_ascii_uppercase();
        let hidden = piece_type == PieceType::Assassin
            && effective_piece(row, col, &self.board, &self.config).is_none();
        self.move_list.push(if hidden {
            format!("A??={label}")
        } else {
            format!("{}={label}", pending.notation)
        });

        self.phase = TurnPhase::Playing;
        self.end_turn();
        Ok(())
    }

    pub fn toggle_reveal_hidden(&mut self) {
        self.reveal_hidden = !self.reveal_hidden;
    }

    /// Consumes the external clock signal: `color` ran out of time.
    pub fn time_expired(&mut self, color: Color) {
        if self.outcome.is_none() {
            self.outcome = Some(GameOutcome::Win {
                winner: color.opposite(),
                reason: WinReason::Timeout,
            });
        }
    }

    /// Repetition key: side to move plus the raw piece codes of all 64
    /// squares in row-major order. Castling and en-passant rights are
    /// deliberately not encoded.
    pub fn position_fingerprint(&self) -> String {
        let mut key = String::with_capacity(70);
        key.push_str(match self.turn {
            Color::White => "white",
            Color::Black => "black",
        });
        key.push(':');
        for row in 0..8 {
            for col in 0..8 {
                match self.board.squares[row][col] {
                    Some(piece) => key.push(piece.to_char()),
                    None => key.push('-'),
                }
            }
        }
        key
    }

    fn end_turn(&mut self) {
        self.reveal_hidden = false;

        // A vanished king should be impossible under legal-move filtering;
        // settle it as a win for the survivor instead of panicking.
        let white_king = self.board.find_king(Color::White);
        let black_king = self.board.find_king(Color::Black);
        if white_king.is_none() || black_king.is_none() {
            let winner = if white_king.is_some() {
                Color::White
            } else {
                Color::Black
            };
            self.outcome = Some(GameOutcome::Win {
                winner,
                reason: WinReason::KingCaptured,
            });
            return;
        }

        self.turn = self.turn.opposite();

        if !self.has_any_legal_move(self.turn) {
            self.outcome = Some(if self.in_check(self.turn) {
                GameOutcome::Win {
                    winner: self.turn.opposite(),
                    reason: WinReason::Checkmate,
                }
            } else {
                GameOutcome::Draw(DrawReason::Stalemate)
            });
        } else if self.insufficient_material() {
            self.outcome = Some(GameOutcome::Draw(DrawReason::InsufficientMaterial));
        } else if self.halfmove_clock >= 100 {
            self.outcome = Some(GameOutcome::Draw(DrawReason::FiftyMoveRule));
        } else {
            let fingerprint = self.position_fingerprint();
            self.position_history.push(fingerprint.clone());
            let occurrences = self
                .position_history
                .iter()
                .filter(|seen| **seen == fingerprint)
                .count();
            if occurrences >= 3 {
                self.outcome = Some(GameOutcome::Draw(DrawReason::ThreefoldRepetition));
            }
        }
    }

    fn insufficient_material(&self) -> bool {
        let mut white = Vec::new();
        let mut black = Vec::new();
        for row in 0..8 {
            for col in 0..8 {
                let piece = match self.board.squares[row][col] {
                    Some(piece) => piece,
                    None => continue,
                };
                if piece.piece_type == PieceType::King {
                    continue;
                }
                // Hidden assassins do not count as visible mating material.
                if self.config.assassin
                    && piece.piece_type == PieceType::Assassin
                    && effective_piece(row, col, &self.board, &self.config).is_none()
                {
                    continue;
                }
                match piece.color {
                    Color::White => white.push(piece.piece_type),
                    Color::Black => black.push(piece.piece_type),
                }
            }
        }

        if white.is_empty() && black.is_empty() {
            return true;
        }
        if white.is_empty() && black.len() == 1 {
            return matches!(black[0], PieceType::Knight | PieceType::Bishop);
        }
        if black.is_empty() && white.len() == 1 {
            return matches!(white[0], PieceType::Knight | PieceType::Bishop);
        }
        // Bishop vs bishop counts regardless of square color.
        white.len() == 1
            && black.len() == 1
            && white[0] == PieceType::Bishop
            && black[0] == PieceType::Bishop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> GameConfig {
        GameConfig {
            timer: false,
            triceratops: false,
            assassin: false,
        }
    }

    fn assassin_config() -> GameConfig {
        GameConfig {
            timer: false,
            triceratops: false,
            assassin: true,
        }
    }

    fn put(state: &mut GameState, row: usize, col: usize, code: char) {
        state.board.squares[row][col] = Some(Piece::from_char(code).unwrap());
    }

    /// Empty board, kings tucked into opposite corners, setup phase done.
    fn sparse_state(config: GameConfig) -> GameState {
        let mut state = GameState::new(config);
        state.board = Board::empty();
        state.assassins_placed = AssassinsPlaced {
            white: true,
            black: true,
        };
        put(&mut state, 7, 7, 'K');
        put(&mut state, 0, 0, 'k');
        state
    }

    #[test]
    fn opening_move_updates_board_turn_and_notation() {
        let mut state = GameState::new(bare_config());
        let outcome = state.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        assert_eq!(outcome, ApplyOutcome::Completed);
        assert_eq!(state.move_list, vec![String::from("e4")]);
        assert_eq!(state.turn, Color::Black);
        assert!(state.board.squares[6][4].is_none());
        assert_eq!(state.board.squares[4][4].map(|p| p.to_char()), Some('P'));
        assert_eq!(state.en_passant, Some((5, 4)));
        assert_eq!(state.halfmove_clock, 0);
        let last = state.last_move.unwrap();
        assert_eq!((last.from, last.to), ((6, 4), (4, 4)));
        assert!(!last.hidden);
    }

    #[test]
    fn rejections_leave_the_state_untouched() {
        let mut state = GameState::new(bare_config());
        let before = state.clone();

        assert_eq!(
            state.apply_move((1, 4), &Move::plain((3, 4))),
            Err(MoveError::OutOfTurn)
        );
        assert_eq!(
            state.apply_move((6, 4), &Move::plain((3, 4))),
            Err(MoveError::IllegalMove)
        );
        assert_eq!(
            state.apply_move((4, 4), &Move::plain((3, 4))),
            Err(MoveError::EmptySquare)
        );
        assert_eq!(
            state.apply_move((9, 9), &Move::plain((3, 4))),
            Err(MoveError::OffBoard)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn pawn_capture_notation_and_log() {
        let mut state = GameState::new(bare_config());
        state.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        state.apply_move((1, 3), &Move::plain((3, 3))).unwrap();
        state.apply_move((4, 4), &Move::plain((3, 3))).unwrap();

        assert_eq!(state.move_list.last().map(String::as_str), Some("pxd5"));
        assert_eq!(
            state.captured.by(Color::White),
            &[Piece::new(PieceType::Pawn, Color::Black)]
        );
    }

    #[test]
    fn castling_relocates_the_rook_and_clears_rights() {
        let mut state = GameState::new(bare_config());
        state.board.squares[7][5] = None;
        state.board.squares[7][6] = None;
        let castle = Move {
            to: (7, 6),
            en_passant: false,
            castle: Some(CastleSide::Kingside),
        };
        state.apply_move((7, 4), &castle).unwrap();

        assert_eq!(state.board.squares[7][6].map(|p| p.to_char()), Some('K'));
        assert_eq!(state.board.squares[7][5].map(|p| p.to_char()), Some('R'));
        assert!(state.board.squares[7][7].is_none());
        assert!(!state.castling.kingside(Color::White));
        assert!(!state.castling.queenside(Color::White));
        assert_eq!(state.move_list, vec![String::from("Kg1")]);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut state = sparse_state(bare_config());
        put(&mut state, 3, 4, 'P');
        put(&mut state, 1, 3, 'p');
        state.turn = Color::Black;

        state.apply_move((1, 3), &Move::plain((3, 3))).unwrap();
        assert_eq!(state.en_passant, Some((2, 3)));

        let capture = Move {
            to: (2, 3),
            en_passant: true,
            castle: None,
        };
        state.apply_move((3, 4), &capture).unwrap();

        assert!(state.board.squares[3][3].is_none(), "victim pawn removed");
        assert_eq!(state.board.squares[2][3].map(|p| p.to_char()), Some('P'));
        assert_eq!(
            state.captured.by(Color::White),
            &[Piece::new(PieceType::Pawn, Color::Black)]
        );
        assert_eq!(state.en_passant, None);
    }

    #[test]
    fn promotion_suspends_the_turn_until_completed() {
        let mut state = sparse_state(bare_config());
        state.board.squares[7][7] = None;
        state.board.squares[0][0] = None;
        put(&mut state, 7, 4, 'K');
        put(&mut state, 0, 4, 'k');
        put(&mut state, 1, 0, 'P');

        let outcome = state.apply_move((1, 0), &Move::plain((0, 0))).unwrap();
        assert_eq!(outcome, ApplyOutcome::AwaitingPromotion);
        assert_eq!(state.turn, Color::White, "turn does not advance yet");
        assert!(state.move_list.is_empty());

        assert_eq!(
            state.apply_move((7, 4), &Move::plain((6, 4))),
            Err(MoveError::PromotionPending)
        );
        assert_eq!(
            state.complete_promotion(PieceType::King),
            Err(MoveError::InvalidPromotion)
        );
        assert_eq!(
            state.complete_promotion(PieceType::Triceratops),
            Err(MoveError::InvalidPromotion),
            "triceratops promotion requires the option"
        );

        state.complete_promotion(PieceType::Queen).unwrap();
        assert_eq!(state.board.squares[0][0].map(|p| p.to_char()), Some('Q'));
        assert_eq!(state.move_list, vec![String::from("a8=Q")]);
        assert_eq!(state.turn, Color::Black);
        assert_eq!(state.outcome, None);
        assert_eq!(state.phase, TurnPhase::Playing);
    }

    #[test]
    fn completing_without_a_pending_promotion_is_rejected() {
        let mut state = GameState::new(bare_config());
        assert_eq!(
            state.complete_promotion(PieceType::Queen),
            Err(MoveError::NoPendingPromotion)
        );
    }

    #[test]
    fn own_assassin_capture_needs_confirmation() {
        let mut state = sparse_state(assassin_config());
        put(&mut state, 7, 3, 'Q');
        put(&mut state, 5, 3, 'A');
        let before = state.clone();

        let mv = Move::plain((5, 3));
        assert_eq!(
            state.apply_move((7, 3), &mv),
            Ok(ApplyOutcome::ConfirmationRequired)
        );
        assert_eq!(state, before, "declining costs nothing");

        assert_eq!(
            state.apply_move_confirmed((7, 3), &mv),
            Ok(ApplyOutcome::Completed)
        );
        assert_eq!(state.board.squares[5][3].map(|p| p.to_char()), Some('Q'));
        assert_eq!(state.turn, Color::Black);
        assert!(
            state.captured.by(Color::White).is_empty(),
            "a hidden assassin never reaches the capture log"
        );
        assert_eq!(state.move_list, vec![String::from("Qxd3")]);
    }

    #[test]
    fn capturing_a_hidden_enemy_assassin_skips_the_log() {
        let mut state = sparse_state(assassin_config());
        put(&mut state, 4, 0, 'R');
        put(&mut state, 4, 3, 'a');

        state.apply_move((4, 0), &Move::plain((4, 3))).unwrap();
        assert_eq!(state.board.squares[4][3].map(|p| p.to_char()), Some('R'));
        assert!(state.captured.by(Color::White).is_empty());
        assert_eq!(state.move_list, vec![String::from("Rxd4")]);
    }

    #[test]
    fn hidden_assassin_moves_are_masked_in_notation() {
        let mut state = sparse_state(assassin_config());
        put(&mut state, 5, 4, 'A');
        put(&mut state, 0, 5, 'r'); // keeps black above bare-kings material

        state.apply_move((5, 4), &Move::plain((3, 4))).unwrap();
        assert_eq!(state.move_list, vec![String::from("A??")]);
        let last = state.last_move.unwrap();
        assert!(last.hidden);
    }

    #[test]
    fn revealed_assassin_moves_use_real_notation() {
        let mut state = sparse_state(assassin_config());
        put(&mut state, 5, 4, 'A');
        put(&mut state, 6, 2, 'p'); // advanced pawn keeps the assassin revealed

        state.apply_move((5, 4), &Move::plain((3, 4))).unwrap();
        assert_eq!(state.move_list, vec![String::from("Ae5")]);
        let last = state.last_move.unwrap();
        assert!(!last.hidden);
    }

    #[test]
    fn placement_phase_gates_normal_moves() {
        let mut state = GameState::new(assassin_config());

        assert_eq!(
            state.apply_move((6, 4), &Move::plain((4, 4))),
            Err(MoveError::AssassinNotPlaced)
        );
        assert_eq!(
            state.place_assassin(3, 3),
            Err(MoveError::InvalidPlacement)
        );
        assert!(state
            .placement_squares()
            .iter()
            .all(|&(row, _)| row == 5));

        state.place_assassin(5, 4).unwrap();
        assert_eq!(state.board.squares[5][4].map(|p| p.to_char()), Some('A'));
        assert!(state.assassins_placed.white);
        assert_eq!(state.turn, Color::Black);

        assert_eq!(
            state.apply_move((1, 4), &Move::plain((3, 4))),
            Err(MoveError::AssassinNotPlaced)
        );
        state.place_assassin(2, 3).unwrap();
        assert_eq!(state.turn, Color::White);
        assert_eq!(state.place_assassin(5, 0), Err(MoveError::AlreadyPlaced));

        // Setup done on both sides: real moves flow again.
        state.apply_move((6, 0), &Move::plain((4, 0))).unwrap();
        assert_eq!(state.turn, Color::Black);
    }

    #[test]
    fn fools_mate_is_detected() {
        let mut state = GameState::new(bare_config());
        state.apply_move((6, 5), &Move::plain((5, 5))).unwrap();
        state.apply_move((1, 4), &Move::plain((3, 4))).unwrap();
        state.apply_move((6, 6), &Move::plain((4, 6))).unwrap();
        state.apply_move((0, 3), &Move::plain((4, 7))).unwrap();

        assert_eq!(
            state.outcome,
            Some(GameOutcome::Win {
                winner: Color::Black,
                reason: WinReason::Checkmate,
            })
        );
        assert_eq!(
            state.outcome.unwrap().to_string(),
            "Black Wins by Checkmate!"
        );
        assert_eq!(
            state.apply_move((6, 0), &Move::plain((5, 0))),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn stalemate_is_a_draw() {
        let mut state = sparse_state(bare_config());
        state.board.squares[7][7] = None;
        put(&mut state, 2, 1, 'K');
        put(&mut state, 5, 2, 'Q');

        state.apply_move((5, 2), &Move::plain((1, 2))).unwrap();
        assert_eq!(state.outcome, Some(GameOutcome::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn bare_kings_draw_by_insufficient_material() {
        let mut state = sparse_state(bare_config());
        state.board.squares[7][7] = None;
        state.board.squares[0][0] = None;
        put(&mut state, 7, 0, 'K');
        put(&mut state, 3, 4, 'k');
        put(&mut state, 4, 4, 'N');
        state.turn = Color::Black;

        state.apply_move((3, 4), &Move::plain((4, 4))).unwrap();
        assert_eq!(
            state.outcome,
            Some(GameOutcome::Draw(DrawReason::InsufficientMaterial))
        );
        assert_eq!(
            state.captured.by(Color::Black),
            &[Piece::new(PieceType::Knight, Color::White)]
        );
    }

    #[test]
    fn halfmove_clock_triggers_the_fifty_move_rule() {
        let mut state = sparse_state(bare_config());
        state.board.squares[7][7] = None;
        state.board.squares[0][0] = None;
        put(&mut state, 7, 4, 'K');
        put(&mut state, 0, 4, 'k');
        put(&mut state, 4, 0, 'R');
        put(&mut state, 3, 7, 'r');
        state.halfmove_clock = 99;

        state.apply_move((4, 0), &Move::plain((4, 1))).unwrap();
        assert_eq!(state.halfmove_clock, 100);
        assert_eq!(
            state.outcome,
            Some(GameOutcome::Draw(DrawReason::FiftyMoveRule))
        );
    }

    #[test]
    fn threefold_repetition_needs_the_third_occurrence() {
        let mut state = GameState::new(bare_config());
        let shuffle: [((usize, usize), (usize, usize)); 4] = [
            ((7, 1), (5, 2)),
            ((0, 1), (2, 2)),
            ((5, 2), (7, 1)),
            ((2, 2), (0, 1)),
        ];

        for round in 0..2 {
            for (from, to) in shuffle {
                state.apply_move(from, &Move::plain(to)).unwrap();
                assert_eq!(state.outcome, None, "no draw in round {round}");
            }
        }

        // The ninth half-move creates the third occurrence of the position
        // after 1.Nc3.
        state.apply_move((7, 1), &Move::plain((5, 2))).unwrap();
        assert_eq!(
            state.outcome,
            Some(GameOutcome::Draw(DrawReason::ThreefoldRepetition))
        );
    }

    #[test]
    fn missing_king_is_an_immediate_win() {
        let mut state = sparse_state(bare_config());
        state.board.squares[0][0] = None; // no black king at all
        put(&mut state, 0, 0, 'r');
        put(&mut state, 4, 0, 'R');

        // Any completed move trips the defensive check without flipping the
        // turn.
        let mv = state
            .legal_moves(4, 0)
            .into_iter()
            .find(|mv| mv.to == (4, 1))
            .unwrap();
        state.apply_move((4, 0), &mv).unwrap();
        assert_eq!(
            state.outcome,
            Some(GameOutcome::Win {
                winner: Color::White,
                reason: WinReason::KingCaptured,
            })
        );
        assert_eq!(state.turn, Color::White);
    }

    #[test]
    fn fingerprint_encodes_turn_and_placement() {
        let state = GameState::new(bare_config());
        let fingerprint = state.position_fingerprint();
        assert!(fingerprint.starts_with("white:rnbqkbnr"));
        assert_eq!(fingerprint.len(), "white:".len() + 64);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn random_playouts_never_leave_the_mover_in_check() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..15 {
            let mut state = GameState::new(GameConfig {
                timer: false,
                triceratops: true,
                assassin: false,
            });
            for _ in 0..120 {
                if state.outcome.is_some() {
                    break;
                }
                let mut options = Vec::new();
                for row in 0..8 {
                    for col in 0..8 {
                        match state.board.squares[row][col] {
                            Some(piece) if piece.color == state.turn => {}
                            _ => continue,
                        }
                        for mv in state.legal_moves(row, col) {
                            options.push(((row, col), mv));
                        }
                    }
                }
                assert!(!options.is_empty(), "live games always have a move");
                let (from, mv) = options[rng.gen_range(0..options.len())];
                let mover = state.turn;
                let outcome = state.apply_move_confirmed(from, &mv).unwrap();
                if outcome == ApplyOutcome::AwaitingPromotion {
                    state.complete_promotion(PieceType::Queen).unwrap();
                }
                assert!(
                    !state.in_check(mover),
                    "a legal move left the mover in check"
                );
            }
        }
    }
}

