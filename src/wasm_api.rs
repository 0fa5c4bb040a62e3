use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::board::GameConfig;
use crate::game::{ApplyOutcome, GameState, TurnPhase};
use crate::piece::{Color, PieceType};
use crate::session::GameSession;
use crate::sync::SyncMessage;
use crate::visibility::effective_piece;

#[derive(Serialize)]
struct SquarePiece {
    code: String,
    color: String,
    /// True for an assassin the stealth rules currently conceal. The UI
    /// decides whether to draw it (own side, reveal toggle) or not.
    hidden: bool,
}

#[derive(Serialize)]
struct MoveJson {
    to: [usize; 2],
    en_passant: bool,
    castle: Option<String>,
}

#[derive(Serialize)]
struct LastMoveJson {
    from: [usize; 2],
    to: [usize; 2],
    hidden: bool,
    side: String,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    game_over: bool,
    result: Option<String>,
    is_in_check: bool,
    awaiting_promotion: bool,
    placement_pending: bool,
    placement_squares: Vec<[usize; 2]>,
    reveal_hidden: bool,
    move_list: Vec<String>,
    captured_white: Vec<String>,
    captured_black: Vec<String>,
    last_move: Option<LastMoveJson>,
    timer_white: u32,
    timer_black: u32,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    needs_confirmation: bool,
    error: Option<String>,
}

fn color_to_string(color: Color) -> String {
    color.to_string()
}

fn string_to_color(value: &str) -> Option<Color> {
    match value {
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        _ => None,
    }
}

fn string_to_piece_type(value: &str) -> Option<PieceType> {
    value.chars().next().and_then(PieceType::from_letter)
}

fn castle_to_string(mv: &crate::moves::Move) -> Option<String> {
    mv.castle.map(|side| {
        match side {
            crate::moves::CastleSide::Kingside => "k",
            crate::moves::CastleSide::Queenside => "q",
        }
        .to_string()
    })
}

fn build_board_state(state: &GameState) -> BoardState {
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    state.board.squares[r][c].map(|p| SquarePiece {
                        code: p.to_char().to_string(),
                        color: color_to_string(p.color),
                        hidden: p.piece_type == PieceType::Assassin
                            && effective_piece(r, c, &state.board, &state.config).is_none(),
                    })
                })
                .collect()
        })
        .collect();

    BoardState {
        squares,
        current_turn: color_to_string(state.turn),
        game_over: state.outcome.is_some(),
        result: state.outcome.map(|outcome| outcome.to_string()),
        is_in_check: state.in_check(state.turn),
        awaiting_promotion: matches!(state.phase, TurnPhase::AwaitingPromotion(_)),
        placement_pending: state.placement_pending(state.turn),
        placement_squares: state
            .placement_squares()
            .into_iter()
            .map(|(r, c)| [r, c])
            .collect(),
        reveal_hidden: state.reveal_hidden,
        move_list: state.move_list.clone(),
        captured_white: state
            .captured
            .by(Color::White)
            .iter()
            .map(|p| p.to_char().to_string())
            .collect(),
        captured_black: state
            .captured
            .by(Color::Black)
            .iter()
            .map(|p| p.to_char().to_string())
            .collect(),
        last_move: state.last_move.map(|last| LastMoveJson {
            from: [last.from.0, last.from.1],
            to: [last.to.0, last.to.1],
            hidden: last.hidden,
            side: color_to_string(last.side),
        }),
        timer_white: state.timers.white,
        timer_black: state.timers.black,
    }
}

fn state_value(state: &GameState) -> JsValue {
    serde_wasm_bindgen::to_value(&build_board_state(state)).unwrap_or(JsValue::NULL)
}

fn error_value(message: &str) -> JsValue {
    let result = MoveResult {
        board_state: None,
        needs_confirmation: false,
        error: Some(message.to_string()),
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn confirmation_value() -> JsValue {
    let result = MoveResult {
        board_state: None,
        needs_confirmation: true,
        error: None,
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct Game {
    session: GameSession,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new(timer: bool, triceratops: bool, assassin: bool) -> Game {
        Game {
            session: GameSession::new(GameConfig {
                timer,
                triceratops,
                assassin,
            }),
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        state_value(&self.session.state)
    }

    pub fn get_legal_moves(&self, row: usize, col: usize) -> JsValue {
        let moves: Vec<MoveJson> = self
            .session
            .state
            .legal_moves(row, col)
            .iter()
            .map(|mv| MoveJson {
                to: [mv.to.0, mv.to.1],
                en_passant: mv.en_passant,
                castle: castle_to_string(mv),
            })
            .collect();
        serde_wasm_bindgen::to_value(&moves).unwrap_or(JsValue::NULL)
    }

    /// Applies the legal move from (from_row, from_col) to (to_row, to_col).
    /// Returns the new board state, `needs_confirmation` when the move would
    /// capture the mover's own assassin, or an error string.
    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        confirmed: bool,
    ) -> JsValue {
        let matching = self
            .session
            .state
            .legal_moves(from_row, from_col)
            .into_iter()
            .find(|mv| mv.to == (to_row, to_col));
        let mv = match matching {
            Some(mv) => mv,
            None => return error_value("Illegal move"),
        };

        let applied = if confirmed {
            self.session.apply_move_confirmed((from_row, from_col), &mv)
        } else {
            self.session.apply_move((from_row, from_col), &mv)
        };
        match applied {
            Ok(ApplyOutcome::ConfirmationRequired) => confirmation_value(),
            Ok(_) => state_value(&self.session.state),
            Err(err) => error_value(&err.to_string()),
        }
    }

    pub fn complete_promotion(&mut self, piece: &str) -> JsValue {
        let piece_type = match string_to_piece_type(piece) {
            Some(piece_type) => piece_type,
            None => return error_value("Unknown piece type"),
        };
        match self.session.complete_promotion(piece_type) {
            Ok(()) => state_value(&self.session.state),
            Err(err) => error_value(&err.to_string()),
        }
    }

    pub fn place_assassin(&mut self, row: usize, col: usize) -> JsValue {
        match self.session.place_assassin(row, col) {
            Ok(()) => state_value(&self.session.state),
            Err(err) => error_value(&err.to_string()),
        }
    }

    pub fn toggle_reveal_hidden(&mut self) -> JsValue {
        self.session.state.toggle_reveal_hidden();
        state_value(&self.session.state)
    }

    pub fn undo(&mut self) -> JsValue {
        self.session.undo();
        state_value(&self.session.state)
    }

    pub fn redo(&mut self) -> JsValue {
        self.session.redo();
        state_value(&self.session.state)
    }

    pub fn time_expired(&mut self, color: &str) -> JsValue {
        match string_to_color(color) {
            Some(color) => {
                self.session.time_expired(color);
                state_value(&self.session.state)
            }
            None => error_value("Unknown color"),
        }
    }

    pub fn set_timer(&mut self, color: &str, seconds: u32) {
        match string_to_color(color) {
            Some(Color::White) => self.session.state.timers.white = seconds,
            Some(Color::Black) => self.session.state.timers.black = seconds,
            None => {}
        }
    }

    /// Serializes the whole session (state plus history) for saving.
    pub fn save(&self) -> Option<String> {
        self.session.to_json().ok()
    }

    /// Loads a saved session. On parse failure the current game stays live.
    pub fn load(&mut self, data: &str) -> JsValue {
        match GameSession::from_json(data) {
            Ok(session) => {
                self.session = session;
                state_value(&self.session.state)
            }
            Err(err) => error_value(&format!("Could not load game: {err}")),
        }
    }

    /// Full-state message for the peer channel.
    pub fn export_sync(&self) -> Option<String> {
        SyncMessage::State {
            state: self.session.clone(),
        }
        .encode()
        .ok()
    }

    /// Applies a full-state message from the peer. Malformed data leaves the
    /// current game untouched.
    pub fn apply_sync(&mut self, data: &str) -> JsValue {
        match SyncMessage::decode(data) {
            Ok(SyncMessage::State { state }) => {
                self.session = state;
                state_value(&self.session.state)
            }
            Err(err) => error_value(&format!("Bad sync message: {err}")),
        }
    }
}
