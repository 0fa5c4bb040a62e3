use serde::{Deserialize, Serialize};

use crate::board::GameConfig;
use crate::game::{ApplyOutcome, GameState, MoveError};
use crate::history::{History, Snapshot};
use crate::moves::Move;
use crate::piece::{Color, PieceType};

/// A live game plus its undo/redo history: the collaborator-facing handle
/// and the unit of persistence and network synchronization. Every completed
/// turn is snapshotted here; suspended turns (pending promotion or an
/// unconfirmed own-assassin capture) are not.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GameSession {
    pub state: GameState,
    pub history: History,
}

impl GameSession {
    pub fn new(config: GameConfig) -> GameSession {
        let state = GameState::new(config);
        let history = History::new(Snapshot::of(&state));
        GameSession { state, history }
    }

    pub fn apply_move(&mut self, from: (usize, usize), mv: &Move) -> Result<ApplyOutcome, MoveError> {
        let outcome = self.state.apply_move(from, mv)?;
        if outcome == ApplyOutcome::Completed {
            self.record();
        }
        Ok(outcome)
    }

    pub fn apply_move_confirmed(
        &mut self,
        from: (usize, usize),
        mv: &Move,
    ) -> Result<ApplyOutcome, MoveError> {
        let outcome = self.state.apply_move_confirmed(from, mv)?;
        if outcome == ApplyOutcome::Completed {
            self.record();
        }
        Ok(outcome)
    }

    pub fn complete_promotion(&mut self, piece_type: PieceType) -> Result<(), MoveError> {
        self.state.complete_promotion(piece_type)?;
        self.record();
        Ok(())
    }

    pub fn place_assassin(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        self.state.place_assassin(row, col)?;
        self.record();
        Ok(())
    }

    /// Steps back one completed turn. Whether undo is allowed at all (e.g.
    /// it is disabled during network play) is the caller's policy.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.state);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.state);
                true
            }
            None => false,
        }
    }

    /// Restores the recorded turn at `index` into the live state.
    pub fn restore(&mut self, index: usize) -> bool {
        match self.history.jump_to(index) {
            Some(snapshot) => {
                snapshot.restore_into(&mut self.state);
                true
            }
            None => false,
        }
    }

    /// Records the live state as a new history entry. Completed turns are
    /// snapshotted automatically; this is for callers that mutate state out
    /// of band (e.g. adjusting clocks) and want a checkpoint.
    pub fn snapshot(&mut self) {
        self.record();
    }

    pub fn time_expired(&mut self, color: Color) {
        self.state.time_expired(color);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a persisted or received session. On failure nothing is
    /// mutated anywhere — the caller keeps its current game and only swaps
    /// in the returned value on success.
    pub fn from_json(data: &str) -> Result<GameSession, serde_json::Error> {
        serde_json::from_str(data)
    }

    fn record(&mut self) {
        self.history.record(Snapshot::of(&self.state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameOutcome;
    use crate::moves::Move;

    fn bare_config() -> GameConfig {
        GameConfig {
            timer: false,
            triceratops: false,
            assassin: false,
        }
    }

    #[test]
    fn undo_rewinds_a_move_and_redo_replays_it() {
        let mut session = GameSession::new(bare_config());
        let initial = session.state.clone();

        session
            .apply_move((6, 4), &Move::plain((4, 4)))
            .expect("e4 is legal");
        assert_eq!(session.state.move_list, vec![String::from("e4")]);

        assert!(session.undo());
        assert_eq!(session.state, initial);

        assert!(session.redo());
        assert_eq!(session.state.move_list, vec![String::from("e4")]);
        assert!(session.state.board.squares[4][4].is_some());
    }

    #[test]
    fn new_move_after_undo_discards_the_redo_branch() {
        let mut session = GameSession::new(bare_config());
        session.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        assert!(session.undo());
        session.apply_move((6, 3), &Move::plain((4, 3))).unwrap();

        assert!(!session.redo());
        assert_eq!(session.state.move_list, vec![String::from("d4")]);
    }

    #[test]
    fn restore_jumps_to_an_arbitrary_turn() {
        let mut session = GameSession::new(bare_config());
        session.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        session.apply_move((1, 4), &Move::plain((3, 4))).unwrap();

        assert!(session.restore(0));
        assert!(session.state.move_list.is_empty());
        assert!(session.restore(2));
        assert_eq!(session.state.move_list.len(), 2);
        assert!(!session.restore(9), "out-of-range index is refused");
    }

    #[test]
    fn snapshot_then_restore_is_identity() {
        let mut session = GameSession::new(bare_config());
        session.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        let before = session.state.clone();

        session.snapshot();
        assert!(session.restore(session.history.index()));
        assert_eq!(session.state.board, before.board);
        assert_eq!(session.state.turn, before.turn);
        assert_eq!(session.state.castling, before.castling);
        assert_eq!(session.state.move_list, before.move_list);
    }

    #[test]
    fn json_round_trip_preserves_the_session() {
        let mut session = GameSession::new(bare_config());
        session.apply_move((6, 4), &Move::plain((4, 4))).unwrap();
        session.apply_move((1, 3), &Move::plain((3, 3))).unwrap();
        session.apply_move((4, 4), &Move {
            to: (3, 3),
            en_passant: false,
            castle: None,
        }).unwrap();

        let json = session.to_json().expect("serializes");
        let restored = GameSession::from_json(&json).expect("parses");
        assert_eq!(restored, session);
    }

    #[test]
    fn board_serializes_in_the_single_character_layout() {
        let session = GameSession::new(bare_config());
        let value = serde_json::to_value(&session.state.board).unwrap();
        assert_eq!(value["squares"][6][0], serde_json::json!("P"));
        assert_eq!(value["squares"][0][4], serde_json::json!("k"));
        assert_eq!(value["squares"][3][3], serde_json::Value::Null);
    }

    #[test]
    fn malformed_saves_are_rejected() {
        assert!(GameSession::from_json("not json").is_err());
        assert!(GameSession::from_json("{\"state\":{}}").is_err());
    }

    #[test]
    fn timeout_ends_the_game_for_the_flagged_side() {
        let mut session = GameSession::new(bare_config());
        session.time_expired(Color::White);
        match session.state.outcome {
            Some(GameOutcome::Win { winner, .. }) => assert_eq!(winner, Color::Black),
            other => panic!("expected a timeout win, got {other:?}"),
        }
        assert_eq!(
            session.state.outcome.unwrap().to_string(),
            "Black wins on time!"
        );
    }
}
