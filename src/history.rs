use serde::{Deserialize, Serialize};

use crate::board::{Board, CastlingRights, GameConfig};
use crate::game::{AssassinsPlaced, CapturedPieces, GameState, LastMove, Timers, TurnPhase};
use crate::piece::Color;

/// The restorable subset of game state: an explicit structural clone, field
/// by field, rather than a serialize/deserialize round trip. Anything not
/// listed here (turn phase, outcome, reveal toggle) is transient and resets
/// on restore.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<(usize, usize)>,
    pub config: GameConfig,
    pub assassins_placed: AssassinsPlaced,
    pub move_list: Vec<String>,
    pub captured: CapturedPieces,
    pub last_move: Option<LastMove>,
    pub halfmove_clock: u32,
    pub position_history: Vec<String>,
    pub timers: Timers,
}

impl Snapshot {
    pub fn of(state: &GameState) -> Snapshot {
        Snapshot {
            board: state.board.clone(),
            turn: state.turn,
            castling: state.castling,
            en_passant: state.en_passant,
            config: state.config,
            assassins_placed: state.assassins_placed,
            move_list: state.move_list.clone(),
            captured: state.captured.clone(),
            last_move: state.last_move,
            halfmove_clock: state.halfmove_clock,
            position_history: state.position_history.clone(),
            timers: state.timers,
        }
    }

    pub fn restore_into(&self, state: &mut GameState) {
        state.board = self.board.clone();
        state.turn = self.turn;
        state.castling = self.castling;
        state.en_passant = self.en_passant;
        state.config = self.config;
        state.assassins_placed = self.assassins_placed;
        state.move_list = self.move_list.clone();
        state.captured = self.captured.clone();
        state.last_move = self.last_move;
        state.halfmove_clock = self.halfmove_clock;
        state.position_history = self.position_history.clone();
        state.timers = self.timers;
        state.phase = TurnPhase::Playing;
        state.outcome = None;
        state.reveal_hidden = false;
    }
}

/// Ordered snapshots plus a cursor. One snapshot per completed turn;
/// recording after an undo drops the redo tail.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct History {
    snapshots: Vec<Snapshot>,
    index: usize,
}

impl History {
    pub fn new(initial: Snapshot) -> History {
        History {
            snapshots: vec![initial],
            index: 0,
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index += 1;
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index])
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index])
    }

    /// Moves the cursor to an arbitrary recorded turn.
    pub fn jump_to(&mut self, index: usize) -> Option<&Snapshot> {
        if index >= self.snapshots.len() {
            return None;
        }
        self.index = index;
        Some(&self.snapshots[self.index])
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.index]
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameConfig;
    use crate::game::GameOutcome;

    fn fresh() -> GameState {
        GameState::new(GameConfig {
            timer: false,
            triceratops: false,
            assassin: false,
        })
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let mut state = fresh();
        let snapshot = Snapshot::of(&state);
        let mut restored = fresh();
        restored.move_list.push(String::from("e4"));
        snapshot.restore_into(&mut restored);
        assert_eq!(restored, state);

        // Transients are cleared even if they were set.
        state.outcome = Some(GameOutcome::Draw(crate::game::DrawReason::Stalemate));
        state.reveal_hidden = true;
        Snapshot::of(&state).restore_into(&mut state);
        assert_eq!(state.outcome, None);
        assert!(!state.reveal_hidden);
    }

    #[test]
    fn undo_and_redo_move_the_cursor() {
        let state = fresh();
        let mut history = History::new(Snapshot::of(&state));

        let mut later = state.clone();
        later.move_list.push(String::from("e4"));
        history.record(Snapshot::of(&later));

        assert_eq!(history.index(), 1);
        assert!(history.undo().is_some());
        assert_eq!(history.index(), 0);
        assert!(history.undo().is_none(), "bounded at the first snapshot");
        assert!(history.redo().is_some());
        assert_eq!(history.index(), 1);
        assert!(history.redo().is_none(), "bounded at the last snapshot");
    }

    #[test]
    fn recording_truncates_the_redo_tail() {
        let state = fresh();
        let mut history = History::new(Snapshot::of(&state));

        let mut a = state.clone();
        a.move_list.push(String::from("e4"));
        history.record(Snapshot::of(&a));

        history.undo();

        let mut b = state.clone();
        b.move_list.push(String::from("d4"));
        history.record(Snapshot::of(&b));

        assert_eq!(history.len(), 2);
        assert_eq!(history.current().move_list, vec![String::from("d4")]);
        assert!(history.redo().is_none());
    }
}
