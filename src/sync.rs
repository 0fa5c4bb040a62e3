use serde::{Deserialize, Serialize};

use crate::session::GameSession;

/// Messages exchanged with a peer. The transport is an opaque channel; both
/// ends speak whole-session snapshots, tagged so future message kinds can
/// coexist. Receiving a `State` message is equivalent to a full state
/// assignment on the receiving side.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyncMessage {
    State { state: GameSession },
}

impl SyncMessage {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decoding failure leaves the receiver's current game untouched; the
    /// caller surfaces the error and keeps playing.
    pub fn decode(data: &str) -> Result<SyncMessage, serde_json::Error> {
        serde_json::from_str(data)
    }
}
