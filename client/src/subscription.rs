use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::GameId;

/// A handle on the events of one game
///
/// Clones share the same flag, so any of them can cancel the subscription. Once cancelled, a
/// session ignores every event for the game, including ones already in flight.
#[derive(Clone, Debug)]
pub struct Subscription {
    game_id: GameId,
    cancelled: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Relaxed)
    }

    /// Whether an event for `game_id` should still be delivered through this handle
    pub fn accepts(&self, game_id: GameId) -> bool {
        self.game_id == game_id && self.is_active()
    }

    /// The topic the game's moves are broadcast on
    pub fn move_topic(&self) -> String {
        format!("/topic/game/{}", self.game_id)
    }

    /// The topic the game's board snapshots are broadcast on
    pub fn board_topic(&self) -> String {
        format!("/topic/board/{}", self.game_id)
    }

    /// Where to ask for a one-off snapshot of the game
    pub fn snapshot_destination(&self) -> String {
        format!("/app/board/{}", self.game_id)
    }
}
