//! The client side of an online chess game
//!
//! The server sends board snapshots and a stream of moves in algebraic notation for each game. A
//! [`GameSession`] keeps a [`mirror::BoardState`] in step with them and turns the local player's
//! drags back into notation. Getting messages to and from the server is left to a
//! [`MessageChannel`].

use board::{Square, UnknownFieldName};

mod config;
mod events;
mod orientation;
mod session;
mod subscription;

pub use crate::config::SessionConfig;
pub use crate::events::{
    BoardMessage, Field, GameId, InboundEvent, MoveMessage, MoveRequest, NotationEvent,
    OutboundNotation, Players, SnapshotEvent,
};
pub use crate::orientation::Orientation;
pub use crate::session::{GameSession, MessageChannel, SessionUpdate};
pub use crate::subscription::Subscription;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Board(#[from] mirror::Error),
    #[error(transparent)]
    Field(#[from] UnknownFieldName),
    #[error("the server reported an error: {0}")]
    Server(String),
    #[error("board message carries no state")]
    MissingState,
    #[error("not subscribed to any game")]
    NotSubscribed,
    #[error("no snapshot of game {0} has arrived yet")]
    AwaitingSnapshot(GameId),
    #[error("spectators cannot move pieces")]
    Spectating,
    #[error("the piece on {0} belongs to the opponent")]
    NotYourPiece(Square),
    #[error("game {0} is over")]
    GameFinished(GameId),
    #[error("message channel failed")]
    Channel(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Whether the board may have drifted from the server's, so a fresh snapshot is needed
    pub fn needs_resync(&self) -> bool {
        matches!(self, Self::Board(e) if e.needs_resync())
    }
}
