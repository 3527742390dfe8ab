//! What travels over the message channel, and the events decoded from it

use core::fmt;

use board::{Color, Occupant, Piece, UnknownFieldName};
use mirror::Grid;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The server's id for a game
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);
impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One square of a board message, written the way the server names it (`"Empty"`, `"WhitePawn"`)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Field(pub Occupant);
impl TryFrom<String> for Field {
    type Error = UnknownFieldName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Piece::from_field_name(&name).map(Self)
    }
}
impl From<Field> for String {
    fn from(field: Field) -> Self {
        match field.0 {
            Some(piece) => piece.field_name(),
            None => board::EMPTY_FIELD_NAME.to_string(),
        }
    }
}

/// A move broadcast on the game's topic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMessage {
    /// Who made the move; the AI has no name
    #[serde(default)]
    pub player: Option<String>,
    #[serde(rename = "move")]
    pub notation: String,
    /// `false` when the server rejected the move, in which case the board didn't change
    pub legal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub won: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

fn first_user_starts() -> bool {
    true
}

/// The whole board, sent when subscribing and whenever the server wants to resynchronize
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMessage {
    pub username1: String,
    /// Missing for games against the AI
    #[serde(default)]
    pub username2: Option<String>,
    #[serde(default)]
    pub ai: bool,
    /// Row 0 is rank 8
    #[serde(default)]
    pub state: Option<[[Field; 8]; 8]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    #[serde(default = "first_user_starts")]
    pub first_user_starts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The body sent to make a move
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub notation: String,
}

/// The two sides of a game and which of them plays white
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Players {
    pub player1: String,
    /// `None` for the AI
    pub player2: Option<String>,
    pub first_player_starts: bool,
}
impl Players {
    /// The color played by `player1`
    pub const fn first_color(&self) -> Color {
        if self.first_player_starts {
            Color::White
        } else {
            Color::Black
        }
    }

    /// The color of whoever the server names as `player`
    ///
    /// Anyone other than the first player, including the unnamed AI, plays the other color.
    pub fn color_of(&self, player: Option<&str>) -> Color {
        if player == Some(self.player1.as_str()) {
            self.first_color()
        } else {
            self.first_color().other()
        }
    }
}

/// A move in notation, with the color that played it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotationEvent {
    pub game_id: GameId,
    pub color: Color,
    pub notation: String,
}

/// The whole board from the server, which replaces whatever the client has
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotEvent {
    pub game_id: GameId,
    pub grid: Grid,
    pub players: Players,
    /// Who is looking at the board, if they're logged in
    pub local_identity: Option<String>,
}
impl SnapshotEvent {
    /// Decode a board message, which fails when the server sent an error instead of a board
    pub fn from_message(
        game_id: GameId,
        message: BoardMessage,
        local_identity: Option<String>,
    ) -> Result<Self> {
        if let Some(error) = message.error {
            return Err(Error::Server(error));
        }
        let rows = message.state.ok_or(Error::MissingState)?;
        Ok(Self {
            game_id,
            grid: Grid::from_rows(rows.map(|row| row.map(|field| field.0))),
            players: Players {
                player1: message.username1,
                player2: message.username2,
                first_player_starts: message.first_user_starts,
            },
            local_identity,
        })
    }

    /// The board message the server would have sent for this snapshot
    pub fn to_message(&self) -> BoardMessage {
        BoardMessage {
            username1: self.players.player1.clone(),
            username2: self.players.player2.clone(),
            ai: self.players.player2.is_none(),
            state: Some(self.grid.to_rows().map(|row| row.map(Field))),
            current_player: None,
            first_user_starts: self.players.first_player_starts,
            error: None,
        }
    }
}

/// Everything a session can be handed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// A move message as it arrived on the game's topic
    Move {
        game_id: GameId,
        message: MoveMessage,
    },
    /// A board message as it arrived on the game's board topic
    Board {
        game_id: GameId,
        message: BoardMessage,
    },
    Notation(NotationEvent),
    Snapshot(SnapshotEvent),
}
impl InboundEvent {
    pub const fn game_id(&self) -> GameId {
        match self {
            InboundEvent::Move { game_id, .. } | InboundEvent::Board { game_id, .. } => *game_id,
            InboundEvent::Notation(event) => event.game_id,
            InboundEvent::Snapshot(event) => event.game_id,
        }
    }
}

/// A move made locally, ready to go to the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundNotation {
    pub game_id: GameId,
    pub notation: String,
}
impl OutboundNotation {
    /// Where the move is published
    ///
    /// ```
    /// use client::{GameId, OutboundNotation};
    /// let mv = OutboundNotation { game_id: GameId(12), notation: "Nf3".to_string() };
    /// assert_eq!(mv.destination(), "/app/move/12");
    /// ```
    pub fn destination(&self) -> String {
        format!("/app/move/{}", self.game_id)
    }

    pub fn request(&self) -> MoveRequest {
        MoveRequest {
            notation: self.notation.clone(),
        }
    }

    /// The JSON body to publish
    pub fn body(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.request())
    }
}
