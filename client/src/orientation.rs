use board::{Color, Square};
use mirror::Grid;

use crate::Players;

/// Which side the local viewer plays, and whether the board is drawn upside down for them
///
/// Squares are stored with rank 8 in row 0, so the board as stored is seen from white's side. A
/// black player sees it rotated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Orientation {
    /// `None` for spectators
    pub local_color: Option<Color>,
    pub inverted: bool,
}

impl Orientation {
    /// Someone watching a game they don't play in
    pub const SPECTATOR: Self = Self {
        local_color: None,
        inverted: false,
    };

    /// Work out the orientation for `viewer`
    ///
    /// ```
    /// use board::Color;
    /// use client::{Orientation, Players};
    ///
    /// let players = Players {
    ///     player1: "alice".to_string(),
    ///     player2: Some("bob".to_string()),
    ///     first_player_starts: true,
    /// };
    /// let bob = Orientation::for_viewer(&players, Some("bob"));
    /// assert_eq!(bob.local_color, Some(Color::Black));
    /// assert!(bob.inverted);
    /// assert_eq!(Orientation::for_viewer(&players, Some("carol")), Orientation::SPECTATOR);
    /// ```
    pub fn for_viewer(players: &Players, viewer: Option<&str>) -> Self {
        let Some(viewer) = viewer else {
            return Self::SPECTATOR;
        };
        let is_first = viewer == players.player1;
        let is_second = players.player2.as_deref() == Some(viewer);
        if !is_first && !is_second {
            return Self::SPECTATOR;
        }
        let inverted = (is_second && players.first_player_starts)
            || (is_first && !players.first_player_starts);
        Self {
            local_color: Some(if inverted { Color::Black } else { Color::White }),
            inverted,
        }
    }

    /// The square drawn at the given position of the board as stored
    pub const fn to_display(self, square: Square) -> Square {
        if self.inverted {
            square.rotated()
        } else {
            square
        }
    }

    /// The board square under a position in the displayed board
    pub const fn from_display(self, square: Square) -> Square {
        // Rotating by half a turn undoes itself
        self.to_display(square)
    }

    /// The grid as the local viewer sees it, so row 0 is the row drawn on top
    pub fn display_grid(self, grid: &Grid) -> Grid {
        let mut shown = Grid::EMPTY;
        for (square, piece) in grid.pieces() {
            shown.set(self.to_display(square), Some(piece));
        }
        shown
    }

    pub const fn is_spectator(self) -> bool {
        self.local_color.is_none()
    }
}
