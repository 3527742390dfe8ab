//! Pieces, squares and algebraic notation for a client-side mirror of a chess game
//!
//! Nothing in this crate knows about a board. The types here describe what a move *says*; figuring
//! out what it *does* is the job of the `mirror` crate.

use core::fmt;

mod notation;
mod square;

pub use crate::notation::{
    AlgebraicMove, CastleSide, CheckStatus, MoveAction, NotationError, ParsedMove,
};
pub use crate::square::{Square, SquareFromStrErr};

/// The types of pieces there are
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceKind {
    /// All the kinds of pieces there are
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    /// The kinds a pawn may promote into, in the order a chooser offers them
    pub const PROMOTIONS: [PieceKind; 4] = [Self::Rook, Self::Bishop, Self::Knight, Self::Queen];

    /// The capitalized letter used for this piece in notation and FEN
    pub const fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }

    /// The piece named by a capital letter, if any
    ///
    /// ```
    /// use board::PieceKind;
    /// assert_eq!(PieceKind::from_letter('N'), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_letter('n'), None);
    /// ```
    pub const fn from_letter(c: char) -> Option<Self> {
        match c {
            'P' => Some(Self::Pawn),
            'N' => Some(Self::Knight),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'Q' => Some(Self::Queen),
            'K' => Some(Self::King),
            _ => None,
        }
    }

    /// Whether a pawn can promote into this kind of piece
    pub const fn is_promotable(self) -> bool {
        match self {
            PieceKind::Pawn | PieceKind::King => false,
            PieceKind::Rook | PieceKind::Queen | PieceKind::Knight | PieceKind::Bishop => true,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Pawn => "Pawn",
            Self::Knight => "Knight",
            Self::Bishop => "Bishop",
            Self::Rook => "Rook",
            Self::Queen => "Queen",
            Self::King => "King",
        }
    }
}

/// The colors a piece can have
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The row delta of one step "forward" for this color's pawns
    ///
    /// White starts on the high rows, so its pawns move towards row 0.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The row holding this color's king and rooks at the start of a game
    pub const fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// The row holding this color's pawns at the start of a game
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The row on which this color's pawns promote
    pub const fn promotion_row(self) -> u8 {
        self.other().back_row()
    }

    const fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

/// What sits on a square: `None` for an empty square
pub type Occupant = Option<Piece>;

/// The name the server uses for an empty square
pub const EMPTY_FIELD_NAME: &str = "Empty";

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { kind, color }
    }

    /// The FEN letter: uppercase for white, lowercase for black
    pub const fn fen_letter(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    /// The name the game server uses for a square holding this piece, e.g. `"WhiteKnight"`
    pub fn field_name(self) -> String {
        format!("{}{}", self.color.name(), self.kind.name())
    }

    /// Parse a server field name into an occupant
    ///
    /// ```
    /// use board::{Color, Piece, PieceKind};
    /// assert_eq!(Piece::from_field_name("Empty"), Ok(None));
    /// assert_eq!(
    ///     Piece::from_field_name("BlackQueen"),
    ///     Ok(Some(Piece::new(Color::Black, PieceKind::Queen))),
    /// );
    /// assert!(Piece::from_field_name("Sunk").is_err());
    /// ```
    pub fn from_field_name(name: &str) -> Result<Occupant, UnknownFieldName> {
        if name == EMPTY_FIELD_NAME {
            return Ok(None);
        }
        let (color, kind) = if let Some(kind) = name.strip_prefix("White") {
            (Color::White, kind)
        } else if let Some(kind) = name.strip_prefix("Black") {
            (Color::Black, kind)
        } else {
            return Err(UnknownFieldName(name.to_string()));
        };
        PieceKind::KINDS
            .into_iter()
            .find(|k| k.name() == kind)
            .map(|kind| Some(Piece { kind, color }))
            .ok_or_else(|| UnknownFieldName(name.to_string()))
    }
}

/// A square name sent by the server that matches no piece
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown field name {0:?}")]
pub struct UnknownFieldName(pub String);
