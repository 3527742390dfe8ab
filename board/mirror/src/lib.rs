//! A client-held mirror of a chess board, driven by algebraic notation
//!
//! The server is the authority on what moves happen. This crate replays the notation it sends onto
//! a local [`Grid`], working out which piece each move refers to, and goes the other way for the
//! local player: a start and target square become the shortest notation the server will accept.

use board::{CastleSide, Color, NotationError, Piece, PieceKind, Square};

mod grid;
mod resolve;
pub mod rules;
mod state;

pub use crate::grid::{Grid, GridFromStrErr};
pub use crate::resolve::{encode, resolve, resolve_drag, BoardMove, CastleMove, ResolvedMove};
pub use crate::state::{AppliedMove, BoardState};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a well-formed move couldn't be matched to a piece on the board
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no {piece:?} can reach {target}")]
    NoSourcePiece { piece: Piece, target: Square },
    #[error("the move names {square} as its source, but no {piece:?} is there")]
    NoPieceAtSource { piece: Piece, square: Square },
    #[error("pawn capture onto empty square {0} that is not an en passant target")]
    CaptureTargetEmpty(Square),
    #[error("en passant annotated, but {0} is occupied")]
    EnPassantTargetOccupied(Square),
    #[error("pawn cannot advance onto occupied square {0}")]
    PawnAdvanceBlocked(Square),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed notation: {0}")]
    MalformedNotation(#[from] NotationError),
    #[error("unresolvable move: {0}")]
    UnresolvableDisambiguation(#[from] ResolveError),
    #[error("{color} cannot castle {side}: king or rook not on its starting square")]
    InvalidCastleContext { color: Color, side: CastleSide },
    #[error("no piece on {0} to move")]
    EmptyStart(Square),
    #[error("the piece on {start} cannot move to {target}")]
    UnreachableTarget { start: Square, target: Square },
    #[error("a pawn reaching {0} has to name a promotion")]
    PromotionRequired(Square),
    #[error("cannot promote into {0:?} here")]
    IllegalPromotion(PieceKind),
}

impl Error {
    /// Whether the error came from the notation itself rather than the board it was played on
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedNotation(_))
    }

    /// Whether this error means the mirror may no longer match the server's board
    ///
    /// Only a fresh snapshot from the server can repair that.
    pub const fn needs_resync(&self) -> bool {
        matches!(
            self,
            Self::UnresolvableDisambiguation(_) | Self::InvalidCastleContext { .. }
        )
    }
}
