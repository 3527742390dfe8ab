//! Matching notation to the pieces on a grid, in both directions

use board::{
    AlgebraicMove, CastleSide, CheckStatus, Color, MoveAction, ParsedMove, Piece, PieceKind, Square,
};
use log::{debug, trace};

use crate::{rules, Error, Grid, ResolveError};

/// A non-castling move with its start square known
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMove {
    pub piece: Piece,
    pub start: Square,
    pub target: Square,
    /// Whether something is captured, counting en passant
    pub capture: bool,
    pub en_passant: bool,
    pub promotion: Option<PieceKind>,
}
impl ResolvedMove {
    /// The piece standing on the target after the move
    pub fn final_piece(&self) -> Piece {
        match self.promotion {
            Some(kind) => Piece::new(self.piece.color, kind),
            None => self.piece,
        }
    }

    /// Whether this is a pawn advancing two rows from its starting row
    pub fn is_double_step(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && self.start.row().abs_diff(self.target.row()) == 2
    }

    /// The square of the pawn taken en passant, which is not the target
    pub fn en_passant_victim(&self) -> Option<Square> {
        if self.en_passant {
            self.target.offset(-self.piece.color.forward(), 0)
        } else {
            None
        }
    }
}

/// A castle, which moves a king and a rook at once
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CastleMove {
    pub color: Color,
    pub side: CastleSide,
}
impl CastleMove {
    pub const fn new(color: Color, side: CastleSide) -> Self {
        Self { color, side }
    }

    /// The king's `(start, target)`
    pub const fn king_leg(self) -> (Square, Square) {
        match (self.color, self.side) {
            (Color::White, CastleSide::Kingside) => (Square::E1, Square::G1),
            (Color::White, CastleSide::Queenside) => (Square::E1, Square::C1),
            (Color::Black, CastleSide::Kingside) => (Square::E8, Square::G8),
            (Color::Black, CastleSide::Queenside) => (Square::E8, Square::C8),
        }
    }

    /// The rook's `(start, target)`
    pub const fn rook_leg(self) -> (Square, Square) {
        match (self.color, self.side) {
            (Color::White, CastleSide::Kingside) => (Square::H1, Square::F1),
            (Color::White, CastleSide::Queenside) => (Square::A1, Square::D1),
            (Color::Black, CastleSide::Kingside) => (Square::H8, Square::F8),
            (Color::Black, CastleSide::Queenside) => (Square::A8, Square::D8),
        }
    }

    /// Both legs as `(piece, start, target)`, king first
    pub const fn legs(self) -> [(Piece, Square, Square); 2] {
        let (king_start, king_target) = self.king_leg();
        let (rook_start, rook_target) = self.rook_leg();
        [
            (
                Piece::new(self.color, PieceKind::King),
                king_start,
                king_target,
            ),
            (
                Piece::new(self.color, PieceKind::Rook),
                rook_start,
                rook_target,
            ),
        ]
    }

    /// The castle a king dragged from `start` to `target` would be, if any
    fn from_king_drag(color: Color, start: Square, target: Square) -> Option<Self> {
        [CastleSide::Kingside, CastleSide::Queenside]
            .into_iter()
            .map(|side| Self::new(color, side))
            .find(|castle| castle.king_leg() == (start, target))
    }

    /// Check that the king and the rook both stand on their starting squares
    pub fn check_context(self, grid: &Grid) -> Result<(), Error> {
        if self
            .legs()
            .into_iter()
            .all(|(piece, start, _)| grid.get(start) == Some(piece))
        {
            Ok(())
        } else {
            Err(Error::InvalidCastleContext {
                color: self.color,
                side: self.side,
            })
        }
    }
}

/// Anything that can change a grid
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoardMove {
    Normal(ResolvedMove),
    Castle(CastleMove),
}

/// The square holding the pawn a capture onto `target` would take en passant, if that's possible
///
/// `memory` is the square a pawn last landed on with a double step.
fn en_passant_victim(
    grid: &Grid,
    memory: Option<Square>,
    color: Color,
    target: Square,
) -> Option<Square> {
    let victim = target.offset(-color.forward(), 0)?;
    let opposing_pawn = Piece::new(color.other(), PieceKind::Pawn);
    (memory == Some(victim) && grid.is_empty(target) && grid.get(victim) == Some(opposing_pawn))
        .then_some(victim)
}

/// Work out which of `color`'s pieces the notation `mv` moves
///
/// When the notation names both the file and the rank of the source, that square is used as long as
/// it holds the right piece. Otherwise every matching piece that fits the hints and could reach the
/// target is a candidate, and the first of them in row-major order wins. Checks and pins are not
/// considered, so the notation has to carry hints whenever geometry alone is ambiguous.
pub fn resolve(
    grid: &Grid,
    en_passant: Option<Square>,
    color: Color,
    mv: &ParsedMove,
) -> Result<ResolvedMove, ResolveError> {
    let piece = Piece::new(color, mv.kind);
    let target = mv.target;
    let start = match (mv.from_column, mv.from_row) {
        (Some(column), Some(row)) => {
            let square =
                Square::new(row, column).ok_or(ResolveError::NoSourcePiece { piece, target })?;
            if grid.get(square) != Some(piece) {
                return Err(ResolveError::NoPieceAtSource { piece, square });
            }
            square
        }
        (from_column, from_row) => {
            let mut candidates = grid
                .squares_of(piece)
                .filter(|square| from_column.map_or(true, |column| square.column() == column))
                .filter(|square| from_row.map_or(true, |row| square.row() == row))
                .filter(|&square| {
                    let reaches = rules::reaches(piece, square, target, grid, mv.capture);
                    trace!("{piece:?} on {square} reaches {target}: {reaches}");
                    reaches
                });
            let start = candidates
                .next()
                .ok_or(ResolveError::NoSourcePiece { piece, target })?;
            let others = candidates.count();
            if others > 0 {
                debug!("{mv} is ambiguous: picked {start} over {others} other candidate(s)");
            }
            start
        }
    };

    let occupied = !grid.is_empty(target);
    let (capture, en_passant) = if mv.kind == PieceKind::Pawn {
        match (mv.capture, occupied) {
            (true, true) if mv.en_passant => {
                return Err(ResolveError::EnPassantTargetOccupied(target))
            }
            (true, true) => (true, false),
            (true, false) => match en_passant_victim(grid, en_passant, color, target) {
                Some(_) => (true, true),
                None => return Err(ResolveError::CaptureTargetEmpty(target)),
            },
            (false, true) => return Err(ResolveError::PawnAdvanceBlocked(target)),
            (false, false) => (false, false),
        }
    } else {
        (occupied, false)
    };

    Ok(ResolvedMove {
        piece,
        start,
        target,
        capture,
        en_passant,
        promotion: mv.promotion,
    })
}

/// Turn a drag of the piece on `start` onto `target` into the move it stands for
///
/// Unlike [`resolve`], this knows the start square, so it checks the move more carefully: the
/// target has to be reachable, and promotions have to happen exactly when a pawn reaches the last
/// row.
pub fn resolve_drag(
    grid: &Grid,
    en_passant: Option<Square>,
    start: Square,
    target: Square,
    promotion: Option<PieceKind>,
) -> Result<BoardMove, Error> {
    let piece = grid.get(start).ok_or(Error::EmptyStart(start))?;
    let color = piece.color;
    let unreachable = Error::UnreachableTarget { start, target };

    if piece.kind == PieceKind::King {
        if let Some(castle) = CastleMove::from_king_drag(color, start, target) {
            if let Some(kind) = promotion {
                return Err(Error::IllegalPromotion(kind));
            }
            castle.check_context(grid)?;
            let (rook_start, _) = castle.rook_leg();
            let path_clear = rules::squares_between(start, rook_start)
                .is_some_and(|mut between| between.all(|square| grid.is_empty(square)));
            if !path_clear {
                return Err(unreachable);
            }
            return Ok(BoardMove::Castle(castle));
        }
    }

    let occupant = grid.get(target);
    if occupant.is_some_and(|other| other.color == color) {
        return Err(unreachable);
    }
    let occupied = occupant.is_some();
    let (capture, en_passant) = if piece.kind == PieceKind::Pawn {
        if rules::pawn_captures(color, start, target) {
            if occupied {
                (true, false)
            } else if en_passant_victim(grid, en_passant, color, target).is_some() {
                (true, true)
            } else {
                return Err(unreachable);
            }
        } else if !occupied && rules::pawn_advances(color, start, target, grid) {
            (false, false)
        } else {
            return Err(unreachable);
        }
    } else if rules::reaches(piece, start, target, grid, occupied) {
        (occupied, false)
    } else {
        return Err(unreachable);
    };

    let promotes = piece.kind == PieceKind::Pawn && target.row() == color.promotion_row();
    match (promotes, promotion) {
        (true, None) => return Err(Error::PromotionRequired(target)),
        (true, Some(kind)) if !PieceKind::PROMOTIONS.contains(&kind) => {
            return Err(Error::IllegalPromotion(kind))
        }
        (false, Some(kind)) => return Err(Error::IllegalPromotion(kind)),
        _ => {}
    }

    Ok(BoardMove::Normal(ResolvedMove {
        piece,
        start,
        target,
        capture,
        en_passant,
        promotion,
    }))
}

/// The shortest notation which [`resolve`] maps back onto `mv` on this grid
///
/// Pawn captures always name their file. Other moves name the file of their start square if another
/// piece of the same kind and color could reach the target, the rank if the file doesn't tell them
/// apart, and both if neither does alone.
pub fn encode(grid: &Grid, mv: &BoardMove) -> AlgebraicMove {
    let mv = match mv {
        BoardMove::Castle(castle) => return AlgebraicMove::castle(castle.side),
        BoardMove::Normal(mv) => mv,
    };
    let (from_column, from_row) = if mv.piece.kind == PieceKind::Pawn {
        (mv.capture.then_some(mv.start.column()), None)
    } else {
        disambiguate(grid, mv)
    };
    AlgebraicMove {
        action: MoveAction::Normal(ParsedMove {
            kind: mv.piece.kind,
            from_column,
            from_row,
            capture: mv.capture,
            target: mv.target,
            promotion: mv.promotion,
            en_passant: mv.en_passant,
        }),
        check: CheckStatus::None,
    }
}

fn disambiguate(grid: &Grid, mv: &ResolvedMove) -> (Option<u8>, Option<u8>) {
    let rivals = grid
        .squares_of(mv.piece)
        .filter(|&square| {
            square != mv.start && rules::reaches(mv.piece, square, mv.target, grid, mv.capture)
        })
        .collect::<Vec<_>>();
    let (column, row) = (mv.start.column(), mv.start.row());
    if rivals.is_empty() {
        (None, None)
    } else if rivals.iter().all(|rival| rival.column() != column) {
        (Some(column), None)
    } else if rivals.iter().all(|rival| rival.row() != row) {
        (None, Some(row))
    } else {
        (Some(column), Some(row))
    }
}
