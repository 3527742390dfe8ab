//! Geometric reachability for each kind of piece
//!
//! These answer "could the piece on `start` get to `target` on this grid?" and nothing more. They
//! ignore checks, pins, whose turn it is and what stands on the target square. Pawn captures are
//! accepted onto empty squares, since en passant lands on one; whether a capture is actually
//! possible is decided by the resolver.

use board::{Color, Piece, PieceKind, Square};

use crate::Grid;

/// Whether `piece`, standing on `start`, could move to `target`
///
/// `capture` only matters for pawns, which move differently when capturing.
pub fn reaches(piece: Piece, start: Square, target: Square, grid: &Grid, capture: bool) -> bool {
    if start == target {
        return false;
    }
    match piece.kind {
        PieceKind::Pawn if capture => pawn_captures(piece.color, start, target),
        PieceKind::Pawn => pawn_advances(piece.color, start, target, grid),
        PieceKind::Knight => knight_reaches(start, target),
        PieceKind::Bishop => bishop_reaches(start, target, grid),
        PieceKind::Rook => rook_reaches(start, target, grid),
        PieceKind::Queen => queen_reaches(start, target, grid),
        PieceKind::King => king_reaches(start, target),
    }
}

/// The `(rows, columns)` from `start` to `target`
fn delta(start: Square, target: Square) -> (i8, i8) {
    (
        target.row() as i8 - start.row() as i8,
        target.column() as i8 - start.column() as i8,
    )
}

/// The squares strictly between `start` and `target`, if they share a row, column or diagonal
///
/// ```
/// use board::Square;
/// use mirror::rules::squares_between;
///
/// assert_eq!(
///     squares_between(Square::A1, Square::D4).map(|between| between.collect::<Vec<_>>()),
///     Some(vec![Square::B2, Square::C3]),
/// );
/// assert_eq!(squares_between(Square::E2, Square::E3).map(|between| between.count()), Some(0));
/// assert!(squares_between(Square::A1, Square::B3).is_none());
/// ```
pub fn squares_between(start: Square, target: Square) -> Option<impl Iterator<Item = Square>> {
    let (rows, columns) = delta(start, target);
    let aligned = rows == 0 || columns == 0 || rows.abs() == columns.abs();
    if start == target || !aligned {
        return None;
    }
    let steps = rows.abs().max(columns.abs());
    let (row_step, column_step) = (rows.signum(), columns.signum());
    Some((1..steps).filter_map(move |step| start.offset(row_step * step, column_step * step)))
}

/// Whether every square strictly between `start` and `target` is empty
fn path_clear(start: Square, target: Square, grid: &Grid) -> bool {
    squares_between(start, target).is_some_and(|mut between| between.all(|sq| grid.is_empty(sq)))
}

pub fn rook_reaches(start: Square, target: Square, grid: &Grid) -> bool {
    let (rows, columns) = delta(start, target);
    (rows == 0) != (columns == 0) && path_clear(start, target, grid)
}

pub fn bishop_reaches(start: Square, target: Square, grid: &Grid) -> bool {
    let (rows, columns) = delta(start, target);
    rows != 0 && rows.abs() == columns.abs() && path_clear(start, target, grid)
}

// Break the queen down into a rook and a bishop
pub fn queen_reaches(start: Square, target: Square, grid: &Grid) -> bool {
    rook_reaches(start, target, grid) || bishop_reaches(start, target, grid)
}

pub fn knight_reaches(start: Square, target: Square) -> bool {
    let (rows, columns) = delta(start, target);
    matches!((rows.abs(), columns.abs()), (1, 2) | (2, 1))
}

/// Normal king steps only; castling is handled as its own move
pub fn king_reaches(start: Square, target: Square) -> bool {
    let (rows, columns) = delta(start, target);
    rows.abs().max(columns.abs()) == 1
}

/// A non-capturing pawn move: one step forward, or two from the pawn's starting row
///
/// The square jumped over by a double step has to be empty.
pub fn pawn_advances(color: Color, start: Square, target: Square, grid: &Grid) -> bool {
    let (rows, columns) = delta(start, target);
    if columns != 0 {
        return false;
    }
    if rows == color.forward() {
        true
    } else if rows == 2 * color.forward() && start.row() == color.pawn_row() {
        path_clear(start, target, grid)
    } else {
        false
    }
}

/// A capturing pawn move: one step diagonally forward
pub fn pawn_captures(color: Color, start: Square, target: Square) -> bool {
    let (rows, columns) = delta(start, target);
    rows == color.forward() && columns.abs() == 1
}
