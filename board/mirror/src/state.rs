use core::str::FromStr;

use board::{AlgebraicMove, CastleSide, Color, MoveAction, Occupant, PieceKind, Square};
use log::debug;

use crate::{encode, resolve, resolve_drag, BoardMove, CastleMove, Grid, Result};

/// The mirrored board, plus the one bit of history notation depends on
///
/// The only history kept is where the last pawn double step landed, so an en passant capture can
/// find the pawn it takes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardState {
    grid: Grid,
    en_passant: Option<Square>,
}

/// What happened when a move was applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    /// The notation, as parsed
    pub notation: AlgebraicMove,
    pub board_move: BoardMove,
    /// The piece removed from the board, if any
    pub captured: Occupant,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// The start of a game
    pub fn new() -> Self {
        Self::from_grid(Grid::initial())
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            en_passant: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The square a pawn landed on with a double step in the last move, if it did
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Throw away everything for a snapshot sent by the server
    pub fn replace(&mut self, grid: Grid) {
        self.grid = grid;
        self.en_passant = None;
    }

    /// Work out what `notation`, played by `color`, does to the board, without doing it
    pub fn resolve(&self, color: Color, notation: &AlgebraicMove) -> Result<BoardMove> {
        match notation.action {
            MoveAction::Normal(mv) => Ok(BoardMove::Normal(resolve(
                &self.grid,
                self.en_passant,
                color,
                &mv,
            )?)),
            MoveAction::Castle(side) => {
                let castle = CastleMove::new(color, side);
                castle.check_context(&self.grid)?;
                Ok(BoardMove::Castle(castle))
            }
        }
    }

    /// Parse, resolve and play a move sent by the server
    ///
    /// If anything goes wrong, the board is left exactly as it was.
    ///
    /// ```
    /// use board::{Color, Square};
    /// use mirror::BoardState;
    ///
    /// let mut state = BoardState::new();
    /// state.apply_notation(Color::White, "e4").unwrap();
    /// assert_eq!(state.en_passant(), Some(Square::E4));
    /// assert!(state.apply_notation(Color::Black, "Nf3").is_err());
    /// ```
    pub fn apply_notation(&mut self, color: Color, notation: &str) -> Result<AppliedMove> {
        let parsed = AlgebraicMove::from_str(notation)?;
        let board_move = self.resolve(color, &parsed)?;
        let captured = self.apply(board_move)?;
        debug!("{color} played {parsed}");
        Ok(AppliedMove {
            notation: parsed,
            board_move,
            captured,
        })
    }

    /// Play a move which has already been resolved against this board, returning what it captured
    pub fn apply(&mut self, mv: BoardMove) -> Result<Occupant> {
        let mv = match mv {
            BoardMove::Castle(castle) => {
                self.castle(castle.color, castle.side)?;
                return Ok(None);
            }
            BoardMove::Normal(mv) => mv,
        };
        self.grid.take(mv.start);
        let mut captured = self.grid.set(mv.target, Some(mv.final_piece()));
        if let Some(victim) = mv.en_passant_victim() {
            captured = self.grid.take(victim);
        }
        self.en_passant = mv.is_double_step().then_some(mv.target);
        Ok(captured)
    }

    /// Move both the king and the rook for a castle
    ///
    /// Nothing changes unless both stand on their starting squares.
    pub fn castle(&mut self, color: Color, side: CastleSide) -> Result<()> {
        let castle = CastleMove::new(color, side);
        castle.check_context(&self.grid)?;
        for (piece, start, target) in castle.legs() {
            self.grid.take(start);
            self.grid.set(target, Some(piece));
        }
        self.en_passant = None;
        Ok(())
    }

    /// The notation to send for the local player dragging the piece on `start` onto `target`
    ///
    /// This doesn't change the board: it gets changed once the server echoes the move back.
    pub fn describe_drag(
        &self,
        start: Square,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> Result<AlgebraicMove> {
        let mv = resolve_drag(&self.grid, self.en_passant, start, target, promotion)?;
        Ok(encode(&self.grid, &mv))
    }
}

impl From<Grid> for BoardState {
    fn from(grid: Grid) -> Self {
        Self::from_grid(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use board::{NotationError, Piece};
    use quickcheck::quickcheck;

    use crate::{Error, ResolveError};

    #[track_caller]
    fn play(state: &mut BoardState, color: Color, notation: &str) -> AppliedMove {
        state
            .apply_notation(color, notation)
            .unwrap_or_else(|e| panic!("{color} couldn't play {notation:?}: {e}"))
    }

    #[track_caller]
    fn play_all(state: &mut BoardState, moves: &[&str]) {
        let mut color = Color::White;
        for notation in moves {
            play(state, color, notation);
            color = color.other();
        }
    }

    fn piece(color: Color, kind: PieceKind) -> Occupant {
        Some(Piece::new(color, kind))
    }

    quickcheck! {
        fn test_snapshots_are_idempotent(before: Grid, snapshot: Grid) -> bool {
            let mut once = BoardState::from_grid(before.clone());
            let _ = once.apply_notation(Color::White, "e4");
            once.replace(snapshot.clone());
            let mut twice = once.clone();
            twice.replace(snapshot.clone());
            once == twice && once.grid() == &snapshot && once.en_passant().is_none()
        }
    }

    #[test]
    fn test_knight_from_initial_position() {
        let mut state = BoardState::new();
        let applied = play(&mut state, Color::White, "Nf3");
        let BoardMove::Normal(mv) = applied.board_move else {
            panic!("Nf3 resolved as a castle");
        };
        assert_eq!((mv.start.row(), mv.start.column()), (7, 6));
        assert_eq!((mv.target.row(), mv.target.column()), (5, 5));
        assert_eq!(state.grid().get(Square::G1), None);
        assert_eq!(
            state.grid().get(Square::F3),
            piece(Color::White, PieceKind::Knight)
        );
        assert_eq!(applied.captured, None);
    }

    #[test]
    fn test_en_passant_memory() {
        let mut state = BoardState::new();
        play(&mut state, Color::White, "e4");
        assert_eq!(state.en_passant(), Some(Square::E4));
        play(&mut state, Color::Black, "e6");
        assert_eq!(state.en_passant(), None);
        play(&mut state, Color::White, "Nf3");
        assert_eq!(state.en_passant(), None);
    }

    #[test]
    fn test_en_passant_capture() {
        let mut state = BoardState::new();
        play_all(&mut state, &["e4", "a6", "e5", "d5"]);
        assert_eq!(state.en_passant(), Some(Square::D5));

        let applied = play(&mut state, Color::White, "exd6 e.p.");
        assert_eq!(applied.captured, piece(Color::Black, PieceKind::Pawn));
        assert_eq!(state.grid().get(Square::D5), None);
        assert_eq!(state.grid().get(Square::E5), None);
        assert_eq!(
            state.grid().get(Square::D6),
            piece(Color::White, PieceKind::Pawn)
        );
        assert_eq!(state.en_passant(), None);
    }

    #[test]
    fn test_en_passant_capture_by_black() {
        let mut state = BoardState::new();
        play_all(&mut state, &["a3", "d5", "a4", "d4", "e4"]);
        assert_eq!(state.en_passant(), Some(Square::E4));

        let applied = play(&mut state, Color::Black, "dxe3 e.p.");
        assert_eq!(applied.captured, piece(Color::White, PieceKind::Pawn));
        assert_eq!(state.grid().get(Square::E4), None);
        assert_eq!(state.grid().get(Square::D4), None);
        assert_eq!(
            state.grid().get(Square::E3),
            piece(Color::Black, PieceKind::Pawn)
        );
    }

    #[test]
    fn test_en_passant_expires() {
        let mut state = BoardState::new();
        play_all(&mut state, &["e4", "a6", "e5", "d5", "Nf3", "Nc6"]);
        let before = state.clone();
        let err = state.apply_notation(Color::White, "exd6").unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvableDisambiguation(ResolveError::CaptureTargetEmpty(Square::D6))
        );
        assert!(err.needs_resync());
        assert_eq!(state, before);
    }

    #[test]
    fn test_kingside_castle() {
        let mut state = BoardState::new();
        let mut grid = state.grid().clone();
        grid.take(Square::F1);
        grid.take(Square::G1);
        state.replace(grid);

        let applied = play(&mut state, Color::White, "O-O");
        assert_eq!(
            applied.board_move,
            BoardMove::Castle(CastleMove::new(Color::White, CastleSide::Kingside))
        );
        let grid = state.grid();
        assert_eq!(grid.get(Square::G1), piece(Color::White, PieceKind::King));
        assert_eq!(grid.get(Square::F1), piece(Color::White, PieceKind::Rook));
        assert_eq!(grid.get(Square::E1), None);
        assert_eq!(grid.get(Square::H1), None);
    }

    #[test]
    fn test_queenside_castle_for_black() {
        let mut state = BoardState::from_grid("r3k3/8/8/8/8/8/8/4K3".parse().unwrap());
        play(&mut state, Color::Black, "O-O-O+");
        assert_eq!(state.grid().placement(), "2kr4/8/8/8/8/8/8/4K3");
    }

    #[test]
    fn test_invalid_castle_context() {
        let mut state = BoardState::new();
        play_all(&mut state, &["Nf3", "e5", "Rg1", "d5"]);
        let before = state.clone();
        let err = state.apply_notation(Color::White, "O-O").unwrap_err();
        assert_eq!(
            err,
            Error::InvalidCastleContext {
                color: Color::White,
                side: CastleSide::Kingside
            }
        );
        assert!(err.needs_resync());
        assert_eq!(state, before);
    }

    #[test]
    fn test_malformed_leaves_board_unchanged() {
        let mut state = BoardState::new();
        play(&mut state, Color::White, "d4");
        let before = state.clone();
        let err = state.apply_notation(Color::Black, "Zz9").unwrap_err();
        assert_eq!(err, Error::MalformedNotation(NotationError::InvalidTarget));
        assert!(err.is_malformed());
        assert!(!err.needs_resync());
        assert_eq!(state, before);
    }

    #[test]
    fn test_promotion() {
        let mut state = BoardState::from_grid("3r4/4P3/8/8/8/8/8/8".parse().unwrap());
        let applied = play(&mut state, Color::White, "exd8=N+");
        assert_eq!(applied.captured, piece(Color::Black, PieceKind::Rook));
        assert_eq!(
            state.grid().get(Square::D8),
            piece(Color::White, PieceKind::Knight)
        );
        assert_eq!(state.grid().pieces().count(), 1);
    }

    #[test]
    fn test_captures_are_reported() {
        let mut state = BoardState::new();
        play_all(&mut state, &["e4", "d5"]);
        let applied = play(&mut state, Color::White, "exd5");
        assert_eq!(applied.captured, piece(Color::Black, PieceKind::Pawn));
        let applied = play(&mut state, Color::Black, "Qxd5");
        assert_eq!(applied.captured, piece(Color::White, PieceKind::Pawn));
    }

    #[test]
    fn test_describe_drag() {
        let mut state = BoardState::new();
        let notation = state.describe_drag(Square::G1, Square::F3, None).unwrap();
        assert_eq!(notation.to_string(), "Nf3");
        // Describing doesn't move anything
        assert_eq!(state, BoardState::new());

        play_all(&mut state, &["e4", "a6", "e5", "d5"]);
        let notation = state.describe_drag(Square::E5, Square::D6, None).unwrap();
        assert_eq!(notation.to_string(), "exd6 e.p.");
        play(&mut state, Color::White, &notation.to_string());
        assert_eq!(state.grid().get(Square::D5), None);

        assert_eq!(
            state.describe_drag(Square::E4, Square::E5, None),
            Err(Error::EmptyStart(Square::E4))
        );
    }
}
