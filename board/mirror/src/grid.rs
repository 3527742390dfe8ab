use core::{fmt, str::FromStr};

use board::{Color, Occupant, Piece, PieceKind, Square};

/// The 8x8 contents of a board, one occupant per square
///
/// This holds no history: whose turn it is, en passant and castling live elsewhere (or nowhere).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Indexed by [`Square::index`]
    squares: [Occupant; 64],
}

impl Grid {
    /// A board with no pieces on it
    pub const EMPTY: Self = Self {
        squares: [None; 64],
    };

    /// The pieces on a back row at the start of a game, from the a-file to the h-file
    const BACK_ROW: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// The position at the start of a chess game
    pub fn initial() -> Self {
        let mut grid = Self::EMPTY;
        for color in [Color::White, Color::Black] {
            for (column, kind) in Self::BACK_ROW.into_iter().enumerate() {
                let column = column as u8;
                if let Some(square) = Square::new(color.back_row(), column) {
                    grid.set(square, Some(Piece::new(color, kind)));
                }
                if let Some(square) = Square::new(color.pawn_row(), column) {
                    grid.set(square, Some(Piece::new(color, PieceKind::Pawn)));
                }
            }
        }
        grid
    }

    /// Build a grid from rows, row 0 first
    pub fn from_rows(rows: [[Occupant; 8]; 8]) -> Self {
        let mut grid = Self::EMPTY;
        for (square, occupant) in Square::all().zip(rows.into_iter().flatten()) {
            grid.set(square, occupant);
        }
        grid
    }

    /// The rows of this grid, row 0 first
    pub fn to_rows(&self) -> [[Occupant; 8]; 8] {
        let mut rows = [[None; 8]; 8];
        for (square, occupant) in Square::all().zip(self.squares) {
            rows[square.row() as usize][square.column() as usize] = occupant;
        }
        rows
    }

    pub fn get(&self, square: Square) -> Occupant {
        self.squares[square.index()]
    }

    /// Put the occupant on the square, returning whatever was there before
    pub fn set(&mut self, square: Square, occupant: Occupant) -> Occupant {
        core::mem::replace(&mut self.squares[square.index()], occupant)
    }

    /// Empty the square, returning whatever was there
    pub fn take(&mut self, square: Square) -> Occupant {
        self.set(square, None)
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    /// Every square holding exactly this piece, in row-major order
    pub fn squares_of(&self, piece: Piece) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(move |&square| self.get(square) == Some(piece))
    }

    /// Every occupied square with its piece, in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }

    /// The piece placement field of FEN for this grid
    ///
    /// ```
    /// use mirror::Grid;
    /// assert_eq!(
    ///     Grid::initial().placement(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
    /// );
    /// ```
    pub fn placement(&self) -> String {
        let mut placement = String::with_capacity(71);
        for row in self.to_rows() {
            if !placement.is_empty() {
                placement.push('/');
            }
            let mut empty_run = 0u8;
            for occupant in row {
                match occupant {
                    Some(piece) => {
                        if empty_run > 0 {
                            placement.push(char::from(b'0' + empty_run));
                            empty_run = 0;
                        }
                        placement.push(piece.fen_letter());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push(char::from(b'0' + empty_run));
            }
        }
        placement
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid piece placement {0:?}")]
pub struct GridFromStrErr(String);

/// Parse the piece placement field of FEN (anything after the first space is ignored)
impl FromStr for Grid {
    type Err = GridFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GridFromStrErr(s.to_string());
        let placement = s.split(' ').next().unwrap_or_default();
        let mut grid = Self::EMPTY;
        let mut rows = 0;
        for (row, rank) in placement.split('/').enumerate() {
            if row >= 8 {
                return Err(err());
            }
            rows += 1;
            let mut column = 0u8;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    column = column
                        .checked_add(skip as u8)
                        .filter(|&column| column <= 8)
                        .ok_or_else(err)?;
                    continue;
                }
                let kind = PieceKind::from_letter(c.to_ascii_uppercase()).ok_or_else(err)?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let square = Square::new(row as u8, column).ok_or_else(err)?;
                grid.set(square, Some(Piece::new(color, kind)));
                column += 1;
            }
            if column != 8 {
                return Err(err());
            }
        }
        if rows != 8 {
            return Err(err());
        }
        Ok(grid)
    }
}

/// Display as a TUI version of a grid, row 0 on top
///
/// ```
/// use mirror::Grid;
///
/// assert_eq!(
///     Grid::initial().to_string(),
///     "rnbqkbnr\npppppppp\n........\n........\n........\n........\nPPPPPPPP\nRNBQKBNR\n",
/// );
/// ```
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        for row in self.to_rows() {
            for occupant in row {
                f.write_char(occupant.map_or('.', Piece::fen_letter))?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Grid").field(&self.placement()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{Arbitrary, Gen};

    /// About a third of the squares occupied, by anything
    impl Arbitrary for Grid {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut grid = Grid::EMPTY;
            for square in Square::all() {
                if u8::arbitrary(g) % 3 == 0 {
                    let color = *g.choose(&[Color::White, Color::Black]).unwrap();
                    let kind = *g.choose(&PieceKind::KINDS).unwrap();
                    grid.set(square, Some(Piece::new(color, kind)));
                }
            }
            grid
        }
    }

    #[test]
    fn test_initial_position() {
        let grid = Grid::initial();
        assert_eq!(
            grid.get(Square::G1),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert_eq!(
            grid.get(Square::E8),
            Some(Piece::new(Color::Black, PieceKind::King))
        );
        assert_eq!(grid.pieces().count(), 32);
        assert!(grid.is_empty(Square::E4));
        assert_eq!(
            grid.squares_of(Piece::new(Color::White, PieceKind::Rook))
                .collect::<Vec<_>>(),
            vec![Square::A1, Square::H1],
        );
    }

    #[test]
    fn test_placement_parsing() {
        let grid: Grid = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        assert_eq!(grid, Grid::initial());

        let grid: Grid = "8/8/8/3pP3/8/8/8/8".parse().unwrap();
        assert_eq!(grid.pieces().count(), 2);
        assert_eq!(
            grid.get(Square::D5),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
        assert_eq!(grid.placement(), "8/8/8/3pP3/8/8/8/8");
    }

    #[test]
    fn test_bad_placements() {
        for placement in [
            "",
            "8/8/8",
            "9/8/8/8/8/8/8/8",
            "7/8/8/8/8/8/8/8",
            "x7/8/8/8/8/8/8/8",
        ] {
            assert!(placement.parse::<Grid>().is_err(), "{placement:?} parsed");
        }
    }

    #[test]
    fn test_rows_round_trip() {
        let grid = Grid::initial();
        assert_eq!(Grid::from_rows(grid.to_rows()), grid);
        assert_eq!(
            grid.to_rows()[7][6],
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
    }
}
