use core::{fmt, str::FromStr};

/// A square on the board
///
/// Stored as a single index in row-major order:
/// ```text
/// 0b00rrrccc
///     +-+ Column (file a..h)
///  +-+ Row (row 0 is rank 8, row 7 is rank 1)
/// ```
///
/// Row 0 is the topmost row when the board is displayed from white's side, so white's pieces
/// start on the highest rows. Ordering squares by their index gives the row-major scan order.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);
impl Square {
    pub const A8: Self = Self(0);
    pub const B8: Self = Self(1);
    pub const C8: Self = Self(2);
    pub const D8: Self = Self(3);
    pub const E8: Self = Self(4);
    pub const F8: Self = Self(5);
    pub const G8: Self = Self(6);
    pub const H8: Self = Self(7);
    pub const A7: Self = Self(8);
    pub const B7: Self = Self(9);
    pub const C7: Self = Self(10);
    pub const D7: Self = Self(11);
    pub const E7: Self = Self(12);
    pub const F7: Self = Self(13);
    pub const G7: Self = Self(14);
    pub const H7: Self = Self(15);
    pub const A6: Self = Self(16);
    pub const B6: Self = Self(17);
    pub const C6: Self = Self(18);
    pub const D6: Self = Self(19);
    pub const E6: Self = Self(20);
    pub const F6: Self = Self(21);
    pub const G6: Self = Self(22);
    pub const H6: Self = Self(23);
    pub const A5: Self = Self(24);
    pub const B5: Self = Self(25);
    pub const C5: Self = Self(26);
    pub const D5: Self = Self(27);
    pub const E5: Self = Self(28);
    pub const F5: Self = Self(29);
    pub const G5: Self = Self(30);
    pub const H5: Self = Self(31);
    pub const A4: Self = Self(32);
    pub const B4: Self = Self(33);
    pub const C4: Self = Self(34);
    pub const D4: Self = Self(35);
    pub const E4: Self = Self(36);
    pub const F4: Self = Self(37);
    pub const G4: Self = Self(38);
    pub const H4: Self = Self(39);
    pub const A3: Self = Self(40);
    pub const B3: Self = Self(41);
    pub const C3: Self = Self(42);
    pub const D3: Self = Self(43);
    pub const E3: Self = Self(44);
    pub const F3: Self = Self(45);
    pub const G3: Self = Self(46);
    pub const H3: Self = Self(47);
    pub const A2: Self = Self(48);
    pub const B2: Self = Self(49);
    pub const C2: Self = Self(50);
    pub const D2: Self = Self(51);
    pub const E2: Self = Self(52);
    pub const F2: Self = Self(53);
    pub const G2: Self = Self(54);
    pub const H2: Self = Self(55);
    pub const A1: Self = Self(56);
    pub const B1: Self = Self(57);
    pub const C1: Self = Self(58);
    pub const D1: Self = Self(59);
    pub const E1: Self = Self(60);
    pub const F1: Self = Self(61);
    pub const G1: Self = Self(62);
    pub const H1: Self = Self(63);

    /// Produce a square from its row and column, if both are on the board
    ///
    /// ```
    /// use board::Square;
    /// assert_eq!(Square::new(7, 6), Some(Square::G1));
    /// assert_eq!(Square::new(0, 0), Some(Square::A8));
    /// assert_eq!(Square::new(8, 0), None);
    /// ```
    pub const fn new(row: u8, column: u8) -> Option<Self> {
        if row < 8 && column < 8 {
            Some(Self(row << 3 | column))
        } else {
            None
        }
    }

    /// The square at the given index in row-major order
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// The row-major index of this square, in `0..64`
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn row(self) -> u8 {
        self.0 >> 3
    }

    pub const fn column(self) -> u8 {
        self.0 & 0x07
    }

    /// Offset the given number of rows and columns, or `None` if that leaves the board
    ///
    /// ```
    /// use board::Square;
    /// assert_eq!(Square::E2.offset(-2, 0), Some(Square::E4));
    /// assert_eq!(Square::G1.offset(-2, -1), Some(Square::F3));
    /// assert_eq!(Square::A1.offset(0, -1), None);
    /// assert_eq!(Square::H8.offset(-1, 0), None);
    /// ```
    pub const fn offset(self, rows: i8, columns: i8) -> Option<Self> {
        let row = self.row() as i8 + rows;
        let column = self.column() as i8 + columns;
        if row < 0 || column < 0 {
            return None;
        }
        Self::new(row as u8, column as u8)
    }

    /// The same square seen from the other side of the board
    pub const fn rotated(self) -> Self {
        Self(63 - self.0)
    }

    /// All squares, in row-major order (a8, b8, ..., h8, a7, ..., h1)
    ///
    /// ```
    /// assert_eq!(board::Square::all().count(), 64);
    /// ```
    pub fn all() -> impl Iterator<Item = Self> {
        (0..64).map(Self)
    }

    /// The file letter of this square
    pub const fn file_char(self) -> char {
        (b'a' + self.column()) as char
    }

    /// The rank digit of this square
    pub const fn rank_char(self) -> char {
        (b'8' - self.row()) as char
    }

    /// The column named by a file letter
    pub const fn column_from_file(file: char) -> Option<u8> {
        match file {
            'a'..='h' => Some(file as u8 - b'a'),
            _ => None,
        }
    }

    /// The row named by a rank digit
    ///
    /// Rank 1 is row 7, rank 8 is row 0.
    pub const fn row_from_rank(rank: char) -> Option<u8> {
        match rank {
            '1'..='8' => Some(b'8' - rank as u8),
            _ => None,
        }
    }
}
impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Square")
            .field("row", &self.row())
            .field("column", &self.column())
            .field("readable", &format_args!("{self}"))
            .finish()
    }
}
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        f.write_char(self.file_char())?;
        f.write_char(self.rank_char())
    }
}
#[derive(Debug, thiserror::Error)]
#[error("board position string was invalid")]
pub struct SquareFromStrErr;
impl FromStr for Square {
    type Err = SquareFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(SquareFromStrErr);
        };
        let column = Self::column_from_file(file).ok_or(SquareFromStrErr)?;
        let row = Self::row_from_rank(rank).ok_or(SquareFromStrErr)?;
        Self::new(row, column).ok_or(SquareFromStrErr)
    }
}
