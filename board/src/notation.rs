//! Parsing and printing short algebraic notation
//!
//! The grammar accepted is
//! `[KQRBN][file][rank][x]<file><rank>[[=]<promotion>][+|#][ e.p.]`, or a castle (`O-O`, `O-O-O`,
//! also written with zeros) with an optional check marker.

use core::{fmt, str::FromStr};

use crate::{PieceKind, Square};

/// Why a string isn't valid notation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("notation is empty")]
    Empty,
    #[error("notation contains non-ascii characters")]
    NonAscii,
    #[error("missing or invalid target square")]
    InvalidTarget,
    #[error("cannot promote into a {0:?}")]
    InvalidPromotion(PieceKind),
    #[error("only pawns can promote")]
    PromotionOnNonPawn,
    #[error("en passant annotation on a move which isn't a pawn capture")]
    InvalidEnPassant,
    #[error("unexpected characters {0:?} in notation")]
    Unexpected(String),
}

/// A move as written, before any board is consulted
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicMove {
    /// What move happened on the board
    pub action: MoveAction,
    /// Whether the move leaves the opponent in check(mate)
    pub check: CheckStatus,
}
impl AlgebraicMove {
    pub const fn normal(mv: ParsedMove) -> Self {
        Self {
            action: MoveAction::Normal(mv),
            check: CheckStatus::None,
        }
    }

    pub const fn castle(side: CastleSide) -> Self {
        Self {
            action: MoveAction::Castle(side),
            check: CheckStatus::None,
        }
    }

    pub const fn is_check(&self) -> bool {
        matches!(self.check, CheckStatus::Check)
    }

    pub const fn is_mate(&self) -> bool {
        matches!(self.check, CheckStatus::Checkmate)
    }
}
impl fmt::Display for AlgebraicMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            MoveAction::Normal(mv) => {
                mv.write_core(f)?;
                write!(f, "{}", self.check)?;
                if mv.en_passant {
                    f.write_str(EN_PASSANT_ANNOTATION)?;
                }
                Ok(())
            }
            MoveAction::Castle(side) => write!(f, "{side}{}", self.check),
        }
    }
}
impl FromStr for AlgebraicMove {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NotationError::Empty);
        }
        if !s.is_ascii() {
            return Err(NotationError::NonAscii);
        }
        // The check marker is allowed on either side of the en passant annotation
        let (mut check, s) = strip_check(s);
        let (en_passant, mut s) = strip_en_passant(s);
        if check == CheckStatus::None {
            (check, s) = strip_check(s);
        }
        let action = match s {
            "O-O" | "0-0" => MoveAction::Castle(CastleSide::Kingside),
            "O-O-O" | "0-0-0" => MoveAction::Castle(CastleSide::Queenside),
            _ => {
                let mut mv = ParsedMove::from_str(s)?;
                if en_passant {
                    if mv.kind != PieceKind::Pawn || !mv.capture {
                        return Err(NotationError::InvalidEnPassant);
                    }
                    mv.en_passant = true;
                }
                MoveAction::Normal(mv)
            }
        };
        if en_passant && matches!(action, MoveAction::Castle(_)) {
            return Err(NotationError::InvalidEnPassant);
        }
        Ok(Self { action, check })
    }
}

const EN_PASSANT_ANNOTATION: &str = " e.p.";

fn strip_check(s: &str) -> (CheckStatus, &str) {
    if let Some(s) = s.strip_suffix('+') {
        (CheckStatus::Check, s.trim_end())
    } else if let Some(s) = s.strip_suffix('#') {
        (CheckStatus::Checkmate, s.trim_end())
    } else {
        (CheckStatus::None, s)
    }
}

fn strip_en_passant(s: &str) -> (bool, &str) {
    for annotation in ["e.p.", "ep"] {
        if let Some(rest) = s.strip_suffix(annotation) {
            // A bare "ep" has to be separated from the move by a space
            if annotation == "e.p." || rest.ends_with(' ') {
                return (true, rest.trim_end());
            }
        }
    }
    (false, s)
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum MoveAction {
    /// A move which isn't a castle (because those are notated entirely unrelatedly)
    Normal(ParsedMove),
    Castle(CastleSide),
}

/// Which way the king goes when castling
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum CastleSide {
    /// `O-O`, king to the g-file
    Kingside,
    /// `O-O-O`, king to the c-file
    Queenside,
}
impl CastleSide {
    /// The `(king, rook)` columns before castling
    pub const fn start_columns(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (4, 7),
            CastleSide::Queenside => (4, 0),
        }
    }

    /// The `(king, rook)` columns after castling
    pub const fn end_columns(self) -> (u8, u8) {
        match self {
            CastleSide::Kingside => (6, 5),
            CastleSide::Queenside => (2, 3),
        }
    }
}
impl fmt::Display for CastleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CheckStatus {
    None,
    Check,
    Checkmate,
}
/// Returns the status as appended to a move in algebraic notation
impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "",
            Self::Check => "+",
            Self::Checkmate => "#",
        })
    }
}

/// All the data from a move that isn't a castle
///
/// This doesn't include the check status after the move, because that is shared with castling in
/// the [`AlgebraicMove`] struct.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ParsedMove {
    pub kind: PieceKind,
    /// Disambiguating column of the moving piece, from its file letter
    pub from_column: Option<u8>,
    /// Disambiguating row of the moving piece, from its rank digit
    pub from_row: Option<u8>,
    pub capture: bool,
    pub target: Square,
    pub promotion: Option<PieceKind>,
    /// Whether the move was annotated as an en passant capture
    pub en_passant: bool,
}
impl ParsedMove {
    /// A plain move of the given piece to the target, with no extra annotations
    pub const fn to(kind: PieceKind, target: Square) -> Self {
        Self {
            kind,
            from_column: None,
            from_row: None,
            capture: false,
            target,
            promotion: None,
            en_passant: false,
        }
    }

    /// Everything except the en passant annotation
    fn write_core(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        if self.kind != PieceKind::Pawn {
            f.write_char(self.kind.letter())?;
        }
        if let Some(column) = self.from_column {
            f.write_char((b'a' + column) as char)?;
        }
        if let Some(row) = self.from_row {
            f.write_char((b'8' - row) as char)?;
        }
        if self.capture {
            f.write_char('x')?;
        }
        write!(f, "{}", self.target)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion.letter())?;
        }
        Ok(())
    }
}
impl fmt::Display for ParsedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_core(f)?;
        if self.en_passant {
            f.write_str(EN_PASSANT_ANNOTATION)?;
        }
        Ok(())
    }
}
/// Parses the move without check markers or annotations
impl FromStr for ParsedMove {
    type Err = NotationError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() {
            return Err(NotationError::NonAscii);
        }
        let kind = match s.chars().next().and_then(PieceKind::from_letter) {
            Some(PieceKind::Pawn) | None => PieceKind::Pawn,
            Some(kind) => {
                s = &s[1..];
                kind
            }
        };
        let promotion = match s.chars().next_back().and_then(PieceKind::from_letter) {
            Some(promotion) => {
                s = &s[..s.len() - 1];
                s = s.strip_suffix('=').unwrap_or(s);
                if !promotion.is_promotable() {
                    return Err(NotationError::InvalidPromotion(promotion));
                }
                if kind != PieceKind::Pawn {
                    return Err(NotationError::PromotionOnNonPawn);
                }
                Some(promotion)
            }
            None => None,
        };
        let Some(target) = s
            .len()
            .checked_sub(2)
            .and_then(|idx| Square::from_str(&s[idx..]).ok())
        else {
            return Err(NotationError::InvalidTarget);
        };
        s = &s[..s.len() - 2];
        let from_column = s.chars().next().and_then(Square::column_from_file);
        if from_column.is_some() {
            s = &s[1..];
        }
        let from_row = s.chars().next().and_then(Square::row_from_rank);
        if from_row.is_some() {
            s = &s[1..];
        }
        let capture = if let Some(rest) = s.strip_prefix('x') {
            s = rest;
            true
        } else {
            false
        };
        if !s.is_empty() {
            return Err(NotationError::Unexpected(s.to_string()));
        }
        Ok(Self {
            kind,
            from_column,
            from_row,
            capture,
            target,
            promotion,
            en_passant: false,
        })
    }
}
