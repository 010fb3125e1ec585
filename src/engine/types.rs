use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank holding this side's king and rooks at the start of a game.
    pub const fn home_rank(self) -> Rank {
        match self {
            Side::White => Rank::One,
            Side::Black => Rank::Eight,
        }
    }

    /// Rank from which this side's pawns may advance two squares.
    pub const fn pawn_start_rank(self) -> Rank {
        match self {
            Side::White => Rank::Two,
            Side::Black => Rank::Seven,
        }
    }

    /// Rank on which this side's pawns promote.
    pub const fn promotion_rank(self) -> Rank {
        match self {
            Side::White => Rank::Eight,
            Side::Black => Rank::One,
        }
    }

    /// Rank a pawn of this side must stand on to capture en passant.
    pub const fn en_passant_rank(self) -> Rank {
        match self {
            Side::White => Rank::Five,
            Side::Black => Rank::Four,
        }
    }

    /// Rank delta of a forward pawn step.
    pub const fn forward(self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

impl std::ops::Not for Side {
    type Output = Self;
    fn not(self) -> Self {
        self.other()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Piece {
    /// All piece kinds in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Algebraic-notation symbol. Pawns have none.
    pub const fn symbol(self) -> &'static str {
        match self {
            Piece::Pawn => "",
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
        }
    }

    /// Parse an algebraic-notation symbol (`""` is a pawn).
    pub fn from_symbol(s: &str) -> Option<Piece> {
        match s {
            "" => Some(Piece::Pawn),
            "N" => Some(Piece::Knight),
            "B" => Some(Piece::Bishop),
            "R" => Some(Piece::Rook),
            "Q" => Some(Piece::Queen),
            "K" => Some(Piece::King),
            _ => None,
        }
    }

    /// Board-diagram letter: uppercase for White, lowercase for Black.
    pub fn to_char(self, side: Side) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// Parse a board-diagram letter; case gives the side.
    pub fn from_char(c: char) -> Option<(Side, Piece)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((side, piece))
    }

    /// Whether a pawn may promote to this piece.
    pub const fn is_promotion_target(self) -> bool {
        !matches!(self, Piece::Pawn | Piece::King)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Pawn => write!(f, "pawn"),
            Piece::Knight => write!(f, "knight"),
            Piece::Bishop => write!(f, "bishop"),
            Piece::Rook => write!(f, "rook"),
            Piece::Queen => write!(f, "queen"),
            Piece::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// File & Rank
// ---------------------------------------------------------------------------

/// A board column, `a` through `h`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// 0-based ordinal (`a` = 0).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<File> {
        File::ALL.get(index as usize).copied()
    }

    /// The next file towards `h`, or `None` at the edge.
    pub fn next(self) -> Option<File> {
        File::from_index(self.index() + 1)
    }

    /// The previous file towards `a`, or `None` at the edge.
    pub fn prev(self) -> Option<File> {
        self.index().checked_sub(1).and_then(File::from_index)
    }

    pub fn to_char(self) -> char {
        (b'a' + self.index()) as char
    }

    pub fn from_char(c: char) -> Option<File> {
        if c.is_ascii_lowercase() {
            File::from_index(c as u8 - b'a')
        } else {
            None
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A board row, `1` through `8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::One,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
    ];

    /// 0-based ordinal (rank 1 = 0).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Rank> {
        Rank::ALL.get(index as usize).copied()
    }

    /// The next rank towards 8, or `None` at the edge.
    pub fn next(self) -> Option<Rank> {
        Rank::from_index(self.index() + 1)
    }

    /// The previous rank towards 1, or `None` at the edge.
    pub fn prev(self) -> Option<Rank> {
        self.index().checked_sub(1).and_then(Rank::from_index)
    }

    pub fn to_char(self) -> char {
        (b'1' + self.index()) as char
    }

    pub fn from_char(c: char) -> Option<Rank> {
        if c.is_ascii_digit() {
            (c as u8).checked_sub(b'1').and_then(Rank::from_index)
        } else {
            None
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The eight compass steps between adjacent squares. "Up" is towards rank 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// `(file_delta, rank_delta)` of one step.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::UpLeft => (-1, 1),
            Direction::UpRight => (1, 1),
            Direction::DownLeft => (-1, -1),
            Direction::DownRight => (1, -1),
        }
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank as u8 * 8 + file as u8)
    }

    pub fn from_index(index: u8) -> Option<Self> {
        (index < 64).then_some(Square(index))
    }

    /// LERF index, usable for array and bitboard lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn file(self) -> File {
        File::ALL[(self.0 & 7) as usize]
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::ALL[(self.0 >> 3) as usize]
    }

    /// The square `file_delta` files and `rank_delta` ranks away, if on the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        let file = (self.0 & 7) as i8 + file_delta;
        let rank = (self.0 >> 3) as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    /// The adjacent square in `direction`; `None` past the board edge.
    #[inline]
    pub fn step(self, direction: Direction) -> Option<Square> {
        let (df, dr) = direction.delta();
        self.offset(df, dr)
    }

    pub fn up(self) -> Option<Square> {
        self.step(Direction::Up)
    }

    pub fn down(self) -> Option<Square> {
        self.step(Direction::Down)
    }

    pub fn left(self) -> Option<Square> {
        self.step(Direction::Left)
    }

    pub fn right(self) -> Option<Square> {
        self.step(Direction::Right)
    }

    pub fn up_left(self) -> Option<Square> {
        self.step(Direction::UpLeft)
    }

    pub fn up_right(self) -> Option<Square> {
        self.step(Direction::UpRight)
    }

    pub fn down_left(self) -> Option<Square> {
        self.step(Direction::DownLeft)
    }

    pub fn down_right(self) -> Option<Square> {
        self.step(Direction::DownRight)
    }

    /// Light squares have odd `file + rank`; a1 is dark.
    #[inline]
    pub fn is_light(self) -> bool {
        ((self.0 & 7) + (self.0 >> 3)) % 2 == 1
    }

    /// All 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next().and_then(File::from_char)?;
        let rank = chars.next().and_then(Rank::from_char)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Square::new(file, rank))
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// A set of squares, one bit per square.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.0)
    }

    #[inline]
    pub fn is_set(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.0);
    }

    #[inline]
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Least significant bit index (first set square).
    #[inline]
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square(self.0.trailing_zeros() as u8))
        }
    }

    /// Pop the least significant bit, returning the square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Iterate over all set bit positions as `Square`s.
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over set bits in a `Bitboard`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.pop_count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard(0x{:016x})", self.0)?;
        for rank in Rank::ALL.iter().rev() {
            write!(f, "  {rank} ")?;
            for file in File::ALL {
                let sq = Square::new(file, *rank);
                write!(f, "{}", if self.is_set(sq) { '1' } else { '.' })?;
                if file != File::H {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")
    }
}

// ---------------------------------------------------------------------------
// CheckCount
// ---------------------------------------------------------------------------

/// How many enemy pieces attack a king. With `Two`, only the king may move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckCount {
    #[default]
    None,
    One,
    Two,
}

impl CheckCount {
    /// One more attacker.
    ///
    /// # Panics
    ///
    /// Three simultaneous checkers cannot arise under legal play.
    pub fn increment(self) -> CheckCount {
        match self {
            CheckCount::None => CheckCount::One,
            CheckCount::One => CheckCount::Two,
            CheckCount::Two => panic!("a king cannot be in check from more than two pieces"),
        }
    }

    #[inline]
    pub fn is_check(self) -> bool {
        self != CheckCount::None
    }
}

// ---------------------------------------------------------------------------
// Castling
// ---------------------------------------------------------------------------

/// Which rook the king castles with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    /// King's home square.
    pub const fn king_from(self, side: Side) -> Square {
        Square::new(File::E, side.home_rank())
    }

    /// Where the king lands.
    pub const fn king_to(self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Square::new(File::G, side.home_rank()),
            CastleSide::QueenSide => Square::new(File::C, side.home_rank()),
        }
    }

    /// Rook's home square.
    pub const fn rook_from(self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Square::new(File::H, side.home_rank()),
            CastleSide::QueenSide => Square::new(File::A, side.home_rank()),
        }
    }

    /// Square the king passes over, which is also where the rook lands.
    pub const fn pass(self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Square::new(File::F, side.home_rank()),
            CastleSide::QueenSide => Square::new(File::D, side.home_rank()),
        }
    }

    /// The b-file square that must also be clear when castling queen-side.
    pub const fn extra_pass(self, side: Side) -> Option<Square> {
        match self {
            CastleSide::KingSide => None,
            CastleSide::QueenSide => Some(Square::new(File::B, side.home_rank())),
        }
    }

    pub const fn notation(self) -> &'static str {
        match self {
            CastleSide::KingSide => "O-O",
            CastleSide::QueenSide => "O-O-O",
        }
    }
}

/// Castling availability bitfield: bits 0-3 = WK, WQ, BK, BQ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    const fn flag(side: Side, castle: CastleSide) -> u8 {
        match (side, castle) {
            (Side::White, CastleSide::KingSide) => Self::WHITE_KINGSIDE,
            (Side::White, CastleSide::QueenSide) => Self::WHITE_QUEENSIDE,
            (Side::Black, CastleSide::KingSide) => Self::BLACK_KINGSIDE,
            (Side::Black, CastleSide::QueenSide) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub fn has(self, side: Side, castle: CastleSide) -> bool {
        self.0 & Self::flag(side, castle) != 0
    }

    #[inline]
    pub fn insert(&mut self, side: Side, castle: CastleSide) {
        self.0 |= Self::flag(side, castle);
    }

    #[inline]
    pub fn remove(&mut self, side: Side, castle: CastleSide) {
        self.0 &= !Self::flag(side, castle);
    }

    /// Drop both of `side`'s rights.
    #[inline]
    pub fn clear(&mut self, side: Side) {
        for castle in CastleSide::ALL {
            self.remove(side, castle);
        }
    }

    /// The castle kinds `side` may still perform.
    pub fn castles(self, side: Side) -> impl Iterator<Item = CastleSide> {
        CastleSide::ALL
            .into_iter()
            .filter(move |&castle| self.has(side, castle))
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        let mut rights = 0u8;
        for c in s.chars() {
            match c {
                'K' => rights |= Self::WHITE_KINGSIDE,
                'Q' => rights |= Self::WHITE_QUEENSIDE,
                'k' => rights |= Self::BLACK_KINGSIDE,
                'q' => rights |= Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(CastlingRights(rights))
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                s.push(c);
            }
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    CheckMate,
    StaleMate,
    Resigned,
    DrawByAgreement,
    DrawByRepetition,
    DrawByMoveRule,
    DrawByInsufficientMaterial,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CheckMate => "checkmate",
            Outcome::StaleMate => "stalemate",
            Outcome::Resigned => "resigned",
            Outcome::DrawByAgreement => "draw_by_agreement",
            Outcome::DrawByRepetition => "draw_by_repetition",
            Outcome::DrawByMoveRule => "draw_by_move_rule",
            Outcome::DrawByInsufficientMaterial => "draw_by_insufficient_material",
        }
    }

    /// Whether neither side wins.
    pub fn is_draw(&self) -> bool {
        !matches!(self, Outcome::CheckMate | Outcome::Resigned)
    }

    /// PGN result token. `turn` is the side to move when the game ended,
    /// which is the losing side for checkmate and resignation.
    pub fn result_string(&self, turn: Side) -> &'static str {
        match (self.is_draw(), turn) {
            (true, _) => "1/2-1/2",
            (false, Side::White) => "0-1",
            (false, Side::Black) => "1-0",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Errors raised while decoding FEN/PGN/SAN text. The rules core itself never
/// fails recoverably; contract violations there panic.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid PGN: {0}")]
    InvalidPgn(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("invalid move '{token}': {reason}")]
    InvalidMove { token: String, reason: String },

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
