use crate::chess::{
    chessmove::CastleSide,
    piece::{Colour, PieceType},
    types::Square,
};

/// Rejections from the rules engine. All of these are recoverable: the board is
/// left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    #[error("no piece on {0}")]
    NoPieceAtSource(Square),
    #[error("the piece on {square} is not {colour}'s")]
    WrongColourToMove { square: Square, colour: Colour },
    #[error("{to} is not a legal destination from {from}")]
    IllegalDestination { from: Square, to: Square },
    #[error("{colour} cannot castle {side:?}-side: king or rook missing")]
    MissingCastlingPieces { colour: Colour, side: CastleSide },
    #[error("{0} has no king on the board")]
    MissingKing(Colour),
    #[error("cannot promote to {0}")]
    InvalidPromotion(PieceType),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("invalid move length {0}")]
    InvalidLength(usize),
    #[error("invalid from-square file {0}")]
    InvalidFromSquareFile(char),
    #[error("invalid from-square rank {0}")]
    InvalidFromSquareRank(char),
    #[error("invalid to-square file {0}")]
    InvalidToSquareFile(char),
    #[error("invalid to-square rank {0}")]
    InvalidToSquareRank(char),
    #[error("invalid promotion piece {0}")]
    InvalidPromotionPiece(char),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("empty move token")]
    Empty,
    #[error("no destination square in {0:?}")]
    MissingDestination(String),
    #[error("unexpected character {1:?} in {0:?}")]
    UnexpectedCharacter(String, char),
    #[error("invalid promotion piece in {0:?}")]
    InvalidPromotion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("expected 8 ranks, got {0}")]
    BoardSegments(usize),
    #[error("rank has the wrong number of squares")]
    BadSquaresInSegment,
    #[error("adjacent digits in a rank")]
    AdjacentDigits,
    #[error("unexpected character {0:?} in placement")]
    UnexpectedCharacter(char),
    #[error("pawns on the back ranks")]
    PawnsOnBackranks,
    #[error("{colour} has {count} kings")]
    KingCount { colour: Colour, count: usize },
    #[error("invalid side to move {0:?}")]
    InvalidSide(String),
}

/// Reasons a replayed log entry could not be applied to the reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("no {colour} {piece_type} can reach {to}")]
    UnresolvedOrigin { colour: Colour, piece_type: PieceType, to: Square },
    #[error("{colour} cannot castle {side:?}-side: king or rook missing")]
    MissingCastlingPieces { colour: Colour, side: CastleSide },
}

/// A point where the live engine and the log replay disagree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Divergence {
    #[error("ply {ply}: placements differ")]
    Position { ply: usize },
    #[error("ply {ply}: live engine has {live} to move, replay has {replay}")]
    SideToMove { ply: usize, live: Colour, replay: Colour },
    #[error("ply {ply}: live en passant target {live:?}, replay {replay:?}")]
    EnPassant { ply: usize, live: Option<Square>, replay: Option<Square> },
    #[error("ply {ply}: verdicts on {from}{to} differ (live {live}, replay {replay})")]
    Verdict { ply: usize, from: Square, to: Square, live: bool, replay: bool },
    #[error("ply {ply}: live engine rejected {request}: {source}")]
    Rejected { ply: usize, request: String, source: EngineError },
}

/// Failures of a command typed into the interactive session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("the game is over, type `new` to start again")]
    GameOver,
    #[error(transparent)]
    MoveParse(#[from] MoveParseError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Storage(String),
}

pub type PositionValidityError = String;
