use std::fmt::{self, Display};

use crate::{
    chess::{
        board::{Board, movegen::Destinations},
        chessmove::{Move, MoveRequest},
        fen,
        piece::{Colour, PieceType},
        squareset::SquareSet,
        types::{Rank, Square},
    },
    errors::{EngineError, PlacementError},
};

/// Terminal classification of the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Checkmate | Self::Stalemate)
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Check => "+",
            Self::Checkmate => "#",
            Self::Ongoing | Self::Stalemate => "",
        }
    }
}

/// What a successful [`Game::apply`] reports back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub en_passant: Option<Square>,
    pub status: GameStatus,
}

/// A move as it was played, with its algebraic rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub san: String,
}

/// The game state tracker: owns the board, the side to move and the en
/// passant target, and is the only thing that commits moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Colour,
    ep_square: Option<Square>,
    history: Vec<MoveRecord>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self {
            board: Board::startpos(),
            turn: Colour::White,
            ep_square: None,
            history: Vec::new(),
        }
    }

    /// A game starting from a placement string with an optional side field.
    pub fn from_placement(text: &str) -> Result<Self, PlacementError> {
        let (board, turn) = fen::parse(text)?;
        Ok(Self { board, turn, ep_square: None, history: Vec::new() })
    }

    /// Replays a coordinate move list from the initial position.
    ///
    /// Lines shorter than four characters or with unreadable squares are
    /// skipped. The first move that is read but rejected ends the replay, so
    /// the result is the longest playable prefix.
    pub fn load<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut game = Self::new();
        for (lineno, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            let head: String = line.chars().take(4).collect();
            let request = match head.parse::<MoveRequest>() {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!(lineno, line, error = %e, "skipping unreadable move line");
                    continue;
                }
            };
            if let Err(e) = game.apply(request.from, request.to, None) {
                tracing::warn!(lineno, line, error = %e, "stopping load at rejected move");
                break;
            }
        }
        game
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn turn(&self) -> Colour {
        self.turn
    }

    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// The en passant target as seen by `colour`: only the side to move may use it.
    fn ep_for(&self, colour: Colour) -> Option<Square> {
        if colour == self.turn { self.ep_square } else { None }
    }

    /// Legal destinations of the piece on `from`. Empty if it is not that
    /// piece's turn.
    pub fn legal_destinations(&mut self, from: Square) -> Destinations {
        self.board.legal_destinations(from, self.turn, self.ep_square)
    }

    /// Validates and commits a move for the side to move.
    ///
    /// Every check happens before the board is touched, so on error the game
    /// is exactly as it was.
    pub fn apply(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<ApplyOutcome, EngineError> {
        let piece = self.board.get(from).ok_or(EngineError::NoPieceAtSource(from))?;
        if piece.colour() != self.turn {
            return Err(EngineError::WrongColourToMove { square: from, colour: self.turn });
        }
        if let Some(pt) = promotion {
            let reaches_back_rank = piece.piece_type() == PieceType::Pawn && to.rank() == Rank::promotion(self.turn);
            if !pt.legal_promo() || !reaches_back_rank {
                return Err(EngineError::InvalidPromotion(pt));
            }
        }
        if !self.legal_destinations(from).contains(&to) {
            return Err(EngineError::IllegalDestination { from, to });
        }
        let m = self.board.classify(from, to, self.ep_square, promotion)?;
        let mut san = self
            .board
            .san(m)
            .ok_or(EngineError::NoPieceAtSource(from))?
            .to_string();

        self.board.apply_move(m)?;
        self.mark_moved(m);

        self.ep_square = if piece.piece_type() == PieceType::Pawn && from.rank().abs_diff(to.rank()) == 2 {
            from.offset(0, self.turn.forward())
        } else {
            None
        };
        self.turn = self.turn.flip();

        let status = self.status();
        san.push_str(status.suffix());
        tracing::debug!(%m, %san, ?status, "applied move");
        self.history.push(MoveRecord { mv: m, san });

        debug_assert_eq!(self.board.check_validity(), Ok(()));

        Ok(ApplyOutcome { en_passant: self.ep_square, status })
    }

    /// Sets the moved flag on any king or rook the move relocated.
    fn mark_moved(&mut self, m: Move) {
        let landed = match m {
            Move::Castle { colour, side } => [Some(side.king_to(colour)), Some(side.rook_to(colour))],
            _ => [Some(m.to()), None],
        };
        for sq in landed.into_iter().flatten() {
            if let Some(piece) = self.board.get(sq)
                && matches!(piece.piece_type(), PieceType::King | PieceType::Rook)
            {
                self.board.set(sq, Some(piece.moved()));
            }
        }
    }

    pub fn in_check(&self, colour: Colour) -> bool {
        self.board.in_check(colour)
    }

    /// Whether any piece of `colour` has a legal move. Stops at the first one found.
    pub fn has_any_legal_move(&mut self, colour: Colour) -> bool {
        let ep = self.ep_for(colour);
        let own: SquareSet = self.board.pieces(colour).map(|(sq, _)| sq).collect();
        own.iter().any(|sq| !self.board.legal_destinations(sq, colour, ep).is_empty())
    }

    pub fn is_checkmate(&mut self, colour: Colour) -> bool {
        self.in_check(colour) && !self.has_any_legal_move(colour)
    }

    pub fn is_stalemate(&mut self, colour: Colour) -> bool {
        !self.in_check(colour) && !self.has_any_legal_move(colour)
    }

    /// Classification of the position for the side to move.
    pub fn status(&mut self) -> GameStatus {
        let colour = self.turn;
        match (self.in_check(colour), self.has_any_legal_move(colour)) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Ongoing,
        }
    }

    /// Every legal move for the side to move, with each promotion kind listed
    /// separately.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let (turn, ep) = (self.turn, self.ep_square);
        let own: SquareSet = self.board.pieces(turn).map(|(sq, _)| sq).collect();
        let mut out = Vec::new();
        for from in own {
            for to in self.board.legal_destinations(from, turn, ep) {
                match self.board.classify(from, to, ep, None) {
                    Ok(Move::Normal { promotion: Some(_), .. }) => {
                        for pt in [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight] {
                            out.push(Move::new_promotion(from, to, pt));
                        }
                    }
                    Ok(m) => out.push(m),
                    Err(e) => tracing::trace!(%from, %to, error = %e, "unclassifiable destination"),
                }
            }
        }
        out
    }

    /// Whether the piece on `sq` is pinned against its own king.
    pub fn is_pinned(&mut self, sq: Square) -> bool {
        self.board.is_pinned(sq)
    }

    /// The history in the four-character save format, `e2e4` per move.
    pub fn coordinate_log(&self) -> Vec<String> {
        self.history
            .iter()
            .map(|record| format!("{}{}", record.mv.from(), record.mv.to()))
            .collect()
    }

    /// The history in algebraic notation, as consumed by the replay validator.
    pub fn algebraic_log(&self) -> Vec<String> {
        self.history.iter().map(|record| record.san.clone()).collect()
    }

    /// The end-of-game message for the side to move, if the game is over.
    pub fn result_message(&mut self) -> Option<String> {
        match self.status() {
            GameStatus::Checkmate => Some(format!("{} wins by checkmate", self.turn.flip())),
            GameStatus::Stalemate => Some("Draw by stalemate".to_string()),
            GameStatus::Ongoing | GameStatus::Check => None,
        }
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{} to move", self.turn)?;
        if let Some(ep) = self.ep_square {
            write!(f, " (en passant on {ep})")?;
        }
        Ok(())
    }
}
