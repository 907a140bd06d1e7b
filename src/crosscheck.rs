//! Cross-validation of the live engine against the log replay.
//!
//! The two share no rule code, so agreement on every ply of a game is a
//! strong check on both.

use crate::{
    chess::{chessmove::MoveRequest, game::Game, types::Square},
    errors::Divergence,
    replay::{MoveHistory, position::Position},
};

/// Compares the live game with a replay of its own algebraic log.
///
/// Checks the placement, the side to move, the en passant target, and the
/// verdict on every from/to pair where `from` holds a piece.
pub fn check_position(game: &mut Game) -> Result<(), Divergence> {
    let ply = game.history().len();
    let replayed = MoveHistory::from_iter(game.algebraic_log()).reconstruct();

    if replayed.position != Position::from_board(game.board()) {
        return Err(Divergence::Position { ply });
    }
    if replayed.side_to_move != game.turn() {
        return Err(Divergence::SideToMove { ply, live: game.turn(), replay: replayed.side_to_move });
    }
    if replayed.en_passant != game.ep_square() {
        return Err(Divergence::EnPassant { ply, live: game.ep_square(), replay: replayed.en_passant });
    }

    let occupied: Vec<_> = Square::all()
        .filter_map(|sq| game.board().get(sq).map(|piece| (sq, piece)))
        .collect();
    for (from, piece) in occupied {
        let destinations = if piece.colour() == game.turn() {
            game.legal_destinations(from)
        } else {
            Default::default()
        };
        for to in Square::all() {
            let live = destinations.contains(&to);
            let replay = replayed.is_valid_move(from, piece.piece_type(), piece, to);
            if live != replay {
                return Err(Divergence::Verdict { ply, from, to, live, replay });
            }
        }
    }
    Ok(())
}

/// Plays a coordinate move list from the initial position, cross-checking
/// before the first move and after every move. Returns the finished game.
pub fn check_game<I, S>(moves: I) -> Result<Game, Divergence>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut game = Game::new();
    check_position(&mut game)?;
    for text in moves {
        let text = text.as_ref();
        let ply = game.history().len();
        let Ok(request) = text.parse::<MoveRequest>() else {
            tracing::debug!(ply, text, "skipping unreadable move");
            continue;
        };
        game.apply(request.from, request.to, request.promotion)
            .map_err(|source| Divergence::Rejected { ply, request: text.to_string(), source })?;
        check_position(&mut game)?;
    }
    tracing::debug!(plies = game.history().len(), "live engine and replay agree");
    Ok(game)
}
