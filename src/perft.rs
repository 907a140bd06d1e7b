use crate::chess::game::Game;

/// Counts the leaf nodes of the legal move tree below `game`, `depth` plies deep.
pub fn perft(game: &Game, depth: usize) -> u64 {
    debug_assert_eq!(game.board().check_validity(), Ok(()));

    if depth == 0 {
        return 1;
    }

    let mut game = game.clone();
    let moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut count = 0;
    for m in moves {
        let mut child = game.clone();
        if let Err(e) = child.apply(m.from(), m.to(), m.promotion()) {
            tracing::error!(%m, error = %e, "generated move was rejected");
            continue;
        }
        count += perft(&child, depth - 1);
    }

    count
}

/// Perft split by root move, sorted by move text, the way perft tools print it.
pub fn divide(game: &Game, depth: usize) -> Vec<(String, u64)> {
    let mut game = game.clone();
    let mut out: Vec<_> = game
        .legal_moves()
        .into_iter()
        .filter_map(|m| {
            let mut child = game.clone();
            child.apply(m.from(), m.to(), m.promotion()).ok()?;
            Some((m.to_string(), perft(&child, depth.saturating_sub(1))))
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_start_position() {
        let game = Game::new();
        assert_eq!(perft(&game, 0), 1);
        assert_eq!(perft(&game, 1), 20);
        assert_eq!(perft(&game, 2), 400);
        assert_eq!(perft(&game, 3), 8_902);
    }

    #[test]
    fn perft_rook_endgame() {
        // kings and rooks are off their home squares, so castling never arises
        let game = Game::from_placement("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w").unwrap();
        assert_eq!(perft(&game, 1), 14);
        assert_eq!(perft(&game, 2), 191);
        assert_eq!(perft(&game, 3), 2_812);
    }

    #[test]
    fn perft_kiwipete() {
        let game = Game::from_placement("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w").unwrap();
        assert_eq!(perft(&game, 1), 48);
        assert_eq!(perft(&game, 2), 2_039);
        assert_eq!(perft(&game, 3), 97_862);
    }

    #[test]
    fn divide_sums_to_perft() {
        let game = Game::new();
        let split = divide(&game, 2);
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, n)| *n == 20));
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), perft(&game, 2));
    }
}
