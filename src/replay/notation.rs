use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::{
    chess::{
        chessmove::CastleSide,
        piece::PieceType,
        types::{File, Rank, Square},
    },
    errors::NotationError,
};

/// One entry of a move log in minimal algebraic notation.
///
/// Only what the log states is kept here. Which piece actually moves is
/// worked out against a reconstructed position by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Castle(CastleSide),
    Piece {
        piece_type: PieceType,
        origin_file: Option<File>,
        origin_rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<PieceType>,
    },
}

impl FromStr for Notation {
    type Err = NotationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let text = token.trim().trim_end_matches(['+', '#', '!', '?']);
        if text.is_empty() {
            return Err(NotationError::Empty);
        }
        match text {
            "O-O" | "0-0" => return Ok(Self::Castle(CastleSide::King)),
            "O-O-O" | "0-0-0" => return Ok(Self::Castle(CastleSide::Queen)),
            _ => {}
        }

        let (body, promotion) = match text.split_once('=') {
            Some((body, promo)) => {
                let mut chars = promo.chars();
                let kind = chars
                    .next()
                    .and_then(|c| PieceType::from_san_letter(c.to_ascii_uppercase()))
                    .filter(|pt| pt.legal_promo());
                match (kind, chars.next()) {
                    (Some(kind), None) => (body, Some(kind)),
                    _ => return Err(NotationError::InvalidPromotion(token.to_string())),
                }
            }
            None => (text, None),
        };

        let mut chars: Vec<char> = body.chars().filter(|&c| c != '-').collect();
        let piece_type = match chars.first().copied().and_then(PieceType::from_san_letter) {
            Some(pt) => {
                chars.remove(0);
                pt
            }
            None => PieceType::Pawn,
        };
        let capture = chars.contains(&'x');
        chars.retain(|&c| c != 'x');

        let [hints @ .., file_char, rank_char] = chars.as_slice() else {
            return Err(NotationError::MissingDestination(token.to_string()));
        };
        let (Some(file), Some(rank)) = (File::from_char(*file_char), Rank::from_char(*rank_char)) else {
            return Err(NotationError::MissingDestination(token.to_string()));
        };

        let mut origin_file = None;
        let mut origin_rank = None;
        for &c in hints {
            match (File::from_char(c), Rank::from_char(c)) {
                (Some(f), _) if origin_file.is_none() && origin_rank.is_none() => origin_file = Some(f),
                (_, Some(r)) if origin_rank.is_none() => origin_rank = Some(r),
                _ => return Err(NotationError::UnexpectedCharacter(token.to_string(), c)),
            }
        }

        Ok(Self::Piece {
            piece_type,
            origin_file,
            origin_rank,
            capture,
            to: file.with(rank),
            promotion,
        })
    }
}

impl Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Castle(side) => write!(f, "{}", side.notation()),
            Self::Piece { piece_type, origin_file, origin_rank, capture, to, promotion } => {
                if let Some(letter) = piece_type.san_letter() {
                    write!(f, "{letter}")?;
                }
                if let Some(file) = origin_file {
                    write!(f, "{}", file.char())?;
                }
                if let Some(rank) = origin_rank {
                    write!(f, "{}", rank.char())?;
                }
                if capture {
                    write!(f, "x")?;
                }
                write!(f, "{to}")?;
                if let Some(letter) = promotion.and_then(PieceType::san_letter) {
                    write!(f, "={letter}")?;
                }
                Ok(())
            }
        }
    }
}
