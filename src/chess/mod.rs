pub mod board;
pub mod chessmove;
pub mod fen;
pub mod game;
pub mod piece;
pub mod san;
pub mod squareset;
pub mod types;
