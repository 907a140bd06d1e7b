#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::multiple_crate_versions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

//! Arbiter: a chess rules engine, plus an independent replay of algebraic
//! move logs that is used to cross-check it.

pub mod chess;
pub mod config;
pub mod crosscheck;
pub mod errors;
pub mod perft;
pub mod play;
pub mod replay;
pub mod savefile;
