//! Library crate for tabletop-tally, the core of a board-game play tracker.
//!
//! The crate is consumed as plain async function calls: the [`services`]
//! module exposes the match lifecycle operations (timer, round scores,
//! winner resolution, completion) and the sharing grant lifecycle, all
//! gated by the canonical resolver so that a match reached through a
//! sharing grant and a match reached by its owner mutate the same
//! underlying rows. Persistence is abstracted behind
//! [`dao::match_store::MatchStore`].

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
