//! Game logic for Parlor: the deal and the authoritative turn loop.
//!
//! The server pipeline hands the dealt roster to a [`TurnEngine`],
//! which owns every connection for the rest of the game and resolves
//! to an [`Outcome`].

mod dealer;
mod engine;
mod error;

pub use dealer::{build_deck, choose_solution, deal_round_robin, run_deal};
pub use engine::{Outcome, TurnEngine, broadcast_abort, solve_is_correct, validate_suggestion};
pub use error::GameError;
