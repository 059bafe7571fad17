//! Name resolution and overload ranking (spec §4.3).

pub mod builtin_ops;
pub mod lookup;
pub mod rank;

pub use rank::{rank_candidates, score_argument, MatchLevel, RankedCandidate, Score};
