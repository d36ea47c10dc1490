//! Loan-level carried-interest contribution ranking.

pub mod ranking;

pub use ranking::{
    rank_carry_contribution, CarryRankingEntry, IrrSource, MissingIrrPolicy, RankingParams,
};
