//! Original vs reinvestment cohort reconstruction from aggregate counters.

pub mod split;

pub use split::{reconstruct_cohorts, split_cohorts, CohortReport, CohortRow, CohortSplit};
