pub mod canonical;
pub mod error;
pub mod resolver;
pub mod series;
pub mod time_value;
pub mod types;

#[cfg(feature = "cohorts")]
pub mod cohorts;

#[cfg(feature = "fees")]
pub mod fees;

#[cfg(feature = "health")]
pub mod health;

#[cfg(feature = "carry")]
pub mod carry;

#[cfg(feature = "full")]
pub mod report;

pub use error::LoanFundError;
pub use types::*;

/// Standard result type for all loan-fund operations
pub type LoanFundResult<T> = Result<T, LoanFundError>;
