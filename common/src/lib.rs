//! RateWidget Common Types
//!
//! Shared types used across the RateWidget crates: currency codes and pairs,
//! the code-parse error and time helpers.

pub mod currency;
pub mod error;
pub mod time;

pub use currency::*;
pub use error::*;
pub use time::*;
