//! Core types for the homework status bot.
//!
//! Holds the review verdicts, the validation of status API answers and the
//! rendering of the notification text. Nothing here performs I/O.

pub mod error;
pub mod homework;
pub mod verdict;

pub use error::*;
pub use homework::*;
pub use verdict::*;
