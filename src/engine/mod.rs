//! Word-substitution engine.
//!
//! A pure text transform that swaps word tokens for vocabulary entries
//! starting with the same letter. Which tokens get swapped is random,
//! controlled by a per-user rate.

pub mod substitute;
pub mod vocabulary;

pub use substitute::Substituter;
