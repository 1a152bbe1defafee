//! Domain model for boards, the phrase buffer and display preferences.
//!
//! # Invariants
//! - Board values are replaced, never mutated in place, once handed out.
//! - The phrase buffer never holds empty words.

pub mod board;
pub mod demo;
pub mod phrase;
pub mod preferences;
