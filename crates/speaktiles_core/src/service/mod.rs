//! Use-case services over the board model and storage.
//!
//! # Responsibility
//! - Keep UI/FFI callers away from storage and serialization details.
//! - Route every board change through [`board_store::BoardStore`].

pub mod board_store;
pub mod preferences_service;
pub mod search;
pub mod share_codec;
pub mod transfer;
