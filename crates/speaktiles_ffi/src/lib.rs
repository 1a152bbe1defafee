//! Flutter-facing bindings over `speaktiles_core`.

pub mod api;
