//! Flutter-facing bindings for the gift book core.

pub mod api;
