//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate store, aggregation and persistence into host-facing commands.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod ledger_service;
