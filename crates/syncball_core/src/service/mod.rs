//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into sync passes.
//! - Keep feed-shaped input decoupled from storage details.

pub mod league_sync;
