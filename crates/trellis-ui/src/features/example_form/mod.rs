//! Example form feature wiring.
//!
//! # Design
//! - Validation rules live in `logic` and report translation keys, never display text.
//! - `state` owns the editing/submission lifecycle so the view only renders it.

pub mod logic;
pub mod state;
#[cfg(target_arch = "wasm32")]
pub mod view;
