//! Home page feature slice.
//!
//! # Design
//! - The random-user demo goes through the shared HTTP client like any API call.
//! - Rendering stays in the view module.

pub mod logic;
#[cfg(target_arch = "wasm32")]
pub mod view;
