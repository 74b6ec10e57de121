//! Fallback page for unknown routes.

pub mod view;
