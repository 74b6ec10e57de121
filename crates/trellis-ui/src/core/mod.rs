//! Core, DOM-free primitives and helpers for the web shell.
pub mod config;
pub mod http;
pub mod preferences;
pub mod storage;
pub mod store;
