//! Page-level feature slices. Each keeps DOM-free logic next to its wasm-only view.

pub mod example_form;
pub mod home;
#[cfg(target_arch = "wasm32")]
pub mod not_found;
