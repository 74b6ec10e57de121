//! Shared UI components.

pub(crate) mod button;
pub(crate) mod error_fallback;
pub(crate) mod form_field;
pub(crate) mod language_switcher;
pub(crate) mod layout;
pub(crate) mod theme_toggle;
