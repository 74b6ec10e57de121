//! Routing definitions.
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/form")]
    Form,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    /// Translation key for the navigation label.
    pub(crate) const fn label_key(&self) -> &'static str {
        match self {
            Self::Home => "nav.home",
            Self::Form => "nav.form",
            Self::NotFound => "notFound.heading",
        }
    }
}
