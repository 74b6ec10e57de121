//! Button with variants, sizes, and a loading state.

use yew::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
}

impl ButtonVariant {
    const fn class(self) -> &'static str {
        match self {
            Self::Primary => "btn-primary",
            Self::Secondary => "btn-secondary",
            Self::Outline => "btn-outline",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ButtonSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ButtonSize {
    const fn class(self) -> &'static str {
        match self {
            Self::Sm => "btn-sm",
            Self::Md => "btn-md",
            Self::Lg => "btn-lg",
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct ButtonProps {
    #[prop_or_default]
    pub variant: ButtonVariant,
    #[prop_or_default]
    pub size: ButtonSize,
    /// Shows a spinner and disables the button.
    #[prop_or_default]
    pub loading: bool,
    #[prop_or(AttrValue::Static("button"))]
    pub kind: AttrValue,
    #[prop_or_default]
    pub aria_label: Option<AttrValue>,
    #[prop_or_default]
    pub onclick: Option<Callback<MouseEvent>>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Button)]
pub(crate) fn button(props: &ButtonProps) -> Html {
    html! {
        <button
            type={props.kind.clone()}
            class={classes!("btn", props.variant.class(), props.size.class())}
            disabled={props.loading}
            aria-busy={props.loading.to_string()}
            aria-label={props.aria_label.clone()}
            onclick={props.onclick.clone()}
        >
            if props.loading {
                <span class="spinner" aria-hidden="true"></span>
            }
            { for props.children.iter() }
        </button>
    }
}
