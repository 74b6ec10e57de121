//! Page-level failure display and the context pages use to report failures.

use crate::app::{AppCtx, Route};
use crate::components::button::{Button, ButtonVariant};
use crate::i18n::Translator;
use trellis_telemetry::{Environment, Level};
use yew::prelude::*;
use yew_router::prelude::use_navigator;

/// Callback that swaps the current page for [`ErrorFallback`].
#[derive(Clone, PartialEq)]
pub(crate) struct FailureReporter(pub(crate) Callback<String>);

/// Reporter from context, or one that only logs when no layout is mounted.
#[hook]
pub(crate) fn use_failure_reporter() -> Callback<String> {
    use_context::<FailureReporter>().map_or_else(
        || {
            Callback::from(|message: String| {
                tracing::error!(%message, "page failure outside layout");
            })
        },
        |reporter| reporter.0,
    )
}

/// Build the reporter owned by the layout.
pub(crate) fn failure_reporter(
    ctx: Option<AppCtx>,
    failure: UseStateHandle<Option<String>>,
) -> FailureReporter {
    FailureReporter(Callback::from(move |message: String| {
        if let Some(ctx) = &ctx {
            ctx.tracker.capture_message(&message, Level::Error);
        }
        failure.set(Some(message));
    }))
}

#[derive(Properties, PartialEq)]
pub(crate) struct ErrorFallbackProps {
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or_default]
    pub on_reset: Option<Callback<()>>,
}

#[function_component(ErrorFallback)]
pub(crate) fn error_fallback(props: &ErrorFallbackProps) -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let show_details = use_context::<AppCtx>()
        .is_some_and(|ctx| ctx.environment == Environment::Development);
    let navigator = use_navigator();

    let go_home = Callback::from(move |_: MouseEvent| {
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Home);
        }
    });
    let try_again = props.on_reset.clone().map(|on_reset| {
        Callback::from(move |_: MouseEvent| on_reset.emit(()))
    });

    html! {
        <div class="error-fallback" role="alert">
            <div class="error-icon" aria-hidden="true">{"⚠"}</div>
            <h1>{ i18n.t_or("error.title", "Oops!") }</h1>
            <p>{ i18n.t_or("error.message", "Something went wrong. Please try again.") }</p>
            if show_details {
                if let Some(error) = &props.error {
                    <details class="error-details">
                        <summary>{ i18n.t_or("error.details", "Error details") }</summary>
                        <pre>{ error.clone() }</pre>
                    </details>
                }
            }
            <div class="actions">
                if let Some(onclick) = try_again {
                    <Button {onclick}>{ i18n.t_or("error.tryAgain", "Try again") }</Button>
                }
                <Button variant={ButtonVariant::Secondary} onclick={go_home}>
                    { i18n.t_or("error.goHome", "Go to homepage") }
                </Button>
            </div>
        </div>
    }
}
