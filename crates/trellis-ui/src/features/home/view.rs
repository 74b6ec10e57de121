//! Landing page: hero, random-user demo, preference demo, and the technology grid.

use crate::app::{AppCtx, Route};
use crate::components::button::{Button, ButtonSize, ButtonVariant};
use crate::components::error_fallback::use_failure_reporter;
use crate::core::http::{ApiErrorKind, RequestOptions};
use crate::core::preferences::Theme;
use crate::core::store::AppStore;
use crate::features::home::logic::{TECHNOLOGIES, Technology, UserSummary, fetch_random_user};
use crate::i18n::Translator;
use futures_util::future::AbortHandle;
use yew::platform::spawn_local;
use yew::prelude::*;
use yew_router::prelude::Link;
use yewdux::prelude::use_selector;

#[derive(Clone, Debug, PartialEq, Eq)]
enum UserDemo {
    Idle,
    Loading,
    Loaded(UserSummary),
    Empty,
    Failed(String),
}

#[function_component(HomePage)]
pub(crate) fn home_page() -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let ctx = use_context::<AppCtx>();
    let report_failure = use_failure_reporter();
    let theme = *use_selector(AppStore::theme);
    let demo = use_state(|| UserDemo::Idle);
    let in_flight = use_mut_ref(|| None::<AbortHandle>);

    {
        let in_flight = in_flight.clone();
        use_effect_with_deps(
            move |()| {
                move || {
                    if let Some(handle) = in_flight.borrow_mut().take() {
                        handle.abort();
                    }
                }
            },
            (),
        );
    }

    let fetch_user = {
        let demo = demo.clone();
        let ctx = ctx.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(ctx) = ctx.clone() else {
                return;
            };
            let (handle, registration) = AbortHandle::new_pair();
            if let Some(previous) = in_flight.borrow_mut().replace(handle) {
                previous.abort();
            }
            demo.set(UserDemo::Loading);
            let demo = demo.clone();
            let report_failure = report_failure.clone();
            spawn_local(async move {
                let options = RequestOptions::new().abortable(registration);
                match fetch_random_user(&ctx.http, options).await {
                    Ok(Some(user)) => demo.set(UserDemo::Loaded(user)),
                    Ok(None) => demo.set(UserDemo::Empty),
                    Err(err) if err.is_aborted() => {}
                    Err(err) if err.kind == ApiErrorKind::Decode => {
                        demo.set(UserDemo::Idle);
                        report_failure.emit(err.message);
                    }
                    Err(err) => {
                        ctx.tracker.capture_exception(&err, None);
                        demo.set(UserDemo::Failed(err.message));
                    }
                }
            });
        })
    };

    let theme_button = |option: Theme| {
        let onclick = {
            let ctx = ctx.clone();
            Callback::from(move |_: MouseEvent| {
                if let Some(ctx) = &ctx {
                    ctx.set_theme(option);
                }
            })
        };
        let variant = if option == theme {
            ButtonVariant::Primary
        } else {
            ButtonVariant::Outline
        };
        html! {
            <Button {variant} size={ButtonSize::Sm} {onclick}>
                { i18n.t(&format!("theme.{}", option.as_str())) }
            </Button>
        }
    };

    html! {
        <div class="home-page">
            <section class="hero">
                <h1>{ i18n.t("home.title") }</h1>
                <p class="muted">{ i18n.t("home.subtitle") }</p>
                <Link<Route> to={Route::Form} classes="btn btn-primary btn-lg">
                    { i18n.t("home.tryForm") }
                </Link<Route>>
            </section>

            <div class="demo-grid">
                <section class="card">
                    <h2>{ i18n.t("home.userDemo.title") }</h2>
                    <Button loading={*demo == UserDemo::Loading} onclick={fetch_user}>
                        if *demo == UserDemo::Loading {
                            { i18n.t("home.loading") }
                        } else {
                            { i18n.t("home.fetchUser") }
                        }
                    </Button>
                    { user_demo_body(&demo, &i18n) }
                </section>

                <section class="card">
                    <h2>{ i18n.t("home.preferences.title") }</h2>
                    <p>
                        { i18n.t("home.preferences.current") }
                        {" "}
                        <strong>{ i18n.t(&format!("theme.{}", theme.as_str())) }</strong>
                    </p>
                    <div class="button-row">
                        { for Theme::all().into_iter().map(theme_button) }
                    </div>
                    <p class="muted">{ i18n.t("home.preferences.persisted") }</p>
                </section>
            </div>

            <section class="tech">
                <h2>{ i18n.t("home.tech.title") }</h2>
                <ul class="tech-grid">
                    { for TECHNOLOGIES.iter().map(|tech| technology_card(tech, &i18n)) }
                </ul>
            </section>
        </div>
    }
}

fn user_demo_body(demo: &UserDemo, i18n: &Translator) -> Html {
    match demo {
        UserDemo::Idle | UserDemo::Loading => html! {},
        UserDemo::Empty => html! { <p class="muted">{ i18n.t("home.userDemo.empty") }</p> },
        UserDemo::Failed(message) => html! {
            <p class="error-message" role="alert">
                { i18n.t_with("home.userDemo.error", &[("message", message.as_str())]) }
            </p>
        },
        UserDemo::Loaded(user) => html! {
            <div class="user-card">
                <img src={user.avatar_url.clone()} alt={user.first_name.clone()} />
                <div>
                    <strong>{ user.full_name.clone() }</strong>
                    <p>{ user.email.clone() }</p>
                    <p class="muted">{ user.country.clone() }</p>
                </div>
            </div>
        },
    }
}

fn technology_card(tech: &Technology, i18n: &Translator) -> Html {
    html! {
        <li class="tech-card">
            <strong>{ tech.name }</strong>
            <span class="muted">{ i18n.t(tech.description_key) }</span>
        </li>
    }
}
