//! Example form page: translated fields, inline errors, and a simulated submit.

use crate::components::button::{Button, ButtonVariant};
use crate::components::form_field::FormField;
use crate::features::example_form::logic::Field;
use crate::features::example_form::state::FormController;
use crate::i18n::Translator;
use gloo_timers::future::TimeoutFuture;
use yew::platform::spawn_local;
use yew::prelude::*;

/// Simulated submit latency.
const SUBMIT_DELAY_MS: u32 = 1_000;

#[function_component(ExampleFormPage)]
pub(crate) fn example_form_page() -> Html {
    let i18n = use_context::<Translator>().unwrap_or_else(Translator::fallback);
    let controller = use_mut_ref(FormController::new);
    let refresh = use_force_update();

    let onsubmit = {
        let controller = controller.clone();
        let refresh = refresh.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let pending = controller.borrow_mut().begin_submit();
            refresh.force_update();
            let Some(pending) = pending else {
                return;
            };
            let controller = controller.clone();
            let refresh = refresh.clone();
            spawn_local(async move {
                TimeoutFuture::new(SUBMIT_DELAY_MS).await;
                controller.borrow_mut().finish_submit(pending);
                refresh.force_update();
            });
        })
    };
    let onreset = {
        let controller = controller.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            controller.borrow_mut().reset();
            refresh.force_update();
        })
    };
    let onterms = {
        let controller = controller.clone();
        let refresh = refresh.clone();
        Callback::from(move |event: Event| {
            let input: web_sys::HtmlInputElement = event.target_unchecked_into();
            controller.borrow_mut().set_terms(input.checked());
            refresh.force_update();
        })
    };

    let state = controller.borrow().clone();
    let text_field = |field: Field| {
        let on_input = {
            let controller = controller.clone();
            let refresh = refresh.clone();
            Callback::from(move |value: String| {
                controller.borrow_mut().set_text(field, &value);
                refresh.force_update();
            })
        };
        let (input_type, placeholder, helper) = match field {
            Field::Email => ("email", i18n.t("form.email.placeholder"), None),
            Field::Age => ("number", i18n.t("form.age.placeholder"), None),
            Field::Password => (
                "password",
                "••••••••".to_string(),
                Some(AttrValue::from(i18n.t("form.password.helper"))),
            ),
            Field::ConfirmPassword => ("password", "••••••••".to_string(), None),
            Field::Name | Field::Terms => ("text", i18n.t("form.name.placeholder"), None),
        };
        html! {
            <FormField
                label={i18n.t(field.label_key())}
                name={field.as_str()}
                input_type={input_type}
                placeholder={placeholder}
                value={state.input().text(field).unwrap_or_default().to_string()}
                error={state.error(field).map(|key| AttrValue::from(i18n.t(key)))}
                {helper}
                {on_input}
            />
        }
    };
    let terms_error = state.error(Field::Terms);

    html! {
        <div class="form-page">
            <h1>{ i18n.t("form.title") }</h1>
            <p class="muted">{ i18n.t("form.subtitle") }</p>

            <form class="card" novalidate="novalidate" {onsubmit}>
                { for Field::all().into_iter().filter(|field| *field != Field::Terms).map(text_field) }
                <div class={classes!("form-field", "checkbox", terms_error.map(|_| "has-error"))}>
                    <label>
                        <input
                            type="checkbox"
                            name={Field::Terms.as_str()}
                            checked={state.input().terms}
                            aria-invalid={terms_error.is_some().to_string()}
                            onchange={onterms}
                        />
                        { i18n.t(Field::Terms.label_key()) }
                    </label>
                    if let Some(key) = terms_error {
                        <p class="error-message" role="alert">{ i18n.t(key) }</p>
                    }
                </div>
                <div class="button-row">
                    <Button kind="submit" loading={state.is_submitting()}>
                        { i18n.t("form.submit") }
                    </Button>
                    <Button variant={ButtonVariant::Secondary} onclick={onreset}>
                        { i18n.t("form.reset") }
                    </Button>
                </div>
            </form>

            if let Some(form) = state.submitted() {
                <section class="card success" role="status">
                    <h2>{ i18n.t("form.success") }</h2>
                    <pre>{ form.redacted_json() }</pre>
                </section>
            }
        </div>
    }
}
