//! Labelled text input with inline error and helper text.

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct FormFieldProps {
    pub label: AttrValue,
    pub name: AttrValue,
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    #[prop_or_default]
    pub placeholder: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub error: Option<AttrValue>,
    #[prop_or_default]
    pub helper: Option<AttrValue>,
    pub on_input: Callback<String>,
}

#[function_component(FormField)]
pub(crate) fn form_field(props: &FormFieldProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |event: InputEvent| {
            let input: web_sys::HtmlInputElement = event.target_unchecked_into();
            on_input.emit(input.value());
        })
    };
    let id = format!("field-{}", props.name);
    let described_by = props.error.as_ref().map(|_| format!("{id}-error"));

    html! {
        <div class={classes!("form-field", props.error.as_ref().map(|_| "has-error"))}>
            <label for={id.clone()}>{ props.label.clone() }</label>
            <input
                id={id.clone()}
                name={props.name.clone()}
                type={props.input_type.clone()}
                placeholder={props.placeholder.clone()}
                value={props.value.clone()}
                aria-invalid={props.error.is_some().to_string()}
                aria-describedby={described_by}
                {oninput}
            />
            if let Some(error) = &props.error {
                <p id={format!("{id}-error")} class="error-message" role="alert">{ error.clone() }</p>
            } else if let Some(helper) = &props.helper {
                <p class="helper-text">{ helper.clone() }</p>
            }
        </div>
    }
}
