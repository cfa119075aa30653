use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, FieldError, Input, Label, NativeSelect, Spinner, TextArea,
};
use crate::models::{Frequency, Habit, HabitCategory, HabitDraft};
use crate::util::{validate_habit, FieldErrors};
use leptos::prelude::*;
use std::str::FromStr;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

fn category_options() -> Vec<(String, String)> {
    HabitCategory::iter()
        .map(|c| (c.to_string(), format!("{} {}", c.icon(), c.label())))
        .collect()
}

fn frequency_options() -> Vec<(String, String)> {
    Frequency::iter()
        .map(|f| (f.to_string(), f.label().to_string()))
        .collect()
}

/// Create / edit form. Validation runs on submit and errors render next to
/// their field; the parent only sees drafts that passed.
#[component]
pub(crate) fn HabitForm(
    #[prop(optional)] initial: Option<Habit>,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_submit: Callback<HabitDraft>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let editing = initial.is_some();
    let seed = initial.as_ref().map(HabitDraft::from).unwrap_or_default();

    let title = RwSignal::new(seed.title);
    let description = RwSignal::new(seed.description);
    let category = RwSignal::new(seed.category.to_string());
    let frequency = RwSignal::new(seed.frequency.to_string());
    let color = RwSignal::new(seed.color_code);
    let icon = RwSignal::new(seed.icon);
    let micro = RwSignal::new(seed.is_micro_habit);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.get(field).map(str::to_string)))
    };

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let draft = HabitDraft {
            title: title.get_untracked().trim().to_string(),
            description: description.get_untracked().trim().to_string(),
            category: HabitCategory::from_str(&category.get_untracked()).unwrap_or_default(),
            frequency: Frequency::from_str(&frequency.get_untracked()).unwrap_or_default(),
            color_code: color.get_untracked().trim().to_string(),
            icon: icon.get_untracked().trim().to_string(),
            is_micro_habit: micro.get_untracked(),
        };
        match validate_habit(&draft) {
            Ok(()) => {
                errors.set(FieldErrors::default());
                on_submit.run(draft);
            }
            Err(e) => errors.set(e),
        }
    };

    view! {
        <form data-name="HabitForm" class="flex flex-col gap-3" on:submit=submit>
            <div class="flex flex-col gap-1.5">
                <Label html_for="habit-title" required=true>"Title"</Label>
                <Input
                    id="habit-title"
                    placeholder="e.g. Drink a glass of water"
                    bind_value=title
                    invalid=Signal::derive(move || errors.with(|e| e.get("title").is_some()))
                    autofocus=true
                />
                <FieldError message=field_error("title") />
            </div>

            <div class="flex flex-col gap-1.5">
                <Label html_for="habit-description">"Description"</Label>
                <TextArea id="habit-description" bind_value=description placeholder="Why does this matter?" />
            </div>

            <div class="grid grid-cols-2 gap-3">
                <div class="flex flex-col gap-1.5">
                    <Label html_for="habit-category">"Category"</Label>
                    <NativeSelect id="habit-category" options=category_options() bind_value=category />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="habit-frequency">"Frequency"</Label>
                    <NativeSelect id="habit-frequency" options=frequency_options() bind_value=frequency />
                </div>
            </div>

            <div class="grid grid-cols-2 gap-3">
                <div class="flex flex-col gap-1.5">
                    <Label html_for="habit-color">"Color"</Label>
                    <div class="flex items-center gap-2">
                        <input
                            type="color"
                            class="h-9 w-10 rounded border"
                            prop:value=move || color.get()
                            on:input=move |ev: web_sys::Event| {
                                if let Some(el) = ev
                                    .target()
                                    .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                                {
                                    color.set(el.value());
                                }
                            }
                        />
                        <Input
                            id="habit-color"
                            bind_value=color
                            invalid=Signal::derive(move || errors.with(|e| e.get("color_code").is_some()))
                        />
                    </div>
                    <FieldError message=field_error("color_code") />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="habit-icon">"Icon"</Label>
                    <Input id="habit-icon" placeholder="💧" bind_value=icon />
                </div>
            </div>

            <label class="flex items-center gap-2 text-sm">
                <input
                    type="checkbox"
                    prop:checked=move || micro.get()
                    on:change=move |ev: web_sys::Event| {
                        if let Some(el) = ev
                            .target()
                            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                        {
                            micro.set(el.checked());
                        }
                    }
                />
                "Micro habit (two minutes or less)"
            </label>

            <div class="flex justify-end gap-2 pt-2">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:r#type="button"
                    on:click=move |_| on_cancel.run(())
                >
                    "Cancel"
                </Button>
                <Button size=ButtonSize::Sm attr:r#type="submit" attr:disabled=move || busy.get()>
                    <Show when=move || busy.get()>
                        <Spinner />
                    </Show>
                    {if editing { "Save changes" } else { "Create habit" }}
                </Button>
            </div>
        </form>
    }
}
