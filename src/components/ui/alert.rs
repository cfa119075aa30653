use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;

/// Inline message under a form control; renders nothing without an error.
#[component]
pub fn FieldError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message.get().map(|m| {
            view! { <p class="text-xs text-destructive" role="alert">{m}</p> }
        })
    }
}

/// Page-level error banner with a retry action.
#[component]
pub fn ErrorBanner(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(into)] on_retry: Callback<()>,
) -> impl IntoView {
    move || {
        message.get().map(|m| {
            view! {
                <Alert class="flex items-center justify-between gap-3 border-destructive/30">
                    <AlertDescription class="text-destructive">{m}</AlertDescription>
                    <button
                        class="text-xs font-medium text-primary underline underline-offset-4"
                        on:click=move |_| on_retry.run(())
                    >
                        "Try again"
                    </button>
                </Alert>
            }
        })
    }
}
