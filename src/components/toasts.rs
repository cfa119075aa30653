use crate::notify::ToastKind;
use crate::state::use_app;
use leptos::prelude::*;

#[component]
pub(crate) fn ToastHost() -> impl IntoView {
    let notifications = use_app().notifications;

    view! {
        <div
            data-name="ToastHost"
            class="pointer-events-none fixed right-4 bottom-4 z-50 flex w-80 flex-col gap-2"
            aria-live="polite"
        >
            <For
                each=move || notifications.toasts()
                key=|t| t.id
                children=move |toast| {
                    let id = toast.id;
                    let icon = match toast.kind {
                        ToastKind::Success => "✅",
                        ToastKind::Error => "⚠️",
                        ToastKind::Info => "ℹ️",
                    };
                    let class = format!(
                        "pointer-events-auto flex cursor-pointer items-start gap-2 rounded-lg border px-3 py-2 text-sm shadow-md {}",
                        toast.kind.class()
                    );
                    view! {
                        <div
                            class=class
                            role=if toast.kind == ToastKind::Error { "alert" } else { "status" }
                            title="Dismiss"
                            on:click=move |_| notifications.dismiss(id)
                        >
                            <span aria-hidden="true">{icon}</span>
                            <span class="flex-1">{toast.message}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}
