use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Native `<select>` over `(value, label)` pairs, bound to a string signal.
#[component]
pub fn NativeSelect(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] id: String,
    options: Vec<(String, String)>,
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "border-input h-9 w-full rounded-md border bg-transparent px-3 text-sm shadow-xs outline-none focus-visible:ring-2 focus-visible:ring-ring/50",
        class
    );

    let on_change = move |ev: web_sys::Event| {
        if let Some(sel) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        {
            bind_value.set(sel.value());
        }
    };

    view! {
        <select data-name="NativeSelect" id=id class=merged_class on:change=on_change>
            {options
                .into_iter()
                .map(|(value, label)| {
                    let v2 = value.clone();
                    view! {
                        <option value=value selected=move || bind_value.get() == v2>
                            {label}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}
