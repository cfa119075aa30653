use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::state::use_app;
use crate::theme::Theme;
use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

const LINKS: [(&str, &str); 5] = [
    ("/", "Dashboard"),
    ("/habits", "Habits"),
    ("/feed", "Community"),
    ("/challenges", "Challenges"),
    ("/profile", "Profile"),
];

fn is_active(current: &str, href: &str) -> bool {
    if href == "/" {
        current == "/" || current.is_empty()
    } else {
        current == href || current.starts_with(&format!("{href}/"))
    }
}

#[component]
pub(crate) fn ThemeSelector() -> impl IntoView {
    let theme = use_app().theme;
    let store = theme.store.clone();
    let current = theme.current;

    view! {
        <div class="flex items-center gap-1">
            <select
                data-name="ThemeSelector"
                aria-label="Theme"
                class="h-8 rounded-md border bg-transparent px-2 text-xs"
                on:change=move |ev: web_sys::Event| {
                    if let Some(sel) = ev
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
                    {
                        store.set_theme(&sel.value());
                    }
                }
            >
                {Theme::iter()
                    .map(|t| {
                        view! {
                            <option value=t.to_string() selected=move || current.get() == t>
                                {format!("{} {}", t.icon(), t.label())}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                attr:aria-label="Toggle dark mode"
                on:click=move |_| {
                    theme.store.toggle();
                }
            >
                {move || if current.get() == Theme::Dark { "☀️" } else { "🌙" }}
            </Button>
        </div>
    }
}

#[component]
pub(crate) fn Navbar() -> impl IntoView {
    let app = use_app();
    let pathname = use_location().pathname;
    let navigate = use_navigate();
    let user = app.current_user;

    let on_logout = move |_: web_sys::MouseEvent| {
        app.sign_out();
        navigate("/login", Default::default());
    };

    view! {
        <header class="sticky top-0 z-40 border-b bg-background/90 backdrop-blur">
            <nav class="mx-auto flex h-14 max-w-5xl items-center gap-4 px-4">
                <a href="/" class="font-semibold">"🌱 Habit Garden"</a>
                <div class="flex flex-1 items-center gap-1 overflow-x-auto">
                    {LINKS
                        .iter()
                        .map(|(href, label)| {
                            let href = *href;
                            let class = move || {
                                if is_active(&pathname.get(), href) {
                                    "rounded-md bg-accent px-3 py-1.5 text-sm font-medium"
                                } else {
                                    "rounded-md px-3 py-1.5 text-sm text-muted-foreground hover:text-foreground"
                                }
                            };
                            view! { <a href=href class=class>{*label}</a> }
                        })
                        .collect_view()}
                </div>
                <ThemeSelector />
                <span class="hidden text-xs text-muted-foreground sm:inline">
                    {move || user.get().map(|u| u.display_name()).unwrap_or_default()}
                </span>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                    "Log out"
                </Button>
            </nav>
        </header>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active_matches_section_prefix() {
        assert!(is_active("/", "/"));
        assert!(!is_active("/habits", "/"));
        assert!(is_active("/habits", "/habits"));
        assert!(is_active("/habits/12", "/habits"));
        assert!(!is_active("/habitsx", "/habits"));
    }
}
