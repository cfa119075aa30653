use crate::components::Navbar;
use crate::state::use_app;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;

/// Signed-in shell: navbar plus page body. Without a token it redirects to
/// `/login`; with a token but no cached user it fetches the user once.
#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app = use_app();
    let user = app.current_user;

    let is_authenticated = {
        let app = app.clone();
        move || {
            // Signing out clears the user, which re-runs this check.
            user.track();
            app.is_authenticated()
        }
    };

    if app.is_authenticated() && user.get_untracked().is_none() {
        let app = app.clone();
        spawn_local(async move {
            match app.api_client.me().await {
                Ok(me) => app.sign_in(me),
                Err(e) => app.report(&e, "Could not load your account"),
            }
        });
    }

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=|| view! { <Redirect path="/login" /> }>
            <div class="min-h-screen bg-background text-foreground">
                <Navbar />
                <main class="mx-auto w-full max-w-5xl px-4 py-6">
                    {move || children.with_value(|c| c())}
                </main>
            </div>
        </Show>
    }
}
