use crate::components::ToastHost;
use crate::pages::{
    ChallengesPage, DashboardPage, FeedPage, HabitsPage, LoginPage, ProfilePage, RegisterPage,
    RootAuthed,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("register") view=RegisterPage />
                <Route path=path!("habits") view=move || view! {
                    <RootAuthed>
                        <HabitsPage />
                    </RootAuthed>
                } />
                <Route path=path!("feed") view=move || view! {
                    <RootAuthed>
                        <FeedPage />
                    </RootAuthed>
                } />
                <Route path=path!("challenges") view=move || view! {
                    <RootAuthed>
                        <ChallengesPage />
                    </RootAuthed>
                } />
                <Route path=path!("profile") view=move || view! {
                    <RootAuthed>
                        <ProfilePage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=move || view! {
                    <RootAuthed>
                        <DashboardPage />
                    </RootAuthed>
                } />
            </Routes>
        </Router>
        <ToastHost />
    }
}
