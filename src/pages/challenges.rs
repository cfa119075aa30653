use crate::components::ui::{
    Button, ButtonSize, Card, CardContent, CardGrid, EmptyState, ErrorBanner, LoadingBlock,
};
use crate::components::{ChallengeCard, ChallengeForm};
use crate::models::{Challenge, ChallengeDraft};
use crate::notify::Notifier;
use crate::optimistic::Messages;
use crate::state::use_app;
use crate::util::now_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn mark_joined(challenges: &mut [Challenge], id: i64) {
    if let Some(c) = challenges.iter_mut().find(|c| c.id == id && !c.joined) {
        c.joined = true;
        c.participants_count += 1;
    }
}

#[component]
pub fn ChallengesPage() -> impl IntoView {
    let app = use_app();
    let challenges: RwSignal<Vec<Challenge>> = RwSignal::new(Vec::new());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let creating: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let coordinator = app.optimistic(challenges);

    let load = Callback::new({
        let app = app.clone();
        move |()| {
            loading.set(true);
            load_error.set(None);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.challenges().await {
                    Ok(list) => {
                        let _ = challenges.try_set(list);
                    }
                    Err(e) => {
                        log::warn!("loading challenges failed: {e}");
                        if e.is_unauthorized() {
                            app.report(&e, "Could not load challenges");
                        }
                        let _ = load_error.try_set(Some(e.message));
                    }
                }
                let _ = loading.try_set(false);
            });
        }
    });
    load.run(());

    let on_join = Callback::new({
        let app = app.clone();
        move |id: i64| {
            if challenges.with_untracked(|cs| cs.iter().any(|c| c.id == id && c.joined)) {
                return;
            }
            let api = app.api_client.clone();
            let settle = coordinator.apply(
                [id],
                move |cs: &mut Vec<Challenge>| mark_joined(cs, id),
                async move { api.join_challenge(id).await },
                Messages::failure("Could not join the challenge")
                    .with_success("You joined the challenge. Good luck!"),
            );
            spawn_local(async move {
                let _ = settle.await;
            });
        }
    });

    let on_create = Callback::new({
        let app = app.clone();
        move |draft: ChallengeDraft| {
            saving.set(true);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.create_challenge(&draft).await {
                    Ok(created) => {
                        let _ = challenges.try_update(|cs| cs.insert(0, created));
                        let _ = creating.try_set(false);
                        app.notifications.show_success("Challenge created");
                    }
                    Err(e) => app.report(&e, "Could not create the challenge"),
                }
                let _ = saving.try_set(false);
            });
        }
    });

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between gap-3">
                <h1 class="text-xl font-semibold">"Challenges"</h1>
                <Button size=ButtonSize::Sm on:click=move |_| creating.update(|v| *v = !*v)>
                    "+ New challenge"
                </Button>
            </div>

            <Show when=move || creating.get()>
                <Card>
                    <CardContent class="pt-4">
                        <ChallengeForm busy=saving on_submit=on_create on_cancel=move |()| creating.set(false) />
                    </CardContent>
                </Card>
            </Show>

            <ErrorBanner message=load_error on_retry=load />

            {move || {
                if loading.get() && challenges.with(|cs| cs.is_empty()) {
                    return view! { <LoadingBlock label="Loading challenges..." /> }.into_any();
                }
                if challenges.with(|cs| cs.is_empty()) {
                    return view! { <EmptyState>"No challenges yet. Start one and invite your friends."</EmptyState> }
                        .into_any();
                }
                let now = now_ms();
                view! {
                    <CardGrid>
                        <For
                            each=move || challenges.get()
                            key=|c| (c.id, c.joined, c.participants_count)
                            children=move |c| view! { <ChallengeCard challenge=c now_ms=now on_join=on_join /> }
                        />
                    </CardGrid>
                }
                    .into_any()
            }}
        </div>
    }
}
