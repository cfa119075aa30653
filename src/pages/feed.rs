use crate::components::hooks::{use_debounce, DEFAULT_DEBOUNCE_MS};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, EmptyState,
    ErrorBanner, Input, LoadingBlock, Spinner,
};
use crate::components::FeedItemCard;
use crate::models::{Comment, FeedItem, Reaction, User, LIKE_EMOJI};
use crate::optimistic::Messages;
use crate::state::use_app;
use crate::util::{make_tmp_id, now_ms, random_u64};
use leptos::prelude::*;
use leptos::task::spawn_local;

const MIN_SEARCH_LEN: usize = 2;

fn add_reaction(items: &mut [FeedItem], item_id: i64, reaction: Reaction) {
    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
        item.reactions.push(reaction);
    }
}

fn add_comment(items: &mut [FeedItem], item_id: i64, comment: Comment) {
    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
        item.comments.push(comment);
    }
}

/// Swaps a placeholder reaction for the server's copy.
fn confirm_reaction(items: &mut [FeedItem], item_id: i64, tmp_id: &str, server: &Reaction) {
    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
        if let Some(r) = item.reactions.iter_mut().find(|r| r.id == tmp_id) {
            *r = server.clone();
        }
    }
}

/// Swaps a placeholder comment for the server's copy.
fn confirm_comment(items: &mut [FeedItem], item_id: i64, tmp_id: &str, server: &Comment) {
    if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
        if let Some(c) = item.comments.iter_mut().find(|c| c.id == tmp_id) {
            *c = server.clone();
        }
    }
}

fn set_followed(users: &mut [User], user_id: i64, followed: bool) {
    if let Some(u) = users.iter_mut().find(|u| u.id == user_id) {
        u.followed = followed;
    }
}

fn search_query(raw: &str) -> Option<String> {
    let q = raw.trim();
    (q.chars().count() >= MIN_SEARCH_LEN).then(|| q.to_string())
}

#[component]
fn UserSearch() -> impl IntoView {
    let app = use_app();
    let query: RwSignal<String> = RwSignal::new(String::new());
    let debounced = use_debounce::<String>(query.into(), DEFAULT_DEBOUNCE_MS);
    let results: RwSignal<Vec<User>> = RwSignal::new(Vec::new());
    let searching: RwSignal<bool> = RwSignal::new(false);
    let coordinator = app.optimistic(results);

    Effect::new({
        let app = app.clone();
        move |_| {
            let Some(q) = search_query(&debounced.get()) else {
                results.set(Vec::new());
                searching.set(false);
                return;
            };
            searching.set(true);
            let app = app.clone();
            spawn_local(async move {
                let found = app.api_client.search_users(&q).await;
                // A newer query may have been issued meanwhile.
                if debounced.try_get_untracked().and_then(|d| search_query(&d)).as_deref() != Some(q.as_str()) {
                    return;
                }
                match found {
                    Ok(users) => {
                        let _ = results.try_set(users);
                    }
                    Err(e) => app.report(&e, "User search failed"),
                }
                let _ = searching.try_set(false);
            });
        }
    });

    let toggle_follow = Callback::new({
        let app = app.clone();
        move |(user_id, follow): (i64, bool)| {
            let api = app.api_client.clone();
            let name = results.with_untracked(|us| {
                us.iter().find(|u| u.id == user_id).map(User::display_name).unwrap_or_default()
            });
            let messages = if follow {
                Messages::failure(format!("Could not follow {name}"))
                    .with_success(format!("You're now following {name}"))
            } else {
                Messages::failure(format!("Could not unfollow {name}"))
            };
            let settle = coordinator.apply(
                [user_id],
                move |us: &mut Vec<User>| set_followed(us, user_id, follow),
                async move {
                    if follow {
                        api.follow(user_id).await
                    } else {
                        api.unfollow(user_id).await
                    }
                },
                messages,
            );
            spawn_local(async move {
                let _ = settle.await;
            });
        }
    });

    view! {
        <Card>
            <CardHeader>
                <CardTitle>"Find friends"</CardTitle>
            </CardHeader>
            <CardContent class="flex flex-col gap-3">
                <div class="relative">
                    <Input r#type="search" placeholder="Search by username..." bind_value=query class="h-8" />
                    <Show when=move || searching.get()>
                        <span class="absolute top-2 right-2"><Spinner /></span>
                    </Show>
                </div>
                <Show when=move || {
                    search_query(&debounced.get()).is_some() && !searching.get() && results.with(|r| r.is_empty())
                }>
                    <p class="text-xs text-muted-foreground">"No users found."</p>
                </Show>
                <ul class="flex flex-col gap-2">
                    <For
                        each=move || results.get()
                        key=|u| (u.id, u.followed)
                        children=move |user: User| {
                            let id = user.id;
                            let followed = user.followed;
                            view! {
                                <li class="flex items-center gap-2 text-sm">
                                    <div class="min-w-0 flex-1">
                                        <div class="truncate font-medium">{user.display_name()}</div>
                                        <div class="truncate text-xs text-muted-foreground">{format!("@{}", user.username)}</div>
                                    </div>
                                    <Button
                                        variant=if followed { ButtonVariant::Outline } else { ButtonVariant::Default }
                                        size=ButtonSize::Sm
                                        on:click=move |_| toggle_follow.run((id, !followed))
                                    >
                                        {if followed { "Following" } else { "Follow" }}
                                    </Button>
                                </li>
                            }
                        }
                    />
                </ul>
            </CardContent>
        </Card>
    }
}

#[component]
pub fn FeedPage() -> impl IntoView {
    let app = use_app();
    let items: RwSignal<Vec<FeedItem>> = RwSignal::new(Vec::new());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let coordinator = app.optimistic(items);

    let load = Callback::new({
        let app = app.clone();
        move |()| {
            loading.set(true);
            load_error.set(None);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.feed().await {
                    Ok(list) => {
                        let _ = items.try_set(list);
                    }
                    Err(e) => {
                        log::warn!("loading feed failed: {e}");
                        if e.is_unauthorized() {
                            app.report(&e, "Could not load the feed");
                        }
                        let _ = load_error.try_set(Some(e.message));
                    }
                }
                let _ = loading.try_set(false);
            });
        }
    });
    load.run(());

    let on_like = Callback::new({
        let app = app.clone();
        let coordinator = coordinator.clone();
        move |item_id: i64| {
            let tmp_id = make_tmp_id(now_ms(), random_u64());
            let placeholder = Reaction {
                id: tmp_id.clone(),
                emoji: LIKE_EMOJI.to_string(),
            };
            let api = app.api_client.clone();
            let settle = coordinator.apply_and_merge(
                [item_id],
                move |fs: &mut Vec<FeedItem>| add_reaction(fs, item_id, placeholder),
                async move { api.react_to_feed_item(item_id, LIKE_EMOJI).await },
                move |fs: &mut Vec<FeedItem>, server: &Reaction| confirm_reaction(fs, item_id, &tmp_id, server),
                Messages::failure("Could not like this post"),
            );
            spawn_local(async move {
                let _ = settle.await;
            });
        }
    });

    let on_comment = Callback::new({
        let app = app.clone();
        move |(item_id, text): (i64, String)| {
            let tmp_id = make_tmp_id(now_ms(), random_u64());
            let placeholder = Comment {
                id: tmp_id.clone(),
                user_name: app
                    .current_user
                    .with_untracked(|u| u.as_ref().map(User::display_name).unwrap_or_default()),
                text: text.clone(),
                created_at: String::new(),
            };
            let api = app.api_client.clone();
            let settle = coordinator.apply_and_merge(
                [item_id],
                move |fs: &mut Vec<FeedItem>| add_comment(fs, item_id, placeholder),
                async move { api.comment_on_feed_item(item_id, &text).await },
                move |fs: &mut Vec<FeedItem>, server: &Comment| confirm_comment(fs, item_id, &tmp_id, server),
                Messages::failure("Could not post your comment"),
            );
            spawn_local(async move {
                let _ = settle.await;
            });
        }
    });

    view! {
        <div class="grid gap-6 md:grid-cols-[1fr_18rem]">
            <section class="flex flex-col gap-3">
                <h1 class="text-xl font-semibold">"Community"</h1>
                <ErrorBanner message=load_error on_retry=load />
                {move || {
                    if loading.get() && items.with(|v| v.is_empty()) {
                        return view! { <LoadingBlock label="Loading feed..." /> }.into_any();
                    }
                    if items.with(|v| v.is_empty()) {
                        return view! { <EmptyState>"Nothing here yet. Follow friends to see their progress."</EmptyState> }
                            .into_any();
                    }
                    let now = now_ms();
                    view! {
                        <For
                            each=move || items.with(|v| v.iter().map(|i| i.id).collect::<Vec<_>>())
                            key=|id| *id
                            children=move |id: i64| {
                                let item = Signal::derive(move || {
                                    items.with(|v| v.iter().find(|i| i.id == id).cloned().unwrap_or_default())
                                });
                                view! { <FeedItemCard item=item now_ms=now on_like=on_like on_comment=on_comment /> }
                            }
                        />
                    }
                        .into_any()
                }}
            </section>
            <aside>
                <UserSearch />
            </aside>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> FeedItem {
        FeedItem {
            id,
            message: format!("post {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_like_placeholder_is_replaced_by_server_reaction() {
        let mut items = vec![item(1), item(2)];
        let tmp = make_tmp_id(10, 3);
        add_reaction(&mut items, 2, Reaction { id: tmp.clone(), emoji: LIKE_EMOJI.to_string() });
        assert_eq!(items[1].reactions.len(), 1);
        assert!(items[0].reactions.is_empty());

        let server = Reaction { id: "77".to_string(), emoji: LIKE_EMOJI.to_string() };
        confirm_reaction(&mut items, 2, &tmp, &server);
        assert_eq!(items[1].reactions, vec![server]);
    }

    #[test]
    fn test_comment_placeholder_is_replaced_by_server_comment() {
        let mut items = vec![item(1)];
        let tmp = make_tmp_id(10, 4);
        let pending = Comment {
            id: tmp.clone(),
            user_name: "me".to_string(),
            text: "great job".to_string(),
            created_at: String::new(),
        };
        add_comment(&mut items, 1, pending);
        add_comment(&mut items, 9, Comment { id: "x".into(), user_name: String::new(), text: "lost".into(), created_at: String::new() });
        assert_eq!(items[0].comments.len(), 1);

        let server = Comment {
            id: "501".to_string(),
            user_name: "me".to_string(),
            text: "great job".to_string(),
            created_at: "2024-05-01T10:00:00Z".to_string(),
        };
        confirm_comment(&mut items, 1, &tmp, &server);
        assert_eq!(items[0].comments, vec![server]);
    }

    #[test]
    fn test_set_followed_targets_one_user() {
        let mut users = vec![
            User { id: 1, username: "a".into(), ..Default::default() },
            User { id: 2, username: "b".into(), ..Default::default() },
        ];
        set_followed(&mut users, 2, true);
        assert!(!users[0].followed);
        assert!(users[1].followed);
    }

    #[test]
    fn test_search_query_needs_two_characters() {
        assert_eq!(search_query(" a "), None);
        assert_eq!(search_query(" al "), Some("al".to_string()));
    }
}
