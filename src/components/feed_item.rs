use crate::components::ui::{Button, ButtonSize, ButtonVariant, FieldError, Input};
use crate::models::{Comment, FeedItem};
use crate::util::{is_tmp_id, relative_time, validate_comment};
use leptos::prelude::*;

fn comment_author(c: &Comment) -> String {
    if c.user_name.trim().is_empty() {
        "You".to_string()
    } else {
        c.user_name.clone()
    }
}

/// One feed entry. `item` stays live so optimistic likes and comments show up
/// without remounting the card (and losing the open comment box).
#[component]
pub(crate) fn FeedItemCard(
    #[prop(into)] item: Signal<FeedItem>,
    now_ms: i64,
    #[prop(into)] on_like: Callback<i64>,
    #[prop(into)] on_comment: Callback<(i64, String)>,
) -> impl IntoView {
    let first = item.get_untracked();
    let id = first.id;

    let show_comments = RwSignal::new(false);
    let draft = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let likes = move || item.with(|i| i.reactions.len());
    let like_pending = move || item.with(|i| i.reactions.iter().any(|r| is_tmp_id(&r.id)));
    let comment_count = move || item.with(|i| i.comments.len());

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        match validate_comment(&draft.get_untracked()) {
            Ok(text) => {
                error.set(None);
                draft.set(String::new());
                on_comment.run((id, text));
            }
            Err(msg) => error.set(Some(msg)),
        }
    };

    view! {
        <article data-name="FeedItemCard" class="flex flex-col gap-3 rounded-xl border bg-card px-4 py-3 shadow-sm">
            <header class="flex items-center gap-2 text-xs text-muted-foreground">
                <span class="text-lg" aria-hidden="true">{first.kind.icon()}</span>
                <span class="font-medium text-foreground">{first.kind.label()}</span>
                <span class="ml-auto">{relative_time(&first.created_at, now_ms)}</span>
            </header>

            <p class="text-sm">{first.message.clone()}</p>

            <div class="flex items-center gap-2">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Pill
                    attr:aria-label="Like"
                    attr:disabled=like_pending
                    on:click=move |_| on_like.run(id)
                >
                    {move || format!("👍 {}", likes())}
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Pill
                    on:click=move |_| show_comments.update(|v| *v = !*v)
                >
                    {move || format!("💬 {}", comment_count())}
                </Button>
            </div>

            <Show when=move || show_comments.get()>
                <ul class="flex flex-col gap-1.5 border-t pt-2">
                    <For
                        each=move || item.with(|i| i.comments.clone())
                        key=|c| c.id.clone()
                        children=move |c| {
                            let class = if is_tmp_id(&c.id) { "text-sm opacity-60" } else { "text-sm" };
                            view! {
                                <li class=class>
                                    <span class="font-medium">{comment_author(&c)}</span>
                                    " "
                                    <span>{c.text.clone()}</span>
                                </li>
                            }
                        }
                    />
                </ul>
                <form class="flex flex-col gap-1" on:submit=submit>
                    <div class="flex gap-2">
                        <Input
                            placeholder="Write a comment..."
                            bind_value=draft
                            invalid=Signal::derive(move || error.with(|e| e.is_some()))
                            class="h-8"
                        />
                        <Button size=ButtonSize::Sm attr:r#type="submit">"Post"</Button>
                    </div>
                    <FieldError message=error />
                </form>
            </Show>
        </article>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_author_falls_back_to_you() {
        let mut c = Comment {
            id: "tmp-1-2".to_string(),
            user_name: " ".to_string(),
            text: "nice".to_string(),
            created_at: String::new(),
        };
        assert_eq!(comment_author(&c), "You");
        c.user_name = "sam".to_string();
        assert_eq!(comment_author(&c), "sam");
    }
}
