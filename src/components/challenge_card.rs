use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardFooter, CardHeader,
    CardTitle, FieldError, Input, Label, Spinner, TextArea,
};
use crate::models::{Challenge, ChallengeDraft};
use crate::util::{days_left, format_iso_date, validate_challenge, FieldErrors};
use leptos::prelude::*;

fn days_left_label(days: Option<i64>) -> String {
    match days {
        Some(0) => "Ends today".to_string(),
        Some(1) => "1 day left".to_string(),
        Some(n) => format!("{n} days left"),
        None => String::new(),
    }
}

fn participants_label(n: u32) -> String {
    if n == 1 {
        "1 participant".to_string()
    } else {
        format!("{n} participants")
    }
}

#[component]
pub(crate) fn ChallengeCard(
    challenge: Challenge,
    now_ms: i64,
    #[prop(into)] on_join: Callback<i64>,
) -> impl IntoView {
    let id = challenge.id;
    let joined = challenge.joined;
    let remaining = days_left_label(days_left(&challenge.end_date, now_ms));
    let dates = format!(
        "{} → {}",
        format_iso_date(&challenge.start_date),
        format_iso_date(&challenge.end_date)
    );

    view! {
        <Card attr:data-name="ChallengeCard">
            <CardHeader>
                <CardTitle>{challenge.title.clone()}</CardTitle>
                <CardDescription>{challenge.description.clone()}</CardDescription>
            </CardHeader>
            <CardContent class="flex flex-wrap gap-x-4 gap-y-1 text-xs text-muted-foreground">
                <span>{dates}</span>
                <span>{remaining}</span>
                {(challenge.goal > 0).then(|| view! { <span>{format!("Goal: {}", challenge.goal)}</span> })}
                <span>{participants_label(challenge.participants_count)}</span>
            </CardContent>
            <CardFooter>
                {if joined {
                    view! {
                        <Button variant=ButtonVariant::Success size=ButtonSize::Sm attr:disabled=true>
                            "Joined ✓"
                        </Button>
                    }
                        .into_any()
                } else {
                    view! {
                        <Button size=ButtonSize::Sm on:click=move |_| on_join.run(id)>
                            "Join challenge"
                        </Button>
                    }
                        .into_any()
                }}
            </CardFooter>
        </Card>
    }
}

#[component]
pub(crate) fn ChallengeForm(
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_submit: Callback<ChallengeDraft>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let title = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let start_date = RwSignal::new(String::new());
    let end_date = RwSignal::new(String::new());
    let goal = RwSignal::new(String::new());
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.get(field).map(str::to_string)))
    };
    let invalid = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.get(field).is_some()))
    };

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let draft = ChallengeDraft {
            title: title.get_untracked().trim().to_string(),
            description: description.get_untracked().trim().to_string(),
            start_date: start_date.get_untracked(),
            end_date: end_date.get_untracked(),
            goal: goal.get_untracked().trim().parse().unwrap_or(0),
        };
        match validate_challenge(&draft) {
            Ok(()) => {
                errors.set(FieldErrors::default());
                on_submit.run(draft);
            }
            Err(e) => errors.set(e),
        }
    };

    view! {
        <form data-name="ChallengeForm" class="flex flex-col gap-3" on:submit=submit>
            <div class="flex flex-col gap-1.5">
                <Label html_for="challenge-title" required=true>"Title"</Label>
                <Input id="challenge-title" bind_value=title invalid=invalid("title") />
                <FieldError message=field_error("title") />
            </div>
            <div class="flex flex-col gap-1.5">
                <Label html_for="challenge-description">"Description"</Label>
                <TextArea id="challenge-description" bind_value=description />
            </div>
            <div class="grid grid-cols-2 gap-3">
                <div class="flex flex-col gap-1.5">
                    <Label html_for="challenge-start" required=true>"Start"</Label>
                    <Input id="challenge-start" r#type="date" bind_value=start_date invalid=invalid("start_date") />
                    <FieldError message=field_error("start_date") />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="challenge-end" required=true>"End"</Label>
                    <Input id="challenge-end" r#type="date" bind_value=end_date invalid=invalid("end_date") />
                    <FieldError message=field_error("end_date") />
                </div>
            </div>
            <div class="flex flex-col gap-1.5">
                <Label html_for="challenge-goal">"Goal (completions)"</Label>
                <Input id="challenge-goal" r#type="number" placeholder="30" bind_value=goal />
            </div>
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
                    "Create challenge"
                </Button>
            </div>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_left_label() {
        assert_eq!(days_left_label(Some(0)), "Ends today");
        assert_eq!(days_left_label(Some(1)), "1 day left");
        assert_eq!(days_left_label(Some(12)), "12 days left");
        assert_eq!(days_left_label(None), "");
    }

    #[test]
    fn test_participants_label() {
        assert_eq!(participants_label(1), "1 participant");
        assert_eq!(participants_label(0), "0 participants");
    }
}
