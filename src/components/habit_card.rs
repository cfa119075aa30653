use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use crate::components::ProgressBar;
use crate::models::{Habit, HabitId};
use leptos::prelude::*;

/// Streak badge text: "🔥 5 days", "1 day", or nothing for zero.
pub(crate) fn streak_label(streak: u32) -> Option<String> {
    match streak {
        0 => None,
        1 => Some("🔥 1 day".to_string()),
        n => Some(format!("🔥 {n} days")),
    }
}

#[component]
pub(crate) fn HabitCard(
    habit: Habit,
    #[prop(into)] on_complete: Callback<HabitId>,
    #[prop(into, optional)] on_edit: Option<Callback<HabitId>>,
    #[prop(into, optional)] on_delete: Option<Callback<HabitId>>,
) -> impl IntoView {
    let id = habit.id;
    let done = habit.completed_today;
    let icon = if habit.icon.trim().is_empty() {
        habit.category.icon().to_string()
    } else {
        habit.icon.clone()
    };
    let accent = format!("border-left: 4px solid {}", habit.color_code);

    view! {
        <div
            data-name="HabitCard"
            class="flex flex-1 items-center gap-3 rounded-lg border bg-card px-4 py-3"
            style=accent
        >
            <span class="text-xl" aria-hidden="true">{icon}</span>

            <div class="min-w-0 flex-1">
                <div class="flex items-center gap-2">
                    <span class="truncate font-medium">{habit.title.clone()}</span>
                    {habit
                        .is_micro_habit
                        .then(|| view! { <span class="rounded bg-accent px-1.5 text-[10px] uppercase">"micro"</span> })}
                </div>
                <div class="flex flex-wrap items-center gap-2 text-xs text-muted-foreground">
                    <span>{habit.category.label()}</span>
                    <span>"·"</span>
                    <span>{habit.frequency.label()}</span>
                    {streak_label(habit.current_streak).map(|s| view! { <span class="text-orange-600">{s}</span> })}
                </div>
                {(!habit.description.trim().is_empty())
                    .then(|| view! { <p class="mt-1 line-clamp-2 text-xs">{habit.description.clone()}</p> })}
                <ProgressBar value=habit.completion_rate class="mt-2" />
            </div>

            <div class="flex shrink-0 items-center gap-1">
                <Button
                    variant=if done { ButtonVariant::Outline } else { ButtonVariant::Success }
                    size=ButtonSize::Sm
                    attr:disabled=done
                    attr:aria-label=if done { "Completed today" } else { "Mark complete" }
                    on:click=move |_| on_complete.run(id)
                >
                    {if done { "✓ Done" } else { "Complete" }}
                </Button>
                {on_edit.map(|cb| view! {
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| cb.run(id)>
                        "Edit"
                    </Button>
                })}
                {on_delete.map(|cb| view! {
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="text-destructive"
                        on:click=move |_| cb.run(id)
                    >
                        "Delete"
                    </Button>
                })}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_label() {
        assert_eq!(streak_label(0), None);
        assert_eq!(streak_label(1).as_deref(), Some("🔥 1 day"));
        assert_eq!(streak_label(12).as_deref(), Some("🔥 12 days"));
    }
}
