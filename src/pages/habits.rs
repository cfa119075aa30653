use crate::api::ApiError;
use crate::components::hooks::use_persisted;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, EmptyState, ErrorBanner, LoadingBlock,
};
use crate::components::{HabitForm, HabitList};
use crate::models::{CompletionResult, Habit, HabitCategory, HabitDraft, HabitId};
use crate::notify::Notifier;
use crate::optimistic::{Messages, Settlement};
use crate::reorder::{apply_order, merge_subset_order, SelectionSet};
use crate::state::{use_app, AppState, Coordinator};
use crate::storage::HABIT_ORDER_KEY;
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

/// Local half of a completion: today is done and the streak grows by one.
pub(crate) fn mark_completed(habits: &mut [Habit], id: HabitId) {
    if let Some(h) = habits.iter_mut().find(|h| h.id == id) {
        h.completed_today = true;
        h.current_streak += 1;
        h.best_streak = h.best_streak.max(h.current_streak);
    }
}

/// The server's streak wins over the locally bumped one.
pub(crate) fn merge_streak(habits: &mut [Habit], id: HabitId, streak: u32) {
    if let Some(h) = habits.iter_mut().find(|h| h.id == id) {
        h.current_streak = streak;
        h.best_streak = h.best_streak.max(streak);
    }
}

fn can_complete(habits: &[Habit], id: HabitId) -> bool {
    habits.iter().any(|h| h.id == id && !h.completed_today)
}

/// Optimistically completes `id` in `habits`. Already-completed habits are
/// left alone.
pub(crate) fn complete_habit(
    app: &AppState,
    coordinator: &Coordinator<Habit>,
    habits: RwSignal<Vec<Habit>>,
    id: HabitId,
) {
    let Some(title) = habits.with_untracked(|hs| {
        can_complete(hs, id)
            .then(|| hs.iter().find(|h| h.id == id).map(|h| h.title.clone()))
            .flatten()
    }) else {
        return;
    };

    let api = app.api_client.clone();
    let settle = coordinator.apply_and_merge(
        [id],
        move |hs: &mut Vec<Habit>| mark_completed(hs, id),
        async move { api.mark_complete(id).await },
        move |hs: &mut Vec<Habit>, res: &CompletionResult| merge_streak(hs, id, res.current_streak),
        Messages::failure(format!("Could not complete \"{title}\""))
            .with_success(format!("\"{title}\" done for today 🎉")),
    );

    let app = app.clone();
    spawn_local(async move {
        if !settle.await.is_committed() && !app.is_authenticated() {
            let _ = app.current_user.try_set(None);
        }
    });
}

fn remove_habits(habits: &mut Vec<Habit>, ids: &[HabitId]) {
    habits.retain(|h| !ids.contains(&h.id));
}

fn filter_by_category(habits: &[Habit], category: Option<HabitCategory>) -> Vec<Habit> {
    habits
        .iter()
        .filter(|h| category.map_or(true, |c| h.category == c))
        .cloned()
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
enum FormMode {
    Closed,
    Create,
    Edit(Habit),
}

#[component]
pub fn HabitsPage() -> impl IntoView {
    let app = use_app();
    let habits: RwSignal<Vec<Habit>> = RwSignal::new(Vec::new());
    let order = use_persisted(app.store.clone(), HABIT_ORDER_KEY, Vec::<HabitId>::new());
    let coordinator = app.optimistic(habits);

    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let category: RwSignal<Option<HabitCategory>> = RwSignal::new(None);
    let selection: RwSignal<SelectionSet<HabitId>> = RwSignal::new(SelectionSet::default());
    let mode: RwSignal<FormMode> = RwSignal::new(FormMode::Closed);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let pending_delete: RwSignal<Option<Vec<HabitId>>> = RwSignal::new(None);

    let load = Callback::new({
        let app = app.clone();
        move |()| {
            loading.set(true);
            load_error.set(None);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.list_habits().await {
                    Ok(list) => {
                        let list = apply_order(list, &order.get_untracked(), |h| &h.id);
                        let _ = order.try_set(list.iter().map(|h| h.id).collect());
                        let _ = habits.try_set(list);
                    }
                    Err(e) => {
                        log::warn!("loading habits failed: {e}");
                        if e.is_unauthorized() {
                            app.report(&e, "Could not load habits");
                        }
                        let _ = load_error.try_set(Some(e.message));
                    }
                }
                let _ = loading.try_set(false);
            });
        }
    });
    load.run(());

    let visible = Signal::derive(move || habits.with(|hs| filter_by_category(hs, category.get())));

    let on_reorder = Callback::new(move |subset: Vec<HabitId>| {
        let full: Vec<HabitId> = habits.with_untracked(|hs| hs.iter().map(|h| h.id).collect());
        let next = merge_subset_order(&full, &subset);
        habits.update(|hs| *hs = apply_order(std::mem::take(hs), &next, |h| &h.id));
        order.set(next);
    });

    let on_complete = Callback::new({
        let app = app.clone();
        let coordinator = coordinator.clone();
        move |id: HabitId| complete_habit(&app, &coordinator, habits, id)
    });

    let complete_selected = {
        let app = app.clone();
        let coordinator = coordinator.clone();
        move |_: web_sys::MouseEvent| {
            let ids = selection.with_untracked(|s| s.ids());
            for id in ids {
                complete_habit(&app, &coordinator, habits, id);
            }
            selection.update(|s| s.clear());
        }
    };

    let on_edit = Callback::new(move |id: HabitId| {
        if let Some(h) = habits.with_untracked(|hs| hs.iter().find(|h| h.id == id).cloned()) {
            mode.set(FormMode::Edit(h));
        }
    });

    let on_delete = Callback::new(move |id: HabitId| pending_delete.set(Some(vec![id])));

    let confirm_delete = {
        let app = app.clone();
        let coordinator = coordinator.clone();
        move |_: web_sys::MouseEvent| {
            let Some(ids) = pending_delete.get_untracked() else {
                return;
            };
            pending_delete.set(None);
            selection.update(|s| s.clear());

            let api = app.api_client.clone();
            let remote_ids = ids.clone();
            let count = ids.len();
            let settle = coordinator.apply(
                ids.clone(),
                move |hs: &mut Vec<Habit>| remove_habits(hs, &ids),
                async move {
                    for id in remote_ids {
                        api.delete_habit(id).await?;
                    }
                    Ok::<(), ApiError>(())
                },
                Messages::failure("Could not delete habits").with_success(if count == 1 {
                    "Habit deleted".to_string()
                } else {
                    format!("{count} habits deleted")
                }),
            );
            spawn_local(async move {
                match settle.await {
                    Settlement::Committed(()) => {
                        let ids: Vec<HabitId> = habits.with_untracked(|hs| hs.iter().map(|h| h.id).collect());
                        let _ = order.try_set(ids);
                    }
                    // Part of a bulk delete may have gone through; refetch.
                    Settlement::RolledBack => load.run(()),
                    Settlement::Abandoned => {}
                }
            });
        }
    };

    let on_save = Callback::new({
        let app = app.clone();
        move |draft: HabitDraft| {
            let editing = match mode.get_untracked() {
                FormMode::Edit(h) => Some(h.id),
                _ => None,
            };
            saving.set(true);
            let app = app.clone();
            spawn_local(async move {
                let result = match editing {
                    Some(id) => app.api_client.update_habit(id, &draft).await,
                    None => app.api_client.create_habit(&draft).await,
                };
                match result {
                    Ok(saved) => {
                        let created = editing.is_none();
                        let _ = habits.try_update(|hs| {
                            match hs.iter_mut().find(|h| h.id == saved.id) {
                                Some(slot) => *slot = saved.clone(),
                                None => hs.push(saved.clone()),
                            }
                        });
                        if created {
                            let _ = order.try_update(|o| o.push(saved.id));
                            app.notifications.show_success("Habit created 🌱");
                        } else {
                            app.notifications.show_success("Habit updated");
                        }
                        let _ = mode.try_set(FormMode::Closed);
                    }
                    Err(e) => app.report(&e, "Could not save habit"),
                }
                let _ = saving.try_set(false);
            });
        }
    });

    let category_tab = move |value: Option<HabitCategory>, label: String| {
        let class = move || {
            if category.get() == value {
                "rounded-full bg-primary px-3 py-1 text-xs font-medium text-primary-foreground"
            } else {
                "rounded-full border px-3 py-1 text-xs text-muted-foreground hover:text-foreground"
            }
        };
        view! {
            <button class=class on:click=move |_| category.set(value)>
                {label}
            </button>
        }
    };

    view! {
        <div class="flex flex-col gap-4">
            <div class="flex items-center justify-between gap-3">
                <h1 class="text-xl font-semibold">"My Habits"</h1>
                <Button size=ButtonSize::Sm on:click=move |_| mode.set(FormMode::Create)>
                    "+ New habit"
                </Button>
            </div>

            {move || {
                let (initial, title) = match mode.get() {
                    FormMode::Closed => return ().into_any(),
                    FormMode::Create => (None, "New habit"),
                    FormMode::Edit(h) => (Some(h), "Edit habit"),
                };
                let form = match initial {
                    Some(h) => view! {
                        <HabitForm
                            initial=h
                            busy=saving
                            on_submit=on_save
                            on_cancel=move |()| mode.set(FormMode::Closed)
                        />
                    }
                        .into_any(),
                    None => view! {
                        <HabitForm
                            busy=saving
                            on_submit=on_save
                            on_cancel=move |()| mode.set(FormMode::Closed)
                        />
                    }
                        .into_any(),
                };
                view! {
                    <Card>
                        <CardContent class="flex flex-col gap-3 pt-4">
                            <h2 class="text-sm font-semibold">{title}</h2>
                            {form}
                        </CardContent>
                    </Card>
                }
                    .into_any()
            }}

            <div class="flex flex-wrap gap-2">
                {category_tab(None, "All".to_string())}
                {HabitCategory::iter()
                    .map(|c| category_tab(Some(c), format!("{} {}", c.icon(), c.label())))
                    .collect_view()}
            </div>

            <Show when=move || selection.with(|s| !s.is_empty())>
                <div class="flex items-center gap-2 rounded-lg border bg-accent/40 px-3 py-2 text-sm">
                    <span class="flex-1">{move || format!("{} selected", selection.with(|s| s.len()))}</span>
                    <Button variant=ButtonVariant::Success size=ButtonSize::Sm on:click=complete_selected.clone()>
                        "Complete"
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        on:click=move |_| pending_delete.set(Some(selection.with_untracked(|s| s.ids())))
                    >
                        "Delete"
                    </Button>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| selection.update(|s| s.clear())>
                        "Clear"
                    </Button>
                </div>
            </Show>

            <Show when=move || pending_delete.with(|p| p.is_some())>
                <div role="alertdialog" class="flex items-center gap-2 rounded-lg border border-destructive/40 px-3 py-2 text-sm">
                    <span class="flex-1">
                        {move || {
                            let n = pending_delete.with(|p| p.as_ref().map_or(0, Vec::len));
                            if n == 1 { "Delete this habit? Its history goes too.".to_string() } else { format!("Delete {n} habits? Their history goes too.") }
                        }}
                    </span>
                    <Button variant=ButtonVariant::Destructive size=ButtonSize::Sm on:click=confirm_delete.clone()>
                        "Delete"
                    </Button>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| pending_delete.set(None)>
                        "Cancel"
                    </Button>
                </div>
            </Show>

            <ErrorBanner message=load_error on_retry=load />

            {move || {
                if loading.get() && habits.with(|hs| hs.is_empty()) {
                    return view! { <LoadingBlock label="Loading habits..." /> }.into_any();
                }
                if visible.with(|v| v.is_empty()) && load_error.with(|e| e.is_none()) {
                    return view! {
                        <EmptyState>
                            {if category.get().is_some() { "No habits in this category yet." } else { "No habits yet. Plant your first one!" }}
                        </EmptyState>
                    }
                        .into_any();
                }
                // A fresh list per tab so its drag order starts from the filtered view.
                category.track();
                view! {
                    <HabitList
                        habits=visible
                        selection=selection
                        on_reorder=on_reorder
                        on_complete=on_complete
                        on_edit=on_edit
                        on_delete=on_delete
                    />
                }
                    .into_any()
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit(id: HabitId, category: HabitCategory, streak: u32, done: bool) -> Habit {
        Habit {
            id,
            title: format!("habit {id}"),
            description: String::new(),
            category,
            frequency: Default::default(),
            color_code: "#3B82F6".to_string(),
            icon: String::new(),
            is_micro_habit: false,
            current_streak: streak,
            best_streak: streak,
            completed_today: done,
            completion_rate: 0.0,
        }
    }

    #[test]
    fn test_mark_completed_bumps_streak_and_best() {
        let mut hs = vec![habit(1, HabitCategory::Health, 4, false), habit(2, HabitCategory::Work, 0, false)];
        mark_completed(&mut hs, 1);
        assert!(hs[0].completed_today);
        assert_eq!(hs[0].current_streak, 5);
        assert_eq!(hs[0].best_streak, 5);
        assert!(!hs[1].completed_today);
    }

    #[test]
    fn test_merge_streak_takes_server_value() {
        let mut hs = vec![habit(1, HabitCategory::Health, 4, false)];
        mark_completed(&mut hs, 1);
        merge_streak(&mut hs, 1, 9);
        assert_eq!(hs[0].current_streak, 9);
        assert_eq!(hs[0].best_streak, 9);

        merge_streak(&mut hs, 1, 1);
        assert_eq!(hs[0].current_streak, 1);
        assert_eq!(hs[0].best_streak, 9);
    }

    #[test]
    fn test_completed_habits_cannot_complete_again() {
        let hs = vec![habit(1, HabitCategory::Health, 1, true), habit(2, HabitCategory::Health, 0, false)];
        assert!(!can_complete(&hs, 1));
        assert!(can_complete(&hs, 2));
        assert!(!can_complete(&hs, 3));
    }

    #[test]
    fn test_filter_and_remove() {
        let mut hs = vec![
            habit(1, HabitCategory::Health, 0, false),
            habit(2, HabitCategory::Work, 0, false),
            habit(3, HabitCategory::Health, 0, false),
        ];
        let health: Vec<HabitId> = filter_by_category(&hs, Some(HabitCategory::Health))
            .iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(health, vec![1, 3]);
        assert_eq!(filter_by_category(&hs, None).len(), 3);

        remove_habits(&mut hs, &[1, 2]);
        assert_eq!(hs.iter().map(|h| h.id).collect::<Vec<_>>(), vec![3]);
    }
}
