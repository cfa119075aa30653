use crate::components::HabitCard;
use crate::models::{Habit, HabitId};
use crate::reorder::{DragState, ReorderEngine, SelectionSet};
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;

fn row_class(state: &DragState<HabitId>, id: HabitId) -> &'static str {
    match state {
        DragState::Dragging { dragged, .. } if *dragged == id => {
            "flex items-center gap-2 rounded-lg opacity-50"
        }
        DragState::Dragging { over: Some(over), .. } if *over == id => {
            "flex items-center gap-2 rounded-lg ring-2 ring-primary/40"
        }
        _ => "flex items-center gap-2 rounded-lg",
    }
}

/// Draggable, selectable habit rows. The list keeps its own copy of the order
/// and reports a new one through `on_reorder` after each successful drop.
#[component]
pub(crate) fn HabitList(
    #[prop(into)] habits: Signal<Vec<Habit>>,
    selection: RwSignal<SelectionSet<HabitId>>,
    #[prop(into)] on_reorder: Callback<Vec<HabitId>>,
    #[prop(into)] on_complete: Callback<HabitId>,
    #[prop(into)] on_edit: Callback<HabitId>,
    #[prop(into)] on_delete: Callback<HabitId>,
) -> impl IntoView {
    let engine: RwSignal<ReorderEngine<HabitId>> = RwSignal::new(ReorderEngine::default());

    Effect::new(move |_| {
        let ids: Vec<HabitId> = habits.with(|hs| hs.iter().map(|h| h.id).collect());
        engine.update(|e| e.reconcile(ids.iter().copied()));
        selection.update(|s| s.prune(&ids));
    });

    let escape = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && engine.with_untracked(|e| e.is_dragging()) {
            engine.update(|e| e.cancel_drag());
        }
    });
    on_cleanup(move || escape.remove());

    let emit = move |next: Option<Vec<HabitId>>| {
        if let Some(order) = next {
            log::debug!("habit order changed: {order:?}");
            on_reorder.run(order);
        }
    };

    let displayed = move || engine.with(|e| e.order().to_vec());
    let all_selected = move || selection.with(|s| s.is_all_selected(&displayed()));

    view! {
        <div data-name="HabitList" class="flex flex-col gap-2">
            <label class="flex items-center gap-2 px-1 text-xs text-muted-foreground">
                <input
                    type="checkbox"
                    prop:checked=all_selected
                    aria-label="Select all habits"
                    on:change=move |_| {
                        let ids = engine.with_untracked(|e| e.order().to_vec());
                        selection.update(|s| s.toggle_all(&ids));
                    }
                />
                "Select all"
            </label>

            <For
                each=displayed
                key=|id| *id
                children=move |id: HabitId| {
                    let habit = Memo::new(move |_| {
                        habits.with(|hs| hs.iter().find(|h| h.id == id).cloned())
                    });
                    let title = move || habit.with(|h| h.as_ref().map(|h| h.title.clone()).unwrap_or_default());

                    view! {
                        <div
                            class=move || engine.with(|e| row_class(e.state(), id))
                            draggable="true"
                            on:dragstart=move |ev: web_sys::DragEvent| {
                                if let Some(dt) = ev.data_transfer() {
                                    let _ = dt.set_data("text/plain", &id.to_string());
                                    dt.set_effect_allowed("move");
                                }
                                engine.update(|e| {
                                    e.begin_drag(id);
                                });
                            }
                            on:dragover=move |ev: web_sys::DragEvent| {
                                ev.prevent_default();
                                if let Some(dt) = ev.data_transfer() {
                                    dt.set_drop_effect("move");
                                }
                                if engine.with_untracked(|e| e.is_dragging() && e.hovered() != Some(&id)) {
                                    engine.update(|e| e.hover(id));
                                }
                            }
                            on:drop=move |ev: web_sys::DragEvent| {
                                ev.prevent_default();
                                // A drag that started in another tab only reaches us
                                // through the DataTransfer payload.
                                if !engine.with_untracked(|e| e.is_dragging()) {
                                    let from = ev
                                        .data_transfer()
                                        .and_then(|dt| dt.get_data("text/plain").ok())
                                        .and_then(|s| s.trim().parse::<HabitId>().ok());
                                    match from {
                                        Some(from) => engine.update(|e| {
                                            e.begin_drag(from);
                                        }),
                                        None => return,
                                    }
                                }
                                let mut next = None;
                                engine.update(|e| next = e.drop_on(&id));
                                emit(next);
                            }
                            on:dragend=move |_| {
                                if engine.with_untracked(|e| e.is_dragging()) {
                                    engine.update(|e| e.cancel_drag());
                                }
                            }
                        >
                            <span
                                class="cursor-grab select-none px-1 text-muted-foreground"
                                title="Drag to reorder"
                                aria-hidden="true"
                            >
                                "⋮⋮"
                            </span>
                            <input
                                type="checkbox"
                                prop:checked=move || selection.with(|s| s.contains(&id))
                                aria-label=move || format!("Select {}", title())
                                on:change=move |_| selection.update(|s| s.toggle(id))
                            />
                            {move || {
                                habit
                                    .get()
                                    .map(|h| {
                                        view! {
                                            <HabitCard
                                                habit=h
                                                on_complete=on_complete
                                                on_edit=on_edit
                                                on_delete=on_delete
                                            />
                                        }
                                    })
                            }}
                        </div>
                    }
                }
            />

            <div
                class=move || {
                    if engine.with(|e| e.is_dragging()) {
                        "h-10 rounded-lg border border-dashed border-primary/40"
                    } else {
                        "h-2"
                    }
                }
                on:dragover=move |ev: web_sys::DragEvent| ev.prevent_default()
                on:drop=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    let mut next = None;
                    engine.update(|e| next = e.drop_at_end());
                    emit(next);
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_class_marks_dragged_and_hovered_rows() {
        let state = DragState::Dragging {
            dragged: 1,
            over: Some(2),
        };
        assert!(row_class(&state, 1).contains("opacity-50"));
        assert!(row_class(&state, 2).contains("ring-2"));
        assert!(!row_class(&state, 3).contains("ring-2"));
        assert!(!row_class(&DragState::Idle, 1).contains("opacity"));
    }
}
