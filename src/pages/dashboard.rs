use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, EmptyState,
    ErrorBanner, LoadingBlock,
};
use crate::components::{ActivityChart, HabitCard, StatCard};
use crate::models::{AnalyticsPoint, Habit, HabitId, Statistics};
use crate::pages::habits::complete_habit;
use crate::state::use_app;
use crate::util::{format_number, format_percent};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Range {
    Week,
    Month,
}

fn greeting(name: &str) -> String {
    if name.is_empty() {
        "Welcome back!".to_string()
    } else {
        format!("Welcome back, {name}!")
    }
}

/// "2 of 5 done today".
fn today_summary(habits: &[Habit]) -> String {
    let done = habits.iter().filter(|h| h.completed_today).count();
    format!("{done} of {} done today", habits.len())
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app = use_app();
    let stats: RwSignal<Option<Statistics>> = RwSignal::new(None);
    let today: RwSignal<Vec<Habit>> = RwSignal::new(Vec::new());
    let points: RwSignal<Vec<AnalyticsPoint>> = RwSignal::new(Vec::new());
    let range: RwSignal<Range> = RwSignal::new(Range::Week);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let coordinator = app.optimistic(today);

    let load = Callback::new({
        let app = app.clone();
        move |()| {
            loading.set(true);
            load_error.set(None);
            let app = app.clone();
            spawn_local(async move {
                let api = &app.api_client;
                match api.today_habits().await {
                    Ok(list) => {
                        let _ = today.try_set(list);
                    }
                    Err(e) => {
                        log::warn!("loading today's habits failed: {e}");
                        let _ = load_error.try_set(Some(e.message.clone()));
                        if e.is_unauthorized() {
                            app.report(&e, "Could not load your dashboard");
                        }
                    }
                }
                match api.statistics().await {
                    Ok(s) => {
                        let _ = stats.try_set(Some(s));
                    }
                    // Stat cards fall back to zeros.
                    Err(e) => log::warn!("loading statistics failed: {e}"),
                }
                let _ = loading.try_set(false);
            });
        }
    });
    load.run(());

    Effect::new({
        let app = app.clone();
        move |_| {
            let r = range.get();
            let app = app.clone();
            spawn_local(async move {
                let series = match r {
                    Range::Week => app.api_client.weekly_analytics().await,
                    Range::Month => app.api_client.monthly_analytics().await,
                };
                match series {
                    Ok(s) => {
                        let _ = points.try_set(s.data);
                    }
                    Err(e) => {
                        log::warn!("loading analytics failed: {e}");
                        let _ = points.try_set(Vec::new());
                    }
                }
            });
        }
    });

    let on_complete = Callback::new({
        let app = app.clone();
        move |id: HabitId| complete_habit(&app, &coordinator, today, id)
    });

    let stat = move |f: fn(&Statistics) -> String| {
        Signal::derive(move || stats.with(|s| f(&s.clone().unwrap_or_default())))
    };
    let name = move || {
        app.current_user
            .with(|u| u.as_ref().map(|u| u.display_name()).unwrap_or_default())
    };

    let range_button = move |r: Range, label: &'static str| {
        move || {
            let variant = if range.get() == r { ButtonVariant::Default } else { ButtonVariant::Ghost };
            view! {
                <Button variant=variant size=ButtonSize::Sm on:click=move |_| range.set(r)>
                    {label}
                </Button>
            }
        }
    };

    view! {
        <div class="flex flex-col gap-6">
            <div>
                <h1 class="text-xl font-semibold">{move || greeting(&name())}</h1>
                <p class="text-sm text-muted-foreground">"Small steps, every day."</p>
            </div>

            <ErrorBanner message=load_error on_retry=load />

            <div class="grid grid-cols-2 gap-3 md:grid-cols-4">
                <StatCard title="Active habits" icon="🌱" value=stat(|s| format_number(s.active_habits as i64)) />
                <StatCard title="Completions" icon="✅" value=stat(|s| format_number(s.total_completions as i64)) hint="all time" />
                <StatCard title="Average streak" icon="🔥" value=stat(|s| format!("{:.1}", s.average_streak)) />
                <StatCard title="Completion rate" icon="📈" value=stat(|s| format_percent(s.completion_rate, 0)) />
            </div>

            <Card>
                <CardHeader class="flex flex-row items-center justify-between">
                    <CardTitle>"Today"</CardTitle>
                    <span class="text-xs text-muted-foreground">{move || today.with(|hs| today_summary(hs))}</span>
                </CardHeader>
                <CardContent class="flex flex-col gap-2">
                    {move || {
                        if loading.get() && today.with(|hs| hs.is_empty()) {
                            return view! { <LoadingBlock label="Loading today's habits..." /> }.into_any();
                        }
                        if today.with(|hs| hs.is_empty()) {
                            return view! {
                                <EmptyState>
                                    "Nothing scheduled today. "
                                    <a class="text-primary underline underline-offset-4" href="/habits">"Add a habit"</a>
                                </EmptyState>
                            }
                                .into_any();
                        }
                        view! {
                            <For
                                each=move || today.get()
                                key=|h| (h.id, h.completed_today, h.current_streak)
                                children=move |habit| view! { <HabitCard habit=habit on_complete=on_complete /> }
                            />
                        }
                            .into_any()
                    }}
                </CardContent>
            </Card>

            <Card>
                <CardHeader class="flex flex-row items-center justify-between">
                    <CardTitle>"Activity"</CardTitle>
                    <div class="flex gap-1">
                        {range_button(Range::Week, "Week")}
                        {range_button(Range::Month, "Month")}
                    </div>
                </CardHeader>
                <CardContent>
                    <ActivityChart points=points />
                </CardContent>
            </Card>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_handles_missing_name() {
        assert_eq!(greeting(""), "Welcome back!");
        assert_eq!(greeting("Ada"), "Welcome back, Ada!");
    }

    #[test]
    fn test_today_summary_counts_completed() {
        let habit = |id, done| Habit {
            id,
            title: String::new(),
            description: String::new(),
            category: Default::default(),
            frequency: Default::default(),
            color_code: String::new(),
            icon: String::new(),
            is_micro_habit: false,
            current_streak: 0,
            best_streak: 0,
            completed_today: done,
            completion_rate: 0.0,
        };
        assert_eq!(today_summary(&[habit(1, true), habit(2, false)]), "1 of 2 done today");
        assert_eq!(today_summary(&[]), "0 of 0 done today");
    }
}
