use crate::models::AnalyticsPoint;
use crate::util::{clamp, format_percent, format_short};
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub(crate) fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into, optional)] icon: String,
    #[prop(into, optional)] hint: String,
) -> impl IntoView {
    view! {
        <div data-name="StatCard" class="flex items-center gap-3 rounded-xl border bg-card px-4 py-3 shadow-sm">
            {(!icon.is_empty()).then(|| view! { <span class="text-2xl" aria-hidden="true">{icon}</span> })}
            <div class="min-w-0">
                <div class="text-xs text-muted-foreground">{title}</div>
                <div class="text-xl font-semibold tabular-nums">{move || value.get()}</div>
                {(!hint.is_empty()).then(|| view! { <div class="text-[11px] text-muted-foreground">{hint}</div> })}
            </div>
        </div>
    }
}

/// Completion rate bar, 0-100.
#[component]
pub(crate) fn ProgressBar(value: f64, #[prop(into, optional)] class: String) -> impl IntoView {
    let pct = clamp(if value.is_finite() { value } else { 0.0 }, 0.0, 100.0);
    let class = tw_merge!("h-1.5 w-full overflow-hidden rounded-full bg-muted", class);

    view! {
        <div class=class role="progressbar" aria-valuemin="0" aria-valuemax="100" aria-valuenow=pct.round().to_string() title=format_percent(pct, 0)>
            <div class="h-full rounded-full bg-primary" style=format!("width: {pct:.1}%") />
        </div>
    }
}

/// Bar heights as a percentage of the busiest day. Days with completions
/// keep a sliver of height so they stay visible next to zero days.
pub(crate) fn bar_heights(points: &[AnalyticsPoint]) -> Vec<u32> {
    let max = points.iter().map(|p| p.completions).max().unwrap_or(0);
    points
        .iter()
        .map(|p| {
            if max == 0 || p.completions == 0 {
                0
            } else {
                ((p.completions as f64 / max as f64) * 100.0).round().max(4.0) as u32
            }
        })
        .collect()
}

fn bar_label(p: &AnalyticsPoint) -> String {
    match p.day_name.as_deref() {
        Some(day) if !day.is_empty() => day.chars().take(3).collect(),
        _ => format_short(&p.date),
    }
}

#[component]
pub(crate) fn ActivityChart(#[prop(into)] points: Signal<Vec<AnalyticsPoint>>) -> impl IntoView {
    view! {
        <div data-name="ActivityChart" class="flex h-40 items-end gap-1">
            {move || {
                let pts = points.get();
                if pts.is_empty() {
                    return view! {
                        <div class="w-full self-center text-center text-xs text-muted-foreground">
                            "No activity yet"
                        </div>
                    }
                    .into_any();
                }
                let heights = bar_heights(&pts);
                pts.iter()
                    .zip(heights)
                    .map(|(p, h)| {
                        let title = format!("{}: {} completions", p.date, p.completions);
                        view! {
                            <div class="flex h-full flex-1 flex-col items-center justify-end gap-1" title=title>
                                <div class="w-full rounded-t bg-primary/80" style=format!("height: {h}%") />
                                <span class="text-[10px] text-muted-foreground">{bar_label(p)}</span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
