use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-4 rounded-xl border py-5 shadow-sm"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1.5 px-5"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardContent, div, "px-5"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
    clx! {CardFooter, footer, "flex items-center px-5", "gap-2"}
    clx! {CardGrid, div, "grid gap-4 sm:grid-cols-2 lg:grid-cols-3"}
    clx! {EmptyState, div, "rounded-xl border border-dashed px-6 py-10 text-center text-sm text-muted-foreground"}
}

pub use components::*;
