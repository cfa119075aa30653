use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex shrink-0 select-none items-center justify-center gap-1.5 rounded-lg text-sm font-medium whitespace-nowrap transition-colors outline-none hover:cursor-pointer focus-visible:ring-2 focus-visible:ring-primary/40 disabled:cursor-not-allowed disabled:opacity-50 [&_svg]:size-4 [&_svg]:shrink-0",
        variants: {
            variant: {
                Default: "bg-primary text-primary-foreground hover:bg-primary/85",
                Destructive: "bg-destructive text-white hover:bg-destructive/85",
                Outline: "border border-border bg-transparent hover:bg-muted",
                Ghost: "text-muted-foreground hover:bg-muted hover:text-foreground",
                Success: "bg-emerald-600 text-white hover:bg-emerald-600/85",
            },
            size: {
                Default: "h-9 px-4",
                Sm: "h-8 px-3 text-xs",
                Icon: "size-9 p-0",
                Pill: "h-7 rounded-full px-3 text-xs",
            }
        },
        component: {
            element: button,
            support_href: true,
            support_aria_current: true
        }
    }
}
