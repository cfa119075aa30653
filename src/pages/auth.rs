use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, Card, CardContent, CardDescription, CardHeader,
    CardTitle, FieldError, Input, Label, Spinner,
};
use crate::state::use_app;
use crate::util::{validate_registration, FieldErrors, RegistrationForm};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;
use leptos_router::hooks::use_navigate;

#[component]
fn AuthShell(
    #[prop(into)] title: String,
    #[prop(into)] description: String,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"🌱 Habit Garden"</a>
                </div>
                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{title}</CardTitle>
                        <CardDescription class="text-xs">{description}</CardDescription>
                    </CardHeader>
                    <CardContent>{children()}</CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
fn FormError(error: RwSignal<Option<String>>) -> impl IntoView {
    move || {
        error.get().map(|e| {
            view! {
                <Alert class="border-destructive/30">
                    <AlertDescription class="text-destructive text-xs">{e}</AlertDescription>
                </Alert>
            }
        })
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app = use_app();
    let navigate = use_navigate();
    if app.is_authenticated() && app.current_user.get_untracked().is_some() {
        return view! { <Redirect path="/" /> }.into_any();
    }

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let username_val = username.get_untracked().trim().to_string();
        let password_val = password.get_untracked();
        if username_val.is_empty() || password_val.is_empty() {
            error.set(Some("Enter your username and password".to_string()));
            return;
        }

        loading.set(true);
        error.set(None);

        let app = app.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match app.api_client.login(&username_val, &password_val).await {
                Ok(response) => {
                    log::info!("signed in as {}", response.user.username);
                    app.sign_in(response.user);
                    navigate("/", Default::default());
                }
                Err(e) => {
                    log::warn!("login failed: {e}");
                    let _ = error.try_set(Some(e.message));
                }
            }
            let _ = loading.try_set(false);
        });
    };

    view! {
        <AuthShell title="Log in" description="Welcome back. Keep your streaks growing.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="username" class="text-xs">"Username"</Label>
                    <Input id="username" bind_value=username required=true class="h-8 text-sm" />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label html_for="password" class="text-xs">"Password"</Label>
                    <Input
                        id="password"
                        r#type="password"
                        placeholder="••••••••"
                        bind_value=password
                        required=true
                        class="h-8 text-sm"
                    />
                </div>

                <FormError error=error />

                <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Signing in..." } else { "Continue" }}
                    </span>
                </Button>

                <div class="pt-1 text-xs text-muted-foreground">
                    "No account? "
                    <a class="text-primary underline underline-offset-4" href="/register">"Sign up"</a>
                </div>
            </form>
        </AuthShell>
    }
    .into_any()
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let password_confirm: RwSignal<String> = RwSignal::new(String::new());
    let field_errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app = use_app();
    let navigate = use_navigate();

    let field_error = move |field: &'static str| {
        Signal::derive(move || field_errors.with(|e| e.get(field).map(str::to_string)))
    };
    let invalid = move |field: &'static str| {
        Signal::derive(move || field_errors.with(|e| e.get(field).is_some()))
    };

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let form = RegistrationForm {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            password_confirm: password_confirm.get_untracked(),
        };
        if let Err(errors) = validate_registration(&form) {
            field_errors.set(errors);
            return;
        }
        field_errors.set(FieldErrors::default());
        error.set(None);
        loading.set(true);

        let app = app.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match app.api_client.register(&form).await {
                Ok(response) => {
                    log::info!("registered {}", response.user.username);
                    app.sign_in(response.user);
                    app.notifications.show_info("Welcome to Habit Garden!");
                    navigate("/", Default::default());
                }
                Err(e) => {
                    log::warn!("registration failed: {e}");
                    let _ = error.try_set(Some(e.message));
                }
            }
            let _ = loading.try_set(false);
        });
    };

    view! {
        <AuthShell title="Create account" description="Start planting small habits.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="reg-username" class="text-xs" required=true>"Username"</Label>
                    <Input id="reg-username" bind_value=username invalid=invalid("username") class="h-8 text-sm" />
                    <FieldError message=field_error("username") />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="reg-email" class="text-xs" required=true>"Email"</Label>
                    <Input
                        id="reg-email"
                        r#type="email"
                        placeholder="you@example.com"
                        bind_value=email
                        invalid=invalid("email")
                        class="h-8 text-sm"
                    />
                    <FieldError message=field_error("email") />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="reg-password" class="text-xs" required=true>"Password"</Label>
                    <Input
                        id="reg-password"
                        r#type="password"
                        bind_value=password
                        invalid=invalid("password")
                        class="h-8 text-sm"
                    />
                    <FieldError message=field_error("password") />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="reg-password-confirm" class="text-xs" required=true>"Confirm password"</Label>
                    <Input
                        id="reg-password-confirm"
                        r#type="password"
                        bind_value=password_confirm
                        invalid=invalid("password_confirm")
                        class="h-8 text-sm"
                    />
                    <FieldError message=field_error("password_confirm") />
                </div>

                <FormError error=error />

                <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Creating account..." } else { "Sign up" }}
                    </span>
                </Button>

                <div class="pt-1 text-xs text-muted-foreground">
                    "Already have an account? "
                    <a class="text-primary underline underline-offset-4" href="/login">"Log in"</a>
                </div>
            </form>
        </AuthShell>
    }
}
