use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    EmptyState, ErrorBanner, FieldError, Input, Label, LoadingBlock, Spinner, TextArea,
};
use crate::components::StatCard;
use crate::models::{Profile, ProfileUpdate, User, UserBadge};
use crate::notify::Notifier;
use crate::state::{use_app, AppState};
use crate::util::{format_iso_date, format_number, validate_avatar, validate_profile, FieldErrors};
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

fn initials(user: &User) -> String {
    let name = user.display_name();
    let letters: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters.to_uppercase()
    }
}

fn update_from(profile: &Profile) -> ProfileUpdate {
    let user = profile.user.clone().unwrap_or_default();
    ProfileUpdate {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        bio: profile.bio.clone(),
        identity: profile.identity.clone(),
    }
}

async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buf = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("{e:?}"))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

fn upload_avatar(
    app: AppState,
    profile: RwSignal<Option<Profile>>,
    uploading: RwSignal<bool>,
    file: web_sys::File,
) {
    let name = file.name();
    let mime = file.type_();
    if let Err(msg) = validate_avatar(&mime, file.size()) {
        app.notifications.show_error(&msg);
        return;
    }

    uploading.set(true);
    spawn_local(async move {
        let bytes = match read_file(&file).await {
            Ok(b) => b,
            Err(e) => {
                log::warn!("reading {name} failed: {e}");
                app.notifications.show_error("Could not read that file");
                let _ = uploading.try_set(false);
                return;
            }
        };
        match app.api_client.upload_avatar(&name, &mime, bytes).await {
            Ok(url) => {
                let _ = profile.try_update(|p| {
                    if let Some(user) = p.as_mut().and_then(|p| p.user.as_mut()) {
                        user.avatar = url.clone();
                    }
                });
                if let Some(mut me) = app.current_user.get_untracked() {
                    me.avatar = url;
                    app.sign_in(me);
                }
                app.notifications.show_success("Profile picture updated");
            }
            Err(e) => app.report(&e, "Could not upload your picture"),
        }
        let _ = uploading.try_set(false);
    });
}

#[component]
fn Avatar(user: User) -> impl IntoView {
    match user.avatar.clone().filter(|a| !a.is_empty()) {
        Some(src) => view! {
            <img src=src alt=user.display_name() class="size-20 rounded-full border object-cover" />
        }
            .into_any(),
        None => view! {
            <div class="flex size-20 items-center justify-center rounded-full bg-primary/15 text-2xl font-semibold text-primary">
                {initials(&user)}
            </div>
        }
            .into_any(),
    }
}

#[component]
fn ProfileEditor(
    initial: ProfileUpdate,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] on_submit: Callback<ProfileUpdate>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let first_name = RwSignal::new(initial.first_name);
    let last_name = RwSignal::new(initial.last_name);
    let email = RwSignal::new(initial.email);
    let bio = RwSignal::new(initial.bio);
    let identity = RwSignal::new(initial.identity);
    let errors: RwSignal<FieldErrors> = RwSignal::new(FieldErrors::default());

    let field_error = move |field: &'static str| {
        Signal::derive(move || errors.with(|e| e.get(field).map(str::to_string)))
    };

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let update = ProfileUpdate {
            first_name: first_name.get_untracked().trim().to_string(),
            last_name: last_name.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            bio: bio.get_untracked().trim().to_string(),
            identity: identity.get_untracked().trim().to_string(),
        };
        match validate_profile(&update) {
            Ok(()) => {
                errors.set(FieldErrors::default());
                on_submit.run(update);
            }
            Err(e) => errors.set(e),
        }
    };

    view! {
        <form class="flex flex-col gap-3" on:submit=submit>
            <div class="grid grid-cols-2 gap-3">
                <div class="flex flex-col gap-1.5">
                    <Label html_for="first-name">"First name"</Label>
                    <Input id="first-name" bind_value=first_name />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="last-name">"Last name"</Label>
                    <Input id="last-name" bind_value=last_name />
                </div>
            </div>
            <div class="flex flex-col gap-1.5">
                <Label html_for="profile-email">"Email"</Label>
                <Input
                    id="profile-email"
                    r#type="email"
                    bind_value=email
                    invalid=Signal::derive(move || errors.with(|e| e.get("email").is_some()))
                />
                <FieldError message=field_error("email") />
            </div>
            <div class="flex flex-col gap-1.5">
                <Label html_for="profile-bio">"Bio"</Label>
                <TextArea id="profile-bio" bind_value=bio />
                <FieldError message=field_error("bio") />
            </div>
            <div class="flex flex-col gap-1.5">
                <Label html_for="profile-identity">"I am a person who..."</Label>
                <Input id="profile-identity" placeholder="takes care of their body" bind_value=identity />
            </div>
            <div class="flex justify-end gap-2">
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
                    "Save profile"
                </Button>
            </div>
        </form>
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let app = use_app();
    let profile: RwSignal<Option<Profile>> = RwSignal::new(None);
    let badges: RwSignal<Vec<UserBadge>> = RwSignal::new(Vec::new());
    let loading: RwSignal<bool> = RwSignal::new(true);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let editing: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let uploading: RwSignal<bool> = RwSignal::new(false);

    let load = Callback::new({
        let app = app.clone();
        move |()| {
            loading.set(true);
            load_error.set(None);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.profile().await {
                    Ok(p) => {
                        let _ = profile.try_set(Some(p));
                    }
                    Err(e) => {
                        log::warn!("loading profile failed: {e}");
                        if e.is_unauthorized() {
                            app.report(&e, "Could not load your profile");
                        }
                        let _ = load_error.try_set(Some(e.message));
                    }
                }
                match app.api_client.badges().await {
                    Ok(list) => {
                        let _ = badges.try_set(list);
                    }
                    Err(e) => log::warn!("loading badges failed: {e}"),
                }
                let _ = loading.try_set(false);
            });
        }
    });
    load.run(());

    let on_save = Callback::new({
        let app = app.clone();
        move |update: ProfileUpdate| {
            saving.set(true);
            let app = app.clone();
            spawn_local(async move {
                match app.api_client.update_profile(&update).await {
                    Ok(mut saved) => {
                        // Some deployments answer without the nested user.
                        if saved.user.is_none() {
                            saved.user = profile.get_untracked().and_then(|p| p.user).map(|mut u| {
                                u.first_name = update.first_name.clone();
                                u.last_name = update.last_name.clone();
                                u.email = update.email.clone();
                                u
                            });
                        }
                        if let Some(user) = saved.user.clone() {
                            app.sign_in(user);
                        }
                        let _ = profile.try_set(Some(saved));
                        let _ = editing.try_set(false);
                        app.notifications.show_success("Profile saved");
                    }
                    Err(e) => app.report(&e, "Could not save your profile"),
                }
                let _ = saving.try_set(false);
            });
        }
    });

    let on_file = {
        let app = app.clone();
        move |ev: web_sys::Event| {
            let Some(input) = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            else {
                return;
            };
            if let Some(file) = input.files().and_then(|fs| fs.get(0)) {
                upload_avatar(app.clone(), profile, uploading, file);
            }
            // Picking the same file again should fire `change`.
            input.set_value("");
        }
    };

    view! {
        <div class="flex flex-col gap-4">
            <h1 class="text-xl font-semibold">"Profile"</h1>
            <ErrorBanner message=load_error on_retry=load />

            {move || {
                let Some(p) = profile.get() else {
                    return if loading.get() {
                        view! { <LoadingBlock label="Loading profile..." /> }.into_any()
                    } else {
                        ().into_any()
                    };
                };
                let user = p.user.clone().unwrap_or_default();
                let initial = StoredValue::new(update_from(&p));
                let level = p.level.to_string();
                let points = format_number(p.total_points as i64);
                let completions = format_number(p.total_completions as i64);
                let streak = p.current_streak.to_string();
                let on_file = on_file.clone();
                view! {
                    <Card>
                        <CardContent class="flex flex-col gap-4 pt-4 sm:flex-row sm:items-start">
                            <div class="flex flex-col items-center gap-2">
                                <Avatar user=user.clone() />
                                <label class="cursor-pointer text-xs text-primary underline underline-offset-4">
                                    {move || if uploading.get() { "Uploading..." } else { "Change photo" }}
                                    <input type="file" accept="image/*" class="hidden" on:change=on_file />
                                </label>
                            </div>
                            <div class="min-w-0 flex-1">
                                <div class="text-lg font-semibold">{user.display_name()}</div>
                                <div class="text-xs text-muted-foreground">{format!("@{}", user.username)}</div>
                                {(!p.identity.is_empty()).then(|| view! {
                                    <p class="mt-2 text-sm italic">{format!("I am a person who {}", p.identity)}</p>
                                })}
                                {(!p.bio.is_empty()).then(|| view! { <p class="mt-2 text-sm">{p.bio.clone()}</p> })}
                                {(!p.location.is_empty()).then(|| view! { <p class="mt-1 text-xs text-muted-foreground">{format!("📍 {}", p.location)}</p> })}
                            </div>
                            <Show when=move || !editing.get()>
                                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| editing.set(true)>
                                    "Edit profile"
                                </Button>
                            </Show>
                        </CardContent>
                    </Card>

                    <Show when=move || editing.get()>
                        <Card>
                            <CardContent class="pt-4">
                                <ProfileEditor
                                    initial=initial.get_value()
                                    busy=saving
                                    on_submit=on_save
                                    on_cancel=move |()| editing.set(false)
                                />
                            </CardContent>
                        </Card>
                    </Show>

                    <div class="grid grid-cols-2 gap-3 md:grid-cols-4">
                        <StatCard title="Level" icon="⭐" value=Signal::stored(level) />
                        <StatCard title="Points" icon="💎" value=Signal::stored(points) />
                        <StatCard title="Completions" icon="✅" value=Signal::stored(completions) />
                        <StatCard title="Streak" icon="🔥" value=Signal::stored(streak) hint=format!("best {}", p.best_streak) />
                    </div>
                }
                    .into_any()
            }}

            <Card>
                <CardHeader>
                    <CardTitle>"Badges"</CardTitle>
                    <CardDescription>"Earned along the way."</CardDescription>
                </CardHeader>
                <CardContent>
                    {move || {
                        let list = badges.get();
                        if list.is_empty() {
                            return view! { <EmptyState>"No badges yet. Keep going!"</EmptyState> }.into_any();
                        }
                        view! {
                            <ul class="grid grid-cols-2 gap-3 sm:grid-cols-3">
                                {list
                                    .into_iter()
                                    .map(|ub| {
                                        view! {
                                            <li class="flex flex-col items-center gap-1 rounded-lg border px-3 py-3 text-center" title=ub.badge.description.clone()>
                                                <span class="text-2xl" aria-hidden="true">{if ub.badge.icon.is_empty() { "🏅".to_string() } else { ub.badge.icon.clone() }}</span>
                                                <span class="text-sm font-medium">{ub.badge.name.clone()}</span>
                                                <span class="text-[11px] text-muted-foreground">{format_iso_date(&ub.awarded_at)}</span>
                                            </li>
                                        }
                                    })
                                    .collect_view()}
                            </ul>
                        }
                            .into_any()
                    }}
                </CardContent>
            </Card>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        let mut u = User {
            username: "gardener".to_string(),
            ..Default::default()
        };
        assert_eq!(initials(&u), "G");
        u.first_name = "ada".to_string();
        u.last_name = "lovelace".to_string();
        assert_eq!(initials(&u), "AL");
    }

    #[test]
    fn test_update_from_profile() {
        let p = Profile {
            user: Some(User {
                id: 1,
                username: "sam".to_string(),
                email: "sam@example.com".to_string(),
                first_name: "Sam".to_string(),
                ..Default::default()
            }),
            bio: "runner".to_string(),
            identity: "moves daily".to_string(),
            ..Default::default()
        };
        let u = update_from(&p);
        assert_eq!(u.first_name, "Sam");
        assert_eq!(u.email, "sam@example.com");
        assert_eq!(u.bio, "runner");
        assert_eq!(u.identity, "moves daily");
    }
}
