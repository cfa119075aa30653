use crate::models::{
    AnalyticsSeries, Challenge, ChallengeDraft, Comment, CompletionResult, FeedItem, Habit,
    HabitDraft, HabitId, Profile, ProfileUpdate, Reaction, Statistics, User, UserBadge,
};
use crate::storage::{
    clear_session, save_tokens, BrowserStorage, SharedStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
use crate::util::RegistrationForm;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: None,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            status: None,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            status: Some(401),
            message: "Your session has expired. Please log in again.".to_string(),
        }
    }

    fn http(status: StatusCode, body: &str) -> Self {
        let message = describe_body(body)
            .unwrap_or_else(|| format!("Request failed ({status})"));
        Self {
            kind: ApiErrorKind::Http,
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

/// Whether a 401 from `path` means the access token went stale.
fn session_expired(path: &str, sent_token: bool) -> bool {
    sent_token && !path.trim_start_matches('/').starts_with("auth/")
}

/// Pulls a readable message out of a DRF error body: `detail`, `error`,
/// `message`, or the first field error (`username: already taken`).
pub(crate) fn describe_body(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = v.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(s) = obj.get(key).and_then(|s| s.as_str()) {
            return Some(s.to_string());
        }
    }

    obj.iter().find_map(|(field, value)| {
        let msg = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items.first()?.as_str()?.to_string(),
            _ => return None,
        };
        if field == "non_field_errors" {
            Some(msg)
        } else {
            Some(format!("{field}: {msg}"))
        }
    })
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // `window.ENV.API_URL`, with `api_url` accepted as well.
        if let Some(env) = web_sys::window().and_then(|w| w.get("ENV")) {
            if !env.is_undefined() && env.is_object() {
                for key in ["API_URL", "api_url"] {
                    if let Ok(v) = js_sys::Reflect::get(&env, &key.into()) {
                        if let Some(url) = v.as_string() {
                            return Self::from_url(&url);
                        }
                    }
                }
            }
        }

        Self::from_url(DEFAULT_API_URL)
    }

    pub fn from_url(url: &str) -> Self {
        Self {
            api_url: normalize_base_url(url),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Endpoint paths are relative (`habits/`), so the base always ends in `/`.
pub(crate) fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// List endpoints return either a bare array or a paginated `{ results }`.
pub(crate) fn parse_list<T: DeserializeOwned>(data: serde_json::Value) -> ApiResult<Vec<T>> {
    let list = match data {
        serde_json::Value::Array(_) => data,
        serde_json::Value::Object(mut obj) => ["results", "habits", "data"]
            .iter()
            .find_map(|k| obj.remove(*k).filter(|v| v.is_array()))
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        _ => return Err(ApiError::parse("expected a list")),
    };
    serde_json::from_value(list).map_err(ApiError::parse)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub(crate) struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl From<&RegistrationForm> for RegisterRequest {
    fn from(f: &RegistrationForm) -> Self {
        Self {
            username: f.username.trim().to_string(),
            email: f.email.trim().to_string(),
            password: f.password.clone(),
            password_confirm: f.password_confirm.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

enum Payload {
    Empty,
    Json(serde_json::Value),
    File {
        field: &'static str,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl Payload {
    fn json(body: &impl Serialize) -> ApiResult<Self> {
        serde_json::to_value(body)
            .map(Self::Json)
            .map_err(ApiError::parse)
    }

    fn attach(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Empty => req,
            Self::Json(v) => req.json(v),
            Self::File {
                field,
                file_name,
                mime,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                let part = match part.mime_str(mime) {
                    Ok(p) => p,
                    Err(_) => reqwest::multipart::Part::bytes(bytes.clone())
                        .file_name(file_name.clone()),
                };
                req.multipart(reqwest::multipart::Form::new().part(*field, part))
            }
        }
    }
}

/// REST client. Clones share one token pair, so a refresh done by any clone
/// is seen by all of them.
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    tokens: Arc<Mutex<Tokens>>,
    store: SharedStore,
}

impl ApiClient {
    pub fn new(base_url: &str, store: SharedStore) -> Self {
        let tokens = Tokens {
            access: store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty()),
            refresh: store.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty()),
        };
        Self {
            base_url: normalize_base_url(base_url),
            tokens: Arc::new(Mutex::new(tokens)),
            store,
        }
    }

    pub fn load_from_storage() -> Self {
        Self::new(&EnvConfig::new().api_url, BrowserStorage::shared())
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn set_tokens(&self, access: String, refresh: Option<String>) {
        save_tokens(self.store.as_ref(), &access, refresh.as_deref());
        if let Ok(mut t) = self.tokens.lock() {
            t.access = Some(access);
            if refresh.is_some() {
                t.refresh = refresh;
            }
        }
    }

    pub(crate) fn access_token(&self) -> Option<String> {
        self.tokens.lock().ok().and_then(|t| t.access.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens.lock().ok().and_then(|t| t.refresh.clone())
    }

    pub(crate) fn auth_header(&self) -> Option<String> {
        self.access_token().map(|t| format!("Bearer {t}"))
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn logout(&self) {
        if let Ok(mut t) = self.tokens.lock() {
            *t = Tokens::default();
        }
        clear_session(self.store.as_ref());
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        auth: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(auth) = auth {
            req = req.header("Authorization", auth);
        }
        req.header("X-Requested-With", "XMLHttpRequest")
    }

    async fn send_once(
        &self,
        client: &reqwest::Client,
        method: &Method,
        path: &str,
        payload: &Payload,
    ) -> ApiResult<reqwest::Response> {
        let req = client.request(method.clone(), self.url(path));
        let req = Self::with_auth_headers(req, self.auth_header());
        payload.attach(req).send().await.map_err(ApiError::network)
    }

    /// Exchanges the refresh token for a new access token.
    async fn refresh_access(&self) -> bool {
        let Some(refresh) = self.refresh_token() else {
            return false;
        };
        let res = reqwest::Client::new()
            .post(self.url("auth/refresh/"))
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await;
        let res = match res {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::info!("token refresh rejected ({})", r.status());
                return false;
            }
            Err(e) => {
                log::warn!("token refresh failed: {e}");
                return false;
            }
        };
        match res.json::<RefreshResponse>().await {
            Ok(body) => {
                self.set_tokens(body.access, body.refresh);
                true
            }
            Err(e) => {
                log::warn!("token refresh response unreadable: {e}");
                false
            }
        }
    }

    /// Sends a request; on an expired session refreshes once and retries. A
    /// second 401 or a failed refresh ends the session. Other 401s (bad
    /// credentials on `auth/*`, anonymous calls) come back as plain HTTP errors.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let sent_token = self.access_token().is_some();
        let mut res = self.send_once(&client, &method, path, &payload).await?;

        if res.status() == StatusCode::UNAUTHORIZED && session_expired(path, sent_token) {
            if !self.refresh_access().await {
                self.logout();
                return Err(ApiError::unauthorized());
            }
            res = self.send_once(&client, &method, path, &payload).await?;
            if res.status() == StatusCode::UNAUTHORIZED {
                self.logout();
                return Err(ApiError::unauthorized());
            }
        }

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            log::debug!("{method} {path} -> {status}: {body}");
            Err(ApiError::http(status, &body))
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> ApiResult<T> {
        let res = self.execute(method, path, payload).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// For endpoints whose body we do not need (204s included).
    async fn request_unit(&self, method: Method, path: &str, payload: Payload) -> ApiResult<()> {
        self.execute(method, path, payload).await.map(|_| ())
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let data: serde_json::Value = self.request(Method::GET, path, Payload::Empty).await?;
        parse_list(data)
    }

    // Auth

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthResponse> {
        let body = Payload::json(&LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        })?;
        let res: AuthResponse = self.request(Method::POST, "auth/login/", body).await?;
        self.set_tokens(res.access.clone(), Some(res.refresh.clone()));
        Ok(res)
    }

    pub async fn register(&self, form: &RegistrationForm) -> ApiResult<AuthResponse> {
        let body = Payload::json(&RegisterRequest::from(form))?;
        let res: AuthResponse = self.request(Method::POST, "auth/register/", body).await?;
        self.set_tokens(res.access.clone(), Some(res.refresh.clone()));
        Ok(res)
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.request(Method::GET, "users/me/", Payload::Empty).await
    }

    // Habits

    pub async fn list_habits(&self) -> ApiResult<Vec<Habit>> {
        self.get_list("habits/").await
    }

    pub async fn today_habits(&self) -> ApiResult<Vec<Habit>> {
        self.get_list("habits/today/").await
    }

    pub async fn create_habit(&self, draft: &HabitDraft) -> ApiResult<Habit> {
        self.request(Method::POST, "habits/", Payload::json(draft)?)
            .await
    }

    pub async fn update_habit(&self, id: HabitId, draft: &HabitDraft) -> ApiResult<Habit> {
        self.request(Method::PATCH, &format!("habits/{id}/"), Payload::json(draft)?)
            .await
    }

    pub async fn delete_habit(&self, id: HabitId) -> ApiResult<()> {
        self.request_unit(Method::DELETE, &format!("habits/{id}/"), Payload::Empty)
            .await
    }

    pub async fn mark_complete(&self, id: HabitId) -> ApiResult<CompletionResult> {
        self.request(
            Method::POST,
            &format!("habits/{id}/mark_complete/"),
            Payload::json(&serde_json::json!({ "note": "" }))?,
        )
        .await
    }

    pub async fn statistics(&self) -> ApiResult<Statistics> {
        self.request(Method::GET, "habits/statistics/", Payload::Empty)
            .await
    }

    pub async fn weekly_analytics(&self) -> ApiResult<AnalyticsSeries> {
        self.request(Method::GET, "habits/analytics/weekly/", Payload::Empty)
            .await
    }

    pub async fn monthly_analytics(&self) -> ApiResult<AnalyticsSeries> {
        self.request(Method::GET, "habits/analytics/monthly/", Payload::Empty)
            .await
    }

    // Feed

    pub async fn feed(&self) -> ApiResult<Vec<FeedItem>> {
        self.get_list("habits/feed/").await
    }

    pub async fn react_to_feed_item(&self, item_id: i64, emoji: &str) -> ApiResult<Reaction> {
        self.request(
            Method::POST,
            &format!("habits/feed/{item_id}/react/"),
            Payload::json(&serde_json::json!({ "emoji": emoji }))?,
        )
        .await
    }

    pub async fn comment_on_feed_item(&self, item_id: i64, text: &str) -> ApiResult<Comment> {
        self.request(
            Method::POST,
            &format!("habits/feed/{item_id}/comments/"),
            Payload::json(&serde_json::json!({ "text": text }))?,
        )
        .await
    }

    // Users

    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        let path = format!("users/search/?q={}", urlencoding::encode(query.trim()));
        self.get_list(&path).await
    }

    pub async fn follow(&self, user_id: i64) -> ApiResult<()> {
        self.request_unit(
            Method::POST,
            "users/follow/",
            Payload::json(&serde_json::json!({ "user_id": user_id }))?,
        )
        .await
    }

    pub async fn unfollow(&self, user_id: i64) -> ApiResult<()> {
        self.request_unit(
            Method::DELETE,
            "users/follow/",
            Payload::json(&serde_json::json!({ "user_id": user_id }))?,
        )
        .await
    }

    pub async fn profile(&self) -> ApiResult<Profile> {
        self.request(Method::GET, "users/profile/", Payload::Empty)
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<Profile> {
        self.request(Method::PATCH, "users/profile/", Payload::json(update)?)
            .await
    }

    /// Multipart upload under the `avatar` field. Returns the new avatar URL
    /// when the server reports one.
    pub async fn upload_avatar(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<Option<String>> {
        let payload = Payload::File {
            field: "avatar",
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        };
        let data: serde_json::Value = self
            .request(Method::POST, "users/profile/avatar/", payload)
            .await?;
        Ok(avatar_url_from(&data))
    }

    pub async fn badges(&self) -> ApiResult<Vec<UserBadge>> {
        self.get_list("users/badges/").await
    }

    // Challenges

    pub async fn challenges(&self) -> ApiResult<Vec<Challenge>> {
        self.get_list("habits/challenges/").await
    }

    pub async fn create_challenge(&self, draft: &ChallengeDraft) -> ApiResult<Challenge> {
        self.request(Method::POST, "habits/challenges/", Payload::json(draft)?)
            .await
    }

    pub async fn join_challenge(&self, id: i64) -> ApiResult<()> {
        self.request_unit(
            Method::POST,
            &format!("habits/challenges/{id}/join/"),
            Payload::Empty,
        )
        .await
    }
}

/// Upload responses carry either `avatar` or `avatar_url`, at the top level
/// or inside `user`.
pub(crate) fn avatar_url_from(data: &serde_json::Value) -> Option<String> {
    let pick = |v: &serde_json::Value| {
        ["avatar_url", "avatar"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|s| s.as_str()).map(str::to_string))
    };
    pick(data).or_else(|| data.get("user").and_then(pick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client(mem: &MemoryStorage) -> ApiClient {
        ApiClient::new("http://localhost:8000/api/v1", mem.shared())
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.example.com/api/v1"),
            "https://api.example.com/api/v1/"
        );
        assert_eq!(normalize_base_url("  "), DEFAULT_API_URL);
        assert_eq!(EnvConfig::from_url(DEFAULT_API_URL).api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_url_joins_relative_and_absolute_paths() {
        let c = client(&MemoryStorage::default());
        assert_eq!(c.url("habits/"), "http://localhost:8000/api/v1/habits/");
        assert_eq!(c.url("/users/badges/"), "http://localhost:8000/api/v1/users/badges/");
    }

    #[test]
    fn test_tokens_are_loaded_and_saved() {
        let mem = MemoryStorage::default();
        mem.put_raw(ACCESS_TOKEN_KEY, "a1");
        let c = client(&mem);
        assert!(c.is_authenticated());
        assert_eq!(c.auth_header().as_deref(), Some("Bearer a1"));

        c.set_tokens("a2".to_string(), Some("r2".to_string()));
        assert_eq!(mem.raw(ACCESS_TOKEN_KEY).as_deref(), Some("a2"));
        assert_eq!(mem.raw(REFRESH_TOKEN_KEY).as_deref(), Some("r2"));
    }

    #[test]
    fn test_clones_share_refreshed_tokens() {
        let mem = MemoryStorage::default();
        let a = client(&mem);
        let b = a.clone();
        a.set_tokens("fresh".to_string(), None);
        assert_eq!(b.access_token().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_logout_clears_memory_and_storage() {
        let mem = MemoryStorage::default();
        let c = client(&mem);
        c.set_tokens("a".to_string(), Some("r".to_string()));
        c.logout();
        assert!(!c.is_authenticated());
        assert!(mem.raw(ACCESS_TOKEN_KEY).is_none());
        assert!(mem.raw(REFRESH_TOKEN_KEY).is_none());
    }

    #[test]
    fn test_parse_list_accepts_array_and_paginated() {
        let bare = serde_json::json!([{ "id": 1, "title": "Read" }]);
        let habits: Vec<Habit> = parse_list(bare).unwrap();
        assert_eq!(habits.len(), 1);

        let paged = serde_json::json!({
            "count": 2,
            "next": null,
            "results": [{ "id": 1, "title": "Read" }, { "id": 2, "title": "Run" }]
        });
        let habits: Vec<Habit> = parse_list(paged).unwrap();
        assert_eq!(habits[1].title, "Run");

        let empty: Vec<Habit> = parse_list(serde_json::json!({ "count": 0 })).unwrap();
        assert!(empty.is_empty());

        assert!(parse_list::<Habit>(serde_json::json!("nope")).is_err());
    }

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "access": "jwt-access",
            "refresh": "jwt-refresh",
            "user": {"id": 1, "username": "u", "email": "u@example.com"}
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.access, "jwt-access");
        assert_eq!(parsed.user.username, "u");
        assert!(parsed.user.avatar.is_none());
    }

    #[test]
    fn test_completion_response_contract_deserialize() {
        let json = r#"{"message": "Habit marked as complete!", "entry": {"id": 9}, "current_streak": 4}"#;
        let parsed: CompletionResult = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.current_streak, 4);
    }

    #[test]
    fn test_register_request_uses_backend_field_names() {
        let form = RegistrationForm {
            username: " sam ".to_string(),
            email: "sam@example.com".to_string(),
            password: "longenough".to_string(),
            password_confirm: "longenough".to_string(),
        };
        let v = serde_json::to_value(RegisterRequest::from(&form)).expect("should serialize");
        assert_eq!(v["username"], "sam");
        assert_eq!(v["password_confirm"], "longenough");
    }

    #[test]
    fn test_describe_body_prefers_detail_then_field_errors() {
        assert_eq!(
            describe_body(r#"{"detail": "Not found."}"#).as_deref(),
            Some("Not found.")
        );
        assert_eq!(
            describe_body(r#"{"username": ["A user with that username already exists."]}"#)
                .as_deref(),
            Some("username: A user with that username already exists.")
        );
        assert_eq!(
            describe_body(r#"{"non_field_errors": ["Invalid credentials"]}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert!(describe_body("<html>502</html>").is_none());
    }

    #[test]
    fn test_http_error_falls_back_to_status() {
        let e = ApiError::http(StatusCode::BAD_GATEWAY, "");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.status, Some(502));
        assert!(e.to_string().contains("502"));
    }

    #[test]
    fn test_only_authenticated_calls_treat_401_as_expiry() {
        assert!(session_expired("habits/", true));
        assert!(session_expired("/users/me/", true));
        assert!(!session_expired("habits/", false));
        assert!(!session_expired("auth/login/", true));
        assert!(!session_expired("auth/register/", false));
    }

    #[test]
    fn test_bad_credentials_keep_backend_detail() {
        let e = ApiError::http(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "No active account found with the given credentials"}"#,
        );
        assert!(!e.is_unauthorized());
        assert_eq!(e.status, Some(401));
        assert_eq!(e.message, "No active account found with the given credentials");
    }

    #[test]
    fn test_avatar_url_from_variants() {
        let top = serde_json::json!({ "avatar_url": "https://cdn/x.png" });
        assert_eq!(avatar_url_from(&top).as_deref(), Some("https://cdn/x.png"));

        let nested = serde_json::json!({ "user": { "avatar": "/media/a.png" } });
        assert_eq!(avatar_url_from(&nested).as_deref(), Some("/media/a.png"));

        assert!(avatar_url_from(&serde_json::json!({})).is_none());
    }
}
