use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

use crate::profile::dto::Profile;
use crate::profile::jwt::AuthUser;
use crate::profile::repo::User;
use crate::state::AppState;

/// Pages of the original flow. `Main` is terminal: there is no logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Login,
    Signup,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Analyze,
    Plan,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Per-user session context: current page/tab, the profile snapshot loaded at
/// login, and the chat transcript. Transcripts are never persisted; the whole
/// session lives only until process exit.
#[derive(Debug, Clone)]
pub struct Session {
    pub page: Page,
    pub tab: Tab,
    pub profile: Option<Profile>,
    pub transcript: Vec<ChatMessage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            page: Page::Login,
            tab: Tab::default(),
            profile: None,
            transcript: Vec::new(),
        }
    }

    /// Unconditional hop from the login page. Ignored once authenticated.
    pub fn goto_signup(&mut self) {
        if self.page != Page::Main {
            self.page = Page::Signup;
        }
    }

    pub fn goto_login(&mut self) {
        if self.page != Page::Main {
            self.page = Page::Login;
        }
    }

    pub fn login_succeeded(&mut self, profile: Profile) {
        self.page = Page::Main;
        self.profile = Some(profile);
    }

    pub fn login_failed(&mut self) {
        self.page = Page::Login;
    }

    /// A fresh account must still log in, so signup lands back on `Login`.
    pub fn signup_succeeded(&mut self) {
        self.page = Page::Login;
    }

    pub fn signup_failed(&mut self) {
        self.page = Page::Signup;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }
}

/// In-process session registry keyed by user id. Replaces the original's
/// framework-managed global state with an explicit object owned by `AppState`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) the session for a user who just logged in.
    pub async fn start(&self, user_id: Uuid, profile: Profile) {
        let mut session = Session::new();
        session.login_succeeded(profile);
        self.inner.lock().await.insert(user_id, session);
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Session> {
        self.inner.lock().await.get(&user_id).cloned()
    }

    /// Fetch the session, lazily starting one when the token outlived a
    /// process restart.
    pub async fn get_or_start(&self, user_id: Uuid, profile: Profile) -> Session {
        let mut guard = self.inner.lock().await;
        guard
            .entry(user_id)
            .or_insert_with(|| {
                let mut s = Session::new();
                s.login_succeeded(profile);
                s
            })
            .clone()
    }

    pub async fn set_tab(&self, user_id: Uuid, tab: Tab) -> Option<Tab> {
        let mut guard = self.inner.lock().await;
        let session = guard.get_mut(&user_id)?;
        session.select_tab(tab);
        Some(session.tab)
    }

    /// Record one question/answer exchange and return the updated transcript.
    /// Takes the profile so a lazily recreated session is always a logged-in
    /// one, never a bare `Login` page.
    pub async fn append_exchange(
        &self,
        user_id: Uuid,
        profile: Profile,
        question: &str,
        reply: &str,
    ) -> Vec<ChatMessage> {
        let mut guard = self.inner.lock().await;
        let session = guard.entry(user_id).or_insert_with(|| {
            let mut s = Session::new();
            s.login_succeeded(profile);
            s
        });
        session.push_user(question);
        session.push_assistant(reply);
        session.transcript.clone()
    }
}

// --- HTTP surface ---

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub page: Page,
    pub tab: Tab,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SetTabRequest {
    pub tab: Tab,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/tab", put(set_tab))
}

/// A valid token can outlive a process restart. Every session endpoint goes
/// through here so the lazily recreated session looks the same everywhere.
async fn ensure_session(
    state: &AppState,
    user_id: Uuid,
) -> Result<Session, (StatusCode, String)> {
    if let Some(session) = state.sessions.get(user_id).await {
        return Ok(session);
    }
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;
    Ok(state.sessions.get_or_start(user_id, user.profile()).await)
}

#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let session = ensure_session(&state, user_id).await?;
    Ok(Json(SessionResponse {
        page: session.page,
        tab: session.tab,
        transcript: session.transcript,
    }))
}

#[instrument(skip(state))]
async fn set_tab(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SetTabRequest>,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    ensure_session(&state, user_id).await?;
    state
        .sessions
        .set_tab(user_id, body.tab)
        .await
        .ok_or((StatusCode::NOT_FOUND, "No active session".to_string()))?;
    let session = state
        .sessions
        .get(user_id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "No active session".to_string()))?;
    Ok(Json(SessionResponse {
        page: session.page,
        tab: session.tab,
        transcript: session.transcript,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Gender, Goal};

    fn profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            username: "asha".into(),
            gender: Gender::Female,
            age: 29,
            height_cm: 165.0,
            weight_kg: 58.0,
            goal: Goal::MaintainWeight,
            activity_level: 1.375,
            tdee: 1900.0,
        }
    }

    #[test]
    fn starts_on_login_with_empty_transcript() {
        let s = Session::new();
        assert_eq!(s.page, Page::Login);
        assert_eq!(s.tab, Tab::Analyze);
        assert!(s.profile.is_none());
        assert!(s.transcript.is_empty());
    }

    #[test]
    fn successful_login_reaches_main_with_the_stored_profile() {
        let mut s = Session::new();
        let p = profile();
        s.login_succeeded(p.clone());
        assert_eq!(s.page, Page::Main);
        let loaded = s.profile.as_ref().unwrap();
        assert_eq!(loaded.username, p.username);
        assert_eq!(loaded.tdee, p.tdee);
        assert_eq!(loaded.goal, p.goal);
    }

    #[test]
    fn failed_login_stays_on_login() {
        let mut s = Session::new();
        s.login_failed();
        assert_eq!(s.page, Page::Login);
        assert!(s.profile.is_none());
    }

    #[test]
    fn signup_success_returns_to_login_without_authenticating() {
        let mut s = Session::new();
        s.goto_signup();
        assert_eq!(s.page, Page::Signup);
        s.signup_succeeded();
        assert_eq!(s.page, Page::Login);
        assert!(s.profile.is_none());
    }

    #[test]
    fn signup_failure_stays_on_signup() {
        let mut s = Session::new();
        s.goto_signup();
        s.signup_failed();
        assert_eq!(s.page, Page::Signup);
    }

    #[test]
    fn main_is_terminal() {
        let mut s = Session::new();
        s.login_succeeded(profile());
        s.goto_login();
        s.goto_signup();
        assert_eq!(s.page, Page::Main);
    }

    #[test]
    fn transcript_keeps_turn_order() {
        let mut s = Session::new();
        s.push_user("is rice healthy?");
        s.push_assistant("it depends on the portion");
        assert_eq!(s.transcript.len(), 2);
        assert_eq!(s.transcript[0].role, Role::User);
        assert_eq!(s.transcript[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn store_round_trips_a_session() {
        let store = SessionStore::new();
        let p = profile();
        store.start(p.id, p.clone()).await;
        let s = store.get(p.id).await.unwrap();
        assert_eq!(s.page, Page::Main);

        assert_eq!(store.set_tab(p.id, Tab::Chat).await, Some(Tab::Chat));
        let transcript = store.append_exchange(p.id, p.clone(), "q", "a").await;
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn set_tab_without_session_is_none() {
        let store = SessionStore::new();
        assert!(store.set_tab(Uuid::new_v4(), Tab::Plan).await.is_none());
    }

    #[tokio::test]
    async fn get_or_start_recreates_a_logged_in_session() {
        let store = SessionStore::new();
        let p = profile();
        let s = store.get_or_start(p.id, p.clone()).await;
        assert_eq!(s.page, Page::Main);
        assert_eq!(s.profile.as_ref().unwrap().username, p.username);

        // an existing session is returned as-is, not reset
        store.set_tab(p.id, Tab::Chat).await;
        let again = store.get_or_start(p.id, p).await;
        assert_eq!(again.tab, Tab::Chat);
    }

    #[tokio::test]
    async fn append_exchange_bootstraps_a_logged_in_session() {
        let store = SessionStore::new();
        let p = profile();
        let transcript = store.append_exchange(p.id, p.clone(), "q", "a").await;
        assert_eq!(transcript.len(), 2);

        let s = store.get(p.id).await.unwrap();
        assert_eq!(s.page, Page::Main);
        assert_eq!(s.profile.as_ref().unwrap().username, p.username);
    }
}
