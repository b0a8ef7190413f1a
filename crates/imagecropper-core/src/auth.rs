//! Authentication session.
//!
//! The identity provider hands the page a signed ID token (a JWT). The token
//! is kept in a key-value store, attached to every backend request, checked
//! for expiry and validated against the backend on each page load, and erased
//! on logout or when the backend answers 401.
//!
//! All of that state lives in an explicit [`Session`] over an injected
//! [`KeyValueStore`], so the request layer receives it as an argument instead
//! of reaching into global storage.
//!
//! # Lifecycle
//!
//! 1. [`Session::restore`] loads the persisted state (init)
//! 2. [`Session::sign_in`] stores a fresh token after the provider callback
//! 3. [`Session::begin_validation`] / [`Session::complete_validation`] run the
//!    page-load guard around a `GET /api/auth/me` call
//! 4. [`Session::teardown`] clears everything; the host redirects to `/login`

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key of the raw ID token.
pub const ID_TOKEN_KEY: &str = "idToken";
/// Storage key of the active logo configuration id.
pub const CONFIG_ID_KEY: &str = "configId";
/// Storage key of the persisted [`AuthState`].
pub const AUTH_STATE_KEY: &str = "auth-storage";

/// How long a validated login is considered fresh (1 hour).
pub const SESSION_TTL_MS: u64 = 60 * 60 * 1000;

/// Error types for the session guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token found")]
    NoToken,

    #[error("Token expired")]
    TokenExpired,

    /// The backend refused the token.
    #[error("Authentication rejected: {0}")]
    Rejected(String),
}

/// Minimal string key-value storage, e.g. browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The signed-in user as reported by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub expires_at: u64,
}

/// Session state. `is_loading` is transient and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(skip)]
    pub is_loading: bool,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<f64>,
}

/// Check whether a JWT has expired.
///
/// Reads the `exp` claim (seconds since the epoch) from the payload segment.
/// A token that cannot be decoded, or has no `exp`, counts as expired.
pub fn is_token_expired(id_token: &str, now_ms: u64) -> bool {
    match token_expiry_ms(id_token) {
        Some(exp_ms) => now_ms as f64 >= exp_ms,
        None => true,
    }
}

fn token_expiry_ms(id_token: &str) -> Option<f64> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp.map(|exp| exp * 1000.0)
}

/// Explicit authentication context over a key-value store.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    state: AuthState,
}

impl<S: KeyValueStore> Session<S> {
    /// Restore the session from the store.
    ///
    /// A missing or unreadable persisted state starts logged out.
    pub fn restore(store: S) -> Self {
        let state = match store.get(AUTH_STATE_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("discarding unreadable persisted auth state: {}", e);
                AuthState::default()
            }),
            None => AuthState::default(),
        };

        Self { store, state }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current raw ID token, if any.
    pub fn id_token(&self) -> Option<String> {
        self.store.get(ID_TOKEN_KEY)
    }

    /// `Authorization` header value for backend requests.
    pub fn bearer(&self) -> Option<String> {
        self.id_token().map(|token| format!("Bearer {}", token))
    }

    /// Store the token handed over by the identity provider.
    pub fn sign_in(&mut self, id_token: &str) {
        self.store.set(ID_TOKEN_KEY, id_token);
        log::info!("identity token stored");
    }

    /// Start the page-load guard.
    ///
    /// Returns the token to validate against the backend. On error the
    /// session has already been torn down and the host should redirect to
    /// the login page.
    pub fn begin_validation(&mut self, now_ms: u64) -> Result<String, AuthError> {
        self.state.is_loading = true;

        let Some(token) = self.id_token() else {
            return Err(self.fail(AuthError::NoToken));
        };

        if is_token_expired(&token, now_ms) {
            return Err(self.fail(AuthError::TokenExpired));
        }

        Ok(token)
    }

    /// Finish the guard after the backend confirmed the token.
    pub fn complete_validation(&mut self, user: AuthUser, now_ms: u64) -> Result<(), AuthError> {
        let Some(token) = self.id_token() else {
            return Err(self.fail(AuthError::NoToken));
        };

        let tokens = AuthTokens {
            access_token: token.clone(),
            id_token: token,
            refresh_token: None,
            expires_at: now_ms.saturating_add(SESSION_TTL_MS),
        };
        self.login(user, tokens);
        Ok(())
    }

    /// Finish the guard after the backend refused the token.
    pub fn fail_validation(&mut self, reason: impl Into<String>) -> AuthError {
        self.fail(AuthError::Rejected(reason.into()))
    }

    pub fn login(&mut self, user: AuthUser, tokens: AuthTokens) {
        log::info!("signed in as {}", user.email);
        self.state = AuthState {
            user: Some(user),
            tokens: Some(tokens),
            is_authenticated: true,
            is_loading: false,
        };
        self.persist();
    }

    /// Clear the token and all session state.
    pub fn teardown(&mut self) {
        self.store.remove(ID_TOKEN_KEY);
        self.state = AuthState::default();
        self.persist();
        log::info!("session cleared");
    }

    /// Remember the active logo configuration across reloads.
    pub fn remember_config(&mut self, id: i64) {
        self.store.set(CONFIG_ID_KEY, &id.to_string());
    }

    pub fn saved_config_id(&self) -> Option<i64> {
        self.store.get(CONFIG_ID_KEY)?.parse().ok()
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        log::warn!("auth check failed: {}", err);
        self.teardown();
        err
    }

    fn persist(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(raw) => self.store.set(AUTH_STATE_KEY, &raw),
            Err(e) => log::error!("failed to persist auth state: {}", e),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{jwt, user};
    use super::*;

    // 2026-01-01T00:00:00Z
    const EXP_SECS: u64 = 1_767_225_600;
    const BEFORE: u64 = EXP_SECS * 1000 - 1;
    const AT: u64 = EXP_SECS * 1000;

    fn valid_token() -> String {
        jwt(&format!(r#"{{"sub":"u-1","exp":{}}}"#, EXP_SECS))
    }

    #[test]
    fn test_token_not_expired_before_exp() {
        assert!(!is_token_expired(&valid_token(), BEFORE));
    }

    #[test]
    fn test_token_expired_at_exp() {
        assert!(is_token_expired(&valid_token(), AT));
        assert!(is_token_expired(&valid_token(), AT + 1));
    }

    #[test]
    fn test_token_without_exp_is_expired() {
        assert!(is_token_expired(&jwt(r#"{"sub":"u-1"}"#), 0));
    }

    #[test]
    fn test_garbage_token_is_expired() {
        assert!(is_token_expired("not-a-jwt", 0));
        assert!(is_token_expired("a.!!!.c", 0));
        assert!(is_token_expired(&jwt("not json"), 0));
        assert!(is_token_expired("", 0));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let token = valid_token();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        parts[1].push_str("==");
        assert!(!is_token_expired(&parts.join("."), BEFORE));
    }

    #[test]
    fn test_restore_empty_store() {
        let session = Session::restore(MemoryStore::new());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.bearer().is_none());
    }

    #[test]
    fn test_restore_ignores_corrupt_state() {
        let mut store = MemoryStore::new();
        store.set(AUTH_STATE_KEY, "{not json");
        let session = Session::restore(store);
        assert_eq!(session.state(), &AuthState::default());
    }

    #[test]
    fn test_sign_in_sets_bearer() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in("abc.def.ghi");
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc.def.ghi"));
    }

    #[test_log::test]
    fn test_guard_without_token() {
        let mut session = Session::restore(MemoryStore::new());
        assert_eq!(session.begin_validation(0), Err(AuthError::NoToken));
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
    }

    #[test_log::test]
    fn test_guard_with_expired_token_removes_it() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in(&valid_token());

        assert_eq!(session.begin_validation(AT), Err(AuthError::TokenExpired));
        assert!(session.id_token().is_none());
    }

    #[test_log::test]
    fn test_guard_happy_path() {
        let mut session = Session::restore(MemoryStore::new());
        let token = valid_token();
        session.sign_in(&token);

        let checked = session.begin_validation(BEFORE).unwrap();
        assert_eq!(checked, token);
        assert!(session.is_loading());

        session.complete_validation(user(), BEFORE).unwrap();
        assert!(session.is_authenticated());
        assert!(!session.is_loading());
        assert_eq!(session.user(), Some(&user()));

        let tokens = session.state().tokens.as_ref().unwrap();
        assert_eq!(tokens.id_token, token);
        assert_eq!(tokens.access_token, token);
        assert_eq!(tokens.expires_at, BEFORE + SESSION_TTL_MS);
    }

    #[test]
    fn test_expiry_saturates_at_far_future_clock() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in("tok");

        session.complete_validation(user(), u64::MAX).unwrap();
        let tokens = session.state().tokens.as_ref().unwrap();
        assert_eq!(tokens.expires_at, u64::MAX);
    }

    #[test]
    fn test_complete_without_token_fails() {
        let mut session = Session::restore(MemoryStore::new());
        assert_eq!(session.complete_validation(user(), 0), Err(AuthError::NoToken));
        assert!(!session.is_authenticated());
    }

    #[test_log::test]
    fn test_backend_rejection_tears_down() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in(&valid_token());
        session.begin_validation(BEFORE).unwrap();

        let err = session.fail_validation("Request failed");
        assert_eq!(err, AuthError::Rejected("Request failed".to_string()));
        assert!(session.id_token().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_state_survives_restore() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in(&valid_token());
        session.begin_validation(BEFORE).unwrap();
        session.complete_validation(user(), BEFORE).unwrap();

        let store = session.store().clone();
        let restored = Session::restore(store);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user(), Some(&user()));
        assert!(!restored.is_loading());
    }

    #[test]
    fn test_persisted_state_omits_loading_flag() {
        let mut session = Session::restore(MemoryStore::new());
        session.login(
            user(),
            AuthTokens {
                access_token: "t".to_string(),
                id_token: "t".to_string(),
                refresh_token: None,
                expires_at: 5,
            },
        );

        let raw = session.store().get(AUTH_STATE_KEY).unwrap();
        assert!(raw.contains(r#""isAuthenticated":true"#));
        assert!(raw.contains(r#""userId":"u-1""#));
        assert!(!raw.contains("isLoading"));
    }

    #[test]
    fn test_teardown_keeps_config_id() {
        let mut session = Session::restore(MemoryStore::new());
        session.sign_in("tok");
        session.remember_config(42);

        session.teardown();
        assert!(session.id_token().is_none());
        assert_eq!(session.saved_config_id(), Some(42));
    }

    #[test]
    fn test_saved_config_id_ignores_garbage() {
        let mut store = MemoryStore::new();
        store.set(CONFIG_ID_KEY, "abc");
        let session = Session::restore(store);
        assert_eq!(session.saved_config_id(), None);
    }
}
