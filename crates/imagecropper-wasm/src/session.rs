//! Session bindings backed by browser local storage.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsSession();
//! try {
//!   session.begin_validation(now_ms());
//!   const res = await send(client.current_user(session));
//!   session.complete_validation(client.receive_user(session, res.status, res.body), now_ms());
//! } catch (e) {
//!   window.location.href = '/login';
//! }
//! ```

use imagecropper_core::auth::{self, AuthUser, KeyValueStore, MemoryStore, Session};
use wasm_bindgen::prelude::*;

/// Local storage when the browser provides it, memory otherwise (e.g.
/// storage disabled by privacy settings).
pub enum BrowserStore {
    Local(web_sys::Storage),
    Memory(MemoryStore),
}

impl BrowserStore {
    pub fn local_or_memory() -> Self {
        match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(Some(storage))) => BrowserStore::Local(storage),
            _ => {
                log::warn!("local storage unavailable, session will not survive reloads");
                BrowserStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStore::Local(storage) => storage.get_item(key).ok().flatten(),
            BrowserStore::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match self {
            BrowserStore::Local(storage) => {
                if let Err(e) = storage.set_item(key, value) {
                    log::warn!("failed to write {} to local storage: {:?}", key, e);
                }
            }
            BrowserStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match self {
            BrowserStore::Local(storage) => {
                if let Err(e) = storage.remove_item(key) {
                    log::warn!("failed to remove {} from local storage: {:?}", key, e);
                }
            }
            BrowserStore::Memory(store) => store.remove(key),
        }
    }
}

/// Authentication session for JavaScript.
#[wasm_bindgen]
pub struct JsSession {
    inner: Session<BrowserStore>,
}

#[wasm_bindgen]
impl JsSession {
    /// Restore the session from local storage.
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsSession {
        Self {
            inner: Session::restore(BrowserStore::local_or_memory()),
        }
    }

    /// A session that is never persisted.
    pub fn in_memory() -> JsSession {
        Self {
            inner: Session::restore(BrowserStore::Memory(MemoryStore::new())),
        }
    }

    /// Store the ID token from the identity provider callback.
    pub fn sign_in(&mut self, id_token: &str) {
        self.inner.sign_in(id_token);
    }

    #[wasm_bindgen(getter)]
    pub fn id_token(&self) -> Option<String> {
        self.inner.id_token()
    }

    #[wasm_bindgen(getter)]
    pub fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    #[wasm_bindgen(getter)]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen(getter)]
    pub fn user_email(&self) -> Option<String> {
        self.inner.user().map(|u| u.email.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn user_id(&self) -> Option<String> {
        self.inner.user().map(|u| u.user_id.clone())
    }

    /// Start the page-load auth check.
    ///
    /// Returns the token to validate with `GET /api/auth/me`. Throws "No token
    /// found" or "Token expired" after clearing the session.
    pub fn begin_validation(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.inner
            .begin_validation(now_ms as u64)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Finish the auth check with the `{userId, email}` the backend returned.
    pub fn complete_validation(&mut self, user: JsValue, now_ms: f64) -> Result<(), JsValue> {
        let user: AuthUser = serde_wasm_bindgen::from_value(user)
            .map_err(|e| JsValue::from_str(&format!("Invalid user: {}", e)))?;
        self.complete_with(user, now_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Finish the auth check after the backend refused the token. Returns the
    /// message to log before redirecting to the login page.
    pub fn fail_validation(&mut self, reason: &str) -> String {
        self.inner.fail_validation(reason).to_string()
    }

    /// Sign out and clear the stored token.
    pub fn logout(&mut self) {
        self.inner.teardown();
    }

    #[wasm_bindgen(getter)]
    pub fn saved_config_id(&self) -> Option<f64> {
        self.inner.saved_config_id().map(|id| id as f64)
    }
}

impl Default for JsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl JsSession {
    pub(crate) fn session(&self) -> &Session<BrowserStore> {
        &self.inner
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session<BrowserStore> {
        &mut self.inner
    }

    fn complete_with(&mut self, user: AuthUser, now_ms: f64) -> Result<(), auth::AuthError> {
        self.inner.complete_validation(user, now_ms as u64)
    }
}

/// Check whether a JWT's `exp` claim has passed.
#[wasm_bindgen]
pub fn is_token_expired(id_token: &str, now_ms: f64) -> bool {
    auth::is_token_expired(id_token, now_ms as u64)
}

/// Current time in milliseconds since the epoch (`Date.now()`).
#[wasm_bindgen]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
