//! Backend request bindings.
//!
//! The host sends each [`JsApiRequest`] with `fetch` and passes the status and
//! body bytes back to one of the `receive*` methods.

use imagecropper_core::api::{ApiClient, ApiResponse};
use imagecropper_core::auth::AuthUser;
use imagecropper_core::overlay::{
    LogoConfig, LogoConfigUpdate, LogoPosition, MyConfigUpdate, NewLogoConfig, ScaleDown,
};
use imagecropper_core::settings::ApiSettings;
use wasm_bindgen::prelude::*;

use crate::session::JsSession;
use crate::types::JsApiRequest;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Request builder for one backend.
#[wasm_bindgen]
pub struct JsApiClient {
    inner: ApiClient,
}

#[wasm_bindgen]
impl JsApiClient {
    /// Create a client from a settings object
    /// (`{api_base_url?, request_timeout_ms?, max_upload_bytes?, google_client_id?}`).
    /// Pass `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<JsApiClient, JsValue> {
        let settings: ApiSettings = if settings.is_undefined() || settings.is_null() {
            ApiSettings::default()
        } else {
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?
        };
        Self::from_settings(settings).map_err(to_js_error)
    }

    /// Create a client from a bundled TOML settings file.
    pub fn from_toml(source: &str) -> Result<JsApiClient, JsValue> {
        let settings = ApiSettings::from_toml_str(source).map_err(to_js_error)?;
        Self::from_settings(settings).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.settings().max_upload_bytes
    }

    #[wasm_bindgen(getter)]
    pub fn google_client_id(&self) -> Option<String> {
        self.inner.settings().google_client_id.clone()
    }

    /// `GET /api/auth/me`
    pub fn current_user(&self, session: &JsSession) -> JsApiRequest {
        JsApiRequest::from_request(self.inner.current_user(session.session()))
    }

    /// `POST /auth/google` for a token fresh from the identity provider.
    pub fn google_sign_in(&self, id_token: &str) -> JsApiRequest {
        JsApiRequest::from_request(self.inner.google_sign_in(id_token))
    }

    /// `POST /api/config`
    ///
    /// # Arguments
    /// * `scale_down` - Logo size as a fraction, 0.01 to 0.25
    /// * `position` - `TOP_LEFT`, `TOP_RIGHT`, `BOTTOM_LEFT`, `BOTTOM_RIGHT` or `CENTER`
    /// * `logo` - PNG bytes; required
    pub fn create_config(
        &self,
        session: &JsSession,
        scale_down: f64,
        position: &str,
        logo: Option<Vec<u8>>,
    ) -> Result<JsApiRequest, JsValue> {
        let input = NewLogoConfig {
            scale_down: ScaleDown::new(scale_down).map_err(to_js_error)?,
            logo_position: position.parse::<LogoPosition>().map_err(to_js_error)?,
            logo_png: logo,
        };
        self.inner
            .create_config(session.session(), &input)
            .map(JsApiRequest::from_request)
            .map_err(to_js_error)
    }

    /// `GET /api/config/{id}`
    pub fn get_config(&self, session: &JsSession, id: f64) -> JsApiRequest {
        JsApiRequest::from_request(self.inner.get_config(session.session(), id as i64))
    }

    /// `PUT /api/config/{id}`; omitted arguments are left unchanged.
    /// Throws "Nothing to update" when every argument is omitted.
    pub fn update_config(
        &self,
        session: &JsSession,
        id: f64,
        scale_down: Option<f64>,
        position: Option<String>,
        logo: Option<Vec<u8>>,
    ) -> Result<JsApiRequest, JsValue> {
        let update = LogoConfigUpdate {
            scale_down: scale_down.map(ScaleDown::new).transpose().map_err(to_js_error)?,
            logo_position: position
                .as_deref()
                .map(str::parse::<LogoPosition>)
                .transpose()
                .map_err(to_js_error)?,
            logo_png: logo,
        };
        self.inner
            .update_config(session.session(), id as i64, &update)
            .map(JsApiRequest::from_request)
            .map_err(to_js_error)
    }

    /// `GET /api/config/me`
    pub fn my_config(&self, session: &JsSession) -> JsApiRequest {
        JsApiRequest::from_request(self.inner.my_config(session.session()))
    }

    /// `PUT /api/config/me` without a new logo.
    pub fn update_my_config(
        &self,
        session: &JsSession,
        scale_down: f64,
        position: &str,
    ) -> Result<JsApiRequest, JsValue> {
        let update = MyConfigUpdate {
            scale_down: ScaleDown::new(scale_down).map_err(to_js_error)?,
            logo_position: position.parse().map_err(to_js_error)?,
        };
        self.inner
            .update_my_config(session.session(), &update)
            .map(JsApiRequest::from_request)
            .map_err(to_js_error)
    }

    /// Check a response and return its body (e.g. PNG bytes).
    ///
    /// Throws the backend's message on failure. A 401 also clears the session;
    /// the host should then redirect to the login page.
    pub fn receive(
        &self,
        session: &mut JsSession,
        status: u16,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, JsValue> {
        self.inner
            .receive(session.session_mut(), ApiResponse::new(status, body))
            .map_err(to_js_error)
    }

    /// Check a `/api/auth/me` response and return `{userId, email}`.
    pub fn receive_user(
        &self,
        session: &mut JsSession,
        status: u16,
        body: Vec<u8>,
    ) -> Result<JsValue, JsValue> {
        let user: AuthUser = self
            .inner
            .receive_json(session.session_mut(), ApiResponse::new(status, body))
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&user).map_err(to_js_error)
    }

    /// Check a config response and return `{id, scaleDown, logoPosition, logoPath?}`.
    pub fn receive_config(
        &self,
        session: &mut JsSession,
        status: u16,
        body: Vec<u8>,
    ) -> Result<JsValue, JsValue> {
        let config: LogoConfig = self
            .inner
            .receive_json(session.session_mut(), ApiResponse::new(status, body))
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&config).map_err(to_js_error)
    }
}

impl JsApiClient {
    pub(crate) fn from_settings(
        settings: ApiSettings,
    ) -> Result<Self, imagecropper_core::settings::ConfigError> {
        Ok(Self {
            inner: ApiClient::new(&settings)?,
        })
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> JsApiClient {
        JsApiClient::from_settings(ApiSettings::default()).unwrap()
    }

    #[test]
    fn test_from_settings_validates() {
        let settings = ApiSettings {
            api_base_url: "localhost".to_string(),
            ..ApiSettings::default()
        };
        assert!(JsApiClient::from_settings(settings).is_err());
    }

    #[test]
    fn test_settings_getters() {
        let c = client();
        assert_eq!(c.max_upload_bytes(), 20 * 1024 * 1024);
        assert!(c.google_client_id().is_none());
    }

    #[test]
    fn test_current_user_request() {
        let mut session = JsSession::in_memory();
        session.sign_in("tok");

        let req = client().current_user(&session);
        assert_eq!(req.method(), "GET");
        assert_eq!(req.url(), "http://localhost:5000/api/auth/me");
        assert_eq!(req.header("Authorization").as_deref(), Some("Bearer tok"));
    }

    #[test]
    fn test_create_config_request() {
        let session = JsSession::in_memory();
        let req = client()
            .create_config(&session, 0.1, "CENTER", Some(vec![1, 2, 3]))
            .unwrap();

        assert_eq!(req.url(), "http://localhost:5000/api/config");
        assert_eq!(req.part_text(0).as_deref(), Some("0.1"));
        assert_eq!(req.part_text(1).as_deref(), Some("CENTER"));
        assert_eq!(req.part_bytes(2), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_update_config_skips_missing_fields() {
        let session = JsSession::in_memory();
        let req = client()
            .update_config(&session, 8.0, Some(0.05), None, None)
            .unwrap();

        assert_eq!(req.method(), "PUT");
        assert_eq!(req.url(), "http://localhost:5000/api/config/8");
        assert_eq!(req.part_count(), 1);
        assert_eq!(req.part_name(0).as_deref(), Some("scaleDown"));
    }

    #[test]
    fn test_update_config_rejects_empty_update() {
        let session = JsSession::in_memory();
        assert!(client().update_config(&session, 8.0, None, None, None).is_err());
    }

    #[test]
    fn test_receive_success() {
        let mut session = JsSession::in_memory();
        let body = client().receive(&mut session, 200, vec![9, 9]).unwrap();
        assert_eq!(body, vec![9, 9]);
    }
}
