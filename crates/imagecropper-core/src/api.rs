//! Backend request shaping.
//!
//! The client never talks to the network itself. Each endpoint builder
//! returns a fully described [`ApiRequest`] that the host executes with its
//! own HTTP stack, and [`ApiClient::receive`] interprets the response the host
//! hands back. Together they play the part of request and response
//! interceptors: the bearer token is attached from the [`Session`] on the way
//! out, and a 401 tears the session down on the way back.
//!
//! # Endpoints
//!
//! | Builder | Method | Path |
//! |---|---|---|
//! | [`ApiClient::current_user`] | GET | `/api/auth/me` |
//! | [`ApiClient::google_sign_in`] | POST | `/auth/google` |
//! | [`ApiClient::create_config`] | POST | `/api/config` |
//! | [`ApiClient::get_config`] | GET | `/api/config/{id}` |
//! | [`ApiClient::update_config`] | PUT | `/api/config/{id}` |
//! | [`ApiClient::my_config`] | GET | `/api/config/me` |
//! | [`ApiClient::update_my_config`] | PUT | `/api/config/me` |
//! | [`ApiClient::preview`] | POST | `/api/image/preview` |
//! | [`ApiClient::generate`] | POST | `/api/image/generate` |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{KeyValueStore, Session};
use crate::mapping::PixelRect;
use crate::overlay::{LogoConfigUpdate, MyConfigUpdate, NewLogoConfig, OverlayError};
use crate::settings::{ApiSettings, ConfigError};
use crate::upload::{SourceImage, PNG_MIME};

const JSON_MIME: &str = "application/json";
const LOGO_FILE_NAME: &str = "logo.png";

/// Error types for backend calls.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    /// The backend answered 401. The session has been cleared.
    #[error("{0}")]
    Unauthorized(String),

    /// Any other non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A request body could not be encoded.
    #[error("Could not encode request: {0}")]
    Encode(String),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// What the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Json,
    Png,
}

/// Content of one multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    /// JSON text sent as an `application/json` blob.
    Json(String),
    /// PNG file contents.
    PngFile { file_name: String, bytes: Vec<u8> },
}

impl PartValue {
    /// MIME type of blob parts; `None` for plain text fields.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            PartValue::Text(_) => None,
            PartValue::Json(_) => Some(JSON_MIME),
            PartValue::PngFile { .. } => Some(PNG_MIME),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::Text(value.into()),
        }
    }

    fn json(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::Json(value),
        }
    }

    fn png(name: &str, file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::PngFile {
                file_name: file_name.to_string(),
                bytes,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(Vec<FormPart>),
}

/// A request ready for the host to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    pub accept: ResponseKind,
    pub timeout_ms: u32,
}

impl ApiRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a multipart field by name.
    pub fn part(&self, name: &str) -> Option<&PartValue> {
        match &self.body {
            RequestBody::Multipart(parts) => parts.iter().find(|p| p.name == name).map(|p| &p.value),
            _ => None,
        }
    }
}

/// What the host got back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `meta` part of the image endpoints.
#[derive(Debug, Serialize)]
struct CropMeta {
    crop: PixelRect,
    #[serde(rename = "configId", skip_serializing_if = "Option::is_none")]
    config_id: Option<i64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Builds requests against one backend.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    settings: ApiSettings,
}

impl ApiClient {
    /// Create a client for validated settings.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`ApiSettings::validated`].
    pub fn new(settings: &ApiSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            settings: settings.clone().validated()?,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// `GET /api/auth/me`: validates the token and returns the user.
    pub fn current_user<S: KeyValueStore>(&self, session: &Session<S>) -> ApiRequest {
        self.build(session, Method::Get, "/api/auth/me", RequestBody::Empty, ResponseKind::Json)
    }

    /// `POST /auth/google`: registers a fresh identity-provider token.
    ///
    /// Sent before the token is stored, so it is attached explicitly rather
    /// than taken from the session.
    pub fn google_sign_in(&self, id_token: &str) -> ApiRequest {
        ApiRequest {
            method: Method::Post,
            url: self.settings.url("/auth/google"),
            headers: vec![
                ("Content-Type".to_string(), JSON_MIME.to_string()),
                ("Authorization".to_string(), format!("Bearer {}", id_token)),
            ],
            body: RequestBody::Empty,
            accept: ResponseKind::Json,
            timeout_ms: self.settings.request_timeout_ms,
        }
    }

    /// `POST /api/config`: saves a new logo configuration.
    ///
    /// # Errors
    ///
    /// `OverlayError::MissingLogo` if no logo was picked.
    pub fn create_config<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        input: &NewLogoConfig,
    ) -> Result<ApiRequest, ApiError> {
        input.validate()?;

        let mut parts = vec![
            FormPart::text("scaleDownPercent", input.scale_down.get().to_string()),
            FormPart::text("logoPosition", input.logo_position.as_str()),
        ];
        if let Some(logo) = &input.logo_png {
            parts.push(FormPart::png("logoImage", LOGO_FILE_NAME, logo.clone()));
        }

        Ok(self.build(
            session,
            Method::Post,
            "/api/config",
            RequestBody::Multipart(parts),
            ResponseKind::Json,
        ))
    }

    /// `GET /api/config/{id}`
    pub fn get_config<S: KeyValueStore>(&self, session: &Session<S>, id: i64) -> ApiRequest {
        let path = format!("/api/config/{}", id);
        self.build(session, Method::Get, &path, RequestBody::Empty, ResponseKind::Json)
    }

    /// `PUT /api/config/{id}`: changes only the fields that are set.
    ///
    /// # Errors
    ///
    /// `OverlayError::EmptyUpdate` if no field is set.
    pub fn update_config<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        id: i64,
        update: &LogoConfigUpdate,
    ) -> Result<ApiRequest, ApiError> {
        update.validate()?;

        let mut parts = Vec::new();
        if let Some(scale) = update.scale_down {
            parts.push(FormPart::text("scaleDown", scale.get().to_string()));
        }
        if let Some(position) = update.logo_position {
            parts.push(FormPart::text("logoPosition", position.as_str()));
        }
        if let Some(logo) = &update.logo_png {
            parts.push(FormPart::png("logoImage", LOGO_FILE_NAME, logo.clone()));
        }

        let path = format!("/api/config/{}", id);
        Ok(self.build(session, Method::Put, &path, RequestBody::Multipart(parts), ResponseKind::Json))
    }

    /// `GET /api/config/me`
    pub fn my_config<S: KeyValueStore>(&self, session: &Session<S>) -> ApiRequest {
        self.build(session, Method::Get, "/api/config/me", RequestBody::Empty, ResponseKind::Json)
    }

    /// `PUT /api/config/me` with a JSON body (keeps the current logo).
    pub fn update_my_config<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        update: &MyConfigUpdate,
    ) -> Result<ApiRequest, ApiError> {
        let body = serde_json::to_string(update).map_err(|e| ApiError::Encode(e.to_string()))?;
        let mut request = self.build(
            session,
            Method::Put,
            "/api/config/me",
            RequestBody::Json(body),
            ResponseKind::Json,
        );
        request
            .headers
            .push(("Content-Type".to_string(), JSON_MIME.to_string()));
        Ok(request)
    }

    /// `POST /api/image/preview`: reduced-quality PNG of the cropped region.
    pub fn preview<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        source: &SourceImage,
        crop: PixelRect,
    ) -> Result<ApiRequest, ApiError> {
        self.image_request(session, "/api/image/preview", source, crop, None)
    }

    /// `POST /api/image/generate`: full-quality PNG, logo overlay applied by
    /// the backend from the saved configuration.
    pub fn generate<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        source: &SourceImage,
        crop: PixelRect,
        config_id: Option<i64>,
    ) -> Result<ApiRequest, ApiError> {
        self.image_request(session, "/api/image/generate", source, crop, config_id)
    }

    /// Interpret a response and return its body.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthorized` on 401, after tearing the session down
    /// - `ApiError::Status` on any other non-2xx status, carrying the body's
    ///   `message` field when there is one
    pub fn receive<S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
        response: ApiResponse,
    ) -> Result<Vec<u8>, ApiError> {
        if response.is_success() {
            return Ok(response.body);
        }

        let message = error_message(&response);
        if response.status == 401 {
            log::warn!("backend rejected credentials, clearing session");
            session.teardown();
            return Err(ApiError::Unauthorized(message));
        }

        log::warn!("request failed with status {}: {}", response.status, message);
        Err(ApiError::Status {
            status: response.status,
            message,
        })
    }

    /// Interpret a response and decode its JSON body.
    pub fn receive_json<T: DeserializeOwned, S: KeyValueStore>(
        &self,
        session: &mut Session<S>,
        response: ApiResponse,
    ) -> Result<T, ApiError> {
        let body = self.receive(session, response)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn image_request<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        path: &str,
        source: &SourceImage,
        crop: PixelRect,
        config_id: Option<i64>,
    ) -> Result<ApiRequest, ApiError> {
        let meta = serde_json::to_string(&CropMeta { crop, config_id })
            .map_err(|e| ApiError::Encode(e.to_string()))?;

        log::debug!("{} with crop {}", path, crop);

        let parts = vec![
            FormPart::png("file", &source.file_name, source.bytes.clone()),
            FormPart::json("meta", meta),
        ];
        Ok(self.build(session, Method::Post, path, RequestBody::Multipart(parts), ResponseKind::Png))
    }

    fn build<S: KeyValueStore>(
        &self,
        session: &Session<S>,
        method: Method,
        path: &str,
        body: RequestBody,
        accept: ResponseKind,
    ) -> ApiRequest {
        let mut headers = Vec::new();
        if let Some(bearer) = session.bearer() {
            headers.push(("Authorization".to_string(), bearer));
        }

        ApiRequest {
            method,
            url: self.settings.url(path),
            headers,
            body,
            accept,
            timeout_ms: self.settings.request_timeout_ms,
        }
    }
}

fn error_message(response: &ApiResponse) -> String {
    serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", response.status))
}
