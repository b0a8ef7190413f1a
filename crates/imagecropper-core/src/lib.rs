//! ImageCropper Core - crop client library
//!
//! This crate holds the logic of the ImageCropper browser client: mapping a
//! crop drawn on a scaled on-screen image back onto the original pixels,
//! PNG intake, logo overlay settings, the authentication session, and the
//! shape of every backend request. It does no rendering and no network I/O.

pub mod api;
pub mod auth;
pub mod mapping;
pub mod overlay;
pub mod selection;
pub mod settings;
pub mod upload;
pub mod workflow;

pub use api::{ApiClient, ApiError, ApiRequest, ApiResponse};
pub use auth::{AuthError, AuthUser, KeyValueStore, MemoryStore, Session};
pub use mapping::{to_natural_crop, CropRect, Dimensions, PixelRect};
pub use overlay::{LogoConfig, LogoPosition, ScaleDown};
pub use selection::{CropUnit, WidgetCrop};
pub use settings::ApiSettings;
pub use upload::{SourceImage, UploadError};
pub use workflow::{CropWorkspace, WorkflowError};
