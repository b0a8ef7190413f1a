//! The crop page: upload, select, preview, generate.
//!
//! [`CropWorkspace`] keeps what the page accumulates between user actions and
//! enforces the one boundary rule of the client: a selection that maps to a
//! natural rectangle with no area must never reach the backend. Preview and
//! generate requests are only produced once that check has passed.

use thiserror::Error;

use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::auth::{KeyValueStore, Session};
use crate::mapping::{to_natural_crop, CropFractions, CropRect, Dimensions, PixelRect};
use crate::selection::WidgetCrop;
use crate::upload::SourceImage;

/// Reasons a preview or generate action is refused.
#[derive(Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Upload PNG first")]
    NoImage,

    /// Rendered dimensions were read before the image element was laid out.
    #[error("Image is not displayed yet")]
    NotLaidOut,

    #[error("Select a crop area")]
    NoSelection,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// State of one crop session on the page.
#[derive(Debug, Default)]
pub struct CropWorkspace {
    source: Option<SourceImage>,
    display_crop: CropRect,
    config_id: Option<i64>,
    preview_png: Option<Vec<u8>>,
    generated_png: Option<Vec<u8>>,
}

impl CropWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the configuration id remembered in the session, if any.
    pub fn restore<S: KeyValueStore>(session: &Session<S>) -> Self {
        Self {
            config_id: session.saved_config_id(),
            ..Self::default()
        }
    }

    /// Take a newly picked image. Any earlier preview no longer applies.
    pub fn pick(&mut self, source: SourceImage) {
        log::info!(
            "picked {} ({}x{})",
            source.file_name,
            source.natural.width,
            source.natural.height
        );
        self.source = Some(source);
        self.preview_png = None;
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn natural(&self) -> Option<Dimensions> {
        self.source.as_ref().map(|s| s.natural)
    }

    /// Record the latest selection in display pixels.
    pub fn set_display_crop(&mut self, rect: CropRect) {
        self.display_crop = rect;
    }

    /// Record the latest widget output, converting percent selections
    /// against the rendered dimensions read alongside it.
    pub fn set_widget_crop(&mut self, crop: &WidgetCrop, rendered: Dimensions) {
        self.display_crop = crop.to_display_rect(rendered);
    }

    pub fn display_crop(&self) -> CropRect {
        self.display_crop
    }

    /// Save the active logo configuration id, in the workspace and the session.
    pub fn set_config_id<S: KeyValueStore>(&mut self, session: &mut Session<S>, id: i64) {
        session.remember_config(id);
        self.config_id = Some(id);
    }

    pub fn config_id(&self) -> Option<i64> {
        self.config_id
    }

    /// Map the current selection onto the natural image and check it.
    ///
    /// `rendered` must be read from the image element right now, after it
    /// has loaded and been laid out.
    pub fn natural_crop(&self, rendered: Dimensions) -> Result<PixelRect, WorkflowError> {
        let natural = self.natural().ok_or(WorkflowError::NoImage)?;

        if !rendered.has_area() {
            log::warn!(
                "refusing to map crop: rendered size {}x{} has no area",
                rendered.width,
                rendered.height
            );
            return Err(WorkflowError::NotLaidOut);
        }

        let mapped = to_natural_crop(&self.display_crop, natural, rendered);
        if !mapped.is_selection() {
            log::warn!("refusing to submit empty selection {}", mapped);
            return Err(WorkflowError::NoSelection);
        }

        Ok(mapped)
    }

    /// The checked selection as fractions of the natural image, for display.
    pub fn crop_fractions(&self, rendered: Dimensions) -> Result<CropFractions, WorkflowError> {
        let natural = self.natural().ok_or(WorkflowError::NoImage)?;
        Ok(self.natural_crop(rendered)?.fractions_of(natural))
    }

    /// Build the preview request for the current selection.
    pub fn prepare_preview<S: KeyValueStore>(
        &self,
        client: &ApiClient,
        session: &Session<S>,
        rendered: Dimensions,
    ) -> Result<ApiRequest, WorkflowError> {
        let crop = self.natural_crop(rendered)?;
        let source = self.source.as_ref().ok_or(WorkflowError::NoImage)?;
        Ok(client.preview(session, source, crop)?)
    }

    /// Build the full-quality generate request for the current selection.
    pub fn prepare_generate<S: KeyValueStore>(
        &self,
        client: &ApiClient,
        session: &Session<S>,
        rendered: Dimensions,
    ) -> Result<ApiRequest, WorkflowError> {
        let crop = self.natural_crop(rendered)?;
        let source = self.source.as_ref().ok_or(WorkflowError::NoImage)?;
        Ok(client.generate(session, source, crop, self.config_id)?)
    }

    pub fn accept_preview(&mut self, png: Vec<u8>) {
        self.preview_png = Some(png);
    }

    pub fn accept_generated(&mut self, png: Vec<u8>) {
        self.generated_png = Some(png);
    }

    pub fn preview_png(&self) -> Option<&[u8]> {
        self.preview_png.as_deref()
    }

    pub fn generated_png(&self) -> Option<&[u8]> {
        self.generated_png.as_deref()
    }
}
