//! Crop page bindings.
//!
//! # Example
//!
//! ```typescript
//! const workspace = new JsCropWorkspace(session);
//! workspace.pick(new JsSourceImage(bytes, file.type, file.name, client.max_upload_bytes));
//!
//! // on every widget change
//! workspace.set_widget_crop(percentCrop, img.clientWidth, img.clientHeight);
//!
//! // on "Preview"
//! try {
//!   const req = workspace.prepare_preview(client, session, img.clientWidth, img.clientHeight);
//!   const res = await send(req);
//!   workspace.accept_preview(client.receive(session, res.status, res.body));
//! } catch (e) {
//!   alert(e); // "Upload PNG first", "Select a crop area", or the backend's message
//! }
//! ```

use imagecropper_core::mapping::{CropRect, Dimensions};
use imagecropper_core::selection::WidgetCrop;
use imagecropper_core::workflow::CropWorkspace;
use wasm_bindgen::prelude::*;

use crate::api::JsApiClient;
use crate::session::JsSession;
use crate::types::{JsApiRequest, JsSourceImage};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// State of the crop page.
#[wasm_bindgen]
pub struct JsCropWorkspace {
    inner: CropWorkspace,
}

#[wasm_bindgen]
impl JsCropWorkspace {
    /// Create a workspace, picking up the logo config id saved in the session.
    #[wasm_bindgen(constructor)]
    pub fn new(session: &JsSession) -> JsCropWorkspace {
        Self {
            inner: CropWorkspace::restore(session.session()),
        }
    }

    /// Take a newly picked image. Clears the previous preview.
    pub fn pick(&mut self, image: JsSourceImage) {
        self.inner.pick(image.into_source());
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.source().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn natural_width(&self) -> Option<f64> {
        self.inner.natural().map(|d| d.width)
    }

    #[wasm_bindgen(getter)]
    pub fn natural_height(&self) -> Option<f64> {
        self.inner.natural().map(|d| d.height)
    }

    /// Record a selection given as `{x, y, width, height}` display pixels.
    pub fn set_display_crop(&mut self, rect: JsValue) -> Result<(), JsValue> {
        let rect: CropRect = serde_wasm_bindgen::from_value(rect)
            .map_err(|e| JsValue::from_str(&format!("Invalid crop rectangle: {}", e)))?;
        self.inner.set_display_crop(rect);
        Ok(())
    }

    /// Record raw widget output (`{unit, x?, y?, width?, height?}`).
    pub fn set_widget_crop(
        &mut self,
        widget: JsValue,
        rendered_width: f64,
        rendered_height: f64,
    ) -> Result<(), JsValue> {
        let widget: WidgetCrop = serde_wasm_bindgen::from_value(widget)
            .map_err(|e| JsValue::from_str(&format!("Invalid widget crop: {}", e)))?;
        self.inner
            .set_widget_crop(&widget, Dimensions::new(rendered_width, rendered_height));
        Ok(())
    }

    /// Human-readable summary of the current display selection.
    pub fn display_summary(&self) -> String {
        let r = self.inner.display_crop();
        format!("{:.0}×{:.0} @ {:.0},{:.0}", r.width, r.height, r.x, r.y)
    }

    /// Activate a saved logo configuration and remember it across reloads.
    pub fn set_config_id(&mut self, session: &mut JsSession, id: f64) {
        self.inner.set_config_id(session.session_mut(), id as i64);
    }

    #[wasm_bindgen(getter)]
    pub fn config_id(&self) -> Option<f64> {
        self.inner.config_id().map(|id| id as f64)
    }

    /// The current selection in natural pixels, `{x, y, width, height}`.
    ///
    /// Throws "Upload PNG first" or "Select a crop area".
    pub fn natural_crop(&self, rendered_width: f64, rendered_height: f64) -> Result<JsValue, JsValue> {
        let crop = self
            .inner
            .natural_crop(Dimensions::new(rendered_width, rendered_height))
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&crop).map_err(to_js_error)
    }

    /// Build the preview request. Throws instead of producing a request when
    /// there is no image or no selection.
    pub fn prepare_preview(
        &self,
        client: &JsApiClient,
        session: &JsSession,
        rendered_width: f64,
        rendered_height: f64,
    ) -> Result<JsApiRequest, JsValue> {
        self.inner
            .prepare_preview(
                client.client(),
                session.session(),
                Dimensions::new(rendered_width, rendered_height),
            )
            .map(JsApiRequest::from_request)
            .map_err(to_js_error)
    }

    /// Build the full-quality generate request, with the active config id.
    pub fn prepare_generate(
        &self,
        client: &JsApiClient,
        session: &JsSession,
        rendered_width: f64,
        rendered_height: f64,
    ) -> Result<JsApiRequest, JsValue> {
        self.inner
            .prepare_generate(
                client.client(),
                session.session(),
                Dimensions::new(rendered_width, rendered_height),
            )
            .map(JsApiRequest::from_request)
            .map_err(to_js_error)
    }

    pub fn accept_preview(&mut self, png: Vec<u8>) {
        self.inner.accept_preview(png);
    }

    pub fn accept_generated(&mut self, png: Vec<u8>) {
        self.inner.accept_generated(png);
    }

    pub fn preview_png(&self) -> Option<Vec<u8>> {
        self.inner.preview_png().map(<[u8]>::to_vec)
    }

    pub fn generated_png(&self) -> Option<Vec<u8>> {
        self.inner.generated_png().map(<[u8]>::to_vec)
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_prepare_preview_without_image_throws() {
        let session = JsSession::in_memory();
        let client = JsApiClient::new(JsValue::UNDEFINED).unwrap();
        let ws = JsCropWorkspace::new(&session);

        let err = ws.prepare_preview(&client, &session, 100.0, 100.0).unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("Upload PNG first"));
    }

    #[wasm_bindgen_test]
    fn test_natural_crop_without_selection_throws() {
        let session = JsSession::in_memory();
        let mut ws = JsCropWorkspace::new(&session);
        ws.pick(crate::types::JsSourceImage::new(
            crate::types::test_support::png_bytes(10, 10),
            Some("image/png".to_string()),
            "a.png".to_string(),
            1024 * 1024,
        )
        .unwrap());

        let err = ws.natural_crop(10.0, 10.0).unwrap_err();
        assert_eq!(err.as_string().as_deref(), Some("Select a crop area"));
    }
}
