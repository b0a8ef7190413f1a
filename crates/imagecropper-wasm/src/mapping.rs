//! WASM bindings for crop coordinate mapping.
//!
//! Rectangles cross the boundary as plain `{x, y, width, height}` objects via
//! serde_wasm_bindgen, so they can be passed straight from the crop widget.

use imagecropper_core::mapping::{self, CropRect, Dimensions, PixelRect};
use imagecropper_core::selection::WidgetCrop;
use wasm_bindgen::prelude::*;

/// Map a display-space crop onto the natural image.
///
/// # Arguments
///
/// * `display` - `{x, y, width, height}` in rendered-element pixels
/// * `natural_width`, `natural_height` - `img.naturalWidth/Height`
/// * `rendered_width`, `rendered_height` - `img.clientWidth/Height`, read now
///
/// # Returns
///
/// `{x, y, width, height}` in whole natural pixels. Zero rendered dimensions
/// are clamped to 1 rather than rejected.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const img = document.querySelector('img[alt="source"]')!;
/// const natural = to_natural_crop(crop, img.naturalWidth, img.naturalHeight,
///                                 img.clientWidth, img.clientHeight);
/// ```
#[wasm_bindgen]
pub fn to_natural_crop(
    display: JsValue,
    natural_width: f64,
    natural_height: f64,
    rendered_width: f64,
    rendered_height: f64,
) -> Result<JsValue, JsValue> {
    let display: CropRect = serde_wasm_bindgen::from_value(display)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop rectangle: {}", e)))?;

    let mapped = mapping::to_natural_crop(
        &display,
        Dimensions::new(natural_width, natural_height),
        Dimensions::new(rendered_width, rendered_height),
    );
    serde_wasm_bindgen::to_value(&mapped).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a crop widget selection (`{unit: 'px' | '%', x?, y?, width?, height?}`)
/// to display pixels.
#[wasm_bindgen]
pub fn widget_crop_to_display(
    widget: JsValue,
    rendered_width: f64,
    rendered_height: f64,
) -> Result<JsValue, JsValue> {
    let widget: WidgetCrop = serde_wasm_bindgen::from_value(widget)
        .map_err(|e| JsValue::from_str(&format!("Invalid widget crop: {}", e)))?;

    let rect = widget.to_display_rect(Dimensions::new(rendered_width, rendered_height));
    serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Express a natural-space crop as fractions of the natural image.
#[wasm_bindgen]
pub fn crop_fractions(
    natural_crop: JsValue,
    natural_width: f64,
    natural_height: f64,
) -> Result<JsValue, JsValue> {
    let rect: PixelRect = serde_wasm_bindgen::from_value(natural_crop)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop rectangle: {}", e)))?;

    let fractions = rect.fractions_of(Dimensions::new(natural_width, natural_height));
    serde_wasm_bindgen::to_value(&fractions).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether a mapped crop (`{x, y, width, height}` from [`to_natural_crop`])
/// has area and may be submitted.
#[wasm_bindgen]
pub fn is_selection(natural_crop: JsValue) -> Result<bool, JsValue> {
    let rect: PixelRect = serde_wasm_bindgen::from_value(natural_crop)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop rectangle: {}", e)))?;
    Ok(rect.is_selection())
}

/// The widget's initial selection as `{unit, x, y, width, height}`.
#[wasm_bindgen]
pub fn default_widget_crop() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&imagecropper_core::selection::default_widget_crop())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
