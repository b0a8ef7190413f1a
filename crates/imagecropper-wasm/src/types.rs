//! WASM-compatible wrapper types.
//!
//! These wrap core types that JavaScript holds on to between calls: the
//! picked source image and prepared backend requests.

use imagecropper_core::api::{ApiRequest, PartValue, RequestBody};
use imagecropper_core::upload::SourceImage;
use wasm_bindgen::prelude::*;

/// A validated PNG upload.
///
/// The file bytes stay in WASM memory until the image is submitted.
#[wasm_bindgen]
pub struct JsSourceImage {
    inner: SourceImage,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Validate a picked file.
    ///
    /// # Arguments
    /// * `bytes` - File contents (`new Uint8Array(await file.arrayBuffer())`)
    /// * `mime` - `file.type`, or undefined if unknown
    /// * `file_name` - `file.name`
    /// * `max_bytes` - Size cap, e.g. from the client settings
    ///
    /// # Errors
    /// "Only PNG" for anything that is not a PNG, or a size/corruption message.
    #[wasm_bindgen(constructor)]
    pub fn new(
        bytes: Vec<u8>,
        mime: Option<String>,
        file_name: String,
        max_bytes: usize,
    ) -> Result<JsSourceImage, JsValue> {
        SourceImage::from_png_limited(bytes, mime.as_deref(), max_bytes)
            .map(|img| Self::from_source(img.with_file_name(file_name)))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn natural_width(&self) -> f64 {
        self.inner.natural.width
    }

    #[wasm_bindgen(getter)]
    pub fn natural_height(&self) -> f64 {
        self.inner.natural.height
    }

    /// True when the image is taller than wide.
    #[wasm_bindgen(getter)]
    pub fn is_portrait(&self) -> bool {
        self.inner.natural.is_portrait()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }
}

impl JsSourceImage {
    pub(crate) fn from_source(inner: SourceImage) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &SourceImage {
        &self.inner
    }

    pub(crate) fn into_source(self) -> SourceImage {
        self.inner
    }
}

/// A prepared backend request for the host to send with `fetch`.
///
/// Multipart fields are exposed by index so the host can assemble a
/// `FormData`:
///
/// ```typescript
/// const fd = new FormData();
/// for (let i = 0; i < req.part_count; i++) {
///   const name = req.part_name(i)!;
///   const bytes = req.part_bytes(i);
///   if (bytes) {
///     fd.append(name, new Blob([bytes], { type: req.part_content_type(i)! }), req.part_file_name(i));
///   } else {
///     fd.append(name, req.part_text(i)!);
///   }
/// }
/// ```
#[wasm_bindgen]
pub struct JsApiRequest {
    inner: ApiRequest,
}

#[wasm_bindgen]
impl JsApiRequest {
    #[wasm_bindgen(getter)]
    pub fn method(&self) -> String {
        self.inner.method.as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn url(&self) -> String {
        self.inner.url.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn timeout_ms(&self) -> u32 {
        self.inner.timeout_ms
    }

    /// `"json"` or `"png"`: how the host should read the response body.
    #[wasm_bindgen(getter)]
    pub fn accept(&self) -> String {
        match self.inner.accept {
            imagecropper_core::api::ResponseKind::Json => "json".to_string(),
            imagecropper_core::api::ResponseKind::Png => "png".to_string(),
        }
    }

    pub fn header_names(&self) -> Vec<String> {
        self.inner.headers.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.inner.header(name).map(str::to_string)
    }

    /// JSON text body, if the request has one.
    #[wasm_bindgen(getter)]
    pub fn json_body(&self) -> Option<String> {
        match &self.inner.body {
            RequestBody::Json(body) => Some(body.clone()),
            _ => None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn is_multipart(&self) -> bool {
        matches!(self.inner.body, RequestBody::Multipart(_))
    }

    #[wasm_bindgen(getter)]
    pub fn part_count(&self) -> usize {
        match &self.inner.body {
            RequestBody::Multipart(parts) => parts.len(),
            _ => 0,
        }
    }

    pub fn part_name(&self, index: usize) -> Option<String> {
        self.part(index).map(|(name, _)| name.to_string())
    }

    /// Text of a plain field or of a JSON blob field.
    pub fn part_text(&self, index: usize) -> Option<String> {
        match self.part(index)? {
            (_, PartValue::Text(text)) | (_, PartValue::Json(text)) => Some(text.clone()),
            (_, PartValue::PngFile { .. }) => None,
        }
    }

    /// Bytes of a blob field. JSON fields are returned as UTF-8 so they can
    /// be wrapped in a typed `Blob`.
    pub fn part_bytes(&self, index: usize) -> Option<Vec<u8>> {
        match self.part(index)? {
            (_, PartValue::PngFile { bytes, .. }) => Some(bytes.clone()),
            (_, PartValue::Json(text)) => Some(text.as_bytes().to_vec()),
            (_, PartValue::Text(_)) => None,
        }
    }

    pub fn part_file_name(&self, index: usize) -> Option<String> {
        match self.part(index)? {
            (_, PartValue::PngFile { file_name, .. }) => Some(file_name.clone()),
            _ => None,
        }
    }

    pub fn part_content_type(&self, index: usize) -> Option<String> {
        self.part(index)?.1.content_type().map(str::to_string)
    }
}

impl JsApiRequest {
    pub(crate) fn from_request(inner: ApiRequest) -> Self {
        Self { inner }
    }

    fn part(&self, index: usize) -> Option<(&str, &PartValue)> {
        match &self.inner.body {
            RequestBody::Multipart(parts) => parts.get(index).map(|p| (p.name.as_str(), &p.value)),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![0u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }
}
