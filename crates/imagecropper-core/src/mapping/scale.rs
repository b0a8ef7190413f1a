//! Display-to-natural crop mapping.
//!
//! The crop widget works on the rendered image element, which is usually
//! scaled to fit the viewport. The backend only knows the original image, so
//! every selection has to be re-expressed in natural pixels before it is
//! submitted.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner in both spaces
//! - Display-space units are pixels of the rendered element
//! - Natural-space units are pixels of the decoded image
//!
//! # Rounding
//!
//! Each output field is rounded independently with round-half-away-from-zero
//! (`f64::round`). The right/bottom edge of the result may therefore differ
//! by one pixel from rounding `x + width` directly. That tolerance is part of
//! the contract.

use super::{CropRect, Dimensions, PixelRect};

/// Horizontal and vertical scale from display pixels to natural pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

/// Compute the display-to-natural scale factors.
///
/// The rendered dimensions are clamped to at least 1 so an element that has
/// not been laid out yet (zero width or height) cannot cause a division by
/// zero. In that case the factor equals the natural dimension itself, which
/// is almost never the intended mapping: callers must read rendered
/// dimensions only after the image has loaded and been laid out.
pub fn scale_factors(natural: Dimensions, rendered: Dimensions) -> ScaleFactors {
    ScaleFactors {
        sx: natural.width / rendered.width.max(1.0),
        sy: natural.height / rendered.height.max(1.0),
    }
}

/// Map a display-space crop rectangle onto the natural image.
///
/// # Arguments
///
/// * `display` - Crop rectangle in rendered-element pixels
/// * `natural` - Intrinsic image dimensions
/// * `rendered` - Current on-screen dimensions of the image element
///
/// # Returns
///
/// The same selection in whole natural pixels.
///
/// # Behavior
///
/// - Pure and total: never panics, never errors
/// - Inputs are expected finite and non-negative but are not validated;
///   non-finite products saturate through the float-to-int cast (NaN maps
///   to 0)
/// - A degenerate result (`width <= 0` or `height <= 0`) is returned as is;
///   rejecting it is the caller's job, see [`PixelRect::is_selection`]
///
/// # Example
///
/// ```
/// use imagecropper_core::mapping::{to_natural_crop, CropRect, Dimensions, PixelRect};
///
/// let natural = Dimensions::new(1000.0, 1000.0);
/// let rendered = Dimensions::new(500.0, 500.0);
/// let display = CropRect::new(10.0, 20.0, 30.0, 40.0);
///
/// assert_eq!(to_natural_crop(&display, natural, rendered), PixelRect::new(20, 40, 60, 80));
/// ```
pub fn to_natural_crop(display: &CropRect, natural: Dimensions, rendered: Dimensions) -> PixelRect {
    let ScaleFactors { sx, sy } = scale_factors(natural, rendered);

    let mapped = PixelRect {
        x: (display.x * sx).round() as i64,
        y: (display.y * sy).round() as i64,
        width: (display.width * sx).round() as i64,
        height: (display.height * sy).round() as i64,
    };

    log::debug!(
        "mapped display crop {:?} to natural {} (sx={:.4}, sy={:.4})",
        display,
        mapped,
        sx,
        sy
    );

    mapped
}


// ============================================================================
// Property-Based Tests
// ============================================================================
