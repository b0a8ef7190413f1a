//! Rectangle and dimension types shared by the mapper and the wire payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A crop rectangle in some pixel coordinate space.
///
/// Coming out of the crop widget this is display-space: pixels of the
/// rendered (possibly scaled) image element. Values are real numbers because
/// the widget reports sub-pixel positions while dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, expected non-negative.
    pub width: f64,
    /// Height, expected non-negative.
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A rectangle in whole pixels of the natural image.
///
/// This is what the backend crops with; it serializes as
/// `{"x":int,"y":int,"width":int,"height":int}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this rectangle denotes an actual selection.
    ///
    /// A rectangle with non-positive width or height means "nothing
    /// selected" and must never be submitted for cropping.
    #[inline]
    pub fn is_selection(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Express this rectangle as fractions of the natural image.
    ///
    /// Used for human-readable display only. A zero natural dimension
    /// yields 0 for the affected fields instead of NaN or infinity.
    pub fn fractions_of(&self, natural: Dimensions) -> CropFractions {
        CropFractions {
            x: fraction(self.x, natural.width),
            y: fraction(self.y, natural.height),
            width: fraction(self.width, natural.width),
            height: fraction(self.height, natural.height),
        }
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{} @ {},{}", self.width, self.height, self.x, self.y)
    }
}

fn fraction(value: i64, whole: f64) -> f64 {
    if whole > 0.0 {
        value as f64 / whole
    } else {
        0.0
    }
}

/// A mapped crop expressed relative to the natural image (0.0 to 1.0 when
/// the crop lies inside the image).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropFractions {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A width/height pair in pixels.
///
/// Used both for natural dimensions (fixed once the image decodes) and for
/// rendered dimensions (read from live layout at the moment of mapping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Taller than wide.
    #[inline]
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Whether both sides are strictly positive, i.e. the element has been
    /// laid out or the image has been decoded.
    #[inline]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_selection() {
        assert!(PixelRect::new(0, 0, 1, 1).is_selection());
        assert!(!PixelRect::new(10, 10, 0, 5).is_selection());
        assert!(!PixelRect::new(10, 10, 5, 0).is_selection());
        assert!(!PixelRect::new(10, 10, -3, 5).is_selection());
        assert!(!PixelRect::default().is_selection());
    }

    #[test]
    fn test_fractions_of_natural() {
        let rect = PixelRect::new(250, 100, 500, 200);
        let fr = rect.fractions_of(Dimensions::new(1000.0, 400.0));

        assert!((fr.x - 0.25).abs() < 1e-12);
        assert!((fr.y - 0.25).abs() < 1e-12);
        assert!((fr.width - 0.5).abs() < 1e-12);
        assert!((fr.height - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fractions_guard_zero_natural() {
        let rect = PixelRect::new(10, 10, 20, 20);
        let fr = rect.fractions_of(Dimensions::new(0.0, 100.0));

        assert_eq!(fr.x, 0.0);
        assert_eq!(fr.width, 0.0);
        assert!((fr.height - 0.2).abs() < 1e-12);
        assert!(fr.x.is_finite() && fr.width.is_finite());
    }

    #[test]
    fn test_pixel_rect_display() {
        let rect = PixelRect::new(20, 40, 60, 80);
        assert_eq!(rect.to_string(), "60×80 @ 20,40");
    }

    #[test]
    fn test_pixel_rect_wire_shape() {
        let rect = PixelRect::new(1, 2, 3, 4);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, r#"{"x":1,"y":2,"width":3,"height":4}"#);
    }

    #[test]
    fn test_dimensions_orientation() {
        assert!(Dimensions::new(300.0, 400.0).is_portrait());
        assert!(!Dimensions::new(400.0, 300.0).is_portrait());
        assert!(!Dimensions::new(400.0, 400.0).is_portrait());
    }

    #[test]
    fn test_dimensions_has_area() {
        assert!(Dimensions::new(1.0, 1.0).has_area());
        assert!(!Dimensions::new(0.0, 100.0).has_area());
        assert!(!Dimensions::default().has_area());
    }

    #[test]
    fn test_dimensions_from_u32_pair() {
        let dims = Dimensions::from((640u32, 480u32));
        assert_eq!(dims, Dimensions::new(640.0, 480.0));
    }
}
