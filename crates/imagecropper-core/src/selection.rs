//! Adapter for the crop gesture widget.
//!
//! The widget reports its selection either in pixels of the rendered element
//! or in percent of it, depending on how it was last driven. Everything
//! downstream works in display pixels, so percent selections are converted
//! against the rendered dimensions read at the same moment.

use serde::{Deserialize, Serialize};

use crate::mapping::{CropRect, Dimensions};

/// Unit the widget reports a selection in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropUnit {
    /// Pixels of the rendered element.
    #[default]
    #[serde(rename = "px")]
    Px,
    /// Percent (0 to 100) of the rendered element.
    #[serde(rename = "%")]
    Percent,
}

/// A raw selection as emitted by the widget. Any missing field reads as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetCrop {
    #[serde(default)]
    pub unit: CropUnit,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl WidgetCrop {
    pub fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Px,
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Percent,
            ..Self::pixels(x, y, width, height)
        }
    }

    /// Convert to a display-space rectangle.
    ///
    /// `rendered` is only consulted for percent selections.
    pub fn to_display_rect(&self, rendered: Dimensions) -> CropRect {
        let x = self.x.unwrap_or(0.0);
        let y = self.y.unwrap_or(0.0);
        let width = self.width.unwrap_or(0.0);
        let height = self.height.unwrap_or(0.0);

        match self.unit {
            CropUnit::Px => CropRect::new(x, y, width, height),
            CropUnit::Percent => CropRect::new(
                x / 100.0 * rendered.width,
                y / 100.0 * rendered.height,
                width / 100.0 * rendered.width,
                height / 100.0 * rendered.height,
            ),
        }
    }
}

/// The selection the widget starts with before the user drags anything.
pub fn default_widget_crop() -> WidgetCrop {
    WidgetCrop::pixels(20.0, 20.0, 200.0, 200.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_selection_passes_through() {
        let crop = WidgetCrop::pixels(5.5, 6.0, 100.0, 50.0);
        let rect = crop.to_display_rect(Dimensions::new(999.0, 999.0));

        assert_eq!(rect, CropRect::new(5.5, 6.0, 100.0, 50.0));
    }

    #[test]
    fn test_percent_selection_converts_against_rendered() {
        let crop = WidgetCrop::percent(10.0, 25.0, 50.0, 50.0);
        let rect = crop.to_display_rect(Dimensions::new(800.0, 400.0));

        assert_eq!(rect, CropRect::new(80.0, 100.0, 400.0, 200.0));
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let crop = WidgetCrop {
            unit: CropUnit::Percent,
            x: None,
            y: Some(10.0),
            width: None,
            height: Some(20.0),
        };
        let rect = crop.to_display_rect(Dimensions::new(100.0, 100.0));

        assert_eq!(rect, CropRect::new(0.0, 10.0, 0.0, 20.0));
    }

    #[test]
    fn test_default_widget_crop() {
        let rect = default_widget_crop().to_display_rect(Dimensions::default());
        assert_eq!(rect, CropRect::new(20.0, 20.0, 200.0, 200.0));
    }

    #[test]
    fn test_deserialize_widget_payload() {
        let crop: WidgetCrop =
            serde_json::from_str(r#"{"unit":"%","x":12.5,"y":0,"width":50}"#).unwrap();

        assert_eq!(crop.unit, CropUnit::Percent);
        assert_eq!(crop.x, Some(12.5));
        assert_eq!(crop.height, None);
    }

    #[test]
    fn test_unit_defaults_to_pixels() {
        let crop: WidgetCrop = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(crop.unit, CropUnit::Px);
    }
}
