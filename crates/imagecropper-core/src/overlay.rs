//! Logo overlay configuration.
//!
//! A user can save one logo plus placement settings on the backend. The
//! generate endpoint then stamps that logo onto the cropped PNG. Only the
//! configuration lives here; compositing is done server-side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted logo scale (1% of the output).
pub const MIN_SCALE_DOWN: f64 = 0.01;
/// Largest accepted logo scale (25% of the output).
pub const MAX_SCALE_DOWN: f64 = 0.25;
/// Scale preselected for a new configuration.
pub const DEFAULT_SCALE_DOWN: f64 = 0.15;

/// Error types for overlay configuration.
#[derive(Debug, Error, PartialEq)]
pub enum OverlayError {
    /// Scale is outside `[0.01, 0.25]` or not a number.
    #[error("Logo scale {0} is outside 0.01-0.25")]
    ScaleOutOfRange(f64),

    /// Position string is not one of the wire names.
    #[error("Unknown logo position: {0}")]
    UnknownPosition(String),

    /// A new configuration needs a logo file.
    #[error("Upload logo (PNG)")]
    MissingLogo,

    /// An update that would change nothing.
    #[error("Nothing to update")]
    EmptyUpdate,
}

/// Where the logo is placed on the output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogoPosition {
    TopLeft,
    #[default]
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl LogoPosition {
    /// All positions in the order the picker lists them.
    pub const ALL: [LogoPosition; 5] = [
        LogoPosition::TopLeft,
        LogoPosition::TopRight,
        LogoPosition::BottomLeft,
        LogoPosition::BottomRight,
        LogoPosition::Center,
    ];

    /// Wire name as the backend expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            LogoPosition::TopLeft => "TOP_LEFT",
            LogoPosition::TopRight => "TOP_RIGHT",
            LogoPosition::BottomLeft => "BOTTOM_LEFT",
            LogoPosition::BottomRight => "BOTTOM_RIGHT",
            LogoPosition::Center => "CENTER",
        }
    }
}

impl fmt::Display for LogoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogoPosition {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogoPosition::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| OverlayError::UnknownPosition(s.to_string()))
    }
}

/// Logo size as a fraction of the output image, validated to `[0.01, 0.25]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ScaleDown(f64);

impl ScaleDown {
    pub fn new(value: f64) -> Result<Self, OverlayError> {
        if value.is_finite() && (MIN_SCALE_DOWN..=MAX_SCALE_DOWN).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OverlayError::ScaleOutOfRange(value))
        }
    }

    /// Build from a whole percentage (1 to 25) as the slider shows it.
    pub fn from_percent(percent: u32) -> Result<Self, OverlayError> {
        Self::new(f64::from(percent) / 100.0)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Rounded whole percentage for display.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for ScaleDown {
    fn default() -> Self {
        Self(DEFAULT_SCALE_DOWN)
    }
}

impl<'de> Deserialize<'de> for ScaleDown {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        ScaleDown::new(value).map_err(serde::de::Error::custom)
    }
}

/// A saved configuration as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoConfig {
    pub id: i64,
    /// Fraction in `[0.01, 0.25]`. Kept unvalidated: this is what the
    /// backend reports, not user input.
    pub scale_down: f64,
    pub logo_position: LogoPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

/// Input for creating a configuration.
#[derive(Debug, Clone, Default)]
pub struct NewLogoConfig {
    pub scale_down: ScaleDown,
    pub logo_position: LogoPosition,
    /// PNG bytes of the logo.
    pub logo_png: Option<Vec<u8>>,
}

impl NewLogoConfig {
    /// Check the configuration can be submitted.
    pub fn validate(&self) -> Result<(), OverlayError> {
        match &self.logo_png {
            Some(bytes) if !bytes.is_empty() => Ok(()),
            _ => Err(OverlayError::MissingLogo),
        }
    }
}

/// Partial update of a configuration. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct LogoConfigUpdate {
    pub scale_down: Option<ScaleDown>,
    pub logo_position: Option<LogoPosition>,
    pub logo_png: Option<Vec<u8>>,
}

impl LogoConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.scale_down.is_none() && self.logo_position.is_none() && self.logo_png.is_none()
    }

    /// Check the update changes at least one field.
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.is_empty() {
            Err(OverlayError::EmptyUpdate)
        } else {
            Ok(())
        }
    }
}

/// JSON body for updating the caller's own configuration without a new logo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyConfigUpdate {
    pub scale_down: ScaleDown,
    pub logo_position: LogoPosition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wire_names() {
        let json = serde_json::to_string(&LogoPosition::BottomRight).unwrap();
        assert_eq!(json, r#""BOTTOM_RIGHT""#);

        let parsed: LogoPosition = serde_json::from_str(r#""CENTER""#).unwrap();
        assert_eq!(parsed, LogoPosition::Center);
    }

    #[test]
    fn test_position_display_matches_serde() {
        for pos in LogoPosition::ALL {
            let json = serde_json::to_string(&pos).unwrap();
            assert_eq!(json, format!("\"{}\"", pos));
            assert_eq!(pos.as_str().parse::<LogoPosition>().unwrap(), pos);
        }
    }

    #[test]
    fn test_position_parse_unknown() {
        let err = "MIDDLE".parse::<LogoPosition>().unwrap_err();
        assert_eq!(err, OverlayError::UnknownPosition("MIDDLE".to_string()));
    }

    #[test]
    fn test_position_default() {
        assert_eq!(LogoPosition::default(), LogoPosition::TopRight);
    }

    #[test]
    fn test_scale_down_bounds() {
        assert!(ScaleDown::new(0.01).is_ok());
        assert!(ScaleDown::new(0.25).is_ok());
        assert!(ScaleDown::new(0.15).is_ok());

        assert_eq!(ScaleDown::new(0.0), Err(OverlayError::ScaleOutOfRange(0.0)));
        assert!(ScaleDown::new(0.26).is_err());
        assert!(ScaleDown::new(-0.1).is_err());
        assert!(ScaleDown::new(f64::NAN).is_err());
        assert!(ScaleDown::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_scale_down_percent() {
        assert_eq!(ScaleDown::default().percent(), 15);
        assert_eq!(ScaleDown::from_percent(7).unwrap().percent(), 7);
        assert!(ScaleDown::from_percent(0).is_err());
        assert!(ScaleDown::from_percent(26).is_err());
    }

    #[test]
    fn test_scale_down_deserialize_validates() {
        let ok: ScaleDown = serde_json::from_str("0.2").unwrap();
        assert_eq!(ok.get(), 0.2);

        assert!(serde_json::from_str::<ScaleDown>("0.5").is_err());
    }

    #[test]
    fn test_config_response_deserialize() {
        let cfg: LogoConfig = serde_json::from_str(
            r#"{"id":7,"scaleDown":0.1,"logoPosition":"TOP_LEFT","logoPath":"/data/logos/a.png"}"#,
        )
        .unwrap();

        assert_eq!(cfg.id, 7);
        assert_eq!(cfg.scale_down, 0.1);
        assert_eq!(cfg.logo_position, LogoPosition::TopLeft);
        assert_eq!(cfg.logo_path.as_deref(), Some("/data/logos/a.png"));
    }

    #[test]
    fn test_config_response_without_logo_path() {
        let cfg: LogoConfig =
            serde_json::from_str(r#"{"id":1,"scaleDown":0.05,"logoPosition":"CENTER","logoPath":null}"#)
                .unwrap();
        assert_eq!(cfg.logo_path, None);
    }

    #[test]
    fn test_new_config_requires_logo() {
        let mut input = NewLogoConfig::default();
        assert_eq!(input.validate(), Err(OverlayError::MissingLogo));

        input.logo_png = Some(Vec::new());
        assert_eq!(input.validate(), Err(OverlayError::MissingLogo));

        input.logo_png = Some(vec![1, 2, 3]);
        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn test_update_is_empty() {
        let mut update = LogoConfigUpdate::default();
        assert!(update.is_empty());

        assert_eq!(update.validate(), Err(OverlayError::EmptyUpdate));

        update.logo_position = Some(LogoPosition::Center);
        assert!(!update.is_empty());
        assert_eq!(update.validate(), Ok(()));
    }

    #[test]
    fn test_my_config_update_body() {
        let body = MyConfigUpdate {
            scale_down: ScaleDown::new(0.2).unwrap(),
            logo_position: LogoPosition::BottomLeft,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"scaleDown":0.2,"logoPosition":"BOTTOM_LEFT"}"#);
    }
}
