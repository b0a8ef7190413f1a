//! Crop coordinate mapping between the rendered image element and the
//! original image.
//!
//! The only geometry in the client: a selection made on a scaled on-screen
//! rendition is converted into the natural pixel grid the backend crops.
//!
//! # Coordinate System
//!
//! - Origin is top-left corner
//! - Display space: pixels of the rendered element, real-valued
//! - Natural space: whole pixels of the decoded image

mod rect;
mod scale;

pub use rect::{CropFractions, CropRect, Dimensions, PixelRect};
pub use scale::{scale_factors, to_natural_crop, ScaleFactors};
