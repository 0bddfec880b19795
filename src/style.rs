//! Stylization options offered by the service
//!
//! The set is fixed; the wire name of each variant is what the service expects
//! in the `style` form field.

use crate::error::CartoonizerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stylization option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Flat, white-box cartoon shading
    #[default]
    Whitebox,
    /// Pencil sketch
    Sketch,
    /// Oil painting
    Oilpaint,
}

impl Style {
    /// All styles in presentation order
    pub const ALL: [Self; 3] = [Self::Whitebox, Self::Sketch, Self::Oilpaint];

    /// Name sent to the service and used in download file names
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Whitebox => "whitebox",
            Self::Sketch => "sketch",
            Self::Oilpaint => "oilpaint",
        }
    }

    /// Human-readable label for selectors
    pub fn label(self) -> &'static str {
        match self {
            Self::Whitebox => "White Box",
            Self::Sketch => "Sketch",
            Self::Oilpaint => "Oil Paint",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Style {
    type Err = CartoonizerError;

    /// Only the exact wire names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.wire_name() == s)
            .ok_or_else(|| CartoonizerError::InvalidStyle(s.to_string()))
    }
}
