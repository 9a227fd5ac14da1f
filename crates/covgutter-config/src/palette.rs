/// Gutter marker colors, one per line coverage status.
use serde::{Deserialize, Serialize};

use crate::HexColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveragePalette {
    pub covered: HexColor,
    pub uncovered: HexColor,
    pub not_executed: HexColor,
    /// Used for any status without a dedicated color.
    pub fallback: HexColor,
}

impl CoveragePalette {
    pub const LIGHT: Self = Self {
        covered: HexColor::rgb(200, 255, 200),
        uncovered: HexColor::rgb(255, 200, 200),
        not_executed: HexColor::rgb(240, 240, 240),
        fallback: HexColor::WHITE,
    };
}

impl Default for CoveragePalette {
    fn default() -> Self {
        Self::LIGHT
    }
}
