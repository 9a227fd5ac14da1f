/// Per-line coverage status and its gutter color.
use covgutter_config::{CoveragePalette, HexColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStatus {
    Covered,
    Uncovered,
    NotExecuted,
    /// No coverage information for the line.
    Unknown,
}

impl LineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Covered => "covered",
            Self::Uncovered => "uncovered",
            Self::NotExecuted => "not_executed",
            Self::Unknown => "unknown",
        }
    }

    /// Maps the status to a color from `palette`.
    pub fn color_in(self, palette: &CoveragePalette) -> HexColor {
        match self {
            Self::Covered => palette.covered,
            Self::Uncovered => palette.uncovered,
            Self::NotExecuted => palette.not_executed,
            Self::Unknown => palette.fallback,
        }
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color of `status` in the built-in light palette.
pub fn color_for(status: LineStatus) -> HexColor {
    status.color_in(&CoveragePalette::LIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_colors() {
        assert_eq!(color_for(LineStatus::Covered), HexColor::rgb(200, 255, 200));
        assert_eq!(color_for(LineStatus::Uncovered), HexColor::rgb(255, 200, 200));
        assert_eq!(color_for(LineStatus::NotExecuted), HexColor::rgb(240, 240, 240));
        assert_eq!(color_for(LineStatus::Unknown), HexColor::WHITE);
    }

    #[test]
    fn test_custom_palette_keeps_mapping() {
        let palette = CoveragePalette {
            covered: HexColor::rgb(0, 1, 0),
            uncovered: HexColor::rgb(1, 0, 0),
            not_executed: HexColor::rgb(1, 1, 1),
            fallback: HexColor::rgb(2, 2, 2),
        };
        assert_eq!(LineStatus::Covered.color_in(&palette), palette.covered);
        assert_eq!(LineStatus::Uncovered.color_in(&palette), palette.uncovered);
        assert_eq!(LineStatus::NotExecuted.color_in(&palette), palette.not_executed);
        assert_eq!(LineStatus::Unknown.color_in(&palette), palette.fallback);
    }

    #[test]
    fn test_status_names() {
        assert_eq!(LineStatus::NotExecuted.to_string(), "not_executed");
        assert_eq!(LineStatus::Covered.as_str(), "covered");
    }
}
