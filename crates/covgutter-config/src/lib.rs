pub mod color;
pub mod config;
pub mod palette;
pub mod view_state;

pub use color::HexColor;
pub use config::CoverageConfig;
pub use palette::CoveragePalette;
pub use view_state::ViewStateStore;
