pub mod coverage_map;
pub mod formats;
pub mod loader;
pub mod marker_cache;
pub mod navigation;
pub mod renderer;
pub mod resolver;
pub mod status;
pub mod surface;
pub mod view;

pub use coverage_map::CoverageMap;
pub use loader::load_info;
pub use marker_cache::MarkerCache;
pub use navigation::{MemoryNavigator, Navigator, QueryState, COVERAGE_VIEW, VIEW_KEY};
pub use renderer::GutterRenderer;
pub use resolver::{resolve, CoverageRecord};
pub use status::{color_for, LineStatus};
pub use surface::{GutterSurface, ListenerId, MarkerFactory, MemorySurface, Viewport};
pub use view::{CoverageView, LoadedCoverage, PendingCoverage, SessionToken, ViewState};
