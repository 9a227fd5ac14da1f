pub mod app;
pub mod code_view;
pub mod marker;
pub mod navigator;

pub use app::{App, SourceView, StartupArgs};
pub use code_view::CodeView;
pub use marker::{CoverageLine, EguiMarkerFactory};
pub use navigator::StoreNavigator;
