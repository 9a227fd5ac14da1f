//! Plain-text coverage output.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use covgutter_config::{CoverageConfig, HexColor};
use covgutter_core::{
    CoverageMap, CoverageView, LineStatus, MemoryNavigator, MemorySurface, Viewport,
};

/// Writes `source` to `out` with one status column per line:
/// `+` covered, `-` uncovered.
///
/// Runs the same coverage view as the window, over a headless surface
/// showing the whole file.
pub fn print_annotated<W: Write>(
    out: &mut W,
    source: &Path,
    coverage: Option<&Path>,
    config: &CoverageConfig,
) -> Result<()> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let map = coverage.map(CoverageMap::load).transpose()?.map(Arc::new);
    let lines: Vec<&str> = text.lines().collect();

    let factory = |_line: usize, status: LineStatus, _color: HexColor| status;
    let mut view = CoverageView::new(factory, MemoryNavigator::new(), config);
    view.attach(MemorySurface::new(lines.len(), Viewport::new(0, lines.len())));
    view.set_source_file(Some(source.display().to_string()));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start runtime")?;
    if !runtime.block_on(view.enable_now(map)) {
        anyhow::bail!("No coverage info given for {}", source.display());
    }
    if let Some(record) = view.record() {
        if !record.is_matched() {
            tracing::warn!("No coverage entry matches {}", source.display());
        }
    }

    let Some(surface) = view.surface() else {
        anyhow::bail!("Coverage view lost its surface");
    };
    for (i, line) in lines.iter().enumerate() {
        let mark = match surface.marker(view.gutter_id(), i) {
            Some(LineStatus::Covered) => '+',
            Some(_) => '-',
            None => ' ',
        };
        writeln!(out, "{:>5} {mark} {line}", i + 1).context("Failed to write output")?;
    }
    Ok(())
}
