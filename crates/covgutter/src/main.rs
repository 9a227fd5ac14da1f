#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod print;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use covgutter_config::{CoverageConfig, ViewStateStore};

/// Shows code coverage in an editor gutter.
#[derive(Parser, Debug)]
#[command(name = "covgutter", version, about)]
struct Cli {
    /// Source file to show.
    source: Option<PathBuf>,

    /// Coverage info: JSON map, lcov `.info` or `.gcov` file.
    #[arg(short, long)]
    coverage: Option<PathBuf>,

    /// Initial view, e.g. `coverage`.
    #[arg(long)]
    view: Option<String>,

    /// View state database.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the annotated source to stdout instead of opening a window.
    #[arg(long, requires = "source")]
    print: bool,

    /// Forget the saved view of every file, then exit.
    #[arg(long, conflicts_with = "print")]
    clear_state: bool,
}

/// Removes every stored view query from the state database at `path`.
fn clear_view_state(path: &Path) -> Result<()> {
    let store = ViewStateStore::open(path)?;
    store.clear()?;
    tracing::info!("Cleared view state at {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if cli.clear_state {
        let path = cli.state.unwrap_or_else(ViewStateStore::state_path);
        return clear_view_state(&path);
    }

    if cli.print {
        let config_path = cli.config.unwrap_or_else(CoverageConfig::config_path);
        let config = CoverageConfig::load_or_create(&config_path);
        let Some(source) = cli.source else {
            anyhow::bail!("--print needs a source file");
        };
        let mut out = std::io::stdout().lock();
        return print::print_annotated(&mut out, &source, cli.coverage.as_deref(), &config);
    }

    tracing::info!("Starting covgutter");

    let startup_args = covgutter_ui::StartupArgs {
        source: cli.source,
        coverage: cli.coverage,
        view: cli.view,
        state_path: cli.state,
        config_path: cli.config,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "covgutter",
        native_options,
        Box::new(move |cc| Ok(Box::new(covgutter_ui::App::new(cc, startup_args)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_clear_view_state_forgets_every_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("state.redb");
        let query: BTreeMap<String, String> =
            [("view".to_string(), "coverage".to_string())].into_iter().collect();
        {
            let store = ViewStateStore::open(&path).unwrap();
            store.save_query("/src/a.c", &query).unwrap();
            store.save_query("/src/b.c", &query).unwrap();
        }

        clear_view_state(&path).unwrap();

        let store = ViewStateStore::open(&path).unwrap();
        assert!(store.load_query("/src/a.c").unwrap().is_empty());
        assert!(store.load_query("/src/b.c").unwrap().is_empty());
    }

    #[test]
    fn test_clear_state_flag_parses() {
        let cli = Cli::try_parse_from(["covgutter", "--clear-state", "--state", "s.redb"]).unwrap();
        assert!(cli.clear_state);
        assert_eq!(cli.state, Some(PathBuf::from("s.redb")));
        assert!(Cli::try_parse_from(["covgutter", "a.c", "--print", "--clear-state"]).is_err());
    }
}
