/// gcov text output (`.gcov`) reader.
///
/// Each report starts with a `-:0:Source:<path>` header followed by
/// `<count>:<line>:<text>` rows. Rows with a positive count are covered; `-`
/// (not executable), `#####` / `=====` (never executed) and the extra
/// `function` / `branch` / `call` rows printed by `gcov -b -c` are not.
///
/// A `N*` count (executed, with some blocks not executed) counts as covered.
/// Converters that parse the count as a plain integer reject `N*` and drop
/// the row; this reader keeps it, so such lines show as covered rather than
/// uncovered.
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::CoverageMap;

pub fn parse(text: &str) -> CoverageMap {
    let mut files: Vec<(String, BTreeSet<u32>)> = Vec::new();
    let mut current: Option<usize> = None;

    for raw in text.lines() {
        let row = raw.trim_start();

        if row.starts_with("-:") {
            if let Some((_, src)) = row.split_once("Source:") {
                let src = src.trim();
                if !src.is_empty() {
                    let norm = normalize(src);
                    let pos = match files.iter().position(|(p, _)| *p == norm) {
                        Some(pos) => pos,
                        None => {
                            files.push((norm, BTreeSet::new()));
                            files.len() - 1
                        }
                    };
                    current = Some(pos);
                }
                continue;
            }
        }

        let Some(pos) = current else {
            continue;
        };
        let mut parts = row.splitn(3, ':');
        let (Some(count), Some(line_no)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(line_no) = line_no.trim().parse::<u32>() else {
            continue;
        };
        if line_no == 0 {
            continue;
        }
        // `N*` marks an executed line that still has unexecuted blocks.
        let count = count.trim().trim_end_matches('*');
        if let Ok(count) = count.parse::<u64>() {
            if count > 0 {
                files[pos].1.insert(line_no);
            }
        }
    }

    files
        .into_iter()
        .map(|(path, lines)| (path, lines.into_iter().collect()))
        .collect()
}

/// Lexical normalization: drops `.` segments and folds `dir/..` pairs.
fn normalize(path: &str) -> String {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        ".".to_string()
    } else {
        out.to_string_lossy().into_owned()
    }
}
