/// lcov tracefile (`.info`) reader.
///
/// Only line records are used: `SF:<path>` opens a source file, `DA:<line>,<count>[,<checksum>]`
/// reports a line, `end_of_record` closes the file. A line is covered when its
/// execution count is positive. Files without any covered line are left out.
use std::collections::BTreeSet;

use crate::CoverageMap;

pub fn parse(text: &str) -> CoverageMap {
    let mut map = CoverageMap::new();
    let mut current: Option<(String, BTreeSet<u32>)> = None;

    for line in text.lines().map(str::trim) {
        if let Some(path) = line.strip_prefix("SF:") {
            flush(&mut map, current.take());
            current = Some((path.trim().to_string(), BTreeSet::new()));
        } else if let Some(record) = line.strip_prefix("DA:") {
            let Some((_, covered)) = current.as_mut() else {
                continue;
            };
            match parse_da(record) {
                Some((line_no, count)) if count > 0 => {
                    covered.insert(line_no);
                }
                Some(_) => {}
                None => tracing::debug!("Skipping malformed lcov record: DA:{record}"),
            }
        } else if line == "end_of_record" {
            flush(&mut map, current.take());
        }
    }
    flush(&mut map, current);

    map
}

fn parse_da(record: &str) -> Option<(u32, u64)> {
    let mut fields = record.split(',');
    let line_no = fields.next()?.trim().parse().ok()?;
    let count = fields.next()?.trim().parse().ok()?;
    Some((line_no, count))
}

fn flush(map: &mut CoverageMap, file: Option<(String, BTreeSet<u32>)>) {
    if let Some((path, covered)) = file {
        if !covered.is_empty() {
            let mut lines: BTreeSet<u32> = covered;
            if let Some(existing) = map.get(&path) {
                lines.extend(existing.iter().copied());
            }
            map.insert(path, lines.into_iter().collect());
        }
    }
}
