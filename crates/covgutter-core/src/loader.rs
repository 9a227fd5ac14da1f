/// Asynchronous coverage lookup.
///
/// Stands in for a remote coverage service: the lookup suspends once (for
/// `delay`, or until the next scheduler tick when `delay` is zero) and then
/// resolves locally. It never fails; a file without coverage yields an empty
/// record.
use std::time::Duration;

use crate::{resolve, CoverageMap, CoverageRecord};

pub async fn load_info(
    file_path: Option<&str>,
    map: Option<&CoverageMap>,
    delay: Duration,
) -> CoverageRecord {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
    resolve(file_path, map)
}
