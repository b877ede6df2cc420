//! Frame availability scan
//!
//! Walks backward one day at a time from `today` to January 1 of the same
//! year and reports the most recent days whose full-frame folder holds more
//! than the configured number of bytes.
//!
//! Reported dates are the measured day plus one.

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, info, instrument};

use crate::config::ScanConfig;
use crate::errors::Result;
use crate::identifier::SourceId;
use crate::metrics;
use crate::storage::StorageBackend;

/// Most recent qualifying days for `source`, newest first, formatted `YYYY-MM-DD`
///
/// Each day costs one listing call and calls are issued strictly in
/// sequence. A failed listing aborts the scan. The walk stops as soon as
/// more than `policy.max_days` days have qualified.
#[instrument(skip(storage, source, policy), fields(source = %source))]
pub async fn find_recent_available_days(
    storage: &dyn StorageBackend,
    source: &SourceId,
    today: NaiveDate,
    policy: &ScanConfig,
) -> Result<Vec<String>> {
    let bucket = source.bucket();
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);

    let mut collected: Vec<NaiveDate> = Vec::new();
    let mut cursor = today;

    while cursor >= year_start {
        let prefix = source.day_prefix(cursor);
        let objects = storage.list(&bucket, &prefix).await?;
        let total_size: u64 = objects.iter().map(|meta| meta.size as u64).sum();
        metrics::SCAN_DAYS_INSPECTED.inc();
        debug!(day = %cursor, objects = objects.len(), total_size, "Inspected day");

        if total_size > policy.size_threshold_bytes {
            metrics::SCAN_DAYS_QUALIFYING.inc();
            info!(day = %cursor, total_size, "Day above size threshold");
            collected.push(reported_day(cursor));
            if collected.len() > policy.max_days {
                break;
            }
        }

        cursor = match cursor.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }

    collected.sort_unstable_by(|a, b| b.cmp(a));
    collected.truncate(policy.max_days);

    info!(found = collected.len(), "Availability scan complete");
    Ok(collected
        .into_iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect())
}

/// Date reported for a measured day
fn reported_day(measured: NaiveDate) -> NaiveDate {
    measured.checked_add_days(Days::new(1)).unwrap_or(measured)
}
