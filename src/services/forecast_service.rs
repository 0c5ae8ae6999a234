use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use crate::fetch_error::FetchError;
use crate::fetcher::NowcastFetcher;
use crate::grid::GridTable;
use crate::observation::{DecodeError, WeatherSnapshot};

/// Administrative location a nowcast is requested for. Absent levels are
/// normalized to empty strings before table matching.
#[derive(Debug, Clone)]
pub struct LocationQuery {
    pub province: String,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Clone)]
pub struct ForecastService {
    grid: Arc<GridTable>,
    fetcher: NowcastFetcher,
}

impl ForecastService {
    pub fn new(grid: Arc<GridTable>, fetcher: NowcastFetcher) -> Self {
        Self { grid, fetcher }
    }

    /// Resolve the current observation snapshot for a location.
    ///
    /// Grid lookup cannot fail (unmatched locations fall back to the
    /// default grid point); fetch and decode failures propagate.
    #[instrument(skip(self), fields(province = %query.province))]
    pub async fn resolve(&self, query: &LocationQuery) -> Result<WeatherSnapshot, ForecastError> {
        let point = self.grid.lookup(
            &query.province,
            query.district.as_deref().unwrap_or(""),
            query.neighborhood.as_deref().unwrap_or(""),
        );

        let now = Local::now();
        let date = base_date(now);
        let time = base_time(now);
        debug!("Base date: {}, base time: {}", date, time);

        let items = self.fetcher.fetch_observations(point, &date, &time).await?;
        info!("Fetched {} observation items", items.len());

        Ok(WeatherSnapshot::aggregate(&items)?)
    }
}

/// Observation-day stamp, `YYYYMMDD`.
fn base_date(now: DateTime<Local>) -> String {
    now.format("%Y%m%d").to_string()
}

/// Wall-clock stamp the hourly nowcast query is anchored to, `HHMM`.
/// Seconds and below are discarded without rounding.
fn base_time(now: DateTime<Local>) -> String {
    now.format("%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_base_time_discards_seconds() {
        let now = Local.with_ymd_and_hms(2025, 10, 14, 14, 37, 52).unwrap();
        assert_eq!(base_time(now), "1437");
    }

    #[test]
    fn test_base_time_zero_pads() {
        let now = Local.with_ymd_and_hms(2025, 10, 14, 7, 5, 0).unwrap();
        assert_eq!(base_time(now), "0705");
    }

    #[test]
    fn test_base_date_format() {
        let now = Local.with_ymd_and_hms(2025, 3, 9, 0, 0, 0).unwrap();
        assert_eq!(base_date(now), "20250309");
    }
}
