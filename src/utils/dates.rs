//! Purchase-history search window

use chrono::{Duration, NaiveDate, Utc};

/// Offset of the portal's local time from UTC
const PORTAL_UTC_OFFSET_HOURS: i64 = 9;

/// Inclusive date range of a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchWindow {
    /// Days covered by a window, today included
    pub const DAYS: i64 = 7;

    /// Window of [`Self::DAYS`] days ending on `end`
    pub fn ending_on(end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(Self::DAYS - 1),
            end,
        }
    }

    /// Window ending on the portal's current local date
    pub fn current() -> Self {
        Self::ending_on(portal_today())
    }

    /// `searchStartDate` parameter, `YYYYMMDD`
    pub fn start_param(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    /// `searchEndDate` parameter, `YYYYMMDD`
    pub fn end_param(&self) -> String {
        self.end.format("%Y%m%d").to_string()
    }
}

/// Today's date in portal-local time
pub fn portal_today() -> NaiveDate {
    (Utc::now() + Duration::hours(PORTAL_UTC_OFFSET_HOURS)).date_naive()
}
