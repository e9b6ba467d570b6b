use chrono::{DateTime, TimeDelta, Utc};

use crate::types::Tz;

mod error;
pub use error::ParserError;

mod line;
pub use line::{Line, LineReader};

mod content_line;
pub use content_line::{ContentLine, ContentLineParser, Token};

mod component;
pub use component::EventParser;

/// Days after "now" beyond which recurring series are cut off.
pub const HORIZON_DAYS: i64 = 365;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Zone for floating times, all-day dates, "start of today" and
    /// recurrence arithmetic.
    pub timezone: Tz,
    /// Reference instant, the system clock when unset.
    pub now: Option<DateTime<Utc>>,
}

impl ParserOptions {
    pub fn new(timezone: Tz) -> Self {
        ParserOptions {
            timezone,
            now: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// A copy with `now` fixed, so that every event of one pass agrees on "today".
    pub fn pinned(&self) -> Self {
        ParserOptions {
            timezone: self.timezone,
            now: Some(self.now()),
        }
    }

    pub fn start_of_today(&self) -> DateTime<Tz> {
        Self::start_of_today_at(self.now(), &self.timezone)
    }

    /// Local midnight of the day containing `now`.
    pub fn start_of_today_at(now: DateTime<Utc>, tz: &Tz) -> DateTime<Tz> {
        let now = now.with_timezone(tz);
        tz.midnight(now.date_naive()).unwrap_or(now)
    }

    pub fn horizon(&self) -> DateTime<Utc> {
        Self::horizon_at(self.now())
    }

    pub fn horizon_at(now: DateTime<Utc>) -> DateTime<Utc> {
        now + TimeDelta::days(HORIZON_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::ParserOptions;
    use crate::types::Tz;
    use chrono::{TimeZone, Utc};

    #[test]
    fn start_of_today_is_zone_local() {
        // 03:00Z is still the previous evening in New York
        let options = ParserOptions {
            timezone: Tz::Olson(chrono_tz::America::New_York),
            now: Some(Utc.with_ymd_and_hms(2025, 3, 6, 3, 0, 0).unwrap()),
        };
        assert_eq!(
            options.start_of_today().with_timezone(&Utc),
            Utc.with_ymd_and_hms(2025, 3, 5, 5, 0, 0).unwrap()
        );
        assert_eq!(
            options.horizon(),
            Utc.with_ymd_and_hms(2026, 3, 6, 3, 0, 0).unwrap()
        );
    }

    #[test]
    fn pinned_keeps_now() {
        let options = ParserOptions::new(Tz::UTC);
        assert_eq!(options.now, None);
        let pinned = options.pinned();
        assert!(pinned.now.is_some());
        assert_eq!(pinned.pinned(), pinned);
    }
}
