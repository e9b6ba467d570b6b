use chrono::{
    DateTime, FixedOffset, Local, MappedLocalTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone,
};
use derive_more::{Display, From};

/// Zone in which floating times, all-day dates and calendar arithmetic are evaluated.
#[derive(Debug, Clone, Copy, Default, From, PartialEq, Eq)]
pub enum Tz {
    /// The zone of the running process.
    #[default]
    Local,
    Olson(chrono_tz::Tz),
}

impl Tz {
    pub const UTC: Self = Self::Olson(chrono_tz::UTC);

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Local => "Local",
            Self::Olson(tz) => tz.name(),
        }
    }

    /// Map a wall-clock time onto an instant in this zone.
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a forward
    /// transition move ahead by one hour, the way the wall clock does.
    pub fn resolve_local(&self, naive: &NaiveDateTime) -> Option<DateTime<Self>> {
        match self.from_local_datetime(naive) {
            MappedLocalTime::Single(dt) => Some(dt),
            MappedLocalTime::Ambiguous(earliest, _) => Some(earliest),
            MappedLocalTime::None => self
                .from_local_datetime(&naive.checked_add_signed(TimeDelta::hours(1))?)
                .earliest(),
        }
    }

    /// Local midnight of `date`.
    pub fn midnight(&self, date: NaiveDate) -> Option<DateTime<Self>> {
        self.resolve_local(&date.and_time(chrono::NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CalTimezoneOffset {
    Local(FixedOffset),
    Olson(chrono_tz::TzOffset),
}

impl chrono::Offset for CalTimezoneOffset {
    fn fix(&self) -> FixedOffset {
        match self {
            Self::Local(offset) => *offset,
            Self::Olson(olson) => olson.fix(),
        }
    }
}

impl TimeZone for Tz {
    type Offset = CalTimezoneOffset;

    fn from_offset(offset: &Self::Offset) -> Self {
        match offset {
            CalTimezoneOffset::Local(_) => Self::Local,
            CalTimezoneOffset::Olson(offset) => Self::Olson(chrono_tz::Tz::from_offset(offset)),
        }
    }

    #[cfg(not(tarpaulin_include))] // Only used by deprecated chrono::Date type
    fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<Self::Offset> {
        match self {
            Self::Local => Local
                .offset_from_local_date(local)
                .map(CalTimezoneOffset::Local),
            Self::Olson(tz) => tz
                .offset_from_local_date(local)
                .map(CalTimezoneOffset::Olson),
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<Self::Offset> {
        match self {
            Self::Local => Local
                .offset_from_local_datetime(local)
                .map(CalTimezoneOffset::Local),
            Self::Olson(tz) => tz
                .offset_from_local_datetime(local)
                .map(CalTimezoneOffset::Olson),
        }
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
        match self {
            Self::Local => CalTimezoneOffset::Local(Local.offset_from_utc_datetime(utc)),
            Self::Olson(tz) => CalTimezoneOffset::Olson(tz.offset_from_utc_datetime(utc)),
        }
    }

    #[cfg(not(tarpaulin_include))] // Only used by deprecated chrono::Date type
    fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
        match self {
            Self::Local => CalTimezoneOffset::Local(Local.offset_from_utc_date(utc)),
            Self::Olson(tz) => CalTimezoneOffset::Olson(tz.offset_from_utc_date(utc)),
        }
    }
}
