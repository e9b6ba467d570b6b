mod timezone;
pub use timezone::{CalTimezoneOffset, Tz};

mod date;
pub(crate) use date::strip_params;
pub use date::{
    add_months_rollover, days_in_month, days_in_year, format_date, format_utc, parse_date,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalDateTimeError {
    #[error("empty date value")]
    Empty,
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid time: {0}")]
    InvalidTime(String),
    #[error("local time does not exist: {0}")]
    NonExistentLocalTime(String),
}
