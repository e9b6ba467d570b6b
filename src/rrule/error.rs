use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors raised while reading typed parts of a recurrence rule.
pub enum RRuleError {
    #[error("RRULE has no FREQ")]
    MissingFrequency,
    #[error("unsupported FREQ `{0}`, expected DAILY, WEEKLY, MONTHLY or YEARLY")]
    UnknownFrequency(String),
    #[error("invalid INTERVAL `{0}`, expected a positive integer")]
    InvalidInterval(String),
}
