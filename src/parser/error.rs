use crate::types::CalDateTimeError;

/// Why a `VEVENT` block could not be turned into an event.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("missing property: {0}")]
    MissingProperty(&'static str),
    #[error("invalid {property}: {source}")]
    InvalidProperty {
        property: &'static str,
        #[source]
        source: CalDateTimeError,
    },
}
