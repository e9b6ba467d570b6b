//! Parse calendar feeds and expand their recurring events into concrete occurrences.
//!
//! ```rust
//! use calfeed::{ParserOptions, expand_feed};
//!
//! let feed = "BEGIN:VCALENDAR\r\n\
//!             BEGIN:VEVENT\r\n\
//!             DTSTART:20990105T180000\r\n\
//!             SUMMARY:Open Shop\r\n\
//!             END:VEVENT\r\n\
//!             END:VCALENDAR\r\n";
//!
//! let occurrences = expand_feed(feed, &ParserOptions::default());
//! assert_eq!(occurrences[0].title, "Open Shop");
//! ```

const PARAM_VALUE_DELIMITER: char = ',';
const VALUE_DELIMITER: char = ':';
const PARAM_DELIMITER: char = ';';
const PARAM_NAME_DELIMITER: char = '=';

pub mod component;
pub use component::{Event, IcalEvent, Occurrence, RawEvent};

pub mod parser;
pub use parser::{ContentLineParser, EventParser, LineReader, ParserError, ParserOptions};

pub mod property;

pub mod generator;

pub mod rrule;

pub mod text;

pub mod types;

pub mod window;

/// Expand every event of `input` into its occurrences from the start of today.
///
/// Events that cannot be parsed are dropped. The result is in feed order, not sorted.
#[tracing::instrument(skip(input, options), fields(
    input_len = input.len(),
    timezone = options.timezone.name(),
))]
pub fn expand_feed(input: &str, options: &ParserOptions) -> Vec<Occurrence> {
    let occurrences = EventParser::new(input)
        .with_options(options.clone())
        .occurrences();
    tracing::debug!(count = occurrences.len(), "feed expanded");
    occurrences
}
