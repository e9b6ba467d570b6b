use std::mem;

use crate::{
    component::{IcalEvent, Occurrence, RawEvent},
    parser::{ContentLine, ContentLineParser, ParserError, ParserOptions, Token},
};

const BEGIN: &str = "BEGIN";
const END: &str = "END";
const VEVENT: &str = "VEVENT";

/// What a folded line continues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Fold {
    /// No line yet, a continuation is read as a line of its own.
    #[default]
    Nothing,
    /// An event property, the text is appended to it.
    Property(String),
    /// A nested component marker, the text is dropped.
    Marker,
}

/// Where the assembler is in the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    #[default]
    Outside,
    Inside {
        event: RawEvent,
        open_field: Fold,
        /// Depth of nested components such as `VALARM`.
        nested: usize,
    },
}

impl State {
    fn open() -> Self {
        State::Inside {
            event: RawEvent::default(),
            open_field: Fold::Nothing,
            nested: 0,
        }
    }

    /// Feed one token, returning the next state and a completed block.
    fn advance(self, token: Token<'_>) -> (Self, Option<RawEvent>) {
        let line = match token {
            Token::Property(line) => line,
            Token::Continuation(line) => {
                let text = line.continuation().unwrap_or_default();
                match self {
                    State::Inside {
                        mut event,
                        open_field: Fold::Property(field),
                        nested: 0,
                    } => {
                        event.append(&field, text);
                        return (
                            State::Inside {
                                event,
                                open_field: Fold::Property(field),
                                nested: 0,
                            },
                            None,
                        );
                    }
                    State::Inside {
                        open_field: Fold::Marker,
                        ..
                    } => return (self, None),
                    State::Inside { nested, .. } if nested > 0 => return (self, None),
                    _ => match ContentLine::parse(text.trim()) {
                        Some(line) => line,
                        None => return (self, None),
                    },
                }
            }
        };

        match self {
            State::Outside if line.is_marker(BEGIN, VEVENT) => (State::open(), None),
            State::Outside => (State::Outside, None),
            State::Inside { nested: 0, .. } if line.is_marker(BEGIN, VEVENT) => {
                tracing::warn!("BEGIN:VEVENT inside an open event, discarding the open event");
                (State::open(), None)
            }
            State::Inside { event, nested: 0, .. } if line.is_marker(END, VEVENT) => {
                (State::Outside, Some(event))
            }
            State::Inside { event, nested, .. } if line.name == BEGIN => {
                tracing::trace!(component = %line.value, "skipping nested component");
                (
                    State::Inside {
                        event,
                        open_field: Fold::Marker,
                        nested: nested + 1,
                    },
                    None,
                )
            }
            State::Inside { event, nested, .. } if nested > 0 => {
                let nested = if line.name == END { nested - 1 } else { nested };
                (
                    State::Inside {
                        event,
                        open_field: Fold::Marker,
                        nested,
                    },
                    None,
                )
            }
            State::Inside { mut event, .. } => {
                let field = line.name.clone();
                event.set(line);
                (
                    State::Inside {
                        event,
                        open_field: Fold::Property(field),
                        nested: 0,
                    },
                    None,
                )
            }
        }
    }
}

/// Iterate over the `VEVENT` blocks of a feed.
///
/// Each completed block is built into an `IcalEvent`; a block that fails to
/// build yields its error and parsing continues with the next block.
#[derive(Debug)]
pub struct EventParser<'a> {
    tokens: ContentLineParser<'a>,
    state: State,
    options: ParserOptions,
}

impl<'a> EventParser<'a> {
    pub fn new(input: &'a str) -> Self {
        EventParser {
            tokens: ContentLineParser::new(input),
            state: State::default(),
            options: ParserOptions::default().pinned(),
        }
    }

    /// Use `options`. An unset `now` is fixed to the current time.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options.pinned();
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Expand every event of the feed, dropping events that fail to build.
    pub fn occurrences(self) -> Vec<Occurrence> {
        let options = self.options.clone();
        self.filter_map(|event| {
            event
                .inspect_err(|err| tracing::debug!(%err, "dropping event"))
                .ok()
        })
        .flat_map(|event| event.occurrences(&options))
        .collect()
    }
}

impl Iterator for EventParser<'_> {
    type Item = Result<IcalEvent, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        for token in self.tokens.by_ref() {
            let (state, completed) = mem::take(&mut self.state).advance(token);
            self.state = state;
            if let Some(raw) = completed {
                return Some(raw.build(&self.options));
            }
        }
        if let State::Inside { event, .. } = mem::take(&mut self.state) {
            tracing::debug!(summary = ?event.summary, "dropping unterminated event");
        }
        None
    }
}
