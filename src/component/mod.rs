mod event;
pub use event::{Event, IcalEvent, Occurrence, RawEvent};

/// Title of events without a `SUMMARY`.
pub const UNTITLED_EVENT: &str = "Untitled Event";
