use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta};

use super::UNTITLED_EVENT;
use crate::{
    parser::{ContentLine, ParserError, ParserOptions},
    property::{ExceptionDates, Property},
    rrule::{RecurrenceExpander, RecurrenceRule},
    text::unescape_text,
    types::{CalDateTimeError, Tz, parse_date},
};

/// The properties of one `VEVENT` block, values kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub dtstart: Option<String>,
    pub dtend: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub rrule: Option<String>,
    pub exdate: Option<String>,
    pub recurrence_id: Option<String>,
    /// Properties the expander does not read.
    pub extra: BTreeMap<String, String>,
}

impl RawEvent {
    fn slot(&mut self, property: Property) -> &mut Option<String> {
        match property {
            Property::DtStart => &mut self.dtstart,
            Property::DtEnd => &mut self.dtend,
            Property::Summary => &mut self.summary,
            Property::Description => &mut self.description,
            Property::Location => &mut self.location,
            Property::RRule => &mut self.rrule,
            Property::ExDate => &mut self.exdate,
            Property::RecurrenceId => &mut self.recurrence_id,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match Property::from_name(name) {
            Some(Property::DtStart) => &self.dtstart,
            Some(Property::DtEnd) => &self.dtend,
            Some(Property::Summary) => &self.summary,
            Some(Property::Description) => &self.description,
            Some(Property::Location) => &self.location,
            Some(Property::RRule) => &self.rrule,
            Some(Property::ExDate) => &self.exdate,
            Some(Property::RecurrenceId) => &self.recurrence_id,
            None => return self.extra.get(name).map(String::as_str),
        };
        value.as_deref()
    }

    /// Store a property, replacing an earlier value of the same name.
    pub fn set(&mut self, line: ContentLine) {
        if let Some(property) = Property::from_name(&line.name) {
            *self.slot(property) = Some(line.value);
        } else {
            self.extra.insert(line.name, line.value);
        }
    }

    /// Append folded text to the value of property `name`.
    pub fn append(&mut self, name: &str, text: &str) {
        let value = if let Some(property) = Property::from_name(name) {
            self.slot(property).get_or_insert_default()
        } else {
            self.extra.entry(name.to_owned()).or_default()
        };
        value.push_str(text);
    }

    pub fn build(self, options: &ParserOptions) -> Result<IcalEvent, ParserError> {
        let tz = &options.timezone;
        let dtstart = self.dtstart.as_deref().unwrap_or_default();
        let is_all_day = !dtstart.contains('T');
        let start = parse_date(dtstart, is_all_day, tz).map_err(|source| match source {
            CalDateTimeError::Empty => ParserError::MissingProperty(Property::DtStart.name()),
            source => ParserError::InvalidProperty {
                property: Property::DtStart.name(),
                source,
            },
        })?;
        let end = match self.dtend.as_deref().map(|dtend| parse_date(dtend, is_all_day, tz)) {
            Some(Ok(end)) => end,
            Some(Err(err)) => {
                tracing::debug!(%err, "ignoring DTEND");
                start
            }
            None => start,
        };

        let event = Event {
            title: self
                .summary
                .as_deref()
                .map(unescape_text)
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT.to_owned()),
            start,
            end,
            description: self.description.as_deref().map(unescape_text).unwrap_or_default(),
            location: self.location.as_deref().map(unescape_text).unwrap_or_default(),
            is_all_day,
        };
        let rrule = self.rrule.as_deref().map(RecurrenceRule::parse);
        let exdates = self
            .exdate
            .as_deref()
            .map(|exdate| ExceptionDates::parse(exdate, tz))
            .unwrap_or_default();

        Ok(IcalEvent {
            event,
            rrule,
            exdates,
            raw: self,
        })
    }
}

/// A parsed event, or one concrete occurrence of a recurring one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub description: String,
    pub location: String,
    pub is_all_day: bool,
}

pub type Occurrence = Event;

impl Event {
    pub fn duration(&self) -> TimeDelta {
        self.end.signed_duration_since(self.start)
    }

    /// A copy of this event moved to `start`..`end`.
    #[must_use]
    pub fn with_span(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Event {
            start,
            end,
            ..self.clone()
        }
    }

    /// The description as display HTML.
    pub fn description_html(&self) -> String {
        crate::text::clean_markup(&self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalEvent {
    /// The block as read, for fields consumers need verbatim.
    pub raw: RawEvent,
    pub event: Event,
    pub rrule: Option<RecurrenceRule>,
    pub exdates: ExceptionDates,
}

impl IcalEvent {
    /// Whether this block overrides one instance of a series.
    pub fn is_recurrence_exception(&self) -> bool {
        self.raw.recurrence_id.is_some()
    }

    /// The recurrence rule to expand, if any.
    pub fn expanded_rule(&self) -> Option<&RecurrenceRule> {
        self.rrule.as_ref().filter(|_| !self.is_recurrence_exception())
    }

    /// The occurrences of this event from the start of today onwards.
    pub fn occurrences(&self, options: &ParserOptions) -> Vec<Occurrence> {
        let today = options.start_of_today();

        if let Some(rule) = self.expanded_rule() {
            if let Some(until) = rule.until(&options.timezone)
                && until < today
            {
                tracing::debug!(title = %self.event.title, %until, "dropping ended series");
                return vec![];
            }
            return RecurrenceExpander::new(rule, &self.exdates, options).expand(&self.event);
        }

        if self.rrule.is_none() && self.event.start < today {
            tracing::debug!(
                title = %self.event.title,
                start = %self.event.start,
                "dropping past event"
            );
            return vec![];
        }
        vec![self.event.clone()]
    }
}
