use chrono::{DateTime, Utc};

use super::{Emitter, escape_text, fold_line};
use crate::{
    PARAM_DELIMITER, PARAM_NAME_DELIMITER, VALUE_DELIMITER,
    component::Occurrence,
    parser::ContentLine,
    property::Property,
    types::{Tz, format_date, format_utc},
};

pub const DEFAULT_PRODID: &str = "-//calfeed//Occurrence Export//EN";

impl Emitter for ContentLine {
    fn generate(&self) -> String {
        fold_line(&format!("{}{VALUE_DELIMITER}{}", self.name, self.value))
    }
}

/// `DTSTART`/`DTEND` line of an occurrence, a date for all-day events and a
/// wall-clock time tagged with the zone otherwise.
fn date_property(property: Property, dt: &DateTime<Tz>, is_all_day: bool) -> String {
    let param = match (is_all_day, dt.timezone()) {
        (true, _) => Some(("VALUE", "DATE")),
        (false, Tz::Olson(tz)) => Some(("TZID", tz.name())),
        (false, Tz::Local) => None,
    };
    let name = match param {
        Some((key, value)) => {
            format!("{property}{PARAM_DELIMITER}{key}{PARAM_NAME_DELIMITER}{value}")
        }
        None => property.to_string(),
    };
    fold_line(&format!(
        "{name}{VALUE_DELIMITER}{}",
        format_date(dt, is_all_day)
    ))
}

/// A single occurrence as a standalone calendar object, for "add to calendar" downloads.
#[derive(Debug, Clone)]
pub struct OccurrenceExport<'a> {
    occurrence: &'a Occurrence,
    uid: String,
    prodid: String,
    dtstamp: DateTime<Utc>,
}

impl<'a> OccurrenceExport<'a> {
    pub fn new(occurrence: &'a Occurrence, uid: impl Into<String>) -> Self {
        OccurrenceExport {
            occurrence,
            uid: uid.into(),
            prodid: DEFAULT_PRODID.to_owned(),
            dtstamp: Utc::now(),
        }
    }

    pub fn with_prodid(mut self, prodid: impl Into<String>) -> Self {
        self.prodid = prodid.into();
        self
    }

    pub fn with_dtstamp(mut self, dtstamp: DateTime<Utc>) -> Self {
        self.dtstamp = dtstamp;
        self
    }

    pub fn file_name(&self) -> String {
        export_file_name(&self.occurrence.title)
    }
}

impl Emitter for OccurrenceExport<'_> {
    fn generate(&self) -> String {
        let event = self.occurrence;
        let mut text = [
            ContentLine::new("BEGIN", "VCALENDAR"),
            ContentLine::new("VERSION", "2.0"),
            ContentLine::new("PRODID", self.prodid.as_str()),
            ContentLine::new("BEGIN", "VEVENT"),
            ContentLine::new("UID", self.uid.as_str()),
            ContentLine::new("DTSTAMP", format_utc(&self.dtstamp)),
        ]
        .generate();
        text += &date_property(Property::DtStart, &event.start, event.is_all_day);
        text += &date_property(Property::DtEnd, &event.end, event.is_all_day);

        let mut properties = vec![ContentLine::new(
            Property::Summary.name(),
            escape_text(&event.title),
        )];
        if !event.location.is_empty() {
            properties.push(ContentLine::new(
                Property::Location.name(),
                escape_text(&event.location),
            ));
        }
        if !event.description.is_empty() {
            properties.push(ContentLine::new(
                Property::Description.name(),
                escape_text(&event.description),
            ));
        }
        properties.push(ContentLine::new("END", "VEVENT"));
        properties.push(ContentLine::new("END", "VCALENDAR"));
        text + &properties.generate()
    }
}

/// Download name for an exported occurrence: `title` with everything but
/// ASCII letters and digits replaced by `_`.
pub fn export_file_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.ics")
}
