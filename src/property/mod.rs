use derive_more::Display;

mod exdate;
pub use exdate::*;

/// Event properties read by the expander. Everything else is passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Property {
    #[display("DTSTART")]
    DtStart,
    #[display("DTEND")]
    DtEnd,
    #[display("SUMMARY")]
    Summary,
    #[display("DESCRIPTION")]
    Description,
    #[display("LOCATION")]
    Location,
    #[display("RRULE")]
    RRule,
    #[display("EXDATE")]
    ExDate,
    #[display("RECURRENCE-ID")]
    RecurrenceId,
}

static PROPERTIES: phf::Map<&'static str, Property> = phf::phf_map! {
    "DTSTART" => Property::DtStart,
    "DTEND" => Property::DtEnd,
    "SUMMARY" => Property::Summary,
    "DESCRIPTION" => Property::Description,
    "LOCATION" => Property::Location,
    "RRULE" => Property::RRule,
    "EXDATE" => Property::ExDate,
    "RECURRENCE-ID" => Property::RecurrenceId,
};

impl Property {
    /// Look up an upper-cased property name.
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        PROPERTIES.get(name).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DtStart => "DTSTART",
            Self::DtEnd => "DTEND",
            Self::Summary => "SUMMARY",
            Self::Description => "DESCRIPTION",
            Self::Location => "LOCATION",
            Self::RRule => "RRULE",
            Self::ExDate => "EXDATE",
            Self::RecurrenceId => "RECURRENCE-ID",
        }
    }
}
