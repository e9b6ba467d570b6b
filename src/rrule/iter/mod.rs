//! Expansion of a recurring event into concrete occurrences.
//!
//! A cursor starts at the event's start and steps by `FREQ`/`INTERVAL` in
//! zone-local wall-clock time. Every candidate day that passes the BY*
//! filters and is not excluded counts towards `COUNT`, but only candidates
//! from the start of today onwards are emitted.
//!
//! Without day-selecting filters the cursor day is the only candidate. A
//! `WEEKLY` rule with `BYDAY`, a `MONTHLY` rule with `BYDAY`, `BYMONTHDAY`
//! or `BYYEARDAY`, or a `YEARLY` rule with any BY* filter offers every day
//! of the cursor's week, month or year instead, so `FREQ=MONTHLY;BYDAY=1MO`
//! finds the first Monday of each month.
//!
//! The iteration cap counts cursor steps, not candidate days, so a weekly or
//! yearly series started decades ago still reaches today.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, Utc};

use crate::{
    component::Event,
    parser::ParserOptions,
    property::ExceptionDates,
    rrule::{Frequency, RecurrenceRule},
    types::{Tz, add_months_rollover, days_in_month, days_in_year},
};

mod checks;
pub(crate) use checks::ByFilters;

/// Upper bound on cursor steps evaluated for one rule.
pub const MAX_ITERATIONS: usize = 10_000;

/// Why an expansion stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cursor passed `UNTIL`.
    Until,
    /// The cursor passed the one-year horizon.
    Horizon,
    /// `COUNT` occurrences were matched.
    Count,
    /// `MAX_ITERATIONS` cursor steps were evaluated.
    IterationCap,
    /// `FREQ` is missing or unsupported, so the cursor cannot advance.
    Frequency,
    /// The cursor left the representable date range.
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub occurrences: Vec<Event>,
    /// Matched, non-excluded candidates, including past ones that were not emitted.
    pub matched: u32,
    pub iterations: usize,
    pub stop: StopReason,
}

/// The days one cursor position stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Day,
    Week,
    Month,
    Year,
}

impl Span {
    fn for_rule(frequency: Option<Frequency>, filters: &ByFilters) -> Self {
        match frequency {
            Some(Frequency::Weekly) if filters.by_day.is_some() => Self::Week,
            Some(Frequency::Monthly) if filters.has_day_filter() => Self::Month,
            Some(Frequency::Yearly) if filters.has_day_filter() || filters.by_month.is_some() => {
                Self::Year
            }
            _ => Self::Day,
        }
    }

    /// First cursor position for an event starting on `date`.
    fn first_period(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day | Self::Week => Some(date),
            Self::Month => date.with_day(1),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    fn days(self, period: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let len = match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => days_in_month(period.year(), period.month()),
            Self::Year => days_in_year(period.year()),
        };
        period.iter_days().take(len as usize)
    }
}

/// Step a cursor date by one `interval` of `frequency`.
fn advance(date: NaiveDate, frequency: Frequency, interval: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => date.checked_add_days(Days::new(u64::from(interval))),
        Frequency::Weekly => date.checked_add_days(Days::new(7 * u64::from(interval))),
        Frequency::Monthly => add_months_rollover(date, interval),
        Frequency::Yearly => add_months_rollover(date, interval.checked_mul(12)?),
    }
}

pub struct RecurrenceExpander<'a> {
    rule: &'a RecurrenceRule,
    exdates: &'a ExceptionDates,
    tz: Tz,
    now: DateTime<Utc>,
}

impl<'a> RecurrenceExpander<'a> {
    pub fn new(
        rule: &'a RecurrenceRule,
        exdates: &'a ExceptionDates,
        options: &ParserOptions,
    ) -> Self {
        RecurrenceExpander {
            rule,
            exdates,
            tz: options.timezone,
            now: options.now(),
        }
    }

    /// Occurrences of `base` from the start of today until the rule ends.
    pub fn expand(&self, base: &Event) -> Vec<Event> {
        self.run(base).occurrences
    }

    pub fn run(&self, base: &Event) -> Expansion {
        let duration: TimeDelta = base.end.signed_duration_since(base.start);
        let horizon = ParserOptions::horizon_at(self.now).with_timezone(&self.tz);
        let until = self.rule.until(&self.tz);
        let today = ParserOptions::start_of_today_at(self.now, &self.tz);
        let count = self.rule.count();

        let frequency = self
            .rule
            .frequency()
            .inspect_err(|err| tracing::warn!(%err, "recurrence stops after its first period"))
            .ok();
        let interval = self.rule.interval().unwrap_or_else(|err| {
            tracing::warn!(%err, "using INTERVAL=1");
            1
        });

        let start = base.start.naive_local();
        let mut filters = ByFilters::from_rule(self.rule);
        let span = Span::for_rule(frequency, &filters);
        if span == Span::Year && !filters.has_day_filter() {
            // BYMONTH alone keeps the day of month of the first occurrence
            filters.by_month_day = i32::try_from(start.day()).ok().map(|day| vec![day]);
        }

        let mut occurrences = vec![];
        let mut matched = 0;
        let mut iterations = 0;
        let mut period = span.first_period(start.date());

        let stop = 'expansion: loop {
            let Some(current) = period else {
                break StopReason::OutOfRange;
            };
            if iterations >= MAX_ITERATIONS {
                break StopReason::IterationCap;
            }
            let mut stepped = false;
            for date in span.days(current).filter(|date| *date >= start.date()) {
                let Some(instant) = self.tz.resolve_local(&date.and_time(start.time())) else {
                    break 'expansion StopReason::OutOfRange;
                };
                if until.is_some_and(|until| instant > until) {
                    break 'expansion StopReason::Until;
                }
                if instant > horizon {
                    break 'expansion StopReason::Horizon;
                }
                if !stepped {
                    iterations += 1;
                    stepped = true;
                }
                if count.is_some_and(|count| matched >= count) {
                    break 'expansion StopReason::Count;
                }

                if filters.matches(date) && !self.exdates.contains(date) {
                    if instant >= today {
                        occurrences.push(base.with_span(instant, instant + duration));
                    }
                    matched += 1;
                }
            }

            let Some(frequency) = frequency else {
                break StopReason::Frequency;
            };
            period = advance(current, frequency, interval);
        };

        tracing::trace!(
            ?stop,
            iterations,
            matched,
            emitted = occurrences.len(),
            "recurrence expanded"
        );
        Expansion {
            occurrences,
            matched,
            iterations,
            stop,
        }
    }
}
