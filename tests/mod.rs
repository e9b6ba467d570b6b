use calfeed::{Occurrence, ParserOptions, types::Tz};
use chrono::{DateTime, TimeZone, Utc};
use itertools::Itertools;

const FEED: &str = include_str!("./resources/makerspace.ics");
const NEW_YORK: Tz = Tz::Olson(chrono_tz::America::New_York);

/// Wednesday 2025-03-05, 10:00 in New York.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 5, 15, 0, 0).unwrap()
}

pub fn options(timezone: Tz) -> ParserOptions {
    ParserOptions {
        timezone,
        now: Some(now()),
    }
}

pub fn listing<'a>(occurrences: impl IntoIterator<Item = &'a Occurrence>) -> String {
    occurrences
        .into_iter()
        .map(|occurrence| {
            let when = if occurrence.is_all_day {
                occurrence.start.format("%Y-%m-%d all day").to_string()
            } else {
                occurrence.start.format("%Y-%m-%d %H:%M").to_string()
            };
            format!("{when} {}", occurrence.title)
        })
        .join("\n")
}

pub mod feed {
    use super::{FEED, NEW_YORK, listing, now, options};
    use calfeed::{
        EventParser, ParserError, expand_feed,
        types::Tz,
        window::{group_by_month, sort_by_start},
    };
    use chrono::{TimeZone, Utc};
    use itertools::Itertools;

    #[test]
    fn expands_upcoming_occurrences() {
        let mut occurrences = expand_feed(FEED, &options(NEW_YORK));
        sort_by_start(&mut occurrences);
        insta::assert_snapshot!(listing(&occurrences), @r"
        2025-03-06 18:00 Open Shop
        2025-03-07 09:00 Print Farm Maintenance
        2025-03-09 09:00 Print Farm Maintenance
        2025-03-11 09:00 Print Farm Maintenance
        2025-03-13 18:00 Open Shop
        2025-03-17 18:00 Open Shop
        2025-03-20 18:00 Open Shop
        2025-03-22 10:00 Laser Cutter Basics
        2025-03-24 18:00 Open Shop
        2025-03-27 18:00 Open Shop
        2025-03-31 18:00 Open Shop
        2025-04-01 19:00 Members Meeting
        2025-04-19 all day Spring Cleanup
        2025-05-06 19:00 Members Meeting
        2025-06-03 19:00 Members Meeting
        ");
    }

    #[test]
    fn occurrences_are_in_feed_order() {
        let occurrences = expand_feed(FEED, &options(NEW_YORK));
        let titles = occurrences
            .iter()
            .map(|occurrence| occurrence.title.as_str())
            .dedup()
            .collect_vec();
        assert_eq!(
            titles,
            vec![
                "Open Shop",
                "Members Meeting",
                "Laser Cutter Basics",
                "Spring Cleanup",
                "Print Farm Maintenance"
            ]
        );
    }

    #[test]
    fn broken_events_are_reported() {
        let results = EventParser::new(FEED)
            .with_options(options(NEW_YORK))
            .collect_vec();
        assert_eq!(results.len(), 8);
        let errors = results.iter().filter_map(|result| result.as_ref().err()).collect_vec();
        assert_eq!(errors, vec![&ParserError::MissingProperty("DTSTART")]);
    }

    #[test]
    fn series_keep_fields() {
        let occurrences = expand_feed(FEED, &options(NEW_YORK));
        let open_shop = occurrences
            .iter()
            .filter(|occurrence| occurrence.title == "Open Shop")
            .collect_vec();
        assert_eq!(open_shop.len(), 7);
        for occurrence in open_shop {
            assert_eq!(occurrence.location, "Kalamazoo Makers, 1 Main St");
            assert_eq!(occurrence.duration(), chrono::TimeDelta::hours(3));
        }
    }

    #[test]
    fn utc_events_do_not_depend_on_zone() {
        let first = |timezone: Tz| {
            expand_feed(FEED, &options(timezone))
                .into_iter()
                .find(|occurrence| occurrence.title == "Print Farm Maintenance")
                .map(|occurrence| occurrence.start.with_timezone(&Utc))
        };
        let expected = Utc.with_ymd_and_hms(2025, 3, 7, 14, 0, 0).single();
        assert_eq!(first(NEW_YORK), expected);
        assert_eq!(first(Tz::Olson(chrono_tz::Europe::Berlin)), expected);
        assert_eq!(first(Tz::UTC), expected);
    }

    #[test]
    fn grouped_by_month() {
        let mut occurrences = expand_feed(FEED, &options(NEW_YORK));
        sort_by_start(&mut occurrences);
        let months = group_by_month(&occurrences)
            .into_iter()
            .map(|(month, events)| format!("{} {month} {}", month.label(), events.len()))
            .collect_vec();
        assert_eq!(
            months,
            vec![
                "March 2025 2025-03 11",
                "April 2025 2025-04 2",
                "May 2025 2025-05 1",
                "June 2025 2025-06 1"
            ]
        );
    }

    #[test]
    fn now_is_pinned() {
        assert_eq!(options(NEW_YORK).pinned().now(), now());
    }
}

pub mod description {
    use super::{FEED, NEW_YORK, options};
    use calfeed::expand_feed;

    #[test]
    fn folded_markup_is_cleaned() {
        let occurrences = expand_feed(FEED, &options(NEW_YORK));
        let laser = occurrences
            .iter()
            .find(|occurrence| occurrence.title == "Laser Cutter Basics")
            .unwrap();
        similar_asserts::assert_eq!(
            laser.description.as_str(),
            r#"Learn to run the laser cutter safely.<br>Sign up <a href="https://example.org/laser">here</a> or see https://example.org/faq"#
        );
        similar_asserts::assert_eq!(
            laser.description_html(),
            "Learn to run the laser cutter safely.\nSign up <a href=\"https://example.org/laser\" target=\"_blank\">here</a> or see <a href=\"https://example.org/faq\" target=\"_blank\">https://example.org/faq</a>"
        );
    }
}

pub mod export {
    use super::{FEED, NEW_YORK, now, options};
    use calfeed::{
        EventParser, expand_feed,
        generator::{Emitter, OccurrenceExport},
    };

    #[test]
    fn exported_occurrence_reparses() {
        let occurrences = expand_feed(FEED, &options(NEW_YORK));
        for occurrence in &occurrences {
            let export = OccurrenceExport::new(occurrence, "test@example.org").with_dtstamp(now());
            let text = export.generate();
            let parsed = EventParser::new(&text)
                .with_options(options(NEW_YORK))
                .next()
                .unwrap()
                .unwrap();
            similar_asserts::assert_eq!(&parsed.event, occurrence);
        }
    }

    #[test]
    fn file_name() {
        let occurrences = expand_feed(FEED, &options(NEW_YORK));
        let export = OccurrenceExport::new(&occurrences[0], "1");
        assert_eq!(export.file_name(), "Open_Shop.ics");
    }
}

pub mod line {
    use calfeed::{ContentLineParser, LineReader, parser::Token};
    use itertools::Itertools;

    #[test]
    fn line_endings_are_equivalent() {
        let crlf = super::FEED;
        let lf = crlf.replace("\r\n", "\n");
        let lines = |input: &str| {
            LineReader::new(input)
                .map(|line| line.as_str().to_owned())
                .collect_vec()
        };
        assert_eq!(lines(crlf), lines(&lf));
    }

    #[test]
    fn continuation_tokens() {
        let continuations = ContentLineParser::new(super::FEED)
            .filter(|token| matches!(token, Token::Continuation(_)))
            .count();
        assert_eq!(continuations, 1);
    }
}
