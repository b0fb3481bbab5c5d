use chrono::NaiveDateTime;

use crate::error::TimestampError;

/// One accepted layout for the joined `"<date> <time>"` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFormat {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Layouts tried in order; the first one that parses wins.
///
/// The ISO and slash layouts cover what a generic parser would detect
/// (slash dates are month-first). The dotted layout is the
/// `day.month.year` form HWiNFO writes on European locales. `%.f` accepts
/// a missing fraction as well.
pub const FORMATS: &[TimestampFormat] = &[
    TimestampFormat {
        name: "iso",
        pattern: "%Y-%m-%d %H:%M:%S%.f",
    },
    TimestampFormat {
        name: "iso-t",
        pattern: "%Y-%m-%dT%H:%M:%S%.f",
    },
    TimestampFormat {
        name: "iso-minutes",
        pattern: "%Y-%m-%d %H:%M",
    },
    TimestampFormat {
        name: "ymd-slash",
        pattern: "%Y/%m/%d %H:%M:%S%.f",
    },
    TimestampFormat {
        name: "mdy-slash",
        pattern: "%m/%d/%Y %H:%M:%S%.f",
    },
    TimestampFormat {
        name: "mdy-slash-12h",
        pattern: "%m/%d/%Y %I:%M:%S%.f %p",
    },
    TimestampFormat {
        name: "dmy-dotted",
        pattern: "%d.%m.%Y %H:%M:%S%.f",
    },
    TimestampFormat {
        name: "dmy-dotted-minutes",
        pattern: "%d.%m.%Y %H:%M",
    },
];

/// Join the two fields with a single space and run the format list.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, TimestampError> {
    let joined = format!("{} {}", date.trim(), time.trim());
    parse_joined(&joined)
}

pub fn parse_joined(text: &str) -> Result<NaiveDateTime, TimestampError> {
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f.pattern).ok())
        .ok_or_else(|| TimestampError(text.to_string()))
}

/// Name of the first layout accepting `text`, for diagnostics.
pub fn detect_format(text: &str) -> Option<&'static str> {
    FORMATS
        .iter()
        .find(|f| NaiveDateTime::parse_from_str(text, f.pattern).is_ok())
        .map(|f| f.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn dotted_day_month_year_with_fraction() {
        assert_eq!(
            parse_timestamp("01.11.2025", "14:05:30.250").unwrap(),
            at(2025, 11, 1, 14, 5, 30, 250)
        );
        assert_eq!(detect_format("01.11.2025 14:05:30.250"), Some("dmy-dotted"));
    }

    #[test]
    fn dotted_without_padding_or_fraction() {
        assert_eq!(
            parse_timestamp("7.11.2025", "9:03:01").unwrap(),
            at(2025, 11, 7, 9, 3, 1, 0)
        );
    }

    #[test]
    fn iso_layout() {
        assert_eq!(
            parse_timestamp("2025-11-03", "08:00:00.5").unwrap(),
            at(2025, 11, 3, 8, 0, 0, 500)
        );
    }

    #[test]
    fn slash_dates_are_month_first() {
        assert_eq!(
            parse_timestamp("11/02/2025", "23:59:59").unwrap(),
            at(2025, 11, 2, 23, 59, 59, 0)
        );
        assert_eq!(
            parse_timestamp("11/02/2025", "11:59:59 PM").unwrap(),
            at(2025, 11, 2, 23, 59, 59, 0)
        );
    }

    #[test]
    fn garbage_is_a_typed_error() {
        let err = parse_timestamp("01.11.2025", "garbage").unwrap_err();
        assert_eq!(err, TimestampError("01.11.2025 garbage".to_string()));
        assert!(parse_timestamp("", "").is_err());
        assert!(parse_timestamp("Date", "Time").is_err());
    }

    #[test]
    fn out_of_range_day_is_rejected() {
        assert!(parse_timestamp("32.11.2025", "10:00:00").is_err());
    }
}
