//! Partial date and time values.
//!
//! Dates are `YYYY[-MM[-DD]]`, or a seasonal `MM[-DD]` without a year. Times
//! are `YYYY[-MM[-DD[ HH[:MM[:SS]]]]]`. Used as a range endpoint, missing
//! trailing fields are filled with the earliest (lower bound) or latest
//! (upper bound) possible value.

use std::sync::LazyLock;

use regex::Regex;

static YEAR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(?:[-/](\d{1,2})(?:[-/](\d{1,2}))?)?$").expect("valid regex")
});

static SEASON_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?:[-/](\d{1,2}))?$").expect("valid regex"));

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})(?:[-/](\d{1,2})(?:[-/](\d{1,2})(?:[ T-](\d{1,2})(?:[:-](\d{1,2})(?:[:-](\d{1,2}))?)?)?)?)?$",
    )
    .expect("valid regex")
});

/// Which end of a range a value is, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

const DATE_LOWER: [u32; 2] = [1, 1];
const DATE_UPPER: [u32; 2] = [12, 31];
const TIME_LOWER: [u32; 5] = [1, 1, 0, 0, 0];
const TIME_UPPER: [u32; 5] = [12, 31, 23, 59, 59];

/// A date with the fields that were given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialDate {
    /// Year plus optional month and day
    Year {
        year: u32,
        month: Option<u32>,
        day: Option<u32>,
    },
    /// Month plus optional day, any year
    Season { month: u32, day: Option<u32> },
}

fn capture(caps: &regex::Captures<'_>, i: usize) -> Option<u32> {
    caps.get(i).and_then(|m| m.as_str().parse().ok())
}

fn valid_month_day(month: Option<u32>, day: Option<u32>) -> bool {
    month.is_none_or(|m| (1..=12).contains(&m)) && day.is_none_or(|d| (1..=31).contains(&d))
}

impl PartialDate {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(caps) = YEAR_DATE.captures(s) {
            let (month, day) = (capture(&caps, 2), capture(&caps, 3));
            return valid_month_day(month, day).then_some(PartialDate::Year {
                year: capture(&caps, 1)?,
                month,
                day,
            });
        }
        let caps = SEASON_DATE.captures(s)?;
        let (month, day) = (capture(&caps, 1)?, capture(&caps, 2));
        valid_month_day(Some(month), day).then_some(PartialDate::Season { month, day })
    }

    /// Canonical zero-padded text; year dates are completed for range bounds.
    pub fn normalize(&self, bound: Bound) -> String {
        match *self {
            PartialDate::Year { year, month, day } => match (bound, month, day) {
                (Bound::Exact, None, _) => format!("{year:04}"),
                (Bound::Exact, Some(m), None) => format!("{year:04}-{m:02}"),
                _ => {
                    let defaults = if bound == Bound::Upper {
                        DATE_UPPER
                    } else {
                        DATE_LOWER
                    };
                    format!(
                        "{year:04}-{:02}-{:02}",
                        month.unwrap_or(defaults[0]),
                        day.unwrap_or(defaults[1])
                    )
                }
            },
            PartialDate::Season { month, day: None } => format!("{month:02}"),
            PartialDate::Season {
                month,
                day: Some(day),
            } => format!("{month:02}-{day:02}"),
        }
    }
}

/// Parses a partial time into its given fields.
pub fn parse_time(s: &str) -> Option<Vec<u32>> {
    let caps = TIME.captures(s.trim())?;
    let fields = (1..=6).map_while(|i| capture(&caps, i)).collect::<Vec<_>>();
    let valid = fields
        .iter()
        .skip(1)
        .zip(TIME_UPPER)
        .enumerate()
        .all(|(i, (value, max))| *value <= max && (i >= 2 || *value >= 1));
    valid.then_some(fields)
}

/// Canonical text for a partial time; completed for range bounds.
pub fn normalize_time(fields: &[u32], bound: Bound) -> String {
    let count = if bound == Bound::Exact {
        fields.len()
    } else {
        6
    };
    let defaults = if bound == Bound::Upper {
        TIME_UPPER
    } else {
        TIME_LOWER
    };
    let mut out = String::with_capacity(19);
    for i in 0..count {
        let value = fields
            .get(i)
            .copied()
            .unwrap_or_else(|| defaults[i.saturating_sub(1)]);
        match i {
            0 => out.push_str(&format!("{value:04}")),
            1 | 2 => out.push_str(&format!("-{value:02}")),
            3 => out.push_str(&format!(" {value:02}")),
            _ => out.push_str(&format!(":{value:02}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_dates() {
        let date = PartialDate::parse("2020").unwrap();
        assert_eq!(date.normalize(Bound::Exact), "2020");
        assert_eq!(date.normalize(Bound::Lower), "2020-01-01");
        assert_eq!(date.normalize(Bound::Upper), "2020-12-31");

        let date = PartialDate::parse("2020-3").unwrap();
        assert_eq!(date.normalize(Bound::Exact), "2020-03");
        assert_eq!(date.normalize(Bound::Upper), "2020-03-31");

        let date = PartialDate::parse("2020-03-05").unwrap();
        assert_eq!(date.normalize(Bound::Upper), "2020-03-05");
    }

    #[test]
    fn test_season_dates() {
        let date = PartialDate::parse("12-5").unwrap();
        assert_eq!(date, PartialDate::Season { month: 12, day: Some(5) });
        assert_eq!(date.normalize(Bound::Lower), "12-05");
        assert_eq!(PartialDate::parse("7").unwrap().normalize(Bound::Upper), "07");
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(PartialDate::parse("2020-13"), None);
        assert_eq!(PartialDate::parse("2020-01-32"), None);
        assert_eq!(PartialDate::parse("yesterday"), None);
        assert_eq!(PartialDate::parse("13-01"), None);
    }

    #[test]
    fn test_times() {
        let fields = parse_time("2021-06").unwrap();
        assert_eq!(normalize_time(&fields, Bound::Lower), "2021-06-01 00:00:00");
        assert_eq!(normalize_time(&fields, Bound::Upper), "2021-06-31 23:59:59");
        assert_eq!(normalize_time(&fields, Bound::Exact), "2021-06");

        let fields = parse_time("2021-06-02 7:05").unwrap();
        assert_eq!(normalize_time(&fields, Bound::Upper), "2021-06-02 07:05:59");

        let fields = parse_time("2021-06-02-07-05-09").unwrap();
        assert_eq!(fields, vec![2021, 6, 2, 7, 5, 9]);

        let full = normalize_time(&fields, Bound::Lower);
        assert_eq!(parse_time(&full).unwrap(), fields);
    }

    #[test]
    fn test_invalid_times() {
        assert_eq!(parse_time("2021-00"), None);
        assert_eq!(parse_time("2021-01-01 25"), None);
        assert_eq!(parse_time("noon"), None);
    }
}
