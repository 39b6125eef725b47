//! Input mask for `DD/MM/YYYY HH:mm` date/time fields.
//!
//! [`format`] only shapes the digits typed so far and never rejects anything,
//! so a half-typed or out-of-range value can still be edited. Whether the
//! finished value names a real moment is decided separately by [`is_valid`].
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// `strftime` pattern of a completed mask.
pub const PATTERN: &str = "%d/%m/%Y %H:%M";

pub const MAX_DIGITS: usize = 12;

// day, month, year, hour, minute
const WIDTHS: [usize; 5] = [2, 2, 4, 2, 2];
const SEPARATORS: [&str; 5] = ["", "/", "/", " ", ":"];

/// Re-masks `raw`, keeping at most [`MAX_DIGITS`] of its digits.
///
/// ```
/// use finpal_core::mask::format;
///
/// assert_eq!(format("1506"), "15/06");
/// assert_eq!(format("15/06/2024 1030"), "15/06/2024 10:30");
/// ```
pub fn format(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();

    match split_groups(&digits) {
        Some(groups) => groups
            .iter()
            .zip(SEPARATORS)
            .filter(|(group, _)| !group.is_empty())
            .fold(String::new(), |mut out, (group, sep)| {
                out.push_str(sep);
                out.push_str(group);
                out
            }),
        None => raw.to_string(),
    }
}

/// Splits a digit run greedily into day, month, year, hour and minute.
/// Returns `None` for anything that is not a run of at most
/// [`MAX_DIGITS`] ASCII digits.
fn split_groups(digits: &str) -> Option<[&str; 5]> {
    if digits.len() > MAX_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut groups = [""; 5];
    let mut rest = digits;
    for (slot, width) in groups.iter_mut().zip(WIDTHS) {
        let (head, tail) = rest.split_at(width.min(rest.len()));
        *slot = head;
        rest = tail;
    }

    Some(groups)
}

/// Reports whether `value` is a complete mask naming a real date and time.
pub fn is_valid(value: &str) -> bool {
    parse(value).is_some()
}

/// Parses a complete mask.
///
/// The components must survive a round trip through the calendar unchanged:
/// 31/04, 29/02 outside leap years, month 13 or hour 24 are all rejected
/// instead of rolling over into the next period. Two-digit years are not
/// expanded and are rejected as well.
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    let (date, time) = match value.split(' ').collect::<Vec<_>>()[..] {
        [date, time] if !date.is_empty() && !time.is_empty() => (date, time),
        _ => return None,
    };

    let [day, month, year] = numeric_fields::<3>(date, '/')?;
    let [hour, minute] = numeric_fields::<2>(time, ':')?;
    if year < 100 {
        return None;
    }

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?.and_hms_opt(hour, minute, 0)
}

fn numeric_fields<const N: usize>(part: &str, sep: char) -> Option<[u32; N]> {
    let mut fields = part.split(sep);
    let mut out = [0; N];
    for slot in out.iter_mut() {
        let field = fields.next()?;
        if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = field.parse().ok()?;
    }

    fields.next().is_none().then_some(out)
}

/// Resolves a complete mask as wall-clock time in `tz`. Times skipped by a
/// daylight saving transition have no instant and yield `None`.
pub fn to_utc_in<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = parse(value)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn to_utc(value: &str) -> Option<DateTime<Utc>> {
    to_utc_in(value, &Local)
}

pub fn render(value: &NaiveDateTime) -> String {
    value.format(PATTERN).to_string()
}

/// The current local time as a complete mask.
pub fn now() -> String {
    render(&Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    #[test]
    fn format_inserts_separators_at_group_boundaries() {
        let tests = vec![
            ("", ""),
            ("1", "1"),
            ("15", "15"),
            ("150", "15/0"),
            ("1506", "15/06"),
            ("15062", "15/06/2"),
            ("15062024", "15/06/2024"),
            ("150620241", "15/06/2024 1"),
            ("1506202410", "15/06/2024 10"),
            ("15062024103", "15/06/2024 10:3"),
            ("150620241030", "15/06/2024 10:30"),
        ];

        for t in tests {
            assert_eq!(format(t.0), t.1, "input {:?}", t.0);
        }
    }

    #[test]
    fn format_strips_non_digits() {
        let tests = vec![
            ("15/06/2024 10:30", "15/06/2024 10:30"),
            ("15/06/", "15/06"),
            ("15-06-2024T10h30", "15/06/2024 10:30"),
            ("abc", ""),
            ("1a5b", "15"),
        ];

        for t in tests {
            assert_eq!(format(t.0), t.1, "input {:?}", t.0);
        }
    }

    #[test]
    fn format_keeps_at_most_twelve_digits() {
        assert_eq!(format("1506202410305"), "15/06/2024 10:30");
        assert_eq!(format("15/06/2024 10:3099"), "15/06/2024 10:30");
    }

    #[test]
    fn format_does_not_validate_ranges() {
        assert_eq!(format("99999999"), "99/99/9999");
        assert_eq!(format("310220242460"), "31/02/2024 24:60");
    }

    #[test]
    fn format_is_idempotent() {
        let inputs = vec![
            "",
            "1",
            "150",
            "15062",
            "150620241",
            "150620241030",
            "15/06/2024 10:30",
            "x1y2z3",
            "1506202410305555",
        ];

        for input in inputs {
            let once = format(input);
            assert_eq!(format(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn format_preserves_digit_order() {
        let digits = "123456789012";
        for len in 0..=digits.len() {
            let out = format(&digits[..len]);
            let kept: String = out.chars().filter(char::is_ascii_digit).collect();
            assert_eq!(kept, &digits[..len]);
        }
    }

    #[test]
    fn split_groups_rejects_undecomposable_runs() {
        assert_eq!(split_groups("1234567890123"), None);
        assert_eq!(split_groups("12a4"), None);
        assert_eq!(split_groups("12345"), Some(["12", "34", "5", "", ""]));
    }

    #[test]
    fn validity_of_calendar_values() {
        let tests = vec![
            ("15/06/2024 23:59", true),
            ("15/06/2024 00:00", true),
            ("29/02/2024 10:00", true),
            ("29/02/2023 10:00", false),
            ("30/02/2024 10:00", false),
            ("31/02/2024 10:00", false),
            ("31/04/2024 10:00", false),
            ("31/12/2024 10:00", true),
            ("15/13/2024 10:00", false),
            ("00/06/2024 10:00", false),
            ("15/06/2024 24:00", false),
            ("15/06/2024 10:60", false),
            ("1/6/2024 9:05", true),
        ];

        for t in tests {
            assert_eq!(is_valid(t.0), t.1, "input {:?}", t.0);
        }
    }

    #[test]
    fn validity_of_malformed_values() {
        let tests = vec![
            "",
            " ",
            "15/06/2024",
            "15/06/2024 ",
            " 10:00",
            "15/06/2024  10:00",
            "15/06/2024 10:00 extra",
            "15/06 10:00",
            "15/06/2024/1 10:00",
            "15/06/2024 10",
            "15/06/2024 10:00:00",
            "aa/06/2024 10:00",
            "15/06/2024 10:-1",
            "15//2024 10:00",
            "15/06/24 10:00",
        ];

        for t in tests {
            assert!(!is_valid(t), "input {:?}", t);
        }
    }

    #[test]
    fn parse_returns_calendar_value() {
        let parsed = parse("05/03/2024 08:07").unwrap();

        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(8, 7, 0)
                .unwrap()
        );
        assert_eq!(render(&parsed), "05/03/2024 08:07");
    }

    #[test]
    fn to_utc_applies_offset() {
        let brasilia = FixedOffset::west_opt(3 * 3600).unwrap();

        let utc = to_utc_in("15/06/2024 22:30", &brasilia).unwrap();

        assert_eq!(utc, "2024-06-16T01:30:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(to_utc_in("31/06/2024 22:30", &brasilia), None);
    }

    #[test]
    fn now_is_a_valid_mask() {
        let current = now();

        assert!(is_valid(&current), "{}", current);
        assert_eq!(format(&current), current);
    }
}
