use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use crate::error::{Error, Result};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses free text into a deadline relative to the current time.
///
/// See [`parse_deadline_at`] for the accepted forms.
pub fn parse_deadline(input: &str) -> Result<Option<DateTime<Utc>>> {
    parse_deadline_at(input, Utc::now())
}

/// Parses free text into a deadline, resolving relative offsets against `now`.
///
/// Accepted forms:
/// - empty or blank: no deadline
/// - `2025-11-16 14:30`, `2025-11-16T14:30` (local time)
/// - `2025-11-16` (end of that day, local time)
/// - RFC 3339, e.g. `2025-11-16T14:30:00+01:00`
/// - offsets such as `2d`, `1h 30m`, `1w 2d` (units `w`, `d`, `h`, `m`)
pub fn parse_deadline_at(input: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return local_to_utc(input, naive).map(Some);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default();
        return local_to_utc(input, date.and_time(end_of_day)).map(Some);
    }

    let offset = parse_offset(input, text)?;
    now.checked_add_signed(offset)
        .map(Some)
        .ok_or_else(|| invalid(input, "deadline is out of range"))
}

fn local_to_utc(input: &str, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| invalid(input, "time does not exist in the local timezone"))
}

/// Sums whitespace-separated `<n><unit>` tokens.
fn parse_offset(input: &str, text: &str) -> Result<Duration> {
    let mut total = Duration::zero();
    for token in text.split_whitespace() {
        let split = token.find(|c: char| !c.is_ascii_digit()).unwrap_or(token.len());
        let (digits, unit) = token.split_at(split);
        if digits.is_empty() {
            return Err(invalid(input, &format!("'{token}' is missing a number")));
        }
        let n: i64 = digits
            .parse()
            .map_err(|_| invalid(input, &format!("'{digits}' is too large")))?;
        let part = match unit {
            "w" => Duration::try_weeks(n),
            "d" => Duration::try_days(n),
            "h" => Duration::try_hours(n),
            "m" => Duration::try_minutes(n),
            "" => return Err(invalid(input, &format!("'{token}' is missing a unit (w, d, h, m)"))),
            other => return Err(invalid(input, &format!("unknown unit '{other}', use w, d, h or m"))),
        };
        total = part
            .and_then(|p| total.checked_add(&p))
            .ok_or_else(|| invalid(input, "offset is too large"))?;
    }
    Ok(total)
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidDeadline {
        input: input.trim().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 14, 10, 0, 0).unwrap()
    }

    #[test]
    fn blank_input_means_no_deadline() {
        assert_eq!(parse_deadline_at("", now()).unwrap(), None);
        assert_eq!(parse_deadline_at("   ", now()).unwrap(), None);
    }

    #[test]
    fn relative_offsets_add_up() {
        let cases = [
            ("2d", Duration::days(2)),
            ("1h 30m", Duration::minutes(90)),
            ("1w 2d", Duration::days(9)),
            ("45m", Duration::minutes(45)),
        ];
        for (input, offset) in cases {
            assert_eq!(parse_deadline_at(input, now()).unwrap(), Some(now() + offset), "{input}");
        }
    }

    #[test]
    fn absolute_local_datetime() {
        let parsed = parse_deadline_at("2025-11-16 14:30", now()).unwrap().unwrap();
        let expected = Local.with_ymd_and_hms(2025, 11, 16, 14, 30, 0).unwrap().with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn bare_date_means_end_of_day() {
        let parsed = parse_deadline_at("2025-11-16", now()).unwrap().unwrap();
        let expected = Local.with_ymd_and_hms(2025, 11, 16, 23, 59, 0).unwrap().with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rfc3339_keeps_its_offset() {
        let parsed = parse_deadline_at("2025-11-16T14:30:00+02:00", now()).unwrap().unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 11, 16, 12, 30, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        for input in ["soon", "2x", "d", "12", "1h thirty", "2025-13-01"] {
            let err = parse_deadline_at(input, now()).unwrap_err();
            assert!(matches!(err, Error::InvalidDeadline { .. }), "{input}");
            assert!(err.is_validation());
        }
    }
}
