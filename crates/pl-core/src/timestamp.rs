use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
];

const NAIVE_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses an event timestamp. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }
    parse_epoch(value)
}

fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number = value.parse::<i64>().ok()?;
    match value.len() {
        10 => DateTime::from_timestamp(number, 0),
        13 => DateTime::from_timestamp_millis(number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_plain_datetime_as_utc() {
        assert_eq!(
            parse_timestamp("2023-01-01 10:05:00"),
            Some(utc(2023, 1, 1, 10, 5, 0))
        );
        assert_eq!(
            parse_timestamp("2023/01/01 10:05:00"),
            Some(utc(2023, 1, 1, 10, 5, 0))
        );
    }

    #[test]
    fn slashed_dates_are_month_first() {
        assert_eq!(
            parse_timestamp("01/02/2023 10:00"),
            Some(utc(2023, 1, 2, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("12/31/2023 23:59:30"),
            Some(utc(2023, 12, 31, 23, 59, 30))
        );
        assert_eq!(parse_timestamp("31/12/2023 10:00"), None);
    }

    #[test]
    fn converts_offsets_to_utc() {
        assert_eq!(
            parse_timestamp("2010-12-30T11:02:00.000+01:00"),
            Some(utc(2010, 12, 30, 10, 2, 0))
        );
        assert_eq!(
            parse_timestamp("2010-12-30 11:02:00+02:00"),
            Some(utc(2010, 12, 30, 9, 2, 0))
        );
    }

    #[test]
    fn accepts_dates_and_epochs() {
        assert_eq!(parse_timestamp("2023-03-04"), Some(utc(2023, 3, 4, 0, 0, 0)));
        assert_eq!(parse_timestamp("1672567200"), Some(utc(2023, 1, 1, 10, 0, 0)));
        assert_eq!(
            parse_timestamp("1672567200000"),
            Some(utc(2023, 1, 1, 10, 0, 0))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("12345"), None);
    }
}
